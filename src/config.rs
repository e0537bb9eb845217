//! Writer construction parameters
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use crate::{BufferedWriter, Error};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default buffer capacity, in bytes
pub const DEFAULT_CAPACITY: usize = 4096;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    /// Buffer capacity, in bytes. Must be positive.
    pub capacity: usize,
    /// Periodic flush interval. No background flusher when None.
    pub flush_interval: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            flush_interval: None,
        }
    }
}

impl Config {
    /// Copies and returns [`Config`] with desired buffer capacity
    pub fn with_capacity(&self, capacity: usize) -> Self {
        let mut s = *self;
        s.capacity = capacity;
        s
    }
    /// Copies and returns [`Config`] with periodic flushing enabled
    pub fn with_flush_interval(&self, interval: Duration) -> Self {
        let mut s = *self;
        s.flush_interval = Some(interval);
        s
    }
}

impl<W: Write + Send + 'static> BufferedWriter<W> {
    /// Builds a shared [`BufferedWriter`] from a [`Config`], starting the
    /// periodic flusher when an interval is configured. Flush failures of
    /// that flusher are logged.
    pub fn from_config(config: Config, sink: W) -> Result<Arc<Self>, Error> {
        let writer = Arc::new(Self::new(config.capacity, sink)?);
        if let Some(interval) = config.flush_interval {
            writer.start_flusher(interval, None)?;
        }
        Ok(writer)
    }
}
