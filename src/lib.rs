//! Fixed capacity, thread-safe write buffer.
//!
//! [`BufferedWriter`] coalesces many small writes into fewer, larger writes
//! to an underlying [`std::io::Write`] sink. Buffered bytes reach the sink
//! when an incoming write would fill the buffer, on explicit
//! [`BufferedWriter::flush`], or periodically from a background flusher
//! thread started with [`BufferedWriter::start_flusher`].
#![cfg_attr(docrs, feature(doc_cfg))]

use thiserror::Error;

#[cfg(test)]
mod tests;

mod config;
mod flusher;
mod writer;

pub use config::{Config, DEFAULT_CAPACITY};
pub use flusher::ErrorHandler;
pub use writer::BufferedWriter;

pub mod prelude {
    pub use crate::config::Config;
    pub use crate::flusher::ErrorHandler;
    pub use crate::writer::BufferedWriter;
    pub use crate::Error;
    pub use std::time::Duration;
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid buffer capacity {0}, must be positive")]
    InvalidCapacity(usize),
    #[error("sink write error: {0}")]
    SinkWrite(#[from] std::io::Error),
    #[error("short write: sink accepted {written} of {expected} bytes")]
    ShortWrite { written: usize, expected: usize },
    #[error("periodic flusher is already running")]
    AlreadyRunning,
    #[error("flush interval must be non zero")]
    InvalidInterval,
    #[error("failed to spawn flusher thread")]
    FlusherSpawn(#[source] std::io::Error),
}

impl From<Error> for std::io::Error {
    fn from(e: Error) -> Self {
        use std::io::ErrorKind;
        match e {
            Error::SinkWrite(e) => e,
            Error::ShortWrite { .. } => std::io::Error::new(ErrorKind::WriteZero, e),
            Error::InvalidCapacity(_) | Error::InvalidInterval => {
                std::io::Error::new(ErrorKind::InvalidInput, e)
            }
            Error::AlreadyRunning | Error::FlusherSpawn(_) => {
                std::io::Error::new(ErrorKind::Other, e)
            }
        }
    }
}
