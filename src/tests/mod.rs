mod config;

use std::io::{Error, ErrorKind, Write};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct SinkState {
    calls: usize,
    bytes: usize,
    data: Vec<u8>,
    fail: bool,
    short: Option<usize>,
}

/*
 * Sink test double: records every write,
 * and can be told to fail or to accept fewer bytes than given.
 * Clones share the same state.
 */
#[derive(Clone, Default)]
pub(crate) struct RecordingSink {
    state: Arc<Mutex<SinkState>>,
}

impl RecordingSink {
    pub fn calls(&self) -> usize {
        self.state.lock().unwrap().calls
    }
    pub fn written(&self) -> usize {
        self.state.lock().unwrap().bytes
    }
    pub fn data(&self) -> Vec<u8> {
        self.state.lock().unwrap().data.clone()
    }
    pub fn fail_writes(&self, fail: bool) {
        self.state.lock().unwrap().fail = fail;
    }
    pub fn short_writes(&self, max: Option<usize>) {
        self.state.lock().unwrap().short = max;
    }
}

impl Write for RecordingSink {
    fn write(&mut self, data: &[u8]) -> std::io::Result<usize> {
        let mut state = self.state.lock().unwrap();
        state.calls += 1;
        if state.fail {
            return Err(Error::new(ErrorKind::BrokenPipe, "sink failure"));
        }
        let n = match state.short {
            Some(max) => max.min(data.len()),
            None => data.len(),
        };
        state.bytes += n;
        state.data.extend_from_slice(&data[..n]);
        Ok(n)
    }
    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
