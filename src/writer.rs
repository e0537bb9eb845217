//! Buffered writer, coalescing small writes into fewer sink writes
use parking_lot::Mutex;
use std::io::Write;
use tracing::{debug, trace, warn};

use crate::flusher::Flusher;
use crate::Error;

/*
 * Fixed size accumulation area.
 * Only data[..len] is meaningful.
 */
struct Buffer {
    data: Box<[u8]>,
    len: usize,
}

impl Buffer {
    fn new(capacity: usize) -> Self {
        Self {
            data: vec![0_u8; capacity].into_boxed_slice(),
            len: 0,
        }
    }

    fn append(&mut self, bytes: &[u8]) {
        let end = self.len + bytes.len();
        self.data[self.len..end].copy_from_slice(bytes);
        self.len = end;
    }

    /// Writes the valid prefix to `sink` in a single call.
    /// Length is reset only when the sink accepted everything.
    fn drain_into<W: Write>(&mut self, sink: &mut W) -> Result<usize, Error> {
        if self.len == 0 {
            return Ok(0);
        }
        let expected = self.len;
        let written = sink.write(&self.data[..expected])?;
        if written != expected {
            return Err(Error::ShortWrite { written, expected });
        }
        self.len = 0;
        Ok(expected)
    }
}

/// [`BufferedWriter`] accumulates writes into a fixed capacity buffer
/// and forwards them to the sink `W` in batches.
///
/// All operations take `&self`: share the writer between threads
/// with an [`std::sync::Arc`]. A single lock guards the buffer, the sink
/// sits behind its own lock so overflowing writes can reach it directly.
pub struct BufferedWriter<W: Write> {
    capacity: usize,
    buf: Mutex<Buffer>,
    sink: Mutex<W>,
    pub(crate) flusher: Mutex<Option<Flusher>>,
}

impl<W: Write> BufferedWriter<W> {
    /// Builds a new [`BufferedWriter`] holding up to `capacity` bytes
    /// before writing through to `sink`. Capacity must be positive.
    pub fn new(capacity: usize, sink: W) -> Result<Self, Error> {
        if capacity == 0 {
            return Err(Error::InvalidCapacity(capacity));
        }
        Ok(Self {
            capacity,
            buf: Mutex::new(Buffer::new(capacity)),
            sink: Mutex::new(sink),
            flusher: Mutex::new(None),
        })
    }

    /// Buffers `data`, or writes it through when it would not fit.
    ///
    /// When the buffered length plus `data` reaches the capacity, the
    /// buffer is flushed first and `data` is then handed to the sink
    /// directly, returning whatever the sink reports.
    ///
    /// This is lossy on error: if that preliminary flush fails,
    /// the error is returned and `data` is neither buffered nor sent.
    /// Previously buffered bytes are kept for a later [`Self::flush`].
    pub fn write(&self, data: &[u8]) -> Result<usize, Error> {
        if data.is_empty() {
            return Ok(0);
        }
        {
            let mut buf = self.buf.lock();
            if buf.len + data.len() < self.capacity {
                buf.append(data);
                trace!(size = data.len(), len = buf.len, "buffered write");
                return Ok(data.len());
            }
            self.flush_locked(&mut buf)?;
        }
        debug!(size = data.len(), "buffer overflow, writing through");
        let n = self.sink.lock().write(data)?;
        Ok(n)
    }

    /// Writes buffered content to the sink, in a single write.
    /// No-op on an empty buffer. On failure, buffered bytes are preserved.
    pub fn flush(&self) -> Result<(), Error> {
        let mut buf = self.buf.lock();
        self.flush_locked(&mut buf)
    }

    fn flush_locked(&self, buf: &mut Buffer) -> Result<(), Error> {
        let flushed = buf.drain_into(&mut *self.sink.lock())?;
        if flushed > 0 {
            debug!(bytes = flushed, "flushed buffer");
        }
        Ok(())
    }

    /// Number of bytes currently buffered
    pub fn len(&self) -> usize {
        self.buf.lock().len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Buffer capacity, in bytes
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns a copy of the entire buffer storage, `capacity` bytes long.
    /// Only the first [`Self::len`] bytes are meaningful, the remainder
    /// holds stale data from previous flushes. The copy is a snapshot:
    /// concurrent writes may change the length right after it was taken.
    pub fn bytes(&self) -> Vec<u8> {
        self.buf.lock().data.to_vec()
    }
}

impl<W: Write> Write for &BufferedWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        Ok(BufferedWriter::write(*self, buf)?)
    }
    fn flush(&mut self) -> std::io::Result<()> {
        BufferedWriter::flush(*self)?;
        self.sink.lock().flush()
    }
}

impl<W: Write> Write for BufferedWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        Write::write(&mut &*self, buf)
    }
    fn flush(&mut self) -> std::io::Result<()> {
        Write::flush(&mut &*self)
    }
}

impl<W: Write> Drop for BufferedWriter<W> {
    fn drop(&mut self) {
        if let Some(flusher) = self.flusher.get_mut().take() {
            flusher.stop();
        }
        let sink = self.sink.get_mut();
        if let Err(e) = self.buf.get_mut().drain_into(sink) {
            warn!("failed to flush buffer on drop: {}", e);
        }
    }
}
