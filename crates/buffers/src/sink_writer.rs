//! Pass-through sink over any `io::Write`.

use std::io;

use crate::stream::WriteStream;
use crate::BufferError;

/// Adapter that writes through to an [`io::Write`] sink while tracking the
/// number of bytes written.
///
/// # Example
///
/// ```
/// use bson_buffers::{SinkWriter, WriteStream};
///
/// let mut sink = SinkWriter::new(Vec::new());
/// sink.write_exact(b"abc").unwrap();
/// assert_eq!(sink.position(), 3);
/// assert_eq!(sink.into_inner(), b"abc");
/// ```
pub struct SinkWriter<W> {
    sink: W,
    x: usize,
}

impl<W: io::Write> SinkWriter<W> {
    /// Creates a new adapter over the given sink.
    pub fn new(sink: W) -> Self {
        Self { sink, x: 0 }
    }

    /// Consumes the adapter and returns the underlying sink.
    pub fn into_inner(self) -> W {
        self.sink
    }
}

impl<W: io::Write> WriteStream for SinkWriter<W> {
    fn write_exact(&mut self, bytes: &[u8]) -> Result<(), BufferError> {
        self.sink
            .write_all(bytes)
            .map_err(|e| BufferError::Io(e.kind()))?;
        self.x += bytes.len();
        Ok(())
    }

    fn position(&self) -> usize {
        self.x
    }
}
