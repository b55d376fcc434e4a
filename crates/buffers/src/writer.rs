//! Auto-growing in-memory sink with in-place patching.

use crate::stream::WriteStream;
use crate::BufferError;

/// A binary buffer writer that grows as needed.
///
/// Written bytes stay addressable so a length prefix can be patched in
/// place once its container's true size is known.
///
/// # Example
///
/// ```
/// use bson_buffers::{WriteStream, Writer};
///
/// let mut writer = Writer::new();
/// writer.write_exact(&[0x00, 0x00]).unwrap();
/// writer.write_exact(&[0xab]).unwrap();
/// writer.patch(0, &[0x03, 0x00]);
/// assert_eq!(writer.into_vec(), vec![0x03, 0x00, 0xab]);
/// ```
pub struct Writer {
    /// The underlying byte buffer.
    pub data: Vec<u8>,
}

impl Default for Writer {
    fn default() -> Self {
        Self::new()
    }
}

impl Writer {
    /// Creates a new empty writer.
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Creates a writer with the given initial capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    /// Overwrites already-written bytes at `offset`.
    ///
    /// The target range must have been written before; out-of-range
    /// patches are a caller bug and panic.
    pub fn patch(&mut self, offset: usize, bytes: &[u8]) {
        self.data[offset..offset + bytes.len()].copy_from_slice(bytes);
    }

    /// Consumes the writer and returns the written bytes.
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }
}

impl WriteStream for Writer {
    fn write_exact(&mut self, bytes: &[u8]) -> Result<(), BufferError> {
        self.data
            .try_reserve(bytes.len())
            .map_err(|_| BufferError::OutOfMemory)?;
        self.data.extend_from_slice(bytes);
        Ok(())
    }

    fn position(&self) -> usize {
        self.data.len()
    }
}
