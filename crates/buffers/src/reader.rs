//! In-memory byte-slice stream with cursor tracking.

use crate::stream::ReadStream;
use crate::BufferError;

/// A byte-slice source with a cursor and an optional read ceiling.
///
/// All reads are zero-copy views into the underlying slice.
///
/// # Example
///
/// ```
/// use bson_buffers::{ReadStream, Reader};
///
/// let data = [0x01, 0x02, 0x03, 0x00, 0x04];
/// let mut reader = Reader::new(&data);
///
/// assert_eq!(reader.read_exact(2).unwrap(), &[0x01, 0x02]);
/// assert_eq!(reader.read_until(0x00, false).unwrap(), &[0x03]);
/// assert_eq!(reader.position(), 3);
/// ```
pub struct Reader<'a> {
    /// The underlying byte slice.
    pub data: &'a [u8],
    /// Current cursor position.
    pub x: usize,
    limit: Option<usize>,
}

impl<'a> Reader<'a> {
    /// Creates a new reader over the given byte slice.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            x: 0,
            limit: None,
        }
    }

    /// Returns the number of bytes remaining before the ceiling or the end
    /// of the slice.
    pub fn remaining(&self) -> usize {
        self.end().saturating_sub(self.x)
    }

    /// Effective end of the readable region.
    fn end(&self) -> usize {
        match self.limit {
            Some(limit) => limit.min(self.data.len()),
            None => self.data.len(),
        }
    }
}

impl ReadStream for Reader<'_> {
    fn read_exact(&mut self, n: usize) -> Result<&[u8], BufferError> {
        if self.x + n > self.end() {
            return Err(BufferError::EndOfBuffer);
        }
        let start = self.x;
        self.x += n;
        Ok(&self.data[start..self.x])
    }

    fn read_until(
        &mut self,
        delimiter: u8,
        include_delimiter: bool,
    ) -> Result<&[u8], BufferError> {
        let end = self.end();
        if self.x > end {
            return Err(BufferError::EndOfBuffer);
        }
        match self.data[self.x..end].iter().position(|&b| b == delimiter) {
            Some(at) => {
                let n = if include_delimiter { at + 1 } else { at };
                let start = self.x;
                self.x += n;
                Ok(&self.data[start..start + n])
            }
            None => Err(BufferError::EndOfBuffer),
        }
    }

    fn position(&self) -> usize {
        self.x
    }

    fn read_limit(&self) -> Option<usize> {
        self.limit
    }

    fn set_read_limit(&mut self, limit: Option<usize>) {
        self.limit = limit;
    }
}
