//! Chunked read-ahead stream over any `io::Read` source.

use std::io;

use crate::stream::ReadStream;
use crate::BufferError;

const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// A sequential byte source with an internal read-ahead buffer.
///
/// While a read ceiling is installed, data is pulled from the underlying
/// reader in fixed-size chunks but never past the ceiling; with no
/// ceiling, only the requested bytes are pulled. A caller that confines a
/// region to its declared length therefore consumes exactly that many
/// bytes from the source.
///
/// # Example
///
/// ```
/// use bson_buffers::{ReadStream, StreamReader};
///
/// let source = std::io::Cursor::new(vec![0x01, 0x02, 0x03]);
/// let mut reader = StreamReader::new(source);
/// assert_eq!(reader.read_exact(2).unwrap(), &[0x01, 0x02]);
/// assert_eq!(reader.position(), 2);
/// ```
pub struct StreamReader<R> {
    source: R,
    /// Read-ahead window. Bytes before `x` are consumed but not yet dropped.
    buf: Vec<u8>,
    /// Cursor within `buf`.
    x: usize,
    /// Absolute position of `buf[0]` in the overall stream.
    offset: usize,
    limit: Option<usize>,
    chunk_size: usize,
}

impl<R: io::Read> StreamReader<R> {
    /// Creates a stream reader with the default 64 KiB chunk size.
    pub fn new(source: R) -> Self {
        Self::with_chunk_size(source, DEFAULT_CHUNK_SIZE)
    }

    /// Creates a stream reader that pulls up to `chunk_size` bytes per
    /// underlying read.
    pub fn with_chunk_size(source: R, chunk_size: usize) -> Self {
        assert!(chunk_size > 0, "chunk size must be non-zero");
        Self {
            source,
            buf: Vec::new(),
            x: 0,
            offset: 0,
            limit: None,
            chunk_size,
        }
    }

    /// Consumes the reader and returns the underlying source.
    pub fn into_inner(self) -> R {
        self.source
    }

    fn buffered(&self) -> usize {
        self.buf.len() - self.x
    }

    /// Ensures at least `need` unconsumed bytes are buffered.
    ///
    /// The ceiling is checked even when enough bytes are already buffered:
    /// read-ahead may have buffered data past a ceiling installed later.
    fn fill(&mut self, need: usize) -> Result<(), BufferError> {
        if let Some(limit) = self.limit {
            if self.offset + self.x + need > limit {
                return Err(BufferError::EndOfBuffer);
            }
        }
        if self.buffered() >= need {
            return Ok(());
        }
        // Drop the consumed prefix before growing the window.
        if self.x > 0 {
            self.buf.drain(..self.x);
            self.offset += self.x;
            self.x = 0;
        }
        while self.buf.len() < need {
            let want = match self.limit {
                // Read ahead in chunks, but never past the ceiling.
                Some(limit) => self
                    .chunk_size
                    .max(need - self.buf.len())
                    .min(limit - (self.offset + self.buf.len())),
                // No ceiling: pull only what was asked for, so the source
                // is never consumed past the caller's region.
                None => need - self.buf.len(),
            };
            let start = self.buf.len();
            self.buf
                .try_reserve(want)
                .map_err(|_| BufferError::OutOfMemory)?;
            self.buf.resize(start + want, 0);
            let read = loop {
                match self.source.read(&mut self.buf[start..]) {
                    Ok(n) => break n,
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => {
                        self.buf.truncate(start);
                        return Err(BufferError::Io(e.kind()));
                    }
                }
            };
            self.buf.truncate(start + read);
            if read == 0 {
                return Err(BufferError::EndOfBuffer);
            }
        }
        Ok(())
    }
}

impl<R: io::Read> ReadStream for StreamReader<R> {
    fn read_exact(&mut self, n: usize) -> Result<&[u8], BufferError> {
        self.fill(n)?;
        let start = self.x;
        self.x += n;
        Ok(&self.buf[start..start + n])
    }

    fn read_until(
        &mut self,
        delimiter: u8,
        include_delimiter: bool,
    ) -> Result<&[u8], BufferError> {
        let mut scanned = 0;
        let at = loop {
            // Scan only bytes below the ceiling; read-ahead may have
            // buffered data past it.
            let window = match self.limit {
                Some(limit) => limit
                    .saturating_sub(self.offset + self.x)
                    .min(self.buffered()),
                None => self.buffered(),
            };
            if let Some(i) = self.buf[self.x + scanned..self.x + window]
                .iter()
                .position(|&b| b == delimiter)
            {
                break scanned + i;
            }
            scanned = window;
            // Relative offsets survive the fill: compaction moves the
            // consumed prefix out but keeps everything from `x` on.
            self.fill(scanned + 1)?;
        };
        let n = if include_delimiter { at + 1 } else { at };
        let start = self.x;
        self.x += n;
        Ok(&self.buf[start..start + n])
    }

    fn position(&self) -> usize {
        self.offset + self.x
    }

    fn read_limit(&self) -> Option<usize> {
        self.limit
    }

    fn set_read_limit(&mut self, limit: Option<usize>) {
        self.limit = limit;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// A source that yields at most one byte per read call.
    struct Drip(Cursor<Vec<u8>>);

    impl io::Read for Drip {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = buf.len().min(1);
            self.0.read(&mut buf[..n])
        }
    }

    /// A source that fails once its prefix is exhausted.
    struct Failing(Cursor<Vec<u8>>);

    impl io::Read for Failing {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.0.read(buf)? {
                0 => Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset")),
                n => Ok(n),
            }
        }
    }

    #[test]
    fn test_read_exact_and_exhaustion() {
        let source = Cursor::new((0u8..10).collect::<Vec<u8>>());
        let mut reader = StreamReader::with_chunk_size(source, 3);
        assert_eq!(reader.read_exact(5).unwrap(), &[0, 1, 2, 3, 4]);
        assert_eq!(reader.read_exact(5).unwrap(), &[5, 6, 7, 8, 9]);
        assert_eq!(reader.position(), 10);
        assert_eq!(reader.read_exact(1), Err(BufferError::EndOfBuffer));
    }

    #[test]
    fn test_read_exact_from_drip_source() {
        let mut reader = StreamReader::new(Drip(Cursor::new(vec![1, 2, 3, 4])));
        assert_eq!(reader.read_exact(4).unwrap(), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_read_until_spans_chunks() {
        let source = Cursor::new(vec![0x61, 0x62, 0x63, 0x64, 0x00, 0x65]);
        let mut reader = StreamReader::with_chunk_size(source, 2);
        assert_eq!(
            reader.read_until(0x00, false),
            Ok(&[0x61, 0x62, 0x63, 0x64][..])
        );
        assert_eq!(reader.read_exact(1), Ok(&[0x00][..]));
        assert_eq!(reader.read_exact(1), Ok(&[0x65][..]));
    }

    #[test]
    fn test_read_until_missing_delimiter() {
        let source = Cursor::new(vec![0x61, 0x62]);
        let mut reader = StreamReader::with_chunk_size(source, 2);
        assert_eq!(reader.read_until(0x00, false), Err(BufferError::EndOfBuffer));
    }

    #[test]
    fn test_no_limit_pulls_only_requested_bytes() {
        let source = Cursor::new((0u8..10).collect::<Vec<u8>>());
        let mut reader = StreamReader::with_chunk_size(source, 64);
        assert_eq!(reader.read_exact(3).unwrap(), &[0, 1, 2]);
        let source = reader.into_inner();
        assert_eq!(source.position(), 3);
    }

    #[test]
    fn test_limit_allows_chunked_read_ahead() {
        let source = Cursor::new((0u8..10).collect::<Vec<u8>>());
        let mut reader = StreamReader::with_chunk_size(source, 4);
        reader.set_read_limit(Some(8));
        assert_eq!(reader.read_exact(1).unwrap(), &[0]);
        assert_eq!(reader.read_exact(7).unwrap(), &[1, 2, 3, 4, 5, 6, 7]);
        // The read-ahead stopped at the ceiling.
        let source = reader.into_inner();
        assert_eq!(source.position(), 8);
    }

    #[test]
    fn test_limit_stops_reads_and_source_pulls() {
        let source = Cursor::new((0u8..10).collect::<Vec<u8>>());
        let mut reader = StreamReader::with_chunk_size(source, 64);
        reader.set_read_limit(Some(4));
        assert_eq!(reader.read_exact(4).unwrap(), &[0, 1, 2, 3]);
        assert_eq!(reader.read_exact(1), Err(BufferError::EndOfBuffer));
        // Nothing beyond the ceiling was pulled from the source.
        let source = reader.into_inner();
        assert_eq!(source.position(), 4);
    }

    #[test]
    fn test_limit_below_buffered_data_blocks_reads() {
        let source = Cursor::new((0u8..10).collect::<Vec<u8>>());
        let mut reader = StreamReader::with_chunk_size(source, 8);
        reader.set_read_limit(Some(8));
        assert_eq!(reader.read_exact(2).unwrap(), &[0, 1]);
        // Read-ahead buffered up to position 8; a tighter ceiling installed
        // afterwards still wins.
        reader.set_read_limit(Some(4));
        assert_eq!(reader.read_exact(3), Err(BufferError::EndOfBuffer));
        assert_eq!(reader.read_exact(2).unwrap(), &[2, 3]);
    }

    #[test]
    fn test_limit_hides_buffered_delimiter() {
        let source = Cursor::new(vec![1, 2, 3, 0, 5, 6, 7, 8]);
        let mut reader = StreamReader::with_chunk_size(source, 8);
        reader.set_read_limit(Some(8));
        assert_eq!(reader.read_exact(1).unwrap(), &[1]);
        // The delimiter at position 3 is already buffered but sits past the
        // tighter ceiling.
        reader.set_read_limit(Some(3));
        assert_eq!(reader.read_until(0, false), Err(BufferError::EndOfBuffer));
        reader.set_read_limit(Some(8));
        assert_eq!(reader.read_until(0, false), Ok(&[2, 3][..]));
    }

    #[test]
    fn test_limit_restore_resumes_reads() {
        let source = Cursor::new((0u8..6).collect::<Vec<u8>>());
        let mut reader = StreamReader::with_chunk_size(source, 2);
        reader.set_read_limit(Some(3));
        assert_eq!(reader.read_exact(3).unwrap(), &[0, 1, 2]);
        reader.set_read_limit(None);
        assert_eq!(reader.read_exact(3).unwrap(), &[3, 4, 5]);
        assert_eq!(reader.position(), 6);
    }

    #[test]
    fn test_source_error_surfaces_kind() {
        let mut reader = StreamReader::new(Failing(Cursor::new(vec![1, 2])));
        assert_eq!(reader.read_exact(2).unwrap(), &[1, 2]);
        assert_eq!(
            reader.read_exact(1),
            Err(BufferError::Io(io::ErrorKind::ConnectionReset))
        );
    }

    #[test]
    fn test_position_survives_compaction() {
        let source = Cursor::new((0u8..100).collect::<Vec<u8>>());
        let mut reader = StreamReader::with_chunk_size(source, 4);
        for i in 0..25 {
            let bytes = reader.read_exact(4).unwrap();
            assert_eq!(bytes[0], (i * 4) as u8);
        }
        assert_eq!(reader.position(), 100);
    }
}
