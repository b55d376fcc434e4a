//! Binary buffer and stream utilities for bson-serialization.
//!
//! # Overview
//!
//! - [`Reader`] - reads from an in-memory byte slice with cursor tracking
//! - [`StreamReader`] - reads from any [`std::io::Read`] source through an
//!   internal read-ahead buffer
//! - [`Writer`] - writes to an auto-growing buffer that supports in-place
//!   patching of already-written bytes
//! - [`SinkWriter`] - writes through to any [`std::io::Write`] sink
//!
//! Sources implement [`ReadStream`] and sinks implement [`WriteStream`].
//! Both track an absolute position from the start of the operation;
//! readers additionally enforce an advisory read ceiling that confines
//! reads of a length-prefixed region to its declared extent.
//!
//! # Example
//!
//! ```
//! use bson_buffers::{ReadStream, Reader, WriteStream, Writer};
//!
//! let mut writer = Writer::new();
//! writer.write_exact(&[0x01, 0x02, 0x03]).unwrap();
//! let data = writer.into_vec();
//!
//! let mut reader = Reader::new(&data);
//! assert_eq!(reader.read_exact(2).unwrap(), &[0x01, 0x02]);
//! assert_eq!(reader.position(), 2);
//! ```

mod reader;
mod sink_writer;
mod stream;
mod stream_reader;
mod writer;

pub use reader::Reader;
pub use sink_writer::SinkWriter;
pub use stream::{ReadStream, WriteStream};
pub use stream_reader::StreamReader;
pub use writer::Writer;

/// Error type for stream operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    /// Attempted to read past the end of the source or the read ceiling.
    EndOfBuffer,
    /// The underlying byte source or sink failed.
    Io(std::io::ErrorKind),
    /// The backing buffer could not grow.
    OutOfMemory,
}

impl std::fmt::Display for BufferError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BufferError::EndOfBuffer => write!(f, "end of buffer"),
            BufferError::Io(kind) => write!(f, "i/o error: {kind}"),
            BufferError::OutOfMemory => write!(f, "out of memory"),
        }
    }
}

impl std::error::Error for BufferError {}
