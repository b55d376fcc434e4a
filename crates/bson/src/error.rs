//! BSON decode/encode error model.

use thiserror::Error;

use bson_buffers::BufferError;

/// Error type for BSON decoding and encoding operations.
///
/// Every error is terminal for the enclosing call: the first structural
/// problem in document order is reported and nothing is retried or
/// downgraded.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BsonError {
    /// The input holds too few bytes to be a document.
    #[error("data too small to be a bson document")]
    TooSmall,
    /// The bytes consumed by a document do not match its declared length.
    #[error("document length does not match the declared length")]
    LengthMismatch,
    /// The source ended before the end of the document.
    #[error("unexpected end of input")]
    EarlyEnd,
    /// An unrecognized element tag byte.
    #[error("invalid bson element type: 0x{0:02x}")]
    InvalidElementType(u8),
    /// A boolean byte other than 0 or 1.
    #[error("invalid boolean value: 0x{0:02x}")]
    InvalidBooleanValue(u8),
    /// A string that is not valid UTF-8. Carries an owned copy of the raw
    /// bytes; the decoded view they came from does not outlive the call.
    #[error("invalid utf-8 string ({} bytes)", .0.len())]
    InvalidString(Vec<u8>),
    /// A length-prefixed string not terminated by a NUL byte. `None` means
    /// no byte could be read where the terminator belongs.
    #[error("invalid end of string: expected NUL, found {0:?}")]
    InvalidEndOfString(Option<u8>),
    /// An array key out of sequence. Array keys must be the decimal
    /// element indices, ascending from "0" with no gaps.
    #[error("invalid array key {current:?} after {previous:?}")]
    InvalidArrayKey {
        current: String,
        previous: Option<String>,
    },
    /// An unknown regular-expression option letter.
    #[error("invalid regex options {options:?}: unknown flag {invalid:?}")]
    InvalidRegexOptions { options: String, invalid: char },
    /// A regular-expression pattern rejected by the regex engine.
    #[error("invalid regex pattern {pattern:?}: {cause}")]
    InvalidRegexPattern { pattern: String, cause: String },
    /// A code-with-scope block whose declared size does not match the
    /// bytes actually consumed decoding it.
    #[error("invalid code-with-scope length: declared {expected}, consumed {actual}")]
    InvalidJsWithScopeLength { expected: i64, actual: i64 },
    /// The byte sink failed.
    #[error("write failed: {0}")]
    WriteFailed(std::io::ErrorKind),
    /// A buffer could not be allocated or grown.
    #[error("out of memory")]
    OutOfMemory,
    /// An internal invariant was violated.
    #[error("internal error")]
    Internal,
}

impl From<BufferError> for BsonError {
    /// Read-side mapping: an exhausted or failing source is an early end
    /// of the document being decoded.
    fn from(e: BufferError) -> Self {
        match e {
            BufferError::EndOfBuffer | BufferError::Io(_) => BsonError::EarlyEnd,
            BufferError::OutOfMemory => BsonError::OutOfMemory,
        }
    }
}

impl BsonError {
    /// Write-side mapping: sink failures keep their I/O error kind.
    pub(crate) fn from_write(e: BufferError) -> Self {
        match e {
            BufferError::Io(kind) => BsonError::WriteFailed(kind),
            BufferError::OutOfMemory => BsonError::OutOfMemory,
            BufferError::EndOfBuffer => BsonError::Internal,
        }
    }
}
