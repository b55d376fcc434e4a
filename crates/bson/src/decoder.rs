//! BSON document decoder.
//!
//! BSON is a little-endian binary format: a document is a 4-byte total
//! length (counting itself), a run of tagged elements, and a terminating
//! zero byte. The decoder walks that structure recursively, confining
//! every nested document's reads to its declared length.

use std::io;
use std::str;

use bson_buffers::{BufferError, ReadStream, Reader, StreamReader};

use crate::constants as tag;
use crate::error::BsonError;
use crate::values::{
    BsonBinary, BsonDbPointer, BsonDecimal128, BsonDocument, BsonJavascriptWithScope,
    BsonObjectId, BsonRegex, BsonTimestamp, BsonValue,
};

/// Decode options. Currently empty; reserved for future flags.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadOptions {}

/// Observer invoked for every decoded key/value pair in document order.
///
/// On failure no document is returned, so the pairs the observer already
/// received are the only recoverable prefix. An observer error aborts the
/// decode and propagates unchanged.
pub type DecodeObserver<'a> = dyn FnMut(&str, &BsonValue) -> Result<(), BsonError> + 'a;

/// Recursive-descent BSON decoder.
///
/// The decoder holds no buffer state of its own; it drives any
/// [`ReadStream`] and is reusable across calls.
pub struct BsonDecoder {
    opts: ReadOptions,
}

impl Default for BsonDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl BsonDecoder {
    pub fn new() -> Self {
        Self::with_options(ReadOptions::default())
    }

    pub fn with_options(opts: ReadOptions) -> Self {
        Self { opts }
    }

    /// The options this decoder was created with.
    pub fn options(&self) -> ReadOptions {
        self.opts
    }

    /// Decodes a BSON document from an in-memory buffer.
    pub fn decode(&self, data: &[u8]) -> Result<BsonDocument, BsonError> {
        let mut stream = Reader::new(data);
        self.decode_document(&mut stream, &mut |_, _| Ok(()))
    }

    /// Decodes a BSON document from a sequential byte source.
    ///
    /// On success exactly the document's declared size has been consumed
    /// from the source; on error, no more than that.
    pub fn decode_stream<R: io::Read>(&self, source: R) -> Result<BsonDocument, BsonError> {
        let mut stream = StreamReader::new(source);
        self.decode_document(&mut stream, &mut |_, _| Ok(()))
    }

    /// Decodes one document starting at the stream's current position,
    /// invoking `observer` for each key/value pair as it is produced.
    ///
    /// This is the core routine, used both for the outermost document and
    /// recursively for embedded documents and arrays.
    pub fn decode_document<S: ReadStream>(
        &self,
        stream: &mut S,
        observer: &mut DecodeObserver<'_>,
    ) -> Result<BsonDocument, BsonError> {
        let start = stream.position();
        let declared = read_i32(stream)?;
        if declared < 5 {
            return Err(BsonError::TooSmall);
        }
        let length = declared as usize;
        // Confine this document's reads to its declared extent. The
        // caller's ceiling is restored on every exit path.
        let previous = stream.read_limit();
        stream.set_read_limit(Some(start + length));
        let result = self.read_elements(stream, start, length, observer);
        stream.set_read_limit(previous);
        result
    }

    fn read_elements<S: ReadStream>(
        &self,
        stream: &mut S,
        start: usize,
        length: usize,
        observer: &mut DecodeObserver<'_>,
    ) -> Result<BsonDocument, BsonError> {
        let mut doc = BsonDocument::new();
        loop {
            // The terminator must appear before the declared end is
            // consumed; landing on or past it here is a length error.
            if stream.position() - start >= length {
                return Err(BsonError::LengthMismatch);
            }
            let tag_byte = read_u8(stream)?;
            if tag_byte == tag::END_OF_DOCUMENT {
                break;
            }
            let key = self.read_cstring(stream)?;
            let value = self.read_element(stream, tag_byte)?;
            observer(&key, &value)?;
            doc.insert(key, value);
        }
        if stream.position() - start != length {
            return Err(BsonError::LengthMismatch);
        }
        Ok(doc)
    }

    fn read_element<S: ReadStream>(
        &self,
        stream: &mut S,
        tag_byte: u8,
    ) -> Result<BsonValue, BsonError> {
        match tag_byte {
            tag::DOUBLE => Ok(BsonValue::Double(read_f64(stream)?)),
            tag::STRING => Ok(BsonValue::String(self.read_string(stream)?)),
            tag::DOCUMENT => {
                Ok(BsonValue::Document(
                    self.decode_document(stream, &mut |_, _| Ok(()))?,
                ))
            }
            tag::ARRAY => Ok(BsonValue::Array(self.read_array(stream)?)),
            tag::BINARY => self.read_binary(stream),
            tag::UNDEFINED => Ok(BsonValue::Null),
            tag::OBJECT_ID => Ok(BsonValue::ObjectId(BsonObjectId(read_bytes(stream)?))),
            tag::BOOLEAN => match read_u8(stream)? {
                0 => Ok(BsonValue::Boolean(false)),
                1 => Ok(BsonValue::Boolean(true)),
                b => Err(BsonError::InvalidBooleanValue(b)),
            },
            tag::UTC_DATETIME => Ok(BsonValue::UtcDatetime(read_i64(stream)?)),
            tag::NULL => Ok(BsonValue::Null),
            tag::REGEX => self.read_regex(stream),
            tag::DB_POINTER => self.read_db_pointer(stream),
            tag::JAVASCRIPT => Ok(BsonValue::String(self.read_string(stream)?)),
            tag::SYMBOL => Ok(BsonValue::String(self.read_string(stream)?)),
            tag::JAVASCRIPT_WITH_SCOPE => self.read_code_with_scope(stream),
            tag::INT32 => Ok(BsonValue::Int32(read_i32(stream)?)),
            tag::TIMESTAMP => {
                let increment = read_bytes(stream)?;
                let timestamp = read_bytes(stream)?;
                Ok(BsonValue::Timestamp(BsonTimestamp {
                    increment,
                    timestamp,
                }))
            }
            tag::INT64 => Ok(BsonValue::Int64(read_i64(stream)?)),
            tag::DECIMAL128 => Ok(BsonValue::Decimal128(BsonDecimal128(read_bytes(stream)?))),
            tag::MAX_KEY => Ok(BsonValue::MaxKey),
            tag::MIN_KEY => Ok(BsonValue::MinKey),
            t => Err(BsonError::InvalidElementType(t)),
        }
    }

    /// Arrays are documents whose keys are the decimal element indices,
    /// ascending from "0" with no gaps. Decoding goes through the shared
    /// document path with an observer that validates each key against the
    /// number of elements accumulated so far, so arrays and documents get
    /// identical length and structure checks.
    fn read_array<S: ReadStream>(&self, stream: &mut S) -> Result<Vec<BsonValue>, BsonError> {
        let mut items: Vec<BsonValue> = Vec::new();
        let mut previous: Option<String> = None;
        self.decode_document(stream, &mut |key, value| {
            if key != items.len().to_string() {
                return Err(BsonError::InvalidArrayKey {
                    current: key.to_owned(),
                    previous: previous.clone(),
                });
            }
            items.push(value.clone());
            previous = Some(key.to_owned());
            Ok(())
        })?;
        Ok(items)
    }

    fn read_binary<S: ReadStream>(&self, stream: &mut S) -> Result<BsonValue, BsonError> {
        let declared = read_i32(stream)?;
        let size = usize::try_from(declared).map_err(|_| BsonError::OutOfMemory)?;
        let subtype = read_u8(stream)?;
        let data = stream.read_exact(size)?.to_vec();
        Ok(BsonValue::Binary(BsonBinary { subtype, data }))
    }

    fn read_regex<S: ReadStream>(&self, stream: &mut S) -> Result<BsonValue, BsonError> {
        let pattern = self.read_cstring(stream)?;
        let options = self.read_cstring(stream)?;
        let regex = BsonRegex { pattern, options };
        // Bad flags and unparsable patterns surface at decode time.
        regex.compile()?;
        Ok(BsonValue::Regex(regex))
    }

    fn read_db_pointer<S: ReadStream>(&self, stream: &mut S) -> Result<BsonValue, BsonError> {
        let namespace = self.read_string(stream)?;
        let id = BsonObjectId(read_bytes(stream)?);
        Ok(BsonValue::DbPointer(BsonDbPointer { namespace, id }))
    }

    fn read_code_with_scope<S: ReadStream>(&self, stream: &mut S) -> Result<BsonValue, BsonError> {
        let start = stream.position();
        // The declared size covers the whole block: these 4 bytes, the
        // code string field, and the scope document.
        let declared = read_i32(stream)?;
        let code = self.read_string(stream)?;
        let scope = self.decode_document(stream, &mut |_, _| Ok(()))?;
        let actual = (stream.position() - start) as i64;
        if i64::from(declared) != actual {
            return Err(BsonError::InvalidJsWithScopeLength {
                expected: i64::from(declared),
                actual,
            });
        }
        Ok(BsonValue::JavascriptWithScope(BsonJavascriptWithScope {
            code,
            scope,
        }))
    }

    /// Reads a NUL-terminated C-string, leaving nothing of it behind.
    fn read_cstring<S: ReadStream>(&self, stream: &mut S) -> Result<String, BsonError> {
        let bytes = stream.read_until(0x00, false)?;
        let s = match str::from_utf8(bytes) {
            Ok(s) => s.to_owned(),
            // The view dies with the next read, so the error keeps a copy.
            Err(_) => return Err(BsonError::InvalidString(bytes.to_vec())),
        };
        stream.read_exact(1)?;
        Ok(s)
    }

    /// Reads a length-prefixed BSON string. The declared length counts the
    /// trailing NUL, and the byte at that position must be exactly zero.
    fn read_string<S: ReadStream>(&self, stream: &mut S) -> Result<String, BsonError> {
        let declared = read_i32(stream)?;
        if declared < 1 {
            return Err(BsonError::InvalidEndOfString(None));
        }
        let size = (declared - 1) as usize;
        let bytes = stream.read_exact(size)?;
        let s = match str::from_utf8(bytes) {
            Ok(s) => s.to_owned(),
            Err(_) => return Err(BsonError::InvalidString(bytes.to_vec())),
        };
        let terminator = match stream.read_exact(1) {
            Ok(b) => b[0],
            Err(BufferError::EndOfBuffer) => return Err(BsonError::InvalidEndOfString(None)),
            Err(e) => return Err(e.into()),
        };
        if terminator != 0 {
            return Err(BsonError::InvalidEndOfString(Some(terminator)));
        }
        Ok(s)
    }
}

fn read_u8<S: ReadStream>(stream: &mut S) -> Result<u8, BsonError> {
    Ok(stream.read_exact(1)?[0])
}

fn read_i32<S: ReadStream>(stream: &mut S) -> Result<i32, BsonError> {
    let b = stream.read_exact(4)?;
    Ok(i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

fn read_i64<S: ReadStream>(stream: &mut S) -> Result<i64, BsonError> {
    let b = stream.read_exact(8)?;
    Ok(i64::from_le_bytes([
        b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
    ]))
}

fn read_f64<S: ReadStream>(stream: &mut S) -> Result<f64, BsonError> {
    let b = stream.read_exact(8)?;
    Ok(f64::from_le_bytes([
        b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
    ]))
}

fn read_bytes<S: ReadStream, const N: usize>(stream: &mut S) -> Result<[u8; N], BsonError> {
    let b = stream.read_exact(N)?;
    let mut out = [0u8; N];
    out.copy_from_slice(b);
    Ok(out)
}
