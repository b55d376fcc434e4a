//! BSON document encoder.
//!
//! Every document and embedded document begins with a 4-byte total length
//! that is only known after its contents are serialized. The encoder
//! therefore writes in a single pass with zero placeholders, records the
//! `(offset, size)` of every length field, and patches the placeholders in
//! place once the full buffer exists.

use bson_buffers::{WriteStream, Writer};

use crate::constants as tag;
use crate::error::BsonError;
use crate::values::{BsonDocument, BsonValue};

/// Encode options.
#[derive(Debug, Clone, Copy, Default)]
pub struct WriteOptions {
    /// Leave the placeholder length prefixes unpatched. For callers that
    /// only count bytes or patch sizes themselves.
    pub skip_sizes: bool,
}

/// Callback receiving the absolute offset of a length field and the final
/// size of its container.
pub type SizeCallback<'a> = dyn FnMut(usize, i32) + 'a;

/// BSON document encoder.
///
/// The top level is always a document; BSON has no scalar top-level
/// encoding.
pub struct BsonEncoder {
    opts: WriteOptions,
}

impl Default for BsonEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl BsonEncoder {
    pub fn new() -> Self {
        Self::with_options(WriteOptions::default())
    }

    pub fn with_options(opts: WriteOptions) -> Self {
        Self { opts }
    }

    /// The options this encoder was created with.
    pub fn options(&self) -> WriteOptions {
        self.opts
    }

    /// Encodes a document to bytes.
    pub fn encode(&self, doc: &BsonDocument) -> Result<Vec<u8>, BsonError> {
        let mut writer = Writer::new();
        let mut sizes: Vec<(usize, i32)> = Vec::new();
        self.encode_document(&mut writer, doc, &mut |offset, size| {
            sizes.push((offset, size));
        })?;
        if !self.opts.skip_sizes {
            for (offset, size) in sizes {
                writer.patch(offset, &size.to_le_bytes());
            }
        }
        Ok(writer.into_vec())
    }

    /// Serializes a document to any sink in a single pass.
    ///
    /// Length prefixes are written as zero placeholders; `size_callback`
    /// receives the `(offset, size)` of every document, array, and
    /// code-with-scope block, so a caller with random access to the output
    /// can patch them afterwards. Returns the number of bytes written.
    pub fn encode_document<W: WriteStream>(
        &self,
        sink: &mut W,
        doc: &BsonDocument,
        size_callback: &mut SizeCallback<'_>,
    ) -> Result<usize, BsonError> {
        let start = sink.position();
        write(sink, &0i32.to_le_bytes())?;
        for (key, value) in doc {
            self.write_element(sink, key, value, size_callback)?;
        }
        write(sink, &[tag::END_OF_DOCUMENT])?;
        let size = (sink.position() - start) as i32;
        size_callback(start, size);
        Ok(size as usize)
    }

    fn write_array<W: WriteStream>(
        &self,
        sink: &mut W,
        items: &[BsonValue],
        size_callback: &mut SizeCallback<'_>,
    ) -> Result<(), BsonError> {
        let start = sink.position();
        write(sink, &0i32.to_le_bytes())?;
        // Array keys are the decimal element indices, in sequence order.
        for (index, value) in items.iter().enumerate() {
            self.write_element(sink, &index.to_string(), value, size_callback)?;
        }
        write(sink, &[tag::END_OF_DOCUMENT])?;
        let size = (sink.position() - start) as i32;
        size_callback(start, size);
        Ok(())
    }

    fn write_element<W: WriteStream>(
        &self,
        sink: &mut W,
        key: &str,
        value: &BsonValue,
        size_callback: &mut SizeCallback<'_>,
    ) -> Result<(), BsonError> {
        match value {
            BsonValue::Double(v) => {
                write(sink, &[tag::DOUBLE])?;
                write_cstring(sink, key)?;
                write(sink, &v.to_le_bytes())?;
            }
            BsonValue::String(s) => {
                write(sink, &[tag::STRING])?;
                write_cstring(sink, key)?;
                write_string(sink, s)?;
            }
            BsonValue::Document(doc) => {
                write(sink, &[tag::DOCUMENT])?;
                write_cstring(sink, key)?;
                self.encode_document(sink, doc, size_callback)?;
            }
            BsonValue::Array(items) => {
                write(sink, &[tag::ARRAY])?;
                write_cstring(sink, key)?;
                self.write_array(sink, items, size_callback)?;
            }
            BsonValue::Binary(bin) => {
                write(sink, &[tag::BINARY])?;
                write_cstring(sink, key)?;
                write(sink, &(bin.data.len() as i32).to_le_bytes())?;
                // The stored subtype byte goes out verbatim, user-defined
                // values included.
                write(sink, &[bin.subtype])?;
                write(sink, &bin.data)?;
            }
            BsonValue::ObjectId(id) => {
                write(sink, &[tag::OBJECT_ID])?;
                write_cstring(sink, key)?;
                write(sink, &id.0)?;
            }
            BsonValue::Boolean(b) => {
                write(sink, &[tag::BOOLEAN])?;
                write_cstring(sink, key)?;
                write(sink, &[u8::from(*b)])?;
            }
            BsonValue::UtcDatetime(ms) => {
                write(sink, &[tag::UTC_DATETIME])?;
                write_cstring(sink, key)?;
                write(sink, &ms.to_le_bytes())?;
            }
            BsonValue::Null => {
                write(sink, &[tag::NULL])?;
                write_cstring(sink, key)?;
            }
            BsonValue::Regex(re) => {
                write(sink, &[tag::REGEX])?;
                write_cstring(sink, key)?;
                write_cstring(sink, &re.pattern)?;
                write_cstring(sink, &re.options)?;
            }
            BsonValue::DbPointer(ptr) => {
                write(sink, &[tag::DB_POINTER])?;
                write_cstring(sink, key)?;
                write_string(sink, &ptr.namespace)?;
                write(sink, &ptr.id.0)?;
            }
            BsonValue::JavascriptWithScope(jws) => {
                write(sink, &[tag::JAVASCRIPT_WITH_SCOPE])?;
                write_cstring(sink, key)?;
                // The block's declared size includes its own 4 length bytes.
                let start = sink.position();
                write(sink, &0i32.to_le_bytes())?;
                write_string(sink, &jws.code)?;
                self.encode_document(sink, &jws.scope, size_callback)?;
                let size = (sink.position() - start) as i32;
                size_callback(start, size);
            }
            BsonValue::Int32(v) => {
                write(sink, &[tag::INT32])?;
                write_cstring(sink, key)?;
                write(sink, &v.to_le_bytes())?;
            }
            BsonValue::Timestamp(ts) => {
                write(sink, &[tag::TIMESTAMP])?;
                write_cstring(sink, key)?;
                write(sink, &ts.increment)?;
                write(sink, &ts.timestamp)?;
            }
            BsonValue::Int64(v) => {
                write(sink, &[tag::INT64])?;
                write_cstring(sink, key)?;
                write(sink, &v.to_le_bytes())?;
            }
            BsonValue::Decimal128(dec) => {
                write(sink, &[tag::DECIMAL128])?;
                write_cstring(sink, key)?;
                write(sink, &dec.0)?;
            }
            BsonValue::MaxKey => {
                write(sink, &[tag::MAX_KEY])?;
                write_cstring(sink, key)?;
            }
            BsonValue::MinKey => {
                write(sink, &[tag::MIN_KEY])?;
                write_cstring(sink, key)?;
            }
        }
        Ok(())
    }
}

/// Writes raw bytes, mapping sink failures into the error model.
fn write<W: WriteStream>(sink: &mut W, bytes: &[u8]) -> Result<(), BsonError> {
    sink.write_exact(bytes).map_err(BsonError::from_write)
}

/// Writes a NUL-terminated C-string. Stops at any embedded NUL byte.
fn write_cstring<W: WriteStream>(sink: &mut W, s: &str) -> Result<(), BsonError> {
    let bytes = s.as_bytes();
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    write(sink, &bytes[..end])?;
    write(sink, &[0])
}

/// Writes a BSON string: an i32 length counting the trailing NUL, the
/// UTF-8 bytes, then the NUL.
fn write_string<W: WriteStream>(sink: &mut W, s: &str) -> Result<(), BsonError> {
    let bytes = s.as_bytes();
    write(sink, &((bytes.len() as i32) + 1).to_le_bytes())?;
    write(sink, bytes)?;
    write(sink, &[0])
}
