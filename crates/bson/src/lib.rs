//! BSON document encoding and decoding.
//!
//! BSON is the typed, length-prefixed binary document format used by
//! MongoDB and compatible stores. This crate decodes byte streams into a
//! generic [`BsonValue`] document model and encodes the model back,
//! round-tripping every representable type losslessly, including the
//! deprecated ones that still appear on the wire.
//!
//! # Overview
//!
//! - [`BsonDecoder`] - recursive-descent reader over any
//!   [`bson_buffers::ReadStream`], with a per-pair observer hook
//! - [`BsonEncoder`] - single-pass writer with deferred length-prefix
//!   patching
//! - [`BsonValue`] / [`BsonDocument`] - the generic value model
//! - [`BsonError`] - the closed set of failure reasons
//!
//! # Example
//!
//! ```
//! use bson_serialization::{BsonDecoder, BsonDocument, BsonEncoder, BsonValue};
//!
//! let mut doc = BsonDocument::new();
//! doc.insert("name".to_owned(), BsonValue::from("bson"));
//! doc.insert("answer".to_owned(), BsonValue::Int32(42));
//!
//! let bytes = BsonEncoder::new().encode(&doc).unwrap();
//! let decoded = BsonDecoder::new().decode(&bytes).unwrap();
//! assert_eq!(decoded, doc);
//! ```

pub mod constants;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod values;

pub use decoder::{BsonDecoder, DecodeObserver, ReadOptions};
pub use encoder::{BsonEncoder, SizeCallback, WriteOptions};
pub use error::BsonError;
pub use values::{
    BinaryKind, BsonBinary, BsonDbPointer, BsonDecimal128, BsonDocument,
    BsonJavascriptWithScope, BsonObjectId, BsonRegex, BsonTimestamp, BsonValue,
};
