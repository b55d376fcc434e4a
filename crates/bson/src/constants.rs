//! BSON element tag bytes.
//!
//! The one place where wire tags map to value kinds; the decoder and the
//! encoder both match against these.

/// End of document.
pub const END_OF_DOCUMENT: u8 = 0x00;
/// 64-bit IEEE 754 binary floating point.
pub const DOUBLE: u8 = 0x01;
/// Length-prefixed UTF-8 string.
pub const STRING: u8 = 0x02;
/// Embedded document.
pub const DOCUMENT: u8 = 0x03;
/// Array: an embedded document with decimal index keys.
pub const ARRAY: u8 = 0x04;
/// Binary data with a subtype byte.
pub const BINARY: u8 = 0x05;
/// Undefined (deprecated; decodes as null).
pub const UNDEFINED: u8 = 0x06;
/// 12-byte ObjectId.
pub const OBJECT_ID: u8 = 0x07;
/// Boolean: one byte, strictly 0 or 1.
pub const BOOLEAN: u8 = 0x08;
/// UTC datetime: signed milliseconds since the epoch.
pub const UTC_DATETIME: u8 = 0x09;
/// Null.
pub const NULL: u8 = 0x0A;
/// Regular expression: two consecutive C-strings (pattern, options).
pub const REGEX: u8 = 0x0B;
/// DBPointer (deprecated): a string plus 12 bytes.
pub const DB_POINTER: u8 = 0x0C;
/// JavaScript code (decodes as a plain string).
pub const JAVASCRIPT: u8 = 0x0D;
/// Symbol (deprecated; decodes as a plain string).
pub const SYMBOL: u8 = 0x0E;
/// JavaScript code with a scope document.
pub const JAVASCRIPT_WITH_SCOPE: u8 = 0x0F;
/// 32-bit signed integer.
pub const INT32: u8 = 0x10;
/// MongoDB internal timestamp: two opaque 4-byte groups.
pub const TIMESTAMP: u8 = 0x11;
/// 64-bit signed integer.
pub const INT64: u8 = 0x12;
/// 128-bit decimal floating point, carried as opaque 16 bytes.
pub const DECIMAL128: u8 = 0x13;
/// Sentinel that compares greater than every other value.
pub const MAX_KEY: u8 = 0x7F;
/// Sentinel that compares less than every other value.
pub const MIN_KEY: u8 = 0xFF;
