//! BSON value model.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use regex::RegexBuilder;

use crate::error::BsonError;

/// An insertion-ordered mapping from string keys to BSON values.
///
/// Duplicate keys keep the first occurrence's position and the last
/// occurrence's value.
pub type BsonDocument = IndexMap<String, BsonValue>;

/// BSON binary data: a subtype byte plus raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BsonBinary {
    /// The raw subtype byte, re-encoded verbatim.
    pub subtype: u8,
    pub data: Vec<u8>,
}

/// Classified binary subtype. The user-defined range `0x80..=0xFF`
/// collapses to one category; [`BsonBinary::subtype`] keeps the raw byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryKind {
    Generic,
    Function,
    /// Legacy generic binary (deprecated subtype 0x02).
    BinaryOld,
    /// Legacy UUID (deprecated subtype 0x03).
    UuidOld,
    Uuid,
    Md5,
    UserDefined,
}

impl BsonBinary {
    /// Classifies the subtype byte, or `None` for a reserved value.
    pub fn kind(&self) -> Option<BinaryKind> {
        match self.subtype {
            0x00 => Some(BinaryKind::Generic),
            0x01 => Some(BinaryKind::Function),
            0x02 => Some(BinaryKind::BinaryOld),
            0x03 => Some(BinaryKind::UuidOld),
            0x04 => Some(BinaryKind::Uuid),
            0x05 => Some(BinaryKind::Md5),
            0x80..=0xFF => Some(BinaryKind::UserDefined),
            _ => None,
        }
    }
}

/// BSON ObjectId: 12 opaque bytes. The internal structure is not
/// interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BsonObjectId(pub [u8; 12]);

/// BSON regular expression: a pattern and a set of single-letter option
/// flags, both stored as they appear on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BsonRegex {
    pub pattern: String,
    pub options: String,
}

impl BsonRegex {
    /// Creates a regex value, normalizing the options to a sorted,
    /// deduplicated flag set.
    pub fn new(pattern: impl Into<String>, options: &str) -> Self {
        let mut flags: Vec<char> = options.chars().collect();
        flags.sort_unstable();
        flags.dedup();
        Self {
            pattern: pattern.into(),
            options: flags.into_iter().collect(),
        }
    }

    /// Compiles through the platform regex engine, validating both the
    /// option flags and the pattern.
    ///
    /// Flag letters: `i` case-insensitive, `m` multi-line, `s` dot matches
    /// newline, `x` ignore pattern whitespace, `u` Unicode (the engine
    /// default), `l` locale-dependent character classes (no engine analog;
    /// accepted without effect). Any other letter is an error.
    pub fn compile(&self) -> Result<regex::Regex, BsonError> {
        let mut builder = RegexBuilder::new(&self.pattern);
        for c in self.options.chars() {
            match c {
                'i' => {
                    builder.case_insensitive(true);
                }
                'm' => {
                    builder.multi_line(true);
                }
                's' => {
                    builder.dot_matches_new_line(true);
                }
                'x' => {
                    builder.ignore_whitespace(true);
                }
                'u' => {
                    builder.unicode(true);
                }
                'l' => {}
                c => {
                    return Err(BsonError::InvalidRegexOptions {
                        options: self.options.clone(),
                        invalid: c,
                    })
                }
            }
        }
        builder.build().map_err(|e| BsonError::InvalidRegexPattern {
            pattern: self.pattern.clone(),
            cause: e.to_string(),
        })
    }
}

/// Deprecated DBPointer: a namespace string plus a 12-byte id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BsonDbPointer {
    pub namespace: String,
    pub id: BsonObjectId,
}

/// JavaScript code together with the document scope it should be
/// evaluated in.
#[derive(Debug, Clone, PartialEq)]
pub struct BsonJavascriptWithScope {
    pub code: String,
    pub scope: BsonDocument,
}

/// MongoDB internal replication timestamp: two opaque 4-byte groups, not
/// interpreted as integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BsonTimestamp {
    pub increment: [u8; 4],
    pub timestamp: [u8; 4],
}

/// 128-bit decimal floating point, carried as raw bytes. No arithmetic is
/// defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BsonDecimal128(pub [u8; 16]);

/// A BSON value that can appear as a document field value.
///
/// Deprecated wire types without a case of their own decode into the
/// nearest live case: Undefined (0x06) becomes [`BsonValue::Null`],
/// JavaScript (0x0d) and Symbol (0x0e) become [`BsonValue::String`].
#[derive(Debug, Clone, PartialEq)]
pub enum BsonValue {
    /// BSON double (0x01).
    Double(f64),
    /// BSON UTF-8 string (0x02).
    String(String),
    /// Embedded document (0x03).
    Document(BsonDocument),
    /// Array (0x04).
    Array(Vec<BsonValue>),
    /// Binary data (0x05).
    Binary(BsonBinary),
    /// ObjectId (0x07).
    ObjectId(BsonObjectId),
    /// Boolean (0x08).
    Boolean(bool),
    /// UTC datetime as signed milliseconds since the epoch (0x09).
    UtcDatetime(i64),
    /// Null (0x0a).
    Null,
    /// Regular expression (0x0b).
    Regex(BsonRegex),
    /// DBPointer (0x0c, deprecated).
    DbPointer(BsonDbPointer),
    /// JavaScript code with scope (0x0f).
    JavascriptWithScope(BsonJavascriptWithScope),
    /// 32-bit signed integer (0x10).
    Int32(i32),
    /// Timestamp (0x11).
    Timestamp(BsonTimestamp),
    /// 64-bit signed integer (0x12).
    Int64(i64),
    /// Decimal128 (0x13).
    Decimal128(BsonDecimal128),
    /// Sentinel that compares greater than every other value (0x7f).
    MaxKey,
    /// Sentinel that compares less than every other value (0xff).
    MinKey,
}

impl BsonValue {
    /// The datetime value as a [`DateTime`], when this is a datetime and
    /// it lies within chrono's representable range. The stored
    /// milliseconds are authoritative either way.
    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            BsonValue::UtcDatetime(ms) => DateTime::from_timestamp_millis(*ms),
            _ => None,
        }
    }
}

/// Sentinel ordering: `MinKey` equals itself and is less than everything
/// else, `MaxKey` equals itself and is greater than everything else.
/// Same-case scalars compare naturally; everything else is unordered.
impl PartialOrd for BsonValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        use BsonValue::*;
        match (self, other) {
            (MinKey, MinKey) | (MaxKey, MaxKey) => Some(Ordering::Equal),
            (MinKey, _) | (_, MaxKey) => Some(Ordering::Less),
            (_, MinKey) | (MaxKey, _) => Some(Ordering::Greater),
            (Double(a), Double(b)) => a.partial_cmp(b),
            (String(a), String(b)) => a.partial_cmp(b),
            (Boolean(a), Boolean(b)) => a.partial_cmp(b),
            (UtcDatetime(a), UtcDatetime(b)) => a.partial_cmp(b),
            (Int32(a), Int32(b)) => a.partial_cmp(b),
            (Int64(a), Int64(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

impl From<bool> for BsonValue {
    fn from(v: bool) -> Self {
        BsonValue::Boolean(v)
    }
}

impl From<i32> for BsonValue {
    fn from(v: i32) -> Self {
        BsonValue::Int32(v)
    }
}

impl From<i64> for BsonValue {
    fn from(v: i64) -> Self {
        BsonValue::Int64(v)
    }
}

impl From<f64> for BsonValue {
    fn from(v: f64) -> Self {
        BsonValue::Double(v)
    }
}

impl From<&str> for BsonValue {
    fn from(v: &str) -> Self {
        BsonValue::String(v.to_owned())
    }
}

impl From<String> for BsonValue {
    fn from(v: String) -> Self {
        BsonValue::String(v)
    }
}

impl From<DateTime<Utc>> for BsonValue {
    fn from(v: DateTime<Utc>) -> Self {
        BsonValue::UtcDatetime(v.timestamp_millis())
    }
}

impl From<Vec<BsonValue>> for BsonValue {
    fn from(v: Vec<BsonValue>) -> Self {
        BsonValue::Array(v)
    }
}

impl From<BsonDocument> for BsonValue {
    fn from(v: BsonDocument) -> Self {
        BsonValue::Document(v)
    }
}
