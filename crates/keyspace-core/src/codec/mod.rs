//! Module: codec
//! Responsibility: typed <-> byte contracts for keys and values.
//! Does not own: collection prefixes, range lowering, or store access.
//! Boundary: every collection encodes through `KeyCodec` / `ValueCodec`.
//!
//! Key encodings are order-preserving: for two keys of the same type,
//! byte-lexicographic order of the encodings matches semantic order.
//! Each key type has a *terminal* form (last part of a key, may rely on the
//! buffer length) and a *non-terminal* form (self-delimiting, because more
//! key parts follow).

mod bytes;
mod hex;
mod ordered;
mod scalar;
mod timestamp;
mod value;


pub use scalar::NoKey;
pub use value::{Cbor, Json, KeyAsValue, NoValue, UncheckedNoValue};

use serde_json::Value as JsonValue;
use thiserror::Error as ThisError;

/// Largest value the non-terminal bytes encoding can carry in its one-byte
/// length prefix.
pub const MAX_NON_TERMINAL_BYTES: usize = u8::MAX as usize;

///
/// CodecError
///
/// Encoding and decoding failures. Messages carry the codec type name and
/// the expected/actual sizes so failures can be diagnosed from the error
/// alone.
///

#[derive(Debug, ThisError)]
pub enum CodecError {
    #[error("{ty}: buffer too small: expected at least {expected} bytes, got {actual}")]
    BufferTooSmall {
        ty: String,
        expected: usize,
        actual: usize,
    },

    #[error("{ty}: invalid byte {byte:#04x}")]
    InvalidByte { ty: String, byte: u8 },

    #[error("{ty}: non-terminal value exceeds max length: {len} bytes (limit {max})")]
    NonTerminalTooLong { ty: String, len: usize, max: usize },

    #[error("{ty}: non-terminal value must not contain the 0x00 delimiter")]
    ContainsDelimiter { ty: String },

    #[error("{ty}: missing 0x00 delimiter")]
    MissingDelimiter { ty: String },

    #[error("{ty}: invalid utf-8")]
    InvalidUtf8 { ty: String },

    #[error("{ty}: decode consumed {consumed} of {len} bytes")]
    PartialConsumption {
        ty: String,
        consumed: usize,
        len: usize,
    },

    #[error("{ty}: expected empty value, got {len} bytes")]
    NonEmptyValue { ty: String, len: usize },

    #[error("{ty}: incomplete composite key: {part} is absent")]
    IncompleteKey { ty: String, part: &'static str },

    #[error("{ty}: time out of range: {message}")]
    TimeOutOfRange { ty: String, message: String },

    #[error("{ty}: json: {message}")]
    Json { ty: String, message: String },

    #[error("{ty}: {source}")]
    Serialize {
        ty: String,
        source: crate::serialize::SerializeError,
    },
}

impl CodecError {
    pub(crate) fn buffer_too_small(ty: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::BufferTooSmall {
            ty: ty.into(),
            expected,
            actual,
        }
    }

    pub(crate) fn json(ty: impl Into<String>, message: impl ToString) -> Self {
        Self::Json {
            ty: ty.into(),
            message: message.to_string(),
        }
    }
}

///
/// KeyCodec
///
/// Order-preserving key encoding, implemented on the key type itself.
///
/// `encode*` append to `buf` and return the number of bytes written.
/// `decode*` return `(bytes_read, key)`; terminal decode may consume the
/// whole buffer. Composite keys compose these generically.
///

pub trait KeyCodec: Clone + Sized {
    /// Terminal encoding (last or only part of a key).
    fn encode(&self, buf: &mut Vec<u8>) -> Result<usize, CodecError>;

    /// Terminal decoding.
    fn decode(buf: &[u8]) -> Result<(usize, Self), CodecError>;

    /// Terminal encoded size.
    fn size(&self) -> usize;

    /// Self-delimiting encoding, used when more key parts follow.
    /// Fixed-width keys encode identically in both forms.
    fn encode_non_terminal(&self, buf: &mut Vec<u8>) -> Result<usize, CodecError> {
        self.encode(buf)
    }

    fn decode_non_terminal(buf: &[u8]) -> Result<(usize, Self), CodecError> {
        Self::decode(buf)
    }

    fn size_non_terminal(&self) -> usize {
        self.size()
    }

    /// Human-readable JSON form; not order-preserving.
    fn encode_json(&self) -> Result<JsonValue, CodecError>;

    fn decode_json(json: &JsonValue) -> Result<Self, CodecError>;

    /// Human-readable rendering for diagnostics.
    fn stringify(&self) -> String;

    /// Stable type name used in diagnostics and schema metadata.
    fn key_type() -> String;
}

///
/// ValueCodec
///
/// Value encoding for stored values. No ordering requirement.
/// Codecs are instances owned by the collection that uses them.
///

pub trait ValueCodec {
    type Value;

    fn encode(&self, value: &Self::Value) -> Result<Vec<u8>, CodecError>;

    fn decode(&self, bytes: &[u8]) -> Result<Self::Value, CodecError>;

    fn encode_json(&self, value: &Self::Value) -> Result<JsonValue, CodecError>;

    fn decode_json(&self, json: &JsonValue) -> Result<Self::Value, CodecError>;

    fn stringify(&self, value: &Self::Value) -> String;

    fn value_type(&self) -> String;
}

/// Encode a key in terminal form into a fresh buffer.
pub fn encode_key<K: KeyCodec>(key: &K) -> Result<Vec<u8>, CodecError> {
    let mut buf = Vec::with_capacity(key.size());
    key.encode(&mut buf)?;

    Ok(buf)
}

/// Decode a terminal key and require that it consumes the whole buffer.
pub fn decode_key_exact<K: KeyCodec>(buf: &[u8]) -> Result<K, CodecError> {
    let (read, key) = K::decode(buf)?;
    if read != buf.len() {
        return Err(CodecError::PartialConsumption {
            ty: K::key_type(),
            consumed: read,
            len: buf.len(),
        });
    }

    Ok(key)
}

// Require at least `expected` bytes in `buf`.
pub(crate) fn ensure_len(ty: &str, buf: &[u8], expected: usize) -> Result<(), CodecError> {
    if buf.len() < expected {
        return Err(CodecError::buffer_too_small(ty, expected, buf.len()));
    }

    Ok(())
}
