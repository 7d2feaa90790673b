//! CBOR plumbing behind the `Cbor` value codec.
//!
//! Size policy belongs to callers; this module only enforces the bound it is
//! given.

use serde::{Serialize, de::DeserializeOwned};
use std::panic::{AssertUnwindSafe, catch_unwind};
use thiserror::Error as ThisError;

///
/// SerializeError
///

#[derive(Debug, ThisError)]
pub enum SerializeError {
    #[error("cbor encode failed: {0}")]
    Encode(String),

    #[error("cbor decode failed: {0}")]
    Decode(String),

    #[error("cbor payload of {len} bytes exceeds the {max_bytes} byte bound")]
    TooLarge { len: usize, max_bytes: usize },
}

impl SerializeError {
    /// True when the payload was refused on size alone.
    #[must_use]
    pub const fn is_too_large(&self) -> bool {
        matches!(self, Self::TooLarge { .. })
    }
}

/// Encode `value` as CBOR.
pub fn serialize<T: Serialize>(value: &T) -> Result<Vec<u8>, SerializeError> {
    serde_cbor::to_vec(value).map_err(|err| SerializeError::Encode(err.to_string()))
}

/// Decode CBOR, refusing payloads longer than `max_bytes` up front.
///
/// Decoder panics on malformed input surface as `Decode` errors.
pub fn deserialize_bounded<T>(bytes: &[u8], max_bytes: usize) -> Result<T, SerializeError>
where
    T: DeserializeOwned,
{
    if bytes.len() > max_bytes {
        return Err(SerializeError::TooLarge {
            len: bytes.len(),
            max_bytes,
        });
    }

    catch_unwind(AssertUnwindSafe(|| serde_cbor::from_slice(bytes)))
        .map_err(|_| SerializeError::Decode("decoder panicked".to_string()))?
        .map_err(|err| SerializeError::Decode(err.to_string()))
}

///
/// TESTS
///
