use crate::{codec::CodecError, config::ConfigError, schema::SchemaError, store::StoreError};
use std::fmt;
use thiserror::Error as ThisError;

///
/// InternalError
///
/// Structured runtime error with a stable classification.
/// Every fallible operation in this crate returns this type; leaf errors
/// (codec, store, schema, config) convert into it via `From`.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct InternalError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,

    /// Optional structured error detail.
    /// The variant (if present) must correspond to `origin`.
    pub detail: Option<ErrorDetail>,
}

impl InternalError {
    /// Construct an InternalError without structured detail.
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
            detail: None,
        }
    }

    /// Construct a not-found error for a key in the named collection.
    pub fn not_found(collection: &str, key: impl Into<String>) -> Self {
        let key = key.into();

        Self::new(
            ErrorClass::NotFound,
            ErrorOrigin::Collection,
            format!("collection '{collection}': key not found: {key}"),
        )
    }

    /// Construct a collection-origin encoding error.
    pub(crate) fn collection_encoding(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Encoding, ErrorOrigin::Collection, message)
    }

    /// Construct an index uniqueness violation.
    pub(crate) fn index_conflict(index: &str, key: impl Into<String>) -> Self {
        let key = key.into();

        Self::new(
            ErrorClass::Conflict,
            ErrorOrigin::Index,
            format!("index '{index}': uniqueness constraint violation on key {key}"),
        )
    }

    /// Construct an index-origin encoding error.
    pub(crate) fn index_encoding(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Encoding, ErrorOrigin::Index, message)
    }

    pub(crate) fn empty_vec(collection: &str) -> Self {
        Self::new(
            ErrorClass::EmptyVec,
            ErrorOrigin::Collection,
            format!("vector '{collection}' is empty"),
        )
    }

    pub(crate) fn out_of_bounds(collection: &str, index: u64, len: u64) -> Self {
        Self::new(
            ErrorClass::OutOfBounds,
            ErrorOrigin::Collection,
            format!("vector '{collection}': index {index} out of bounds (len {len})"),
        )
    }

    /// Construct an invalid-iterator error (bad range shape or inverted bounds).
    pub(crate) fn invalid_iterator(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::InvalidIterator, ErrorOrigin::Collection, message)
    }

    /// Construct a collection-origin unsupported error (limits, shapes).
    pub(crate) fn collection_unsupported(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Unsupported, ErrorOrigin::Collection, message)
    }

    /// Construct a tree-origin invariant violation.
    pub(crate) fn tree_invariant(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Internal, ErrorOrigin::Tree, message)
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.class, ErrorClass::NotFound)
    }

    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self.class, ErrorClass::Conflict)
    }

    #[must_use]
    pub const fn is_encoding(&self) -> bool {
        matches!(self.class, ErrorClass::Encoding)
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }
}

///
/// ErrorDetail
///
/// Structured, origin-specific error detail carried by [`InternalError`].
///

#[derive(Debug, ThisError)]
pub enum ErrorDetail {
    #[error("{0}")]
    Codec(CodecError),

    #[error("{0}")]
    Store(StoreError),

    #[error("{0}")]
    Schema(SchemaError),

    #[error("{0}")]
    Config(ConfigError),
}

impl From<CodecError> for InternalError {
    fn from(err: CodecError) -> Self {
        Self {
            class: ErrorClass::Encoding,
            origin: ErrorOrigin::Codec,
            message: err.to_string(),
            detail: Some(ErrorDetail::Codec(err)),
        }
    }
}

impl From<StoreError> for InternalError {
    fn from(err: StoreError) -> Self {
        let class = match err {
            StoreError::InvalidRange { .. } => ErrorClass::InvalidIterator,
            StoreError::Backend(_) => ErrorClass::Internal,
        };

        Self {
            class,
            origin: ErrorOrigin::Store,
            message: err.to_string(),
            detail: Some(ErrorDetail::Store(err)),
        }
    }
}

impl From<SchemaError> for InternalError {
    fn from(err: SchemaError) -> Self {
        Self {
            class: ErrorClass::Unsupported,
            origin: ErrorOrigin::Schema,
            message: err.to_string(),
            detail: Some(ErrorDetail::Schema(err)),
        }
    }
}

impl From<ConfigError> for InternalError {
    fn from(err: ConfigError) -> Self {
        Self {
            class: ErrorClass::Unsupported,
            origin: ErrorOrigin::Config,
            message: err.to_string(),
            detail: Some(ErrorDetail::Config(err)),
        }
    }
}

///
/// ErrorClass
/// Error taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    NotFound,
    Encoding,
    Conflict,
    EmptyVec,
    OutOfBounds,
    InvalidIterator,
    Unsupported,
    Internal,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::NotFound => "not_found",
            Self::Encoding => "encoding",
            Self::Conflict => "conflict",
            Self::EmptyVec => "empty_vec",
            Self::OutOfBounds => "out_of_bounds",
            Self::InvalidIterator => "invalid_iterator",
            Self::Unsupported => "unsupported",
            Self::Internal => "internal",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Origin taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Codec,
    Store,
    Collection,
    Schema,
    Index,
    Tree,
    Config,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Codec => "codec",
            Self::Store => "store",
            Self::Collection => "collection",
            Self::Schema => "schema",
            Self::Index => "index",
            Self::Tree => "tree",
            Self::Config => "config",
        };
        write!(f, "{label}")
    }
}

///
/// TESTS
///
