// In: src/error.rs

//! This module defines the single, unified error type for the khiva binding.
//! It uses the `thiserror` crate to provide ergonomic, context-aware error handling.
//!
//! Two layers of failure exist: the native layer reports a numeric code plus a
//! message (`NativeError`), and the binding itself rejects bad input before any
//! native call is made (every other `KhivaError` variant).

use thiserror::Error;

use crate::marshal::Channel;
use crate::types::Dtype;

/// A failure reported by the native layer, carried as its raw code and message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("native error {code}: {message}")]
pub struct NativeError {
    pub code: i32,
    pub message: String,
}

impl NativeError {
    pub const INVALID_ARGUMENT: i32 = 202;
    pub const SIZE: i32 = 203;
    pub const TYPE: i32 = 204;
    pub const DIFFERENT_TYPES: i32 = 205;
    pub const DEVICE: i32 = 208;
    pub const NOT_SUPPORTED: i32 = 301;
    pub const INTERNAL: i32 = 998;

    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum KhivaError {
    // =========================================================================
    // === Input Validation (raised before any native call)
    // =========================================================================
    #[error("Null elems object provided")]
    NullInput,

    #[error("Mismatching dims and array size: dims describe {expected} elements, buffer holds {actual}")]
    ShapeMismatch { expected: u64, actual: u64 },

    #[error("ArrayFire supports up to 4 dimensions only, got {0}")]
    RankExceeded(usize),

    #[error("Array has already been released")]
    Released,

    #[error("Requested element type {requested} but the array holds {actual}")]
    TypeMismatch { requested: Dtype, actual: Dtype },

    #[error("Unknown element type ordinal: {0}")]
    UnknownDtype(i32),

    #[error("Unknown element type name: '{0}'")]
    UnknownDtypeName(String),

    #[error("Arrays belong to different library contexts")]
    ContextMismatch,

    #[error("Entry point '{entry}' expects {expected} input arrays, got {actual}")]
    Arity {
        entry: &'static str,
        expected: usize,
        actual: usize,
    },

    // =========================================================================
    // === Protocol Errors (native layer answered, but not as agreed)
    // =========================================================================
    #[error("Entry point '{entry}' returned {actual} handles, expected {expected}")]
    MalformedResult {
        entry: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Transport channel {channel} cannot carry elements of type {dtype}")]
    ChannelMismatch { dtype: Dtype, channel: Channel },

    #[error("Unsupported data type for this operation: {0}")]
    UnsupportedType(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Internal logic error (this is a bug): {0}")]
    Internal(String),

    // =========================================================================
    // === External Error Wrappers (Using #[from] for automatic conversion)
    // =========================================================================
    /// A failure reported by the native library itself.
    #[error(transparent)]
    Native(#[from] NativeError),

    /// An error originating from the Arrow library.
    #[error("Arrow operation failed: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// An error from the underlying I/O subsystem, typically while reading a config file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error from the Serde JSON library, typically during config parsing.
    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),
}

pub type Result<T, E = KhivaError> = std::result::Result<T, E>;

#[cfg(feature = "python")]
impl From<KhivaError> for pyo3::PyErr {
    fn from(err: KhivaError) -> pyo3::PyErr {
        pyo3::exceptions::PyValueError::new_err(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_error_converts_and_keeps_code() {
        let err: KhivaError = NativeError::new(NativeError::TYPE, "bad type").into();
        match err {
            KhivaError::Native(inner) => {
                assert_eq!(inner.code, 204);
                assert_eq!(inner.message, "bad type");
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn messages_name_the_offending_values() {
        let err = KhivaError::ShapeMismatch {
            expected: 6,
            actual: 4,
        };
        assert!(err.to_string().contains("6"));
        assert!(err.to_string().contains("4"));
        assert_eq!(
            KhivaError::NullInput.to_string(),
            "Null elems object provided"
        );
    }
}
