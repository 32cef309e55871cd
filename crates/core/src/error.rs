//! Error types for strand
//!
//! This module defines the single error type shared by every strand crate.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! ## Error Kinds
//!
//! | Variant | Raised when | Phase |
//! |---------|-------------|-------|
//! | `InvalidType` | a type family is asked to combine incompatible descriptors | graph construction |
//! | `ShapeMismatch` | a collection's element type does not decompose as required | graph construction |
//! | `Binding` | a location is neither readable nor writable | graph construction |
//! | `Detach` | a descriptor cannot produce an owned copy of a value | execution |
//!
//! The remaining variants cover serialization, on-disk corruption, I/O and
//! configuration problems raised by the storage and engine crates.

use std::io;
use thiserror::Error;

/// Result type alias for strand operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the strand data-binding layer
#[derive(Debug, Error)]
pub enum Error {
    /// A type family was asked to build a type from incompatible descriptors
    #[error("Invalid type: {0}")]
    InvalidType(String),

    /// An element type does not have the structural shape an operation needs
    #[error("Shape mismatch for {type_name}: expected {expected} sub-types, found {actual}")]
    ShapeMismatch {
        /// Name of the offending element type
        type_name: String,
        /// Number of sub-types the operation requires
        expected: usize,
        /// Number of sub-types the type actually declares
        actual: usize,
    },

    /// A location cannot be bound as a source or a target
    #[error("Cannot bind {location}: {reason}")]
    Binding {
        /// Location that failed to bind
        location: String,
        /// Why the binding failed
        reason: String,
    },

    /// A value could not be copied out of its backing buffer
    #[error("Cannot detach value of type {type_name}: {reason}")]
    Detach {
        /// Name of the type whose detach failed
        type_name: String,
        /// Underlying failure
        reason: String,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Data corruption detected in stored records
    #[error("Data corruption: {0}")]
    Corruption(String),

    /// I/O error (file operations)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Invalid operation or state
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

impl Error {
    /// Create an `InvalidType` error.
    pub fn invalid_type(detail: impl Into<String>) -> Self {
        Error::InvalidType(detail.into())
    }

    /// Create a `ShapeMismatch` error.
    pub fn shape_mismatch(type_name: impl Into<String>, expected: usize, actual: usize) -> Self {
        Error::ShapeMismatch {
            type_name: type_name.into(),
            expected,
            actual,
        }
    }

    /// Create a `Binding` error.
    pub fn binding(location: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Binding {
            location: location.into(),
            reason: reason.into(),
        }
    }

    /// Create a `Detach` error.
    pub fn detach(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Detach {
            type_name: type_name.into(),
            reason: reason.into(),
        }
    }

    /// Create a `Corruption` error.
    pub fn corruption(detail: impl Into<String>) -> Self {
        Error::Corruption(detail.into())
    }

    /// Returns true for errors raised while describing a pipeline, before any
    /// record is read or written.
    pub fn is_construction_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidType(_) | Error::ShapeMismatch { .. } | Error::Binding { .. } | Error::Config(_)
        )
    }

    /// Returns true if retrying the failed operation may succeed.
    ///
    /// Only I/O failures qualify. Retry policy itself belongs to the caller.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Io(_))
    }
}

impl From<bincode::Error> for Error {
    fn from(e: bincode::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<rmp_serde::encode::Error> for Error {
    fn from(e: rmp_serde::encode::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<rmp_serde::decode::Error> for Error {
    fn from(e: rmp_serde::decode::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
