//! Error types for feature, attribute and store operations.

use thiserror::Error;

/// Errors raised by the feature model and the overlay operations.
#[derive(Debug, Error)]
pub enum FeatureError {
    /// The key is not present in the store.
    #[error("the given key was not present in the store")]
    KeyNotFound,

    /// A key equal to the one being added is already present.
    #[error("an item with the same key has already been added")]
    DuplicateKey,

    /// A mutation was attempted on a read-only store.
    #[error("collection is read-only")]
    ReadOnly,

    /// The attribute does not exist.
    #[error("attribute {name} does not exist")]
    AttributeNotFound { name: String },

    /// The attribute already exists.
    #[error("attribute {name} already exists")]
    AttributeExists { name: String },

    /// Type lookup for an attribute that does not exist.
    #[error("attribute {name} is out of range")]
    AttributeOutOfRange { name: String },

    /// A required argument was missing.
    #[error("argument {name} must not be null")]
    NullArgument { name: &'static str },

    /// The overlay operation tag is not mapped to a spatial function.
    #[error("unknown spatial function: {0}")]
    UnknownSpatialFunction(String),

    /// Malformed configuration document.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// I/O error while reading configuration.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for feature operations.
pub type Result<T> = std::result::Result<T, FeatureError>;
