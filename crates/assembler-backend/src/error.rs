//! Error types for the backend helper layer.

use thiserror::Error;

/// Failure to resolve a node to an identifier.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    /// The node's type has no variant in the model.
    ///
    /// Points at a schema/type-registration mismatch; fix it in code.
    #[error("unrecognized node type {typename}: {value}")]
    UnrecognizedNodeType { typename: String, value: String },
}

/// Failure to load or validate backend configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),

    #[error("batch_size must be greater than 0")]
    InvalidBatchSize,
}

/// Any error this crate returns.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
