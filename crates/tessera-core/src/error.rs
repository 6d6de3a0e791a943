//! Core error types for the Tessera scene pipeline.

/// A specialized Result type for Tessera operations.
pub type TesseraResult<T> = Result<T, TesseraError>;

/// Top-level error type encompassing all Tessera subsystems.
#[derive(Debug, thiserror::Error)]
pub enum TesseraError {
    /// Input does not match a structural schema.
    #[error("schema validation error at {path}: {message}")]
    SchemaValidation { path: String, message: String },

    /// A component or operation names a type missing from its registry.
    #[error("unknown {kind} type '{name}'")]
    UnknownType { kind: String, name: String },

    /// Singleton, dangling reference or cycle in the entity tree.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    #[error("migration error: {0}")]
    Migration(String),

    /// An operation lacks the previous state needed to compute its inverse.
    #[error("inversion error: {0}")]
    Inversion(String),

    #[error("IR validation error: {0}")]
    IrValidation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl TesseraError {
    /// Create a schema validation error at a dotted field path.
    pub fn schema(path: impl Into<String>, message: impl Into<String>) -> Self {
        TesseraError::SchemaValidation {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an unknown-type error for the given registry kind.
    pub fn unknown_type(kind: impl Into<String>, name: impl Into<String>) -> Self {
        TesseraError::UnknownType {
            kind: kind.into(),
            name: name.into(),
        }
    }

    pub fn invariant(message: impl Into<String>) -> Self {
        TesseraError::InvariantViolation(message.into())
    }

    /// Whether this error is an invariant violation.
    pub fn is_invariant(&self) -> bool {
        matches!(self, TesseraError::InvariantViolation(_))
    }
}
