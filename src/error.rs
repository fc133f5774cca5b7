use thiserror::Error;

use crate::fluent::FluentKind;

/// Errors raised by the environment, trajectory, runner, and registry.
#[derive(Debug, Error)]
pub enum RddlError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Environment must be reset before calling step")]
    NotReset,

    #[error("Couldn't find RDDL domain: {0}")]
    DomainNotFound(String),

    #[error("Shape mismatch for fluent '{fluent}': expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        fluent: String,
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    #[error("Fluent '{fluent}' holds values outside its {kind} domain")]
    KindMismatch { fluent: String, kind: FluentKind },

    #[error("Missing value for fluent '{0}'")]
    MissingFluent(String),

    #[error("Unknown fluent '{0}'")]
    UnknownFluent(String),

    #[error("Operation attempted on a closed resource")]
    ResourceClosed,

    #[error("Index {index} out of range for trajectory of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Model evaluation failed: {0}")]
    Model(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RddlError>;
