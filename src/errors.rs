// Copyright 2025 Cowboy AI, LLC.

//! Error types for categorical scope operations

use thiserror::Error;

/// A single integer column that could not be restored at scope exit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CastBackFailure {
    /// Dataset name the column belongs to
    pub dataset: String,
    /// Column that failed to restore
    pub column: String,
    /// Why the cast failed
    pub reason: String,
}

/// Errors that can occur while categorizing, unifying or operating on datasets
#[derive(Debug, Clone, Error)]
pub enum CatError {
    /// The dataset registry was never configured
    #[error("Dataset registry not configured: call configure_registry first")]
    GlobalsNotConfigured,

    /// No dataset is bound to the name
    #[error("Dataset not found: {0}")]
    NotFound(String),

    /// Column missing from a dataset
    #[error("Column not found: {column} in dataset {dataset}")]
    ColumnNotFound {
        /// Dataset that was searched
        dataset: String,
        /// Column that was requested
        column: String,
    },

    /// Add invoked with an operand shape it does not support
    #[error("Unsupported operand: {reason}")]
    UnsupportedOperand {
        /// Description of the rejected operand
        reason: String,
    },

    /// Row counts disagree
    #[error("Length mismatch: expected {expected} rows, found {actual}")]
    LengthMismatch {
        /// Expected row count
        expected: usize,
        /// Actual row count
        actual: usize,
    },

    /// A column could not be cast to the requested dtype
    #[error("Invalid cast of column {column} from {from} to {to}: {reason}")]
    InvalidCast {
        /// Column being cast
        column: String,
        /// Source dtype name
        from: String,
        /// Target dtype name
        to: String,
        /// What went wrong
        reason: String,
    },

    /// Same-named categorical columns carry domains of incompatible value kinds
    #[error("Domain type mismatch for column {column}: {kinds:?}")]
    DomainTypeMismatch {
        /// Column being unified
        column: String,
        /// Kinds of the conflicting domains
        kinds: Vec<String>,
    },

    /// Invalid scope state transition
    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition {
        /// Current state
        from: String,
        /// Attempted target state
        to: String,
    },

    /// Invalid operation
    #[error("Invalid operation: {reason}")]
    InvalidOperation {
        /// Reason why the operation is invalid
        reason: String,
    },

    /// Integer columns that could not be restored at scope exit
    #[error("Failed to restore {} integer column(s)", failures.len())]
    CastBack {
        /// One entry per column left categorical
        failures: Vec<CastBackFailure>,
    },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for categorical scope operations
pub type CatResult<T> = Result<T, CatError>;

impl From<serde_json::Error> for CatError {
    fn from(err: serde_json::Error) -> Self {
        CatError::Serialization(err.to_string())
    }
}

impl CatError {
    /// Shorthand for an unsupported operand
    pub fn unsupported(reason: impl Into<String>) -> Self {
        CatError::UnsupportedOperand {
            reason: reason.into(),
        }
    }

    /// Shorthand for an invalid operation
    pub fn invalid_operation(reason: impl Into<String>) -> Self {
        CatError::InvalidOperation {
            reason: reason.into(),
        }
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CatError::NotFound(_) | CatError::ColumnNotFound { .. }
        )
    }

    /// Check if this is a cast error
    pub fn is_cast_error(&self) -> bool {
        matches!(self, CatError::InvalidCast { .. } | CatError::CastBack { .. })
    }
}
