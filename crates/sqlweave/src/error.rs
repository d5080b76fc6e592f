//! Error types for sqlweave

use thiserror::Error;

/// Result type alias for sqlweave operations
pub type SqlResult<T> = Result<T, SqlError>;

/// Errors raised while compiling predicates or building statements.
///
/// Every variant is a deterministic function of the input: nothing here is
/// retryable, and nothing is raised after a command has been handed to a provider.
#[derive(Debug, Error)]
pub enum SqlError {
    /// A function, operator or statement shape the target cannot express.
    #[error("Unsupported operation '{operation}': {context}")]
    UnsupportedOperation { operation: String, context: String },

    /// Malformed input (paging without ordering, bad comparison shape, unknown property...).
    #[error("Argument error: {0}")]
    Argument(String),

    /// Parameter count is above the engine's ceiling.
    #[error("Parameter limit exceeded: {count} parameters, engine maximum is {max}")]
    ParameterLimitExceeded { count: usize, max: usize },

    /// Rejected schema/table/column/alias name.
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// The entity declares no primary key but the statement needs one.
    #[error("Entity '{entity}' does not have a property marked as primary key")]
    MissingPrimaryKey { entity: String },

    /// Required-field validation failed.
    #[error("Validation error: {0}")]
    Validation(String),
}

impl SqlError {
    /// Create an unsupported-operation error
    pub fn unsupported(operation: impl Into<String>, context: impl Into<String>) -> Self {
        Self::UnsupportedOperation {
            operation: operation.into(),
            context: context.into(),
        }
    }

    /// Create an argument error
    pub fn argument(message: impl Into<String>) -> Self {
        Self::Argument(message.into())
    }

    /// Create an invalid identifier error
    pub fn invalid_identifier(message: impl Into<String>) -> Self {
        Self::InvalidIdentifier(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Check if this is an unsupported-operation error
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::UnsupportedOperation { .. })
    }

    /// Check if this is an argument error
    pub fn is_argument(&self) -> bool {
        matches!(self, Self::Argument(_))
    }

    /// Check if this is a parameter-limit error
    pub fn is_parameter_limit(&self) -> bool {
        matches!(self, Self::ParameterLimitExceeded { .. })
    }
}
