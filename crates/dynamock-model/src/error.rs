//! Store error types.
//!
//! Every public operation fails with a [`StoreError`]. The shell and the JSON
//! handler render it as `{"__type": <code>, "message": <text>}`.

use std::fmt;

/// Well-known store error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum StoreErrorCode {
    /// Data operation against a table that was never created (or was deleted).
    TableNotFound,
    /// A statement failed to parse.
    StatementSyntaxError,
    /// A condition named an operator the evaluator does not implement.
    UnsupportedOperator,
    /// The request named an operation the dispatcher does not route.
    UnsupportedOperation,
    /// Malformed key schema at table creation.
    SchemaConflict,
    /// Validation error.
    #[default]
    ValidationError,
    /// Request body could not be decoded or a response could not be encoded.
    SerializationError,
    /// Internal error.
    InternalError,
}

impl StoreErrorCode {
    /// Returns the error code string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TableNotFound => "TableNotFound",
            Self::StatementSyntaxError => "StatementSyntaxError",
            Self::UnsupportedOperator => "UnsupportedOperator",
            Self::UnsupportedOperation => "UnsupportedOperation",
            Self::SchemaConflict => "SchemaConflict",
            Self::ValidationError => "ValidationError",
            Self::SerializationError => "SerializationError",
            Self::InternalError => "InternalError",
        }
    }
}

impl fmt::Display for StoreErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error returned by the store.
#[derive(Debug)]
pub struct StoreError {
    /// The error code.
    pub code: StoreErrorCode,
    /// A human-readable error message.
    pub message: String,
    /// The underlying source error, if any.
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StoreError({}): {}", self.code, self.message)
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl StoreError {
    /// Create a new `StoreError` from an error code.
    #[must_use]
    pub fn new(code: StoreErrorCode) -> Self {
        Self {
            message: code.as_str().to_owned(),
            code,
            source: None,
        }
    }

    /// Create a new `StoreError` with a custom message.
    #[must_use]
    pub fn with_message(code: StoreErrorCode, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code,
            source: None,
        }
    }

    /// Set the source error.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    // -- Convenience constructors --

    /// Table not registered in the catalog.
    #[must_use]
    pub fn table_not_found(table_name: &str) -> Self {
        Self::with_message(
            StoreErrorCode::TableNotFound,
            format!("Requested resource not found: Table: {table_name} not found"),
        )
    }

    /// Statement parse failure.
    #[must_use]
    pub fn statement_syntax(message: impl Into<String>) -> Self {
        Self::with_message(StoreErrorCode::StatementSyntaxError, message)
    }

    /// Unknown comparison operator.
    #[must_use]
    pub fn unsupported_operator(operator: &str) -> Self {
        Self::with_message(
            StoreErrorCode::UnsupportedOperator,
            format!("Unsupported operator: {operator}"),
        )
    }

    /// Unknown operation name.
    #[must_use]
    pub fn unsupported_operation(name: &str) -> Self {
        Self::with_message(
            StoreErrorCode::UnsupportedOperation,
            format!("Unsupported operation: {name}"),
        )
    }

    /// Malformed key schema.
    #[must_use]
    pub fn schema_conflict(message: impl Into<String>) -> Self {
        Self::with_message(StoreErrorCode::SchemaConflict, message)
    }

    /// Validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::with_message(StoreErrorCode::ValidationError, message)
    }

    /// Serialization error.
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::with_message(StoreErrorCode::SerializationError, message)
    }

    /// Internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::with_message(StoreErrorCode::InternalError, message)
    }
}

/// Create a `StoreError` from an error code.
///
/// # Examples
///
/// ```
/// use dynamock_model::store_error;
/// use dynamock_model::error::StoreErrorCode;
///
/// let err = store_error!(ValidationError);
/// assert_eq!(err.code, StoreErrorCode::ValidationError);
///
/// let err = store_error!(SchemaConflict, "duplicate HASH key");
/// assert_eq!(err.message, "duplicate HASH key");
/// ```
#[macro_export]
macro_rules! store_error {
    ($code:ident) => {
        $crate::error::StoreError::new($crate::error::StoreErrorCode::$code)
    };
    ($code:ident, $msg:expr) => {
        $crate::error::StoreError::with_message($crate::error::StoreErrorCode::$code, $msg)
    };
}
