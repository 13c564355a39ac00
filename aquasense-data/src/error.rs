//! Error types for the data-access core
//!
//! Two layers:
//!
//! - [`StoreError`]: structured, backend-neutral failure raised by a store
//!   backend, carrying the operation and a coarse kind so the session layer
//!   can classify it without inspecting backend-specific error types.
//! - [`DataError`]: the single base failure type exposed by repositories.
//!   The session scope is the one place where store failures are translated
//!   into the typed variants; anything it cannot classify passes through
//!   unchanged as [`DataError::Store`].

use std::fmt;

use thiserror::Error;

/// Store operation being performed when the error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    /// Establishing a connection or acquiring one from the pool
    Connect,
    /// Executing a select
    Query,
    /// Inserting a row
    Insert,
    /// Updating rows
    Update,
    /// Deleting rows
    Delete,
    /// Transaction control (begin, commit, rollback)
    Transaction,
    /// Schema administration (create/drop tables)
    Schema,
}

impl fmt::Display for StoreOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect => write!(f, "connect"),
            Self::Query => write!(f, "query"),
            Self::Insert => write!(f, "insert"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
            Self::Transaction => write!(f, "transaction"),
            Self::Schema => write!(f, "schema"),
        }
    }
}

/// Category of store error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreErrorKind {
    /// Failed to establish or acquire a connection
    ConnectionFailed,
    /// A row required by the query layer was absent
    NotFound,
    /// Unique constraint violation (duplicate key)
    UniqueViolation,
    /// Non-unique constraint violation (foreign key, check, not-null)
    ConstraintViolation,
    /// Query execution failed
    QueryFailed,
    /// Transaction control failed
    TransactionFailed,
    /// Row value could not be decoded into the expected type
    TypeConversion,
    /// Other/unclassified error
    Other,
}

impl fmt::Display for StoreErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectionFailed => write!(f, "connection_failed"),
            Self::NotFound => write!(f, "not_found"),
            Self::UniqueViolation => write!(f, "unique_violation"),
            Self::ConstraintViolation => write!(f, "constraint_violation"),
            Self::QueryFailed => write!(f, "query_failed"),
            Self::TransactionFailed => write!(f, "transaction_failed"),
            Self::TypeConversion => write!(f, "type_conversion"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Structured store error with operation context
///
/// Raised by store backends ([`crate::store::MemoryStore`],
/// `crate::store::PostgresStore`) and classified by the session scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreError {
    /// The operation being performed when the error occurred
    pub operation: StoreOperation,
    /// The category of error
    pub kind: StoreErrorKind,
    /// Human-readable error message
    pub message: String,
    /// Additional context (e.g., table name, constraint name)
    pub context: Option<String>,
}

impl StoreError {
    /// Create a new store error
    pub fn new(
        operation: StoreOperation,
        kind: StoreErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            operation,
            kind,
            message: message.into(),
            context: None,
        }
    }

    /// Create a connection failure error
    pub fn connection_failed(message: impl Into<String>) -> Self {
        Self::new(
            StoreOperation::Connect,
            StoreErrorKind::ConnectionFailed,
            message,
        )
    }

    /// Create a unique-violation error
    pub fn unique_violation(operation: StoreOperation, message: impl Into<String>) -> Self {
        Self::new(operation, StoreErrorKind::UniqueViolation, message)
    }

    /// Create a constraint-violation error
    pub fn constraint_violation(operation: StoreOperation, message: impl Into<String>) -> Self {
        Self::new(operation, StoreErrorKind::ConstraintViolation, message)
    }

    /// Create a query failure error
    pub fn query_failed(operation: StoreOperation, message: impl Into<String>) -> Self {
        Self::new(operation, StoreErrorKind::QueryFailed, message)
    }

    /// Create a transaction failure error
    pub fn transaction_failed(message: impl Into<String>) -> Self {
        Self::new(
            StoreOperation::Transaction,
            StoreErrorKind::TransactionFailed,
            message,
        )
    }

    /// Create a type-conversion error
    pub fn type_conversion(operation: StoreOperation, message: impl Into<String>) -> Self {
        Self::new(operation, StoreErrorKind::TypeConversion, message)
    }

    /// Attach context (table or constraint name) to an existing error
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "store {} error during {}: {}",
            self.kind, self.operation, self.message
        )?;
        if let Some(ref context) = self.context {
            write!(f, " [{}]", context)?;
        }
        Ok(())
    }
}

impl std::error::Error for StoreError {}

/// Base failure type for every repository operation
///
/// `NotFound`, `AlreadyExists` and `Integrity` are the typed outcomes the
/// session scope and repositories produce deliberately; the remaining
/// variants are caller/configuration errors surfaced before a query runs.
/// Store failures that map to none of these pass through as `Store`.
#[derive(Debug, Error)]
pub enum DataError {
    /// Requested key or criteria matched zero rows where one was required
    #[error("{entity} not found for {key}")]
    NotFound {
        /// Entity type name
        entity: &'static str,
        /// Rendered key or criteria
        key: String,
    },

    /// Insert violated a uniqueness constraint
    #[error("{entity} already exists: {detail}")]
    AlreadyExists {
        /// Entity type name
        entity: &'static str,
        /// Constraint detail from the store
        detail: String,
    },

    /// Constraint violation outside the insert path
    #[error("integrity violation on {entity}: {detail}")]
    Integrity {
        /// Entity type name
        entity: &'static str,
        /// Constraint detail from the store
        detail: String,
    },

    /// A criteria field is not declared on the entity
    #[error("unknown field `{field}` on {entity}")]
    UnknownField {
        /// Entity type name
        entity: &'static str,
        /// The undeclared field name
        field: String,
    },

    /// Key arity does not match the entity's primary-key column count
    #[error("{entity} primary key expects {expected} part(s), got {got}")]
    KeyArity {
        /// Entity type name
        entity: &'static str,
        /// Declared primary-key column count
        expected: usize,
        /// Provided key part count
        got: usize,
    },

    /// The entity type forbids in-place updates
    #[error("{entity} is append-only and cannot be updated")]
    ImmutableEntity {
        /// Entity type name
        entity: &'static str,
    },

    /// A persisted record could not be mapped back to an entity
    #[error("cannot map column `{column}`: {detail}")]
    Mapping {
        /// Column being read
        column: String,
        /// What was expected vs. found
        detail: String,
    },

    /// Configuration loading failed
    #[error("configuration error: {0}")]
    Config(#[from] figment::Error),

    /// Unclassified store failure, propagated unchanged
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl DataError {
    /// True when the error is the typed "no matching row" outcome
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// True when the error is the typed duplicate-insert outcome
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_operation_display() {
        assert_eq!(format!("{}", StoreOperation::Connect), "connect");
        assert_eq!(format!("{}", StoreOperation::Query), "query");
        assert_eq!(format!("{}", StoreOperation::Insert), "insert");
        assert_eq!(format!("{}", StoreOperation::Update), "update");
        assert_eq!(format!("{}", StoreOperation::Delete), "delete");
        assert_eq!(format!("{}", StoreOperation::Transaction), "transaction");
        assert_eq!(format!("{}", StoreOperation::Schema), "schema");
    }

    #[test]
    fn test_store_error_display_without_context() {
        let error = StoreError::query_failed(StoreOperation::Query, "syntax error");
        let display = format!("{}", error);
        assert!(display.contains("query_failed"));
        assert!(display.contains("syntax error"));
        assert!(!display.contains("["));
    }

    #[test]
    fn test_store_error_display_with_context() {
        let error = StoreError::unique_violation(StoreOperation::Insert, "duplicate key")
            .with_context("water_tank.tank_code");
        let display = format!("{}", error);
        assert!(display.contains("unique_violation"));
        assert!(display.contains("[water_tank.tank_code]"));
    }

    #[test]
    fn test_data_error_not_found_display() {
        let error = DataError::NotFound {
            entity: "WaterTank",
            key: "42".to_string(),
        };
        assert_eq!(format!("{}", error), "WaterTank not found for 42");
        assert!(error.is_not_found());
        assert!(!error.is_already_exists());
    }

    #[test]
    fn test_data_error_store_passthrough_is_transparent() {
        let store = StoreError::transaction_failed("commit failed");
        let rendered = format!("{}", store);
        let error = DataError::from(store);
        assert_eq!(format!("{}", error), rendered);
    }

    #[test]
    fn test_data_error_key_arity_display() {
        let error = DataError::KeyArity {
            entity: "WaterTankSensorRecordHistory",
            expected: 2,
            got: 1,
        };
        let display = format!("{}", error);
        assert!(display.contains("expects 2 part(s)"));
        assert!(display.contains("got 1"));
    }
}
