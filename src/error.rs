//! Error types for the grid.
//!
//! Nothing in the grid is fatal: validation failures keep the cell in edit
//! mode, rejected commits revert the cell, and lookups of stale keys report
//! which key was stale.

use crate::record::RecordKey;
use thiserror::Error;

/// Result type used by fallible grid operations.
pub type Result<T> = std::result::Result<T, GridError>;

/// A proposed cell value failed a type, required or format check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The column requires a value.
    #[error("value is required")]
    Required,
    /// The column holds numbers and the input does not parse as one.
    #[error("{0:?} is not a number")]
    InvalidNumber(String),
    /// The column holds booleans and the input does not parse as one.
    #[error("{0:?} is not a boolean")]
    InvalidBoolean(String),
    /// The input exceeds the column's maximum length.
    #[error("value exceeds {max} characters")]
    TooLong {
        /// Maximum number of characters.
        max: usize,
    },
}

/// Errors reported by grid operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    /// A proposed value was rejected before any write.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The backing store rejected an already-applied edit; the old value has
    /// been restored.
    #[error("commit of {column} on record {record} rejected: {reason}")]
    CommitRejected {
        /// Record whose edit was reverted.
        record: RecordKey,
        /// Attribute that was reverted.
        column: String,
        /// Reason given by the host.
        reason: String,
    },

    /// No record with this key is bound to the grid.
    #[error("unknown record {0}")]
    UnknownRecord(RecordKey),

    /// No data row at this index.
    #[error("no data row at index {0}")]
    UnknownRow(usize),

    /// No column at this position or with this name.
    #[error("unknown column {0}")]
    UnknownColumn(String),

    /// No schema field with this id.
    #[error("unknown field {0}")]
    UnknownField(String),

    /// A field with this id already exists.
    #[error("duplicate field {0}")]
    DuplicateField(String),

    /// No pending commit with this id.
    #[error("unknown commit {0}")]
    UnknownCommit(u64),

    /// Paging state violates `first <= current <= last`.
    #[error("invalid paging state: first={first} current={current} last={last}")]
    InvalidPagingState {
        /// First page index.
        first: i64,
        /// Current page index.
        current: i64,
        /// Last page index.
        last: i64,
    },
}
