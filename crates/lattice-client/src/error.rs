//! Error types for the client SDK.

use lattice_codec::CodecError;
use thiserror::Error;

/// Client error type.
#[derive(Debug, Error, PartialEq)]
pub enum ClientError {
    /// The statement could not be parsed as an INSERT template.
    #[error("malformed insert template: {0}")]
    MalformedTemplate(String),

    /// The VALUES clause has the wrong number of positions.
    #[error("column count mismatch: schema has {expected} columns, template supplies {found}")]
    ColumnCountMismatch {
        /// Columns in the table schema.
        expected: usize,
        /// Positions in the VALUES clause.
        found: usize,
    },

    /// A template literal's lexical type does not fit its column.
    #[error("literal {found} is incompatible with column '{column}'")]
    TemplateTypeMismatch {
        /// Target column name.
        column: String,
        /// The offending literal as written.
        found: String,
    },

    /// A column name in the template is not in the schema.
    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    /// The template's column list is not in schema order.
    #[error("column list out of order: expected '{expected}', found '{found}'")]
    ColumnOrderMismatch {
        /// The column the schema expects at this position.
        expected: String,
        /// The column the template names.
        found: String,
    },

    /// A batch statement targets a different table than the session.
    #[error("statement targets table '{found}', session is prepared for '{expected}'")]
    TableMismatch {
        /// The session's table.
        expected: String,
        /// The statement's table.
        found: String,
    },

    /// A literal-only entry point was given a statement with placeholders.
    #[error("statement requires binding for {placeholders} parameter(s)")]
    StatementRequiresBinding {
        /// Number of `?` markers in the statement.
        placeholders: usize,
    },

    /// `execute` called while batch rows are pending.
    #[error("batch rows pending; use execute_batch")]
    BatchPending,

    /// Operation on a closed session.
    #[error("session is closed")]
    SessionClosed,

    /// The table is absent from the schema registry.
    #[error("table '{0}' not found")]
    TableNotFound(String),

    /// Failure reported by the remote engine, surfaced verbatim.
    #[error("remote failure: {0}")]
    Remote(String),

    /// Row codec failure.
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;
