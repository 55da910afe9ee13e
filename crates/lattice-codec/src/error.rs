//! Error types for the row codec.

use lattice_common::DataType;
use thiserror::Error;

/// Codec error type.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    /// A value's runtime type is incompatible with the declared column type.
    #[error("type mismatch for column '{column}': expected {declared}, got {actual}")]
    TypeMismatch {
        /// Target column name.
        column: String,
        /// Declared column type.
        declared: DataType,
        /// Description of the supplied value's type.
        actual: String,
    },

    /// NULL bound to a non-nullable column.
    #[error("column '{0}' is not nullable")]
    NullNotAllowed(String),

    /// Placeholder index outside the template's parameter range.
    #[error("parameter index {index} out of range (statement has {count} parameters)")]
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// Number of parameters in the statement.
        count: usize,
    },

    /// Finalize called before every placeholder was bound.
    #[error("parameter for column '{0}' has not been bound")]
    IncompleteParameters(String),

    /// A row was supplied with the wrong number of values.
    #[error("wrong column count: schema has {expected} columns, got {found}")]
    WrongColumnCount {
        /// Columns in the schema.
        expected: usize,
        /// Values supplied.
        found: usize,
    },

    /// Column index outside the schema when reading.
    #[error("column index {index} out of range (schema has {count} columns)")]
    ColumnOutOfRange {
        /// The offending index.
        index: usize,
        /// Columns in the schema.
        count: usize,
    },

    /// Read attempted before a successful cursor advance.
    #[error("cursor is not positioned on a row")]
    NoCurrentRow,

    /// Buffer shorter than its layout requires.
    #[error("row buffer truncated: expected at least {expected} bytes, got {found}")]
    Truncated {
        /// Minimum required length.
        expected: usize,
        /// Actual buffer length.
        found: usize,
    },

    /// Unknown row format version byte.
    #[error("unsupported row format version {0}")]
    UnsupportedVersion(u8),

    /// A var-region offset points outside the buffer.
    #[error("corrupt row: var offset {offset}+{len} outside buffer of {buf_len} bytes")]
    BadOffset {
        /// Stored offset.
        offset: usize,
        /// Stored length.
        len: usize,
        /// Buffer length.
        buf_len: usize,
    },

    /// String payload is not valid UTF-8.
    #[error("corrupt row: column '{0}' payload is not valid UTF-8")]
    InvalidUtf8(String),

    /// Encoded row exceeds the format's 32-bit addressing.
    #[error("row too large: {0} bytes")]
    PayloadTooLarge(usize),
}

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;
