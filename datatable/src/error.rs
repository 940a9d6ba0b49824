//! Error types.

use thiserror::Error;

/// Errors raised while building a table from its options.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    /// Two columns resolved to the same id.
    #[error("duplicate column id '{0}'")]
    DuplicateColumnId(String),

    /// A column resolved to an empty id.
    #[error("column at position {0} has an empty id")]
    EmptyColumnId(usize),

    /// A data column used the id reserved for the selection column.
    #[error("column id '{0}' is reserved")]
    ReservedColumnId(String),
}

/// Errors raised by export writers and file savers.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
