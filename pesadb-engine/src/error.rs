use thiserror::Error;

/// Errors produced by the storage engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Type mismatch, missing column, duplicate column names, missing
    /// primary key or an invalid type name.
    #[error("{0}")]
    Schema(String),

    /// Unique/primary-key duplicates, missing foreign-key targets and
    /// referential actions blocked by RESTRICT.
    #[error("{0}")]
    Constraint(String),

    /// Database, table or column not found.
    #[error("{0}")]
    Lookup(String),

    /// An operation that is valid in isolation but disallowed in context,
    /// such as an aggregate over a join.
    #[error("{0}")]
    Execution(String),

    /// Snapshot read/write failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A snapshot or catalog document that does not parse.
    #[error("Invalid database file format: {0}")]
    Corrupt(#[from] serde_json::Error),
}

impl EngineError {
    pub(crate) fn schema(message: impl Into<String>) -> Self {
        Self::Schema(message.into())
    }

    pub(crate) fn constraint(message: impl Into<String>) -> Self {
        Self::Constraint(message.into())
    }

    pub(crate) fn lookup(message: impl Into<String>) -> Self {
        Self::Lookup(message.into())
    }

    pub(crate) fn execution(message: impl Into<String>) -> Self {
        Self::Execution(message.into())
    }
}
