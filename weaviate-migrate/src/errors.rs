use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type returned by the migration engine.
#[derive(Debug, Error)]
pub enum MigrateError {
    /// Invalid or missing folder/input supplied by the caller.
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// The remote schema store failed; the store error is carried unchanged.
    #[error("remote store error: {0}")]
    RemoteStore(#[from] StoreError),

    /// A ledger entry is missing, unreadable, or not a migration record.
    #[error("failed to load migration {}: {reason}", path.display())]
    MigrationLoad { path: PathBuf, reason: String },

    /// The target schema is empty or structurally invalid.
    #[error("validation failed: {}", issues.join("; "))]
    Validation { issues: Vec<String> },

    /// Writing a ledger entry failed.
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl MigrateError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }

    /// Convenience helper for a validation error with one issue.
    pub fn validation(issue: impl Into<String>) -> Self {
        Self::Validation {
            issues: vec![issue.into()],
        }
    }

    pub fn migration_load(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::MigrationLoad {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Process exit code the CLI uses for this error kind.
    pub fn exit_code(&self) -> i32 {
        match self {
            MigrateError::Configuration { .. } => 2,
            MigrateError::RemoteStore(_) => 3,
            MigrateError::MigrationLoad { .. } => 4,
            MigrateError::Validation { .. } => 5,
            MigrateError::Io { .. } => 1,
        }
    }
}

/// Failure reported by a [`SchemaStore`](crate::store::SchemaStore) implementation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The request never produced a response (connect, DNS, timeout).
    #[error("transport failure during {operation}: {message}")]
    Transport { operation: &'static str, message: String },

    /// The store answered with a non-success status.
    #[error("{operation} returned HTTP {status}: {body}")]
    Status {
        operation: &'static str,
        status: u16,
        body: String,
    },

    /// The response body could not be decoded.
    #[error("could not decode {operation} response: {message}")]
    Decode { operation: &'static str, message: String },

    /// Catch-all for adapters that are not HTTP based.
    #[error("{message}")]
    Other { message: String },
}

impl StoreError {
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other { message: message.into() }
    }

    /// Whether the store rejected our credentials.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, StoreError::Status { status: 401 | 403, .. })
    }
}

pub type MigrateResult<T> = Result<T, MigrateError>;
