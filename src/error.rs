//! Error taxonomy for file sources.
//!
//! Every fallible operation in this crate returns [`Result<T>`], whose error is
//! [`SourceError`]. Errors are categorized by [`ErrorKind`]:
//! - `NotFound` - a literal (non-pattern) path does not exist
//! - `Io` - a channel could not be opened or read
//! - `IllegalState` - a reader accessor was called out of protocol order
//! - `InvalidRange` - inverted offsets, or a pattern combined with a byte range
//! - `Decode` - the record decoder rejected a record
//! - `Config` - the channel-provider registry is missing or has no provider for a scheme
//!
//! An empty pattern match or a shard with no records is **not** an error.

use thiserror::Error;

/// Errors produced while resolving, planning, or reading a file source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("file not found: {path}")]
    NotFound { path: String },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("illegal reader state: {0}")]
    IllegalState(String),

    #[error("invalid range: {0}")]
    InvalidRange(String),

    #[error("failed to decode record at offset {offset} in {path}: {source}")]
    Decode {
        path: String,
        offset: u64,
        #[source]
        source: anyhow::Error,
    },

    #[error("invalid glob pattern {pattern}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("configuration error: {0}")]
    Config(String),
}

/// Coarse category of a [`SourceError`], convenient for matching in callers and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Io,
    IllegalState,
    InvalidRange,
    Decode,
    InvalidPattern,
    Config,
}

impl SourceError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Io { .. } => ErrorKind::Io,
            Self::IllegalState(_) => ErrorKind::IllegalState,
            Self::InvalidRange(_) => ErrorKind::InvalidRange,
            Self::Decode { .. } => ErrorKind::Decode,
            Self::InvalidPattern { .. } => ErrorKind::InvalidPattern,
            Self::Config(_) => ErrorKind::Config,
        }
    }

    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub(crate) fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    pub(crate) fn illegal_state(message: impl Into<String>) -> Self {
        Self::IllegalState(message.into())
    }

    pub(crate) fn invalid_range(message: impl Into<String>) -> Self {
        Self::InvalidRange(message.into())
    }
}

pub type Result<T> = std::result::Result<T, SourceError>;
