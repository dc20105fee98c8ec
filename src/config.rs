//! Read options shared by sources, planners, and readers.

use crate::error::{Result, SourceError};
use serde::{Deserialize, Serialize};

/// Default read-ahead buffer used while scanning for record delimiters.
pub const DEFAULT_BUFFER_SIZE: usize = 1024;

/// Default desired shard size used by [`crate::runner`] when none is given (64 MiB).
pub const DEFAULT_DESIRED_SHARD_SIZE_BYTES: u64 = 64 * 1024 * 1024;

/// Default minimum shard size (1 MiB).
pub const DEFAULT_MIN_SHARD_SIZE_BYTES: u64 = 1024 * 1024;

/// Options controlling how records are scanned and how work is sharded.
///
/// Missing fields fall back to their defaults when deserialized, so a partial
/// JSON document such as `{"delimiter": 0}` is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadOptions {
    /// Byte terminating each record. Never part of the record itself.
    pub delimiter: u8,
    /// Size of the bounded read-ahead buffer.
    pub buffer_size: usize,
    pub default_desired_shard_size_bytes: u64,
    pub default_min_shard_size_bytes: u64,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            delimiter: b'\n',
            buffer_size: DEFAULT_BUFFER_SIZE,
            default_desired_shard_size_bytes: DEFAULT_DESIRED_SHARD_SIZE_BYTES,
            default_min_shard_size_bytes: DEFAULT_MIN_SHARD_SIZE_BYTES,
        }
    }
}

impl ReadOptions {
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    #[must_use]
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    #[must_use]
    pub fn with_desired_shard_size(mut self, bytes: u64) -> Self {
        self.default_desired_shard_size_bytes = bytes;
        self
    }

    #[must_use]
    pub fn with_min_shard_size(mut self, bytes: u64) -> Self {
        self.default_min_shard_size_bytes = bytes;
        self
    }

    /// Parse options from a JSON document and validate them.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Config`] if the document is malformed or the options are invalid.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)
            .map_err(|e| SourceError::Config(format!("parse read options: {e}")))?;
        options.validate()?;
        Ok(options)
    }

    /// # Errors
    ///
    /// Returns [`SourceError::Config`] if `buffer_size` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.buffer_size == 0 {
            return Err(SourceError::Config("buffer_size must be positive".into()));
        }
        Ok(())
    }
}
