//! Local filesystem channel provider.
//!
//! Patterns use standard glob syntax:
//! - `*` matches any sequence of characters within a path component
//! - `?` matches any single character
//! - `**` matches zero or more directories
//! - `[abc]` / `[!abc]` match (or exclude) a character set
//!
//! Only regular files are returned, sorted lexicographically so that planning is
//! deterministic for a given directory state.

use crate::error::{Result, SourceError};
use crate::io::channel::{ChannelProvider, LOCAL_SCHEME, SeekableChannel, split_scheme};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};

/// Provider for plain paths and `file://` URIs.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileProvider;

fn local_path(path: &str) -> &str {
    split_scheme(path).1
}

fn open_file(path: &str) -> Result<File> {
    File::open(local_path(path)).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => SourceError::not_found(path),
        _ => SourceError::io(format!("open {path}"), e),
    })
}

impl ChannelProvider for LocalFileProvider {
    fn scheme(&self) -> &str {
        LOCAL_SCHEME
    }

    fn match_pattern(&self, pattern: &str) -> Result<Vec<String>> {
        let raw = local_path(pattern);
        let paths = glob::glob(raw).map_err(|source| SourceError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;

        let mut result = Vec::new();
        for entry in paths {
            let path = entry.map_err(|e| {
                SourceError::io(format!("read glob entry for pattern {pattern}"), e.into())
            })?;
            // Only include actual files, not directories
            if path.is_file() {
                result.push(path.to_string_lossy().into_owned());
            }
        }
        result.sort();
        Ok(result)
    }

    fn size_of(&self, path: &str) -> Result<u64> {
        match std::fs::metadata(local_path(path)) {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(SourceError::not_found(path)),
            Err(e) => Err(SourceError::io(format!("stat {path}"), e)),
        }
    }

    fn open(&self, path: &str) -> Result<Box<dyn Read + Send>> {
        Ok(Box::new(open_file(path)?))
    }

    fn open_seekable(&self, path: &str, start_offset: u64) -> Result<Box<dyn SeekableChannel>> {
        let mut file = open_file(path)?;
        file.seek(SeekFrom::Start(start_offset))
            .map_err(|e| SourceError::io(format!("seek {path} to {start_offset}"), e))?;
        Ok(Box::new(file))
    }
}
