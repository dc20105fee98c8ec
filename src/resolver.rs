//! File-set resolution: literal paths and glob patterns to sized files.
//!
//! Resolution is done fresh on every call. Nothing is cached, so an estimate and a
//! later split observe the filesystem as it is at each call (best effort, no
//! transactional guarantee between the two).

use crate::error::Result;
use crate::io::channel::provider_for;
use crate::source::SourceDescriptor;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A concrete file together with its size at resolution time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchedFile {
    pub path: String,
    pub size_bytes: u64,
}

/// Whether `s` contains glob metacharacters.
#[must_use]
pub fn is_glob_pattern(s: &str) -> bool {
    s.contains(['*', '?', '['])
}

/// Expand `pattern` through the provider of its scheme.
///
/// Each matched path is sized by the provider of *its own* scheme, so a pattern
/// provider may hand back paths living on another backend. Order is the provider's
/// match order. No match yields an empty vector.
///
/// # Errors
///
/// Returns an error if no provider serves the pattern's scheme, the pattern is
/// malformed, or a matched file cannot be sized.
pub fn resolve_pattern(pattern: &str) -> Result<Vec<MatchedFile>> {
    let paths = provider_for(pattern)?.match_pattern(pattern)?;
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let size_bytes = provider_for(&path)?.size_of(&path)?;
        files.push(MatchedFile { path, size_bytes });
    }
    debug!(pattern, matched = files.len(), "resolved file pattern");
    Ok(files)
}

/// Size a single literal path.
///
/// # Errors
///
/// Returns [`crate::SourceError::NotFound`] if the file does not exist.
pub fn resolve_file(path: &str) -> Result<MatchedFile> {
    let size_bytes = provider_for(path)?.size_of(path)?;
    Ok(MatchedFile {
        path: path.to_string(),
        size_bytes,
    })
}

/// Resolve the files a descriptor denotes: the pattern's matches, or its one file.
///
/// # Errors
///
/// See [`resolve_pattern`] and [`resolve_file`].
pub fn resolve(descriptor: &SourceDescriptor) -> Result<Vec<MatchedFile>> {
    if descriptor.is_pattern() {
        resolve_pattern(descriptor.path_or_pattern())
    } else {
        Ok(vec![resolve_file(descriptor.path_or_pattern())?])
    }
}
