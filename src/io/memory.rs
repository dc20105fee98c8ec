//! In-memory channel provider for tests.
//!
//! Files live in a shared map, so a clone of the provider registered in the global
//! registry still sees files added afterwards. Pattern responses can be canned, which
//! makes it possible to return paths that belong to another provider (for example
//! local temp files behind a `mocked://` pattern).

use crate::error::{Result, SourceError};
use crate::io::channel::{ChannelProvider, SeekableChannel};
use std::collections::HashMap;
use std::io::{Cursor, Read, Seek, SeekFrom};
use std::sync::{Arc, Mutex};

type FileMap = Arc<Mutex<HashMap<String, Arc<[u8]>>>>;
type PatternMap = Arc<Mutex<HashMap<String, Vec<String>>>>;
type FailureMap = Arc<Mutex<HashMap<String, u64>>>;

#[derive(Clone)]
pub struct InMemoryProvider {
    scheme: String,
    files: FileMap,
    patterns: PatternMap,
    failures: FailureMap,
}

impl InMemoryProvider {
    #[must_use]
    pub fn new(scheme: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            files: Arc::new(Mutex::new(HashMap::new())),
            patterns: Arc::new(Mutex::new(HashMap::new())),
            failures: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Store `data` under `path`, replacing earlier contents.
    ///
    /// # Panics
    ///
    /// Panics if the mutex protecting the files is poisoned.
    pub fn put_file(&self, path: impl Into<String>, data: impl Into<Vec<u8>>) {
        let data: Vec<u8> = data.into();
        self.files
            .lock()
            .expect("files mutex poisoned")
            .insert(path.into(), Arc::from(data));
    }

    /// Answer `pattern` with exactly `paths`, bypassing glob matching.
    ///
    /// # Panics
    ///
    /// Panics if the mutex protecting the patterns is poisoned.
    pub fn set_match(&self, pattern: impl Into<String>, paths: Vec<String>) {
        self.patterns
            .lock()
            .expect("patterns mutex poisoned")
            .insert(pattern.into(), paths);
    }

    /// Make every read of `path` fail once the channel reaches byte `offset`.
    ///
    /// # Panics
    ///
    /// Panics if the mutex protecting the failures is poisoned.
    pub fn fail_reads_at(&self, path: impl Into<String>, offset: u64) {
        self.failures
            .lock()
            .expect("failures mutex poisoned")
            .insert(path.into(), offset);
    }

    fn channel(&self, path: &str) -> Result<InMemoryChannel> {
        let data = self
            .files
            .lock()
            .expect("files mutex poisoned")
            .get(path)
            .cloned()
            .ok_or_else(|| SourceError::not_found(path))?;
        let fail_at = self
            .failures
            .lock()
            .expect("failures mutex poisoned")
            .get(path)
            .copied();
        Ok(InMemoryChannel {
            inner: Cursor::new(data),
            fail_at,
        })
    }
}

impl ChannelProvider for InMemoryProvider {
    fn scheme(&self) -> &str {
        &self.scheme
    }

    fn match_pattern(&self, pattern: &str) -> Result<Vec<String>> {
        if let Some(paths) = self
            .patterns
            .lock()
            .expect("patterns mutex poisoned")
            .get(pattern)
        {
            return Ok(paths.clone());
        }
        let matcher = glob::Pattern::new(pattern).map_err(|source| SourceError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        let mut result: Vec<String> = self
            .files
            .lock()
            .expect("files mutex poisoned")
            .keys()
            .filter(|path| matcher.matches(path))
            .cloned()
            .collect();
        result.sort();
        Ok(result)
    }

    fn size_of(&self, path: &str) -> Result<u64> {
        self.files
            .lock()
            .expect("files mutex poisoned")
            .get(path)
            .map(|data| data.len() as u64)
            .ok_or_else(|| SourceError::not_found(path))
    }

    fn open(&self, path: &str) -> Result<Box<dyn Read + Send>> {
        Ok(Box::new(self.channel(path)?))
    }

    fn open_seekable(&self, path: &str, start_offset: u64) -> Result<Box<dyn SeekableChannel>> {
        let mut channel = self.channel(path)?;
        channel
            .seek(SeekFrom::Start(start_offset))
            .map_err(|e| SourceError::io(format!("seek {path} to {start_offset}"), e))?;
        Ok(Box::new(channel))
    }
}

struct InMemoryChannel {
    inner: Cursor<Arc<[u8]>>,
    fail_at: Option<u64>,
}

impl Read for InMemoryChannel {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let Some(fail_at) = self.fail_at else {
            return self.inner.read(buf);
        };
        let pos = self.inner.position();
        if pos >= fail_at {
            return Err(std::io::Error::other("injected read failure"));
        }
        let allowed = usize::try_from(fail_at - pos).unwrap_or(usize::MAX).min(buf.len());
        self.inner.read(&mut buf[..allowed])
    }
}

impl Seek for InMemoryChannel {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        self.inner.seek(pos)
    }
}
