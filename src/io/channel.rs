//! Pluggable, scheme-keyed channel providers.
//!
//! Every path handled by this crate is routed to a [`ChannelProvider`] chosen by its
//! scheme prefix (`mocked://test` → `mocked`). Paths without a prefix belong to the
//! [`LOCAL_SCHEME`] provider.
//!
//! The registry is process-wide configuration with explicit setup and teardown:
//!
//! ```
//! use ironbeam_source::io::channel::{init_providers, provider_for};
//!
//! init_providers();
//! let local = provider_for("/tmp/data.txt")?;
//! assert_eq!(local.scheme(), "file");
//! # Ok::<(), ironbeam_source::SourceError>(())
//! ```
//!
//! Looking up a provider before [`init_providers`] has run, or for a scheme nobody
//! registered, is a [`SourceError::Config`] error rather than a silent fallback.

use crate::error::{Result, SourceError};
use crate::io::local::LocalFileProvider;
use regex::Regex;
use std::collections::HashMap;
use std::io::{Read, Seek};
use std::sync::{Arc, LazyLock, RwLock};
use tracing::debug;

/// Scheme used for paths without an explicit `scheme://` prefix.
pub const LOCAL_SCHEME: &str = "file";

static SCHEME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z][A-Za-z0-9+.\-]*)://").expect("scheme regex is valid")
});

static PROVIDER_REGISTRY: RwLock<Option<HashMap<String, Arc<dyn ChannelProvider>>>> =
    RwLock::new(None);

/// A readable channel that can also be repositioned.
pub trait SeekableChannel: Read + Seek + Send {
    /// Give up seeking and keep only the read half.
    fn into_read(self: Box<Self>) -> Box<dyn Read + Send>;
}

impl<T: Read + Seek + Send + 'static> SeekableChannel for T {
    fn into_read(self: Box<Self>) -> Box<dyn Read + Send> {
        self
    }
}

/// Storage backend able to list, size, and open files under one scheme.
///
/// # Thread Safety
/// Providers live in a global registry and are shared across planning and reading
/// threads, so implementations must be `Send + Sync`.
pub trait ChannelProvider: Send + Sync {
    /// Scheme this provider answers for (without `://`).
    fn scheme(&self) -> &str;

    /// Expand a pattern into the paths it denotes, in a deterministic order.
    ///
    /// An empty result is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern is malformed or listing fails.
    fn match_pattern(&self, pattern: &str) -> Result<Vec<String>>;

    /// # Errors
    ///
    /// Returns [`SourceError::NotFound`] if `path` does not exist.
    fn size_of(&self, path: &str) -> Result<u64>;

    /// Open `path` for sequential reading from byte 0.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist or cannot be opened.
    fn open(&self, path: &str) -> Result<Box<dyn Read + Send>>;

    /// Open `path` positioned at `start_offset`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist, cannot be opened, or cannot be positioned.
    fn open_seekable(&self, path: &str, start_offset: u64) -> Result<Box<dyn SeekableChannel>>;
}

/// Split a path into its scheme and the remainder.
///
/// ```
/// use ironbeam_source::io::channel::split_scheme;
///
/// assert_eq!(split_scheme("mocked://test"), ("mocked", "test"));
/// assert_eq!(split_scheme("/var/data/a.txt"), ("file", "/var/data/a.txt"));
/// ```
#[must_use]
pub fn split_scheme(path: &str) -> (&str, &str) {
    match SCHEME_RE.captures(path).and_then(|c| c.get(1)) {
        Some(scheme) => (scheme.as_str(), &path[scheme.end() + 3..]),
        None => (LOCAL_SCHEME, path),
    }
}

/// Initialize the registry with the local filesystem provider.
///
/// Calling this more than once is harmless; providers registered earlier are kept.
pub fn init_providers() {
    let mut lock = PROVIDER_REGISTRY
        .write()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    let registry = lock.get_or_insert_with(HashMap::new);
    registry
        .entry(LOCAL_SCHEME.to_string())
        .or_insert_with(|| Arc::new(LocalFileProvider));
}

/// Register a provider for its scheme, replacing any previous one.
///
/// Initializes the registry first if needed.
pub fn register_provider(provider: Arc<dyn ChannelProvider>) {
    init_providers();
    let mut lock = PROVIDER_REGISTRY
        .write()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    let scheme = provider.scheme().to_string();
    debug!(scheme = %scheme, "registering channel provider");
    lock.get_or_insert_with(HashMap::new).insert(scheme, provider);
}

/// Remove the provider for `scheme`, returning it if one was registered.
pub fn unregister_provider(scheme: &str) -> Option<Arc<dyn ChannelProvider>> {
    let mut lock = PROVIDER_REGISTRY
        .write()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    lock.as_mut().and_then(|registry| registry.remove(scheme))
}

/// Tear the registry down. Later lookups fail until [`init_providers`] runs again.
pub fn reset_providers() {
    let mut lock = PROVIDER_REGISTRY
        .write()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    *lock = None;
}

/// Find the provider responsible for `path`.
///
/// # Errors
///
/// Returns [`SourceError::Config`] if the registry was never initialized or no
/// provider is registered for the path's scheme.
pub fn provider_for(path: &str) -> Result<Arc<dyn ChannelProvider>> {
    let (scheme, _) = split_scheme(path);
    let lock = PROVIDER_REGISTRY
        .read()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    let registry = lock.as_ref().ok_or_else(|| {
        SourceError::Config("channel provider registry is not initialized".into())
    })?;
    registry
        .get(scheme)
        .cloned()
        .ok_or_else(|| SourceError::Config(format!("no channel provider for scheme '{scheme}'")))
}
