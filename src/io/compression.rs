//! Pluggable decompression for whole-file reads.
//!
//! A file whose name ends in a registered codec extension cannot be split by byte
//! offset: there is no way to start decoding from the middle of a compressed stream.
//! The planner therefore keeps such a file as one shard, and the reader wraps its
//! channel with the codec's decompressor. Offsets reported for those records are
//! positions in the decompressed stream.
//!
//! ## Built-in Codecs
//!
//! When enabled via feature flags:
//! - **Gzip** (`.gz`) - via `flate2` (feature: `compression-gzip`)
//! - **Zstd** (`.zst`) - via `zstd` (feature: `compression-zstd`)
//! - **Bzip2** (`.bz2`) - via `bzip2` (feature: `compression-bzip2`)
//! - **Xz** (`.xz`) - via `xz2` (feature: `compression-xz`)
//!
//! ## Custom Codecs
//! ```
//! use ironbeam_source::io::compression::{register_codec, CompressionCodec};
//! use std::io::Read;
//! use std::sync::Arc;
//!
//! struct Identity;
//! impl CompressionCodec for Identity {
//!     fn name(&self) -> &str { "identity" }
//!     fn extensions(&self) -> &[&str] { &[".ident"] }
//!     fn wrap_reader(&self, r: Box<dyn Read + Send>) -> std::io::Result<Box<dyn Read + Send>> {
//!         Ok(r)
//!     }
//! }
//!
//! register_codec(Arc::new(Identity));
//! ```

use std::io::Read;
use std::sync::{Arc, RwLock};

static CODEC_REGISTRY: RwLock<Option<Vec<Arc<dyn CompressionCodec>>>> = RwLock::new(None);

#[allow(unused_mut)]
fn builtin_codecs() -> Vec<Arc<dyn CompressionCodec>> {
    let mut codecs: Vec<Arc<dyn CompressionCodec>> = Vec::new();
    #[cfg(feature = "compression-gzip")]
    codecs.push(Arc::new(GzipCodec));
    #[cfg(feature = "compression-zstd")]
    codecs.push(Arc::new(ZstdCodec));
    #[cfg(feature = "compression-bzip2")]
    codecs.push(Arc::new(Bzip2Codec));
    #[cfg(feature = "compression-xz")]
    codecs.push(Arc::new(XzCodec));
    codecs
}

fn registry() -> Vec<Arc<dyn CompressionCodec>> {
    let mut lock = CODEC_REGISTRY
        .write()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    lock.get_or_insert_with(builtin_codecs).clone()
}

/// Register a custom codec alongside the built-in ones.
pub fn register_codec(codec: Arc<dyn CompressionCodec>) {
    let mut lock = CODEC_REGISTRY
        .write()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    lock.get_or_insert_with(builtin_codecs).push(codec);
}

/// Decompression algorithm keyed by file extension.
pub trait CompressionCodec: Send + Sync {
    fn name(&self) -> &str;

    /// Extensions including the leading dot, lowercase (e.g. `&[".gz", ".gzip"]`).
    fn extensions(&self) -> &[&str];

    /// Wrap a raw channel so that reads yield decompressed bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the decompressor cannot be initialized.
    fn wrap_reader(&self, reader: Box<dyn Read + Send>) -> std::io::Result<Box<dyn Read + Send>>;
}

/// Codec whose extension matches `path`, if any. Matching is case-insensitive.
#[must_use]
pub fn codec_for_path(path: &str) -> Option<Arc<dyn CompressionCodec>> {
    let lower = path.to_lowercase();
    registry()
        .into_iter()
        .find(|codec| codec.extensions().iter().any(|ext| lower.ends_with(ext)))
}

/// Whether `path` can be read by byte sub-range.
#[must_use]
pub fn is_splittable(path: &str) -> bool {
    codec_for_path(path).is_none()
}

#[cfg(feature = "compression-gzip")]
struct GzipCodec;

#[cfg(feature = "compression-gzip")]
impl CompressionCodec for GzipCodec {
    fn name(&self) -> &str {
        "gzip"
    }

    fn extensions(&self) -> &[&str] {
        &[".gz", ".gzip"]
    }

    fn wrap_reader(&self, reader: Box<dyn Read + Send>) -> std::io::Result<Box<dyn Read + Send>> {
        Ok(Box::new(flate2::read::MultiGzDecoder::new(reader)))
    }
}

#[cfg(feature = "compression-zstd")]
struct ZstdCodec;

#[cfg(feature = "compression-zstd")]
impl CompressionCodec for ZstdCodec {
    fn name(&self) -> &str {
        "zstd"
    }

    fn extensions(&self) -> &[&str] {
        &[".zst", ".zstd"]
    }

    fn wrap_reader(&self, reader: Box<dyn Read + Send>) -> std::io::Result<Box<dyn Read + Send>> {
        zstd::stream::read::Decoder::new(reader).map(|d| Box::new(d) as Box<dyn Read + Send>)
    }
}

#[cfg(feature = "compression-bzip2")]
struct Bzip2Codec;

#[cfg(feature = "compression-bzip2")]
impl CompressionCodec for Bzip2Codec {
    fn name(&self) -> &str {
        "bzip2"
    }

    fn extensions(&self) -> &[&str] {
        &[".bz2", ".bzip2"]
    }

    fn wrap_reader(&self, reader: Box<dyn Read + Send>) -> std::io::Result<Box<dyn Read + Send>> {
        Ok(Box::new(bzip2::read::MultiBzDecoder::new(reader)))
    }
}

#[cfg(feature = "compression-xz")]
struct XzCodec;

#[cfg(feature = "compression-xz")]
impl CompressionCodec for XzCodec {
    fn name(&self) -> &str {
        "xz"
    }

    fn extensions(&self) -> &[&str] {
        &[".xz"]
    }

    fn wrap_reader(&self, reader: Box<dyn Read + Send>) -> std::io::Result<Box<dyn Read + Send>> {
        Ok(Box::new(xz2::read::XzDecoder::new_multi_decoder(reader)))
    }
}
