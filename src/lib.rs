//! # ironbeam-source
//!
//! **Splittable file sources** for batch pipelines. A source describes a file, a
//! glob pattern of files, or a byte range of one file. It can estimate its size,
//! split itself into shards that cover the input without overlap, and read its
//! records through a reader that reports where each record starts.
//!
//! ## Key Features
//!
//! - **Size-proportional planning** - shards of roughly equal byte size, cut anywhere
//! - **Record-exact boundaries** - readers realign to record boundaries so every
//!   record is read by exactly one shard
//! - **Block formats** - header-delimited blocks that are only split between blocks
//! - **Dynamic splitting** - hand off the unread remainder of a range mid-read
//! - **Pluggable storage** - scheme-keyed channel providers (`file://`, in-memory, ...)
//! - **Transparent decompression** - gzip, zstd, bzip2 and xz via feature flags
//! - **Sequential and parallel runners** - drain every shard with rayon
//!
//! ## Quick Start
//!
//! ```no_run
//! use ironbeam_source::*;
//!
//! # fn main() -> anyhow::Result<()> {
//! init_providers();
//!
//! let source = FileBasedSource::new(
//!     SourceDescriptor::for_pattern("/data/logs/*.log", DEFAULT_MIN_SHARD_SIZE_BYTES),
//!     RecordFormat::Delimited,
//!     Utf8Decoder,
//! );
//!
//! println!("about {} bytes", source.estimated_size_bytes()?);
//! let lines = ShardRunner::default().read_all(&source)?;
//! println!("{} lines", lines.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Concepts
//!
//! ### Descriptors and modes
//!
//! A [`SourceDescriptor`] is immutable and serializable. Its [`Mode`] is derived from
//! its fields: a pattern, a whole single file, or a sub-range of a single file.
//!
//! ### Shards
//!
//! [`FileBasedSource::split_into_shards`] resolves the input and cuts every file into
//! byte ranges. Boundaries are arithmetic; they are not aligned to records.
//!
//! ### Readers
//!
//! [`FileBasedSource::create_reader`] returns a [`SourceReader`]. A reader owning
//! `[start, end)` returns exactly the records whose split point lies in the range.
//! For plain delimited files every record is a split point; for
//! [`RecordFormat::HeaderBlocks`] only the first record of each block is.
//!
//! ### Providers
//!
//! Paths are routed to a [`ChannelProvider`] by URI scheme. [`init_providers`]
//! installs the local filesystem provider; [`register_provider`] adds more.

pub mod config;
pub mod decoder;
pub mod error;
pub mod estimate;
pub mod io;
pub mod planner;
pub mod reader;
pub mod resolver;
pub mod runner;
pub mod source;
pub mod testing;

pub use config::{
    DEFAULT_BUFFER_SIZE, DEFAULT_DESIRED_SHARD_SIZE_BYTES, DEFAULT_MIN_SHARD_SIZE_BYTES,
    ReadOptions,
};
pub use decoder::{BytesDecoder, JsonDecoder, RecordDecoder, Utf8Decoder};
pub use error::{ErrorKind, Result, SourceError};
pub use io::{
    ChannelProvider, InMemoryProvider, LocalFileProvider, SeekableChannel, init_providers,
    provider_for, register_provider, unregister_provider,
};
pub use reader::{DelimitedReader, FilePatternReader, HeaderBlockReader, OffsetRangeTracker, SourceReader};
pub use resolver::MatchedFile;
pub use runner::{ExecMode, ShardRunner};
pub use source::{FileBasedSource, Mode, RecordFormat, SourceDescriptor, UNBOUNDED_END};
