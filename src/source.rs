//! Source descriptors and file-based sources.
//!
//! A [`SourceDescriptor`] is the immutable, serializable description of one unit of
//! schedulable work: a file or pattern, an optional byte range, and a minimum shard
//! size. A [`FileBasedSource`] pairs a descriptor with a [`RecordFormat`] and a
//! [`RecordDecoder`], and is what callers estimate, split, and read.
//!
//! ```no_run
//! use ironbeam_source::*;
//!
//! init_providers();
//! let source = FileBasedSource::new(
//!     SourceDescriptor::for_pattern("/data/events/part-*", 1024),
//!     RecordFormat::Delimited,
//!     Utf8Decoder,
//! );
//!
//! for shard in source.split_into_shards(64 * 1024 * 1024)? {
//!     let mut reader = shard.create_reader();
//!     let mut available = reader.start()?;
//!     while available {
//!         println!("{} @ {}", reader.current()?, reader.current_offset()?);
//!         available = reader.advance()?;
//!     }
//! }
//! # Ok::<(), SourceError>(())
//! ```

use crate::config::ReadOptions;
use crate::decoder::RecordDecoder;
use crate::error::{Result, SourceError};
use crate::estimate;
use crate::io::compression::is_splittable;
use crate::planner;
use crate::reader::{DelimitedReader, FilePatternReader, HeaderBlockReader, SourceReader};
use crate::resolver::is_glob_pattern;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// End offset meaning "until the end of the file".
pub const UNBOUNDED_END: u64 = u64::MAX;

/// How a descriptor addresses its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    /// A glob pattern; expands to many files before any byte range applies.
    WholeFileOrPattern,
    /// One literal file, read from byte 0 to the end.
    SingleFile,
    /// One literal file restricted to `[start_offset, end_offset)`.
    SubrangeOfSingleFile,
}

/// Immutable description of what a source reads.
///
/// Invariants, checked by every constructor and on deserialization:
/// - a pattern always covers `[0, UNBOUNDED_END)`
/// - `start_offset <= end_offset`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "DescriptorFields")]
pub struct SourceDescriptor {
    is_pattern: bool,
    path_or_pattern: String,
    min_shard_size_bytes: u64,
    start_offset: u64,
    end_offset: u64,
}

#[derive(Deserialize)]
struct DescriptorFields {
    is_pattern: bool,
    path_or_pattern: String,
    min_shard_size_bytes: u64,
    start_offset: u64,
    end_offset: u64,
}

impl TryFrom<DescriptorFields> for SourceDescriptor {
    type Error = SourceError;

    fn try_from(f: DescriptorFields) -> Result<Self> {
        Self::new(
            f.is_pattern,
            f.path_or_pattern,
            f.min_shard_size_bytes,
            f.start_offset,
            f.end_offset,
        )
    }
}

impl SourceDescriptor {
    /// # Errors
    ///
    /// Returns [`SourceError::InvalidRange`] if the offsets are inverted or a pattern
    /// is combined with a byte range.
    pub fn new(
        is_pattern: bool,
        path_or_pattern: impl Into<String>,
        min_shard_size_bytes: u64,
        start_offset: u64,
        end_offset: u64,
    ) -> Result<Self> {
        let path_or_pattern = path_or_pattern.into();
        if is_pattern && (start_offset != 0 || end_offset != UNBOUNDED_END) {
            return Err(SourceError::invalid_range(format!(
                "pattern {path_or_pattern} cannot be restricted to [{start_offset}, {end_offset})"
            )));
        }
        if start_offset > end_offset {
            return Err(SourceError::invalid_range(format!(
                "start offset {start_offset} is past end offset {end_offset} for {path_or_pattern}"
            )));
        }
        Ok(Self {
            is_pattern,
            path_or_pattern,
            min_shard_size_bytes,
            start_offset,
            end_offset,
        })
    }

    #[must_use]
    pub fn for_pattern(pattern: impl Into<String>, min_shard_size_bytes: u64) -> Self {
        Self {
            is_pattern: true,
            path_or_pattern: pattern.into(),
            min_shard_size_bytes,
            start_offset: 0,
            end_offset: UNBOUNDED_END,
        }
    }

    #[must_use]
    pub fn for_file(path: impl Into<String>, min_shard_size_bytes: u64) -> Self {
        Self {
            is_pattern: false,
            path_or_pattern: path.into(),
            min_shard_size_bytes,
            start_offset: 0,
            end_offset: UNBOUNDED_END,
        }
    }

    /// # Errors
    ///
    /// Returns [`SourceError::InvalidRange`] if `start_offset > end_offset`.
    pub fn for_subrange(
        path: impl Into<String>,
        min_shard_size_bytes: u64,
        start_offset: u64,
        end_offset: u64,
    ) -> Result<Self> {
        Self::new(false, path, min_shard_size_bytes, start_offset, end_offset)
    }

    #[must_use]
    pub fn is_pattern(&self) -> bool {
        self.is_pattern
    }

    #[must_use]
    pub fn path_or_pattern(&self) -> &str {
        &self.path_or_pattern
    }

    #[must_use]
    pub fn min_shard_size_bytes(&self) -> u64 {
        self.min_shard_size_bytes
    }

    #[must_use]
    pub fn start_offset(&self) -> u64 {
        self.start_offset
    }

    #[must_use]
    pub fn end_offset(&self) -> u64 {
        self.end_offset
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        if self.is_pattern {
            Mode::WholeFileOrPattern
        } else if self.start_offset == 0 && self.end_offset == UNBOUNDED_END {
            Mode::SingleFile
        } else {
            Mode::SubrangeOfSingleFile
        }
    }

    /// A new descriptor reading `[start, end)` of one concrete file, keeping this
    /// descriptor's minimum shard size.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::InvalidRange`] if `start > end`.
    pub fn narrow_to(&self, file: impl Into<String>, start: u64, end: u64) -> Result<Self> {
        Self::for_subrange(file, self.min_shard_size_bytes, start, end)
    }

    /// Split this range at `position` into `[start, position)` and `[position, end)`.
    ///
    /// The residual half is a fresh descriptor that another worker can read on its
    /// own; boundary adjustment guarantees the two halves never share a record.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::InvalidRange`] for patterns, for compressed files, and
    /// for positions that would leave either half empty.
    pub fn split_at(&self, position: u64) -> Result<(Self, Self)> {
        if self.is_pattern {
            return Err(SourceError::invalid_range(format!(
                "cannot split pattern {} at a byte offset",
                self.path_or_pattern
            )));
        }
        if !is_splittable(&self.path_or_pattern) {
            return Err(SourceError::invalid_range(format!(
                "compressed file {} cannot be split at a byte offset",
                self.path_or_pattern
            )));
        }
        if position <= self.start_offset || position >= self.end_offset {
            return Err(SourceError::invalid_range(format!(
                "split position {position} is outside ({}, {}) of {}",
                self.start_offset, self.end_offset, self.path_or_pattern
            )));
        }
        let primary = self.narrow_to(&self.path_or_pattern, self.start_offset, position)?;
        let residual = self.narrow_to(&self.path_or_pattern, position, self.end_offset)?;
        Ok((primary, residual))
    }
}

impl fmt::Display for SourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mode() {
            Mode::WholeFileOrPattern | Mode::SingleFile => f.write_str(&self.path_or_pattern),
            Mode::SubrangeOfSingleFile if self.end_offset == UNBOUNDED_END => {
                write!(f, "{}@[{}, EOF)", self.path_or_pattern, self.start_offset)
            }
            Mode::SubrangeOfSingleFile => write!(
                f,
                "{}@[{}, {})",
                self.path_or_pattern, self.start_offset, self.end_offset
            ),
        }
    }
}

/// How records are grouped in a file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordFormat {
    /// Every delimited record stands alone and is a split point.
    Delimited,
    /// A `marker` record precedes each block; only the first data record after a
    /// marker is a split point and markers are never emitted.
    HeaderBlocks { marker: Vec<u8> },
}

impl RecordFormat {
    #[must_use]
    pub fn header_blocks(marker: impl Into<Vec<u8>>) -> Self {
        Self::HeaderBlocks {
            marker: marker.into(),
        }
    }
}

/// A readable, splittable source of records of type `D::Output`.
pub struct FileBasedSource<D> {
    descriptor: SourceDescriptor,
    format: RecordFormat,
    decoder: Arc<D>,
    options: ReadOptions,
}

impl<D> Clone for FileBasedSource<D> {
    fn clone(&self) -> Self {
        Self {
            descriptor: self.descriptor.clone(),
            format: self.format.clone(),
            decoder: Arc::clone(&self.decoder),
            options: self.options,
        }
    }
}

impl<D> fmt::Debug for FileBasedSource<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileBasedSource")
            .field("descriptor", &self.descriptor)
            .field("format", &self.format)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<D: RecordDecoder + 'static> FileBasedSource<D> {
    #[must_use]
    pub fn new(descriptor: SourceDescriptor, format: RecordFormat, decoder: D) -> Self {
        Self {
            descriptor,
            format,
            decoder: Arc::new(decoder),
            options: ReadOptions::default(),
        }
    }

    /// Build a source from a bare path or glob pattern, using `options` for the
    /// minimum shard size. Glob metacharacters make the path a pattern.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Config`] if `options` are invalid.
    pub fn from_path(
        path_or_pattern: impl Into<String>,
        format: RecordFormat,
        decoder: D,
        options: ReadOptions,
    ) -> Result<Self> {
        options.validate()?;
        let path_or_pattern = path_or_pattern.into();
        let min = options.default_min_shard_size_bytes;
        let descriptor = if is_glob_pattern(&path_or_pattern) {
            SourceDescriptor::for_pattern(path_or_pattern, min)
        } else {
            SourceDescriptor::for_file(path_or_pattern, min)
        };
        Ok(Self::new(descriptor, format, decoder).with_options(options))
    }

    #[must_use]
    pub fn with_options(mut self, options: ReadOptions) -> Self {
        self.options = options;
        self
    }

    /// Same format, decoder and options over a different descriptor.
    #[must_use]
    pub fn with_descriptor(&self, descriptor: SourceDescriptor) -> Self {
        Self {
            descriptor,
            format: self.format.clone(),
            decoder: Arc::clone(&self.decoder),
            options: self.options,
        }
    }

    #[must_use]
    pub fn descriptor(&self) -> &SourceDescriptor {
        &self.descriptor
    }

    #[must_use]
    pub fn format(&self) -> &RecordFormat {
        &self.format
    }

    #[must_use]
    pub fn options(&self) -> &ReadOptions {
        &self.options
    }

    pub(crate) fn decoder(&self) -> Arc<D> {
        Arc::clone(&self.decoder)
    }

    /// # Errors
    ///
    /// Propagates resolution failures (missing literal file, provider errors).
    pub fn estimated_size_bytes(&self) -> Result<u64> {
        estimate::estimated_size_bytes(&self.descriptor)
    }

    /// Partition this source into independently readable shards.
    ///
    /// # Errors
    ///
    /// Propagates resolution failures; see [`planner::split_into_shards`].
    pub fn split_into_shards(&self, desired_shard_size_bytes: u64) -> Result<Vec<Self>> {
        Ok(planner::split_into_shards(&self.descriptor, desired_shard_size_bytes)?
            .into_iter()
            .map(|descriptor| self.with_descriptor(descriptor))
            .collect())
    }

    /// Hand off everything after the record starting at `record_offset`.
    ///
    /// Returns `(primary, residual)`: the primary keeps every record up to and
    /// including the one at `record_offset`, the residual starts with the next split
    /// point after it.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::InvalidRange`] if there is nothing left to hand off or
    /// the file is compressed.
    pub fn split_after_record(&self, record_offset: u64) -> Result<(Self, Self)> {
        let position = record_offset.checked_add(1).ok_or_else(|| {
            SourceError::invalid_range(format!("record offset {record_offset} overflows"))
        })?;
        let (primary, residual) = self.descriptor.split_at(position)?;
        Ok((self.with_descriptor(primary), self.with_descriptor(residual)))
    }

    /// Create a reader for this source. The channel is not opened until `start()`.
    #[must_use]
    pub fn create_reader(&self) -> Box<dyn SourceReader<D::Output>> {
        if self.descriptor.is_pattern() {
            return Box::new(FilePatternReader::new(self.clone()));
        }
        match &self.format {
            RecordFormat::Delimited => Box::new(DelimitedReader::new(
                &self.descriptor,
                self.decoder(),
                self.options,
            )),
            RecordFormat::HeaderBlocks { marker } => Box::new(HeaderBlockReader::new(
                &self.descriptor,
                marker.clone(),
                self.decoder(),
                self.options,
            )),
        }
    }
}
