//! Shard planning.
//!
//! The planner turns a descriptor into narrower descriptors, each bound to one file
//! and one byte range. Shard boundaries are plain arithmetic byte offsets; they are
//! not aligned to records. Readers fix that up with boundary adjustment, which is
//! what makes it safe to cut anywhere.
//!
//! Per file, with `effective = max(desired, min_shard_size, 1)`:
//!
//! ```text
//! shards = max(1, round(len / effective))
//! shard i = [start + i*len/shards, start + (i+1)*len/shards)
//! ```
//!
//! The ranges are contiguous, non-overlapping, never empty, and cover the file
//! exactly. A file shorter than the minimum shard size therefore stays whole, and an
//! empty file produces no shard at all.

use crate::error::{Result, SourceError};
use crate::io::compression::is_splittable;
use crate::resolver::resolve;
use crate::source::{Mode, SourceDescriptor};
use tracing::debug;

/// Number of shards for `len` bytes.
#[must_use]
pub fn shard_count(len: u64, desired_shard_size_bytes: u64, min_shard_size_bytes: u64) -> u64 {
    let effective = u128::from(desired_shard_size_bytes.max(min_shard_size_bytes).max(1));
    let len = u128::from(len);
    // Round to nearest.
    let rounded = (len + effective / 2) / effective;
    u64::try_from(rounded).unwrap_or(u64::MAX).max(1)
}

/// Contiguous byte ranges covering `[start, end)`.
#[must_use]
pub fn shard_ranges(
    start: u64,
    end: u64,
    desired_shard_size_bytes: u64,
    min_shard_size_bytes: u64,
) -> Vec<(u64, u64)> {
    if end <= start {
        return Vec::new();
    }
    let len = end - start;
    let count = shard_count(len, desired_shard_size_bytes, min_shard_size_bytes);
    // `count <= len`, so every range is non-empty.
    let boundary = |i: u64| -> u64 {
        let offset = u128::from(len) * u128::from(i) / u128::from(count);
        start + u64::try_from(offset).unwrap_or(len)
    };
    (0..count).map(|i| (boundary(i), boundary(i + 1))).collect()
}

/// Partition a descriptor into independently readable shards.
///
/// A pattern is resolved and each match is split on its own; per-file lists are
/// concatenated in match order and each is ascending by offset. A sub-range
/// descriptor is split over its own range, clipped to the file size. Compressed
/// files cannot be cut and come back as one whole-file shard.
///
/// # Errors
///
/// Propagates resolution failures, and returns [`SourceError::InvalidRange`] for a
/// byte sub-range of a compressed file.
pub fn split_into_shards(
    descriptor: &SourceDescriptor,
    desired_shard_size_bytes: u64,
) -> Result<Vec<SourceDescriptor>> {
    let mut shards = Vec::new();
    for file in resolve(descriptor)? {
        // A pattern match is planned as its own whole file; a literal keeps its range.
        let scope = if descriptor.is_pattern() {
            SourceDescriptor::for_file(&file.path, descriptor.min_shard_size_bytes())
        } else {
            descriptor.clone()
        };
        shards.extend(split_file(&scope, file.size_bytes, desired_shard_size_bytes)?);
    }

    debug!(
        source = %descriptor,
        desired_shard_size_bytes,
        shards = shards.len(),
        "planned shards"
    );
    Ok(shards)
}

fn split_file(
    descriptor: &SourceDescriptor,
    file_size: u64,
    desired_shard_size_bytes: u64,
) -> Result<Vec<SourceDescriptor>> {
    let path = descriptor.path_or_pattern();
    let start = descriptor.start_offset().min(file_size);
    let end = descriptor.end_offset().min(file_size);

    if !is_splittable(path) {
        return match descriptor.mode() {
            Mode::SubrangeOfSingleFile => Err(SourceError::invalid_range(format!(
                "compressed file {path} cannot be split by byte range"
            ))),
            _ if file_size == 0 => Ok(Vec::new()),
            _ => Ok(vec![SourceDescriptor::for_file(
                path,
                descriptor.min_shard_size_bytes(),
            )]),
        };
    }

    shard_ranges(
        start,
        end,
        desired_shard_size_bytes,
        descriptor.min_shard_size_bytes(),
    )
    .into_iter()
    .map(|(s, e)| descriptor.narrow_to(path, s, e))
    .collect()
}
