//! Input size estimation for size-proportional planning.

use crate::error::Result;
use crate::resolver::{resolve_file, resolve_pattern};
use crate::source::{Mode, SourceDescriptor, UNBOUNDED_END};

/// Estimated number of bytes a descriptor covers.
///
/// A pattern sums the sizes of its matches. A bounded sub-range is `end - start`
/// without touching storage; an open-ended one is clipped to the file's size.
///
/// # Errors
///
/// Propagates resolution failures, e.g. a missing literal file.
pub fn estimated_size_bytes(descriptor: &SourceDescriptor) -> Result<u64> {
    match descriptor.mode() {
        Mode::WholeFileOrPattern => Ok(resolve_pattern(descriptor.path_or_pattern())?
            .iter()
            .map(|f| f.size_bytes)
            .sum()),
        Mode::SingleFile | Mode::SubrangeOfSingleFile => {
            let start = descriptor.start_offset();
            let end = descriptor.end_offset();
            if end == UNBOUNDED_END {
                let size = resolve_file(descriptor.path_or_pattern())?.size_bytes;
                Ok(size.saturating_sub(start))
            } else {
                Ok(end - start)
            }
        }
    }
}
