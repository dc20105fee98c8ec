//! Deterministic datasets with predictable byte layouts.
//!
//! Every generated line is [`LINE_WIDTH`] bytes, so once written with a trailing
//! newline line `i` starts at byte `i * (LINE_WIDTH + 1)`. Tests can then work out
//! by hand which lines a byte range owns.

/// Characters per generated record, excluding the newline.
pub const LINE_WIDTH: usize = 3;

/// Marker used by [`header_block_lines`] in the crate's own tests.
pub const HEADER_MARKER: &str = "<h>";

/// Distinct lowercase id for `i`, `LINE_WIDTH` characters wide.
///
/// # Panics
///
/// Panics if `i` does not fit in `LINE_WIDTH` base-26 digits.
#[must_use]
pub fn line_id(i: usize) -> String {
    let capacity = 26usize.pow(LINE_WIDTH as u32);
    assert!(i < capacity, "line id {i} exceeds {capacity} distinct ids");
    let mut digits = [b'a'; LINE_WIDTH];
    let mut n = i;
    for d in digits.iter_mut().rev() {
        *d = b'a' + (n % 26) as u8;
        n /= 26;
    }
    digits.iter().map(|&b| char::from(b)).collect()
}

/// `count` distinct fixed-width lines: ids `0..count`.
///
/// # Example
///
/// ```
/// use ironbeam_source::testing::fixed_width_lines;
///
/// assert_eq!(fixed_width_lines(3), vec!["aaa", "aab", "aac"]);
/// ```
#[must_use]
pub fn fixed_width_lines(count: usize) -> Vec<String> {
    fixed_width_lines_from(0, count)
}

/// `count` distinct fixed-width lines starting at id `first`. Non-overlapping id
/// ranges give datasets that can be told apart after reading several files.
#[must_use]
pub fn fixed_width_lines_from(first: usize, count: usize) -> Vec<String> {
    (first..first + count).map(line_id).collect()
}

/// `blocks` blocks of `marker` followed by `per_block` data lines.
///
/// Line `i` of the result is the marker when `i % (per_block + 1) == 0` and
/// `line_id(i)` otherwise, so data lines keep their file line number as identity.
#[must_use]
pub fn header_block_lines(marker: &str, blocks: usize, per_block: usize) -> Vec<String> {
    let stride = per_block + 1;
    (0..blocks * stride)
        .map(|i| {
            if i % stride == 0 {
                marker.to_string()
            } else {
                line_id(i)
            }
        })
        .collect()
}

/// The data lines of `lines` whose file line number falls in `range`, skipping
/// `marker` lines.
#[must_use]
pub fn data_lines_in(lines: &[String], marker: &str, range: std::ops::Range<usize>) -> Vec<String> {
    lines[range]
        .iter()
        .filter(|l| l.as_str() != marker)
        .cloned()
        .collect()
}
