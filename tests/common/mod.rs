//! Shared setup for integration tests.

#![allow(dead_code)]

use ironbeam_source::testing::LINE_WIDTH;
use ironbeam_source::*;
use tracing_subscriber::EnvFilter;

/// Bytes per written fixture line, newline included.
pub const LINE_BYTES: u64 = LINE_WIDTH as u64 + 1;

/// Register the local provider and, when `RUST_LOG` is set, a test log subscriber.
pub fn setup() {
    init_providers();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn lines_source(descriptor: SourceDescriptor) -> FileBasedSource<Utf8Decoder> {
    FileBasedSource::new(descriptor, RecordFormat::Delimited, Utf8Decoder)
}

pub fn header_source(descriptor: SourceDescriptor, marker: &str) -> FileBasedSource<Utf8Decoder> {
    FileBasedSource::new(descriptor, RecordFormat::header_blocks(marker), Utf8Decoder)
}

pub fn subrange(path: &str, start: u64, end: u64) -> anyhow::Result<SourceDescriptor> {
    Ok(SourceDescriptor::for_subrange(path, 1, start, end)?)
}
