//! Testing utilities for file sources.
//!
//! Deterministic datasets, temporary files to read them from, reader drains, and
//! collection assertions. Everything here is plain library code so downstream crates
//! can test their own decoders and formats with the same tools.
//!
//! ```no_run
//! use ironbeam_source::*;
//! use ironbeam_source::testing::*;
//!
//! # fn main() -> anyhow::Result<()> {
//! init_providers();
//! let dir = TempDirPath::new()?;
//! let lines = fixed_width_lines(1000);
//! let path = dir.write_lines("file", &lines)?;
//!
//! let source = FileBasedSource::new(
//!     SourceDescriptor::for_file(path, 1),
//!     RecordFormat::Delimited,
//!     Utf8Decoder,
//! );
//! let read = read_shards(&source.split_into_shards(512)?)?;
//! assert_collections_unordered_equal(&read, &lines);
//! # Ok(())
//! # }
//! ```

pub mod assertions;
pub mod drain;
pub mod fixtures;
pub mod mock_io;

pub use assertions::*;
pub use drain::*;
pub use fixtures::*;
pub use mock_io::*;
