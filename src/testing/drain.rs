//! Helpers that run readers to completion.

use crate::decoder::RecordDecoder;
use crate::error::Result;
use crate::reader::SourceReader;
use crate::source::FileBasedSource;

/// A record together with the reader's view of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadRecord<T> {
    pub value: T,
    pub offset: u64,
    pub split_point: bool,
}

/// Start `reader` and collect every record with its offset and split-point flag.
///
/// # Errors
///
/// Propagates the reader's first failure.
pub fn drain_with_offsets<T: Clone>(reader: &mut dyn SourceReader<T>) -> Result<Vec<ReadRecord<T>>> {
    let mut out = Vec::new();
    let mut available = reader.start()?;
    while available {
        out.push(ReadRecord {
            value: reader.current()?.clone(),
            offset: reader.current_offset()?,
            split_point: reader.is_at_split_point()?,
        });
        available = reader.advance()?;
    }
    Ok(out)
}

/// Read one source to completion.
///
/// # Errors
///
/// Propagates the reader's first failure.
pub fn read_source<D>(source: &FileBasedSource<D>) -> Result<Vec<D::Output>>
where
    D: RecordDecoder + 'static,
    D::Output: Clone,
{
    source.create_reader().read_all()
}

/// Read each shard in turn and concatenate the results in shard order.
///
/// # Errors
///
/// Propagates the first failing shard's error.
pub fn read_shards<D>(shards: &[FileBasedSource<D>]) -> Result<Vec<D::Output>>
where
    D: RecordDecoder + 'static,
    D::Output: Clone,
{
    let mut out = Vec::new();
    for shard in shards {
        out.extend(read_source(shard)?);
    }
    Ok(out)
}
