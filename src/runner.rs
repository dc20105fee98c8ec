use crate::decoder::RecordDecoder;
use crate::error::{Result, SourceError};
use crate::source::FileBasedSource;
#[cfg(feature = "parallel-io")]
use rayon::prelude::*;
use tracing::{debug, info};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecMode {
    Sequential,
    /// Read shards on a rayon pool; `threads: None` uses rayon's default size.
    Parallel { threads: Option<usize> },
}

/// Plans a source into shards and drains every shard with its own reader.
///
/// Output is always in shard order, whatever the execution mode, so sequential and
/// parallel runs of the same source return identical vectors.
pub struct ShardRunner {
    pub mode: ExecMode,
    /// Explicit shard size. When unset the estimated input size is spread over
    /// `default_partitions` shards, capped at the source's configured default.
    pub desired_shard_size_bytes: Option<u64>,
    pub default_partitions: usize,
}

impl Default for ShardRunner {
    fn default() -> Self {
        Self {
            mode: ExecMode::Parallel { threads: None },
            desired_shard_size_bytes: None,
            default_partitions: 2 * num_cpus::get().max(2),
        }
    }
}

impl ShardRunner {
    #[must_use]
    pub fn sequential() -> Self {
        Self {
            mode: ExecMode::Sequential,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_desired_shard_size(mut self, bytes: u64) -> Self {
        self.desired_shard_size_bytes = Some(bytes);
        self
    }

    /// Shard size to plan with for `source`.
    ///
    /// # Errors
    ///
    /// Propagates estimation failures.
    pub fn desired_shard_size_for<D: RecordDecoder + 'static>(
        &self,
        source: &FileBasedSource<D>,
    ) -> Result<u64> {
        if let Some(bytes) = self.desired_shard_size_bytes {
            return Ok(bytes);
        }
        let estimate = source.estimated_size_bytes()?;
        let parts = u64::try_from(self.default_partitions.max(1)).unwrap_or(1);
        let cap = source.options().default_desired_shard_size_bytes;
        Ok((estimate / parts).clamp(1, cap.max(1)))
    }

    /// Read every record of `source`.
    ///
    /// # Errors
    ///
    /// Returns the first planning, read, or decode failure; in parallel mode "first"
    /// means first in shard order.
    pub fn read_all<D>(&self, source: &FileBasedSource<D>) -> Result<Vec<D::Output>>
    where
        D: RecordDecoder + 'static,
        D::Output: Clone,
    {
        let desired = self.desired_shard_size_for(source)?;
        let shards = source.split_into_shards(desired)?;
        debug!(
            source = %source.descriptor(),
            desired_shard_size_bytes = desired,
            shards = shards.len(),
            mode = ?self.mode,
            "running shards"
        );

        let per_shard = match self.mode {
            ExecMode::Sequential => shards.iter().map(read_shard).collect::<Result<Vec<_>>>()?,
            ExecMode::Parallel { threads } => read_parallel(&shards, threads)?,
        };

        let out: Vec<D::Output> = per_shard.into_iter().flatten().collect();
        info!(
            source = %source.descriptor(),
            shards = shards.len(),
            records = out.len(),
            "read complete"
        );
        Ok(out)
    }
}

/// Drain one shard to completion.
///
/// # Errors
///
/// Propagates the reader's first failure.
pub fn read_shard<D>(shard: &FileBasedSource<D>) -> Result<Vec<D::Output>>
where
    D: RecordDecoder + 'static,
    D::Output: Clone,
{
    let mut reader = shard.create_reader();
    let records = reader.read_all();
    reader.close();
    records
}

#[cfg(feature = "parallel-io")]
fn read_parallel<D>(
    shards: &[FileBasedSource<D>],
    threads: Option<usize>,
) -> Result<Vec<Vec<D::Output>>>
where
    D: RecordDecoder + 'static,
    D::Output: Clone,
{
    let run = || {
        shards
            .par_iter()
            .map(read_shard)
            .collect::<Vec<_>>()
            .into_iter()
            .collect::<Result<Vec<_>>>()
    };
    match threads {
        Some(t) => rayon::ThreadPoolBuilder::new()
            .num_threads(t)
            .build()
            .map_err(|e| SourceError::Config(format!("cannot build reader pool: {e}")))?
            .install(run),
        None => run(),
    }
}

#[cfg(not(feature = "parallel-io"))]
fn read_parallel<D>(
    shards: &[FileBasedSource<D>],
    threads: Option<usize>,
) -> Result<Vec<Vec<D::Output>>>
where
    D: RecordDecoder + 'static,
    D::Output: Clone,
{
    if threads.is_some_and(|t| t == 0) {
        return Err(SourceError::Config("thread count must be positive".into()));
    }
    shards.iter().map(read_shard).collect()
}
