use crate::decoder::RecordDecoder;
use crate::error::Result;
use crate::reader::{ReaderState, SourceReader, no_current_record};
use crate::resolver::{MatchedFile, resolve_pattern};
use crate::source::{FileBasedSource, SourceDescriptor};
use std::collections::VecDeque;
use tracing::{debug, info};

/// Reads every file a pattern matches, one after another, in match order.
///
/// The pattern is resolved at `start()`. Empty files are skipped. Each file is read
/// whole by the reader its format calls for; offsets reported by this reader are
/// offsets within the file currently being read.
pub struct FilePatternReader<D: RecordDecoder + 'static> {
    source: FileBasedSource<D>,
    pending: VecDeque<MatchedFile>,
    active: Option<Box<dyn SourceReader<D::Output>>>,
    state: ReaderState,
}

impl<D: RecordDecoder + 'static> FilePatternReader<D> {
    #[must_use]
    pub fn new(source: FileBasedSource<D>) -> Self {
        Self {
            source,
            pending: VecDeque::new(),
            active: None,
            state: ReaderState::Unstarted,
        }
    }

    /// Start readers on pending files until one yields a record.
    fn open_next_file(&mut self) -> Result<bool> {
        while let Some(file) = self.pending.pop_front() {
            debug!(path = %file.path, size_bytes = file.size_bytes, "reading matched file");
            let descriptor =
                SourceDescriptor::for_file(&file.path, self.source.descriptor().min_shard_size_bytes());
            let mut reader = self.source.with_descriptor(descriptor).create_reader();
            let available = reader.start()?;
            self.active = Some(reader);
            if available {
                return Ok(true);
            }
        }
        self.active = None;
        self.state = ReaderState::Exhausted;
        Ok(false)
    }

    fn open_and_read(&mut self) -> Result<bool> {
        let files = resolve_pattern(self.source.descriptor().path_or_pattern())?;
        let matched = files.len();
        self.pending = files.into_iter().filter(|f| f.size_bytes > 0).collect();
        info!(
            pattern = %self.source.descriptor().path_or_pattern(),
            matched,
            non_empty = self.pending.len(),
            "starting pattern read"
        );
        self.open_next_file()
    }

    fn read_next(&mut self) -> Result<bool> {
        if let Some(reader) = self.active.as_mut()
            && reader.advance()?
        {
            return Ok(true);
        }
        self.open_next_file()
    }

    fn guarded(&mut self, step: fn(&mut Self) -> Result<bool>) -> Result<bool> {
        let result = step(self);
        if result.is_err() {
            self.state = ReaderState::Failed;
            self.pending.clear();
            if let Some(mut reader) = self.active.take() {
                reader.close();
            }
        }
        result
    }

    fn active_reader(&self) -> Result<&dyn SourceReader<D::Output>> {
        match (&self.state, &self.active) {
            (ReaderState::Reading, Some(reader)) => Ok(reader.as_ref()),
            _ => Err(no_current_record(self.state)),
        }
    }
}

impl<D: RecordDecoder + 'static> SourceReader<D::Output> for FilePatternReader<D> {
    fn start(&mut self) -> Result<bool> {
        self.state.check_start()?;
        self.state = ReaderState::Reading;
        self.guarded(Self::open_and_read)
    }

    fn advance(&mut self) -> Result<bool> {
        if !self.state.check_advance()? {
            return Ok(false);
        }
        self.guarded(Self::read_next)
    }

    fn current(&self) -> Result<&D::Output> {
        self.active_reader()?.current()
    }

    fn current_offset(&self) -> Result<u64> {
        self.active_reader()?.current_offset()
    }

    fn is_at_split_point(&self) -> Result<bool> {
        self.active_reader()?.is_at_split_point()
    }

    fn close(&mut self) {
        if self.state != ReaderState::Failed {
            self.state = ReaderState::Exhausted;
        }
        self.pending.clear();
        if let Some(mut reader) = self.active.take() {
            reader.close();
        }
    }

    fn has_started(&self) -> bool {
        self.state != ReaderState::Unstarted
    }
}
