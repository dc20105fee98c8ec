use crate::config::ReadOptions;
use crate::decoder::RecordDecoder;
use crate::error::{Result, SourceError};
use crate::reader::cursor::RecordCursor;
use crate::reader::tracker::OffsetRangeTracker;
use crate::reader::{ReaderState, SourceReader, no_current_record};
use crate::source::SourceDescriptor;
use std::sync::Arc;
use tracing::debug;

/// Reader for plain delimited records, e.g. one record per line.
///
/// Every record is a split point, and a record belongs to the range iff its first
/// byte lies in `[start, end)`.
pub struct DelimitedReader<D: RecordDecoder> {
    cursor: RecordCursor,
    tracker: OffsetRangeTracker,
    decoder: Arc<D>,
    state: ReaderState,
    current: Option<D::Output>,
    buf: Vec<u8>,
}

impl<D: RecordDecoder> DelimitedReader<D> {
    #[must_use]
    pub fn new(descriptor: &SourceDescriptor, decoder: Arc<D>, options: ReadOptions) -> Self {
        Self {
            cursor: RecordCursor::new(descriptor, options),
            tracker: OffsetRangeTracker::new(descriptor.start_offset(), descriptor.end_offset()),
            decoder,
            state: ReaderState::Unstarted,
            current: None,
            buf: Vec::new(),
        }
    }

    fn read_next(&mut self) -> Result<bool> {
        if !self.cursor.read_record(&mut self.buf)? {
            self.finish();
            return Ok(false);
        }
        let offset = self.cursor.current_offset();
        if !self.tracker.try_return_record_at(true, offset)? {
            self.finish();
            return Ok(false);
        }
        let value = self
            .decoder
            .decode(&self.buf)
            .map_err(|source| SourceError::Decode {
                path: self.cursor.path().to_string(),
                offset,
                source,
            })?;
        self.current = Some(value);
        Ok(true)
    }

    fn finish(&mut self) {
        debug!(
            path = %self.cursor.path(),
            start = self.tracker.start(),
            end = self.tracker.end(),
            "reader exhausted"
        );
        self.state = ReaderState::Exhausted;
        self.current = None;
        self.cursor.release();
    }

    fn guarded(&mut self, step: fn(&mut Self) -> Result<bool>) -> Result<bool> {
        let result = step(self);
        if result.is_err() {
            self.state = ReaderState::Failed;
            self.current = None;
            self.cursor.release();
        }
        result
    }

    fn check_current(&self) -> Result<()> {
        match (&self.state, &self.current) {
            (ReaderState::Reading, Some(_)) => Ok(()),
            _ => Err(no_current_record(self.state)),
        }
    }
}

impl<D: RecordDecoder> SourceReader<D::Output> for DelimitedReader<D> {
    fn start(&mut self) -> Result<bool> {
        self.state.check_start()?;
        self.state = ReaderState::Reading;
        self.guarded(|r| {
            r.cursor.open()?;
            r.read_next()
        })
    }

    fn advance(&mut self) -> Result<bool> {
        if !self.state.check_advance()? {
            return Ok(false);
        }
        self.guarded(Self::read_next)
    }

    fn current(&self) -> Result<&D::Output> {
        self.current
            .as_ref()
            .filter(|_| self.state == ReaderState::Reading)
            .ok_or_else(|| no_current_record(self.state))
    }

    fn current_offset(&self) -> Result<u64> {
        self.check_current()?;
        Ok(self.cursor.current_offset())
    }

    fn is_at_split_point(&self) -> Result<bool> {
        self.check_current()?;
        Ok(true)
    }

    fn close(&mut self) {
        if self.state != ReaderState::Failed {
            self.state = ReaderState::Exhausted;
        }
        self.current = None;
        self.cursor.release();
    }

    fn has_started(&self) -> bool {
        self.state != ReaderState::Unstarted
    }
}
