use crate::config::ReadOptions;
use crate::decoder::RecordDecoder;
use crate::error::{Result, SourceError};
use crate::reader::cursor::RecordCursor;
use crate::reader::tracker::OffsetRangeTracker;
use crate::reader::{ReaderState, SourceReader, no_current_record};
use crate::source::SourceDescriptor;
use std::sync::Arc;
use tracing::{debug, trace};

/// Reader for files made of blocks, each introduced by a marker record.
///
/// Marker records are consumed and never returned. The first data record after a
/// marker is a split point; the rest of the block rides along with it. A block is
/// owned by the range containing its (last) marker, so the range check for a split
/// point uses the marker's offset rather than the data record's own.
///
/// Data records that precede the first marker reachable from the range start are
/// skipped, including at the beginning of a file.
pub struct HeaderBlockReader<D: RecordDecoder> {
    cursor: RecordCursor,
    tracker: OffsetRangeTracker,
    marker: Vec<u8>,
    decoder: Arc<D>,
    state: ReaderState,
    current: Option<D::Output>,
    current_is_split_point: bool,
    /// Offset of the marker whose block has not yet produced a data record.
    pending_block: Option<u64>,
    buf: Vec<u8>,
}

impl<D: RecordDecoder> HeaderBlockReader<D> {
    #[must_use]
    pub fn new(
        descriptor: &SourceDescriptor,
        marker: Vec<u8>,
        decoder: Arc<D>,
        options: ReadOptions,
    ) -> Self {
        Self {
            cursor: RecordCursor::new(descriptor, options),
            tracker: OffsetRangeTracker::new(descriptor.start_offset(), descriptor.end_offset()),
            marker,
            decoder,
            state: ReaderState::Unstarted,
            current: None,
            current_is_split_point: false,
            pending_block: None,
            buf: Vec::new(),
        }
    }

    fn open_and_read(&mut self) -> Result<bool> {
        self.cursor.open()?;
        let mut skipped = 0usize;
        loop {
            if !self.cursor.read_record(&mut self.buf)? {
                debug!(path = %self.cursor.path(), skipped, "no block marker before end of file");
                self.finish();
                return Ok(false);
            }
            if self.buf == self.marker {
                self.pending_block = Some(self.cursor.current_offset());
                break;
            }
            skipped += 1;
        }
        if skipped > 0 {
            debug!(
                path = %self.cursor.path(),
                skipped,
                marker_offset = ?self.pending_block,
                "skipped records before first block marker"
            );
        }
        self.read_next()
    }

    fn read_next(&mut self) -> Result<bool> {
        loop {
            if !self.cursor.read_record(&mut self.buf)? {
                self.finish();
                return Ok(false);
            }
            let offset = self.cursor.current_offset();
            if self.buf == self.marker {
                trace!(path = %self.cursor.path(), offset, "block marker");
                self.pending_block = Some(offset);
                continue;
            }

            let (is_split_point, position) = match self.pending_block.take() {
                Some(marker_offset) => (true, marker_offset),
                None => (false, offset),
            };
            if !self.tracker.try_return_record_at(is_split_point, position)? {
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
            self.current_is_split_point = is_split_point;
            return Ok(true);
        }
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
        if self.state == ReaderState::Reading && self.current.is_some() {
            Ok(())
        } else {
            Err(no_current_record(self.state))
        }
    }
}

impl<D: RecordDecoder> SourceReader<D::Output> for HeaderBlockReader<D> {
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
        self.check_current()?;
        self.current
            .as_ref()
            .ok_or_else(|| no_current_record(self.state))
    }

    fn current_offset(&self) -> Result<u64> {
        self.check_current()?;
        Ok(self.cursor.current_offset())
    }

    fn is_at_split_point(&self) -> Result<bool> {
        self.check_current()?;
        Ok(self.current_is_split_point)
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
