//! Channel ownership and the base byte-offset adjustment shared by single-file readers.

use crate::config::ReadOptions;
use crate::error::{Result, SourceError};
use crate::io::channel::provider_for;
use crate::io::compression::codec_for_path;
use crate::reader::scanner::RecordScanner;
use crate::source::{Mode, SourceDescriptor};
use std::io::Read;
use tracing::{debug, trace};

/// Raw record cursor over one file.
///
/// `current_offset` is where the last record read began; `next_offset` is the byte
/// right after it (after its delimiter).
pub(crate) struct RecordCursor {
    path: String,
    mode: Mode,
    start_offset: u64,
    options: ReadOptions,
    scanner: Option<RecordScanner>,
    current_offset: u64,
    next_offset: u64,
    scratch: Vec<u8>,
}

impl RecordCursor {
    pub(crate) fn new(descriptor: &SourceDescriptor, options: ReadOptions) -> Self {
        Self {
            path: descriptor.path_or_pattern().to_string(),
            mode: descriptor.mode(),
            start_offset: descriptor.start_offset(),
            options,
            scanner: None,
            current_offset: descriptor.start_offset(),
            next_offset: descriptor.start_offset(),
            scratch: Vec::new(),
        }
    }

    pub(crate) fn path(&self) -> &str {
        &self.path
    }

    pub(crate) fn current_offset(&self) -> u64 {
        self.current_offset
    }

    /// Open the channel and skip any partial leading record.
    ///
    /// For a sub-range starting past byte 0 the channel is positioned one byte before
    /// the start and one record is discarded from there. If that byte is a delimiter
    /// only the delimiter is discarded, so a record beginning exactly at the start is
    /// kept; otherwise the record straddling the boundary, which belongs to the
    /// previous range, is dropped.
    pub(crate) fn open(&mut self) -> Result<()> {
        let provider = provider_for(&self.path)?;
        let codec = codec_for_path(&self.path);

        let channel: Box<dyn Read + Send> = match (self.mode, codec) {
            (Mode::SubrangeOfSingleFile, Some(codec)) => {
                return Err(SourceError::invalid_range(format!(
                    "{} file {} cannot be read by byte sub-range",
                    codec.name(),
                    self.path
                )));
            }
            (Mode::SubrangeOfSingleFile, None) => {
                let position = self.start_offset.saturating_sub(1);
                self.next_offset = position;
                provider.open_seekable(&self.path, position)?.into_read()
            }
            (_, Some(codec)) => {
                self.next_offset = 0;
                codec
                    .wrap_reader(provider.open(&self.path)?)
                    .map_err(|e| SourceError::io(format!("decompress {}", self.path), e))?
            }
            (_, None) => {
                self.next_offset = 0;
                provider.open(&self.path)?
            }
        };
        self.scanner = Some(RecordScanner::new(
            channel,
            self.options.delimiter,
            self.options.buffer_size,
        ));

        if self.mode == Mode::SubrangeOfSingleFile && self.start_offset > 0 {
            let skipped = self.skip_record()?;
            debug!(
                path = %self.path,
                requested_start = self.start_offset,
                adjusted_start = self.next_offset,
                skipped,
                "adjusted reader start to record boundary"
            );
        }
        Ok(())
    }

    /// Read the next record into `out`. `Ok(false)` at end of channel.
    pub(crate) fn read_record(&mut self, out: &mut Vec<u8>) -> Result<bool> {
        out.clear();
        let scanner = self
            .scanner
            .as_mut()
            .ok_or_else(|| SourceError::illegal_state("channel is not open"))?;
        let consumed = scanner.read_record(out).map_err(|e| {
            SourceError::io(format!("read {} at offset {}", self.path, self.next_offset), e)
        })?;
        if consumed == 0 {
            return Ok(false);
        }
        self.current_offset = self.next_offset;
        self.next_offset += consumed;
        Ok(true)
    }

    /// Discard one record, returning how many bytes it occupied.
    fn skip_record(&mut self) -> Result<u64> {
        let before = self.next_offset;
        let mut scratch = std::mem::take(&mut self.scratch);
        let read = self.read_record(&mut scratch);
        scratch.clear();
        self.scratch = scratch;
        read?;
        trace!(path = %self.path, offset = before, "discarded partial record");
        Ok(self.next_offset - before)
    }

    /// Drop the channel. Safe to call repeatedly; only the first call releases.
    pub(crate) fn release(&mut self) {
        if self.scanner.take().is_some() {
            debug!(path = %self.path, offset = self.next_offset, "released channel");
        }
    }
}
