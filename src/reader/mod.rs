//! Record readers.
//!
//! Every reader follows the same cursor protocol:
//!
//! ```text
//! created ──start()──▶ reading ──advance() == false──▶ exhausted
//!                         │
//!                         └── error ──▶ failed
//! ```
//!
//! `start()` opens the channel, performs boundary adjustment and tries the first
//! record; `advance()` tries the next one. Accessors are only valid while a record is
//! current; anywhere else they fail with [`crate::SourceError::IllegalState`]. A
//! reader is not restartable: once exhausted `advance()` keeps returning `false`
//! without touching the channel, and after a failure every call is an error.
//!
//! The channel is released exactly once, on exhaustion, failure, [`SourceReader::close`],
//! or drop, whichever comes first.

mod cursor;
mod delimited;
mod header_block;
mod pattern;
mod scanner;
mod tracker;

pub use delimited::DelimitedReader;
pub use header_block::HeaderBlockReader;
pub use pattern::FilePatternReader;
pub use tracker::OffsetRangeTracker;

use crate::error::{Result, SourceError};

/// Cursor over the records of one source.
pub trait SourceReader<T>: Send {
    /// Open the channel, adjust to the first owned record and try to read it.
    ///
    /// # Errors
    ///
    /// Returns an error if the channel cannot be opened or read, or if called twice.
    fn start(&mut self) -> Result<bool>;

    /// Try to read the next record.
    ///
    /// # Errors
    ///
    /// Returns an error on I/O or decode failure, or if called before `start()`.
    fn advance(&mut self) -> Result<bool>;

    /// # Errors
    ///
    /// Returns [`SourceError::IllegalState`] if no record is current.
    fn current(&self) -> Result<&T>;

    /// Byte offset of the first byte of the current record.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::IllegalState`] if no record is current.
    fn current_offset(&self) -> Result<u64>;

    /// Whether the unread remainder could become a new source starting at the
    /// current record.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::IllegalState`] if no record is current.
    fn is_at_split_point(&self) -> Result<bool>;

    /// Abandon the reader and release its channel.
    fn close(&mut self);

    /// Drain every remaining record, starting the reader if needed.
    ///
    /// # Errors
    ///
    /// Propagates the first read or decode failure.
    fn read_all(&mut self) -> Result<Vec<T>>
    where
        T: Clone,
    {
        let mut out = Vec::new();
        let mut available = if self.has_started() {
            self.advance()?
        } else {
            self.start()?
        };
        while available {
            out.push(self.current()?.clone());
            available = self.advance()?;
        }
        Ok(out)
    }

    /// Whether `start()` has already been called.
    fn has_started(&self) -> bool;
}

/// Lifecycle of a reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderState {
    Unstarted,
    Reading,
    Exhausted,
    Failed,
}

impl ReaderState {
    pub(crate) fn check_start(self) -> Result<()> {
        match self {
            Self::Unstarted => Ok(()),
            _ => Err(SourceError::illegal_state("start() called more than once")),
        }
    }

    /// `Ok(true)` when `advance()` should read, `Ok(false)` when it should report
    /// exhaustion without reading.
    pub(crate) fn check_advance(self) -> Result<bool> {
        match self {
            Self::Reading => Ok(true),
            Self::Exhausted => Ok(false),
            Self::Unstarted => Err(SourceError::illegal_state("advance() called before start()")),
            Self::Failed => Err(SourceError::illegal_state(
                "advance() called after a read failure",
            )),
        }
    }
}

pub(crate) fn no_current_record(state: ReaderState) -> SourceError {
    let why = match state {
        ReaderState::Unstarted => "before start()",
        ReaderState::Reading => "without a current record",
        ReaderState::Exhausted => "after the reader was exhausted",
        ReaderState::Failed => "after a read failure",
    };
    SourceError::illegal_state(format!("record accessor called {why}"))
}
