//! Offset range tracking.
//!
//! The tracker decides which records a reader owns. Only split points are checked
//! against the range end; a record that is not a split point belongs to the block
//! opened by the last accepted split point and is always returned. The first record
//! a reader returns must be a split point.

use crate::error::{Result, SourceError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffsetRangeTracker {
    start: u64,
    end: u64,
    last_split_point: Option<u64>,
    done: bool,
}

impl OffsetRangeTracker {
    #[must_use]
    pub fn new(start: u64, end: u64) -> Self {
        Self {
            start,
            end,
            last_split_point: None,
            done: false,
        }
    }

    #[must_use]
    pub fn start(&self) -> u64 {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> u64 {
        self.end
    }

    #[must_use]
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Claim the record at `position`.
    ///
    /// Returns `false` once a split point at or past the end is seen; the range is
    /// then done and every later call also returns `false`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::IllegalState`] if the first record is not a split point
    /// or split points go backwards.
    pub fn try_return_record_at(&mut self, is_split_point: bool, position: u64) -> Result<bool> {
        if self.done {
            return Ok(false);
        }
        if !is_split_point {
            return match self.last_split_point {
                Some(_) => Ok(true),
                None => Err(SourceError::illegal_state(format!(
                    "first record at {position} is not a split point"
                ))),
            };
        }
        if let Some(last) = self.last_split_point
            && position < last
        {
            return Err(SourceError::illegal_state(format!(
                "split point {position} precedes previous split point {last}"
            )));
        }
        if position >= self.end {
            self.done = true;
            return Ok(false);
        }
        self.last_split_point = Some(position);
        Ok(true)
    }
}
