//! Delimiter scanning over a channel with a bounded read-ahead buffer.

use std::io::{ErrorKind, Read};

pub(crate) struct RecordScanner {
    channel: Box<dyn Read + Send>,
    delimiter: u8,
    buf: Box<[u8]>,
    pos: usize,
    filled: usize,
}

impl RecordScanner {
    pub(crate) fn new(channel: Box<dyn Read + Send>, delimiter: u8, buffer_size: usize) -> Self {
        Self {
            channel,
            delimiter,
            buf: vec![0u8; buffer_size.max(1)].into_boxed_slice(),
            pos: 0,
            filled: 0,
        }
    }

    /// Append the next record (delimiter excluded) to `out`.
    ///
    /// Returns the number of bytes consumed from the channel, delimiter included.
    /// Zero means end of channel with nothing read since the last delimiter.
    pub(crate) fn read_record(&mut self, out: &mut Vec<u8>) -> std::io::Result<u64> {
        let mut consumed = 0u64;
        loop {
            if self.pos == self.filled {
                let n = self.fill()?;
                if n == 0 {
                    return Ok(consumed);
                }
            }
            let available = &self.buf[self.pos..self.filled];
            if let Some(i) = available.iter().position(|&b| b == self.delimiter) {
                out.extend_from_slice(&available[..i]);
                self.pos += i + 1;
                consumed += (i + 1) as u64;
                return Ok(consumed);
            }
            out.extend_from_slice(available);
            consumed += available.len() as u64;
            self.pos = self.filled;
        }
    }

    fn fill(&mut self) -> std::io::Result<usize> {
        loop {
            match self.channel.read(&mut self.buf) {
                Ok(n) => {
                    self.pos = 0;
                    self.filled = n;
                    return Ok(n);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
    }
}
