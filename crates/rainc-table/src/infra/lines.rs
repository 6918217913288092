//! Line-by-line reading for tables, wordlists and query streams
//!
//! Lines are read as raw bytes. Tables and query streams decode them lossily,
//! so a stray non-UTF-8 byte does not abort the whole pass; wordlists are
//! hashed from the bytes as read.

use std::borrow::Cow;
use std::io::{self, BufRead};

/// Reusable-buffer line reader
pub struct LineReader<R> {
    reader: R,
    buf: Vec<u8>,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
        }
    }

    /// Read the next line including its terminator
    ///
    /// Returns `Ok(None)` at end of stream.
    pub fn next_line(&mut self) -> io::Result<Option<Cow<'_, str>>> {
        self.buf.clear();
        if self.reader.read_until(b'\n', &mut self.buf)? == 0 {
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&self.buf)))
    }

    /// Read the next line as raw bytes, without its trailing `\n`/`\r`
    ///
    /// Returns `Ok(None)` at end of stream.
    pub fn next_line_bytes(&mut self) -> io::Result<Option<&[u8]>> {
        self.buf.clear();
        if self.reader.read_until(b'\n', &mut self.buf)? == 0 {
            return Ok(None);
        }

        let mut end = self.buf.len();
        while end > 0 && matches!(self.buf[end - 1], b'\n' | b'\r') {
            end -= 1;
        }
        Ok(Some(&self.buf[..end]))
    }
}
