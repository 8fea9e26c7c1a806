//! Accumulation buffer that splits a byte stream into lines.
//!
//! Serial ports deliver data in arbitrary chunks: a single receive callback
//! may carry half a line, exactly one line, several lines, or several lines
//! followed by the start of the next one. [`LineBuffer`] accumulates chunks
//! and extracts every complete `\n`-terminated line, keeping the trailing
//! partial line until more data arrives.
//!
//! ```text
//! feed("12")       buffer: "12"            lines: []
//! feed("3\n45")    buffer: "45"            lines: ["123\n"]
//! feed("\nx")      buffer: "x"             lines: ["123\n", "45\n"]
//! ```
//!
//! # Usage
//!
//! ```
//! use hearth_serial::LineBuffer;
//!
//! let mut buffer = LineBuffer::new();
//!
//! buffer.feed(b"a\nb\nc").unwrap();
//!
//! let lines: Vec<_> = buffer.drain_lines().collect();
//! assert_eq!(lines.len(), 2);
//! assert_eq!(lines[0].as_bytes(), b"a\n");
//! assert_eq!(lines[1].as_bytes(), b"b\n");
//! assert_eq!(buffer.pending(), b"c");
//! ```

use bytes::{Bytes, BytesMut};
use hearth_core::constants::{DEFAULT_MAX_PENDING, INITIAL_LINE_BUFFER_CAPACITY, LINE_DELIMITER};
use std::collections::VecDeque;

use crate::error::{Result, SerialError};
use crate::line::Line;

/// Recommended initial capacity for the extracted line queue.
const INITIAL_LINE_QUEUE_CAPACITY: usize = 4;

/// Stateful line splitter for a serial byte stream.
///
/// # Invariant
///
/// After every [`feed`](LineBuffer::feed) the pending bytes contain no
/// delimiter: they are exactly the received bytes that have not yet been
/// terminated. All complete lines have been moved to the line queue in
/// arrival order.
///
/// # Overflow
///
/// If the pending bytes exceed the configured limit after extraction, they
/// are discarded and `feed` returns [`SerialError::LineTooLong`]. Lines
/// extracted by the same call are kept. The rest of the oversized line, up to
/// and including its delimiter, is dropped by later feeds and never
/// delivered as a line.
#[derive(Debug)]
pub struct LineBuffer {
    /// Bytes received but not yet terminated by a delimiter.
    buffer: BytesMut,

    /// Prefix of `buffer` already known to contain no delimiter.
    scanned: usize,

    /// Complete lines ready for extraction.
    lines: VecDeque<Line>,

    /// Maximum number of pending bytes before the buffer is reset.
    max_pending: usize,

    /// Dropping the tail of an oversized line until the next delimiter.
    discarding: bool,
}

impl LineBuffer {
    /// Create a line buffer with the default pending limit.
    ///
    /// # Example
    ///
    /// ```
    /// use hearth_serial::LineBuffer;
    ///
    /// let buffer = LineBuffer::new();
    /// assert!(buffer.pending().is_empty());
    /// ```
    pub fn new() -> Self {
        Self::with_max_pending(DEFAULT_MAX_PENDING)
    }

    /// Create a line buffer that discards pending data beyond `max_pending`
    /// bytes.
    pub fn with_max_pending(max_pending: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(INITIAL_LINE_BUFFER_CAPACITY.min(max_pending)),
            scanned: 0,
            lines: VecDeque::with_capacity(INITIAL_LINE_QUEUE_CAPACITY),
            max_pending,
            discarding: false,
        }
    }

    /// Append a chunk and extract every line it completes.
    ///
    /// Returns the number of lines extracted by this call.
    ///
    /// # Errors
    ///
    /// Returns [`SerialError::LineTooLong`] if the remaining partial line is
    /// longer than the pending limit. The partial line is discarded, and so
    /// is everything up to the next delimiter; the line after that starts
    /// fresh.
    ///
    /// # Example
    ///
    /// ```
    /// use hearth_serial::LineBuffer;
    ///
    /// let mut buffer = LineBuffer::new();
    ///
    /// assert_eq!(buffer.feed(b"12").unwrap(), 0);
    /// assert_eq!(buffer.feed(b"3\n").unwrap(), 1);
    /// assert_eq!(buffer.next_line().unwrap().as_bytes(), b"123\n");
    /// ```
    pub fn feed(&mut self, chunk: &[u8]) -> Result<usize> {
        self.buffer.extend_from_slice(chunk);

        if self.discarding && !self.skip_discarded_tail() {
            return Ok(0);
        }

        let mut extracted = 0;
        while self.try_extract_line() {
            extracted += 1;
        }

        if self.buffer.len() > self.max_pending {
            let pending = self.buffer.len();
            self.discard_pending();
            self.discarding = true;
            return Err(SerialError::LineTooLong {
                pending,
                limit: self.max_pending,
            });
        }

        Ok(extracted)
    }

    /// Extract the next complete line, if any.
    pub fn next_line(&mut self) -> Option<Line> {
        self.lines.pop_front()
    }

    /// Number of complete lines waiting for extraction.
    pub fn lines_available(&self) -> usize {
        self.lines.len()
    }

    /// Bytes received since the last delimiter.
    pub fn pending(&self) -> &[u8] {
        &self.buffer
    }

    /// Take the partial line out of the buffer, leaving it empty.
    pub fn take_pending(&mut self) -> Bytes {
        self.scanned = 0;
        self.buffer.split().freeze()
    }

    /// Discard the partial line and any queued lines.
    pub fn clear(&mut self) {
        self.discard_pending();
        self.discarding = false;
        self.lines.clear();
    }

    /// Iterator over the lines currently queued.
    ///
    /// Does not consume more input; call [`feed`](LineBuffer::feed) first.
    pub fn drain_lines(&mut self) -> DrainLines<'_> {
        DrainLines { buffer: self }
    }

    /// Move one delimited line from the front of the buffer to the queue.
    ///
    /// Only the unscanned tail is searched, so a long partial line fed one
    /// byte at a time is not rescanned from the start on every call.
    fn try_extract_line(&mut self) -> bool {
        let tail = &self.buffer[self.scanned..];
        match tail.iter().position(|&b| b == LINE_DELIMITER) {
            Some(offset) => {
                let end = self.scanned + offset + 1;
                let line = self.buffer.split_to(end).freeze();
                self.lines.push_back(Line::new(line));
                self.scanned = 0;
                true
            }
            None => {
                self.scanned = self.buffer.len();
                false
            }
        }
    }

    /// Drop bytes up to and including the first delimiter.
    ///
    /// Returns `false` if there is no delimiter yet; everything buffered is
    /// dropped and discarding continues with the next feed.
    fn skip_discarded_tail(&mut self) -> bool {
        match self.buffer.iter().position(|&b| b == LINE_DELIMITER) {
            Some(offset) => {
                let _ = self.buffer.split_to(offset + 1);
                self.scanned = 0;
                self.discarding = false;
                true
            }
            None => {
                self.discard_pending();
                false
            }
        }
    }

    fn discard_pending(&mut self) {
        self.buffer.clear();
        self.scanned = 0;
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator that drains lines from a [`LineBuffer`].
///
/// Created by [`LineBuffer::drain_lines`].
pub struct DrainLines<'a> {
    buffer: &'a mut LineBuffer,
}

impl Iterator for DrainLines<'_> {
    type Item = Line;

    fn next(&mut self) -> Option<Self::Item> {
        self.buffer.next_line()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.buffer.lines_available();
        (len, Some(len))
    }
}

impl ExactSizeIterator for DrainLines<'_> {
    fn len(&self) -> usize {
        self.buffer.lines_available()
    }
}
