//! Delimited lines of serial data.

use bytes::Bytes;
use hearth_core::constants::{CARRIAGE_RETURN, LINE_DELIMITER};
use std::fmt;

use crate::error::Result;

/// One complete line of received serial data.
///
/// A `Line` always holds the bytes exactly as received, including the
/// trailing `\n`. Use [`content`](Line::content) for the payload without the
/// terminator.
///
/// # Example
///
/// ```
/// use hearth_serial::Line;
///
/// let line = Line::from_static(b"VOL 12\r\n");
/// assert_eq!(line.as_bytes(), b"VOL 12\r\n");
/// assert_eq!(line.content(), b"VOL 12");
/// assert_eq!(line.to_str().unwrap(), "VOL 12\r\n");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Line {
    data: Bytes,
}

impl Line {
    pub(crate) fn new(data: Bytes) -> Self {
        debug_assert_eq!(data.last(), Some(&LINE_DELIMITER));
        Self { data }
    }

    /// Build a line from a static byte string. Intended for tests and
    /// fixtures; the bytes should end with `\n`.
    pub fn from_static(bytes: &'static [u8]) -> Self {
        Self {
            data: Bytes::from_static(bytes),
        }
    }

    /// Raw bytes including the terminator.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Length in bytes, including the terminator.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Line payload without the trailing `\n` or `\r\n`.
    pub fn content(&self) -> &[u8] {
        let mut end = self.data.len();
        if end > 0 && self.data[end - 1] == LINE_DELIMITER {
            end -= 1;
        }
        if end > 0 && self.data[end - 1] == CARRIAGE_RETURN {
            end -= 1;
        }
        &self.data[..end]
    }

    /// Decode the whole line (terminator included) as UTF-8.
    ///
    /// # Errors
    ///
    /// Returns [`SerialError::InvalidUtf8`](crate::SerialError::InvalidUtf8)
    /// if the bytes are not valid UTF-8.
    pub fn to_str(&self) -> Result<&str> {
        Ok(std::str::from_utf8(&self.data)?)
    }
}

impl fmt::Display for Line {
    /// Lossy rendering of [`content`](Line::content) for logs.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(self.content()))
    }
}

impl AsRef<[u8]> for Line {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(b"abc\n", b"abc")]
    #[case(b"abc\r\n", b"abc")]
    #[case(b"\n", b"")]
    #[case(b"\r\n", b"")]
    #[case(b"a\rb\n", b"a\rb")]
    fn test_content_strips_terminator(#[case] raw: &'static [u8], #[case] expected: &[u8]) {
        let line = Line::from_static(raw);
        assert_eq!(line.content(), expected);
        assert_eq!(line.len(), raw.len());
    }

    #[test]
    fn test_to_str_rejects_invalid_utf8() {
        let line = Line::from_static(b"\xFF\xFE\n");
        assert!(line.to_str().is_err());
        assert_eq!(line.to_string(), "\u{FFFD}\u{FFFD}");
    }

    #[test]
    fn test_display_uses_content() {
        let line = Line::from_static(b"PWR ON\r\n");
        assert_eq!(format!("{line}"), "PWR ON");
    }
}
