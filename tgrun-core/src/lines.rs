//! Incremental line decoding shared by both supervisors.
//!
//! Encoders rewrite their status line in place by ending it with a bare `\r`,
//! so `\r`, `\n` and `\r\n` all terminate a line here. Bytes are decoded
//! lossily per complete line, which keeps multi-byte characters intact.

/// Accumulates raw output and yields complete lines without terminators.
#[derive(Debug, Default)]
pub struct LineSplitter {
    buf: Vec<u8>,
    // The previous chunk ended in '\r'; a leading '\n' belongs to it.
    pending_cr: bool,
}

impl LineSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds `bytes` and returns every line completed by them, in order.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();
        for &byte in bytes {
            match byte {
                b'\n' if self.pending_cr => {
                    self.pending_cr = false;
                }
                b'\n' => lines.push(self.take_line()),
                b'\r' => {
                    lines.push(self.take_line());
                    self.pending_cr = true;
                }
                _ => {
                    self.pending_cr = false;
                    self.buf.push(byte);
                }
            }
        }
        lines
    }

    /// Returns the unterminated remainder, if any, and resets the splitter.
    pub fn finish(&mut self) -> Option<String> {
        self.pending_cr = false;
        if self.buf.is_empty() {
            None
        } else {
            Some(self.take_line())
        }
    }

    pub fn has_partial(&self) -> bool {
        !self.buf.is_empty()
    }

    fn take_line(&mut self) -> String {
        let line = String::from_utf8_lossy(&self.buf).into_owned();
        self.buf.clear();
        line
    }
}

/// Position just past the first line terminator in `bytes`.
///
/// A `\r\n` pair counts as one terminator only when both bytes are present.
pub(crate) fn next_terminator(bytes: &[u8]) -> Option<usize> {
    let pos = bytes.iter().position(|&b| b == b'\n' || b == b'\r')?;
    if bytes[pos] == b'\r' && bytes.get(pos + 1) == Some(&b'\n') {
        Some(pos + 2)
    } else {
        Some(pos + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_all_terminators() {
        let mut splitter = LineSplitter::new();
        let lines = splitter.push(b"one\ntwo\r\nthree\rfour");
        assert_eq!(lines, vec!["one", "two", "three"]);
        assert!(splitter.has_partial());
        assert_eq!(splitter.finish(), Some("four".to_string()));
        assert_eq!(splitter.finish(), None);
    }

    #[test]
    fn crlf_split_across_chunks_is_one_terminator() {
        let mut splitter = LineSplitter::new();
        assert_eq!(splitter.push(b"frame=1 time=00:00:01.00\r"), vec!["frame=1 time=00:00:01.00"]);
        assert!(splitter.push(b"\n").is_empty());
        assert_eq!(splitter.push(b"done\n"), vec!["done"]);
    }

    #[test]
    fn keeps_empty_lines_and_multibyte_text() {
        let mut splitter = LineSplitter::new();
        let text = "Готово\n\n".as_bytes();
        let (head, tail) = text.split_at(3);
        let mut lines = splitter.push(head);
        lines.extend(splitter.push(tail));
        assert_eq!(lines, vec!["Готово", ""]);
    }

    #[test]
    fn next_terminator_positions() {
        assert_eq!(next_terminator(b"abc"), None);
        assert_eq!(next_terminator(b"ab\ncd"), Some(3));
        assert_eq!(next_terminator(b"ab\r\ncd"), Some(4));
        assert_eq!(next_terminator(b"ab\r"), Some(3));
    }
}
