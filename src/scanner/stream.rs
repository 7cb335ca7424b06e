//! Incrementally fed group cursor

use super::GroupRead;
use crate::error::{DxfError, Result};
use crate::group::Group;

/// Cursor over a line buffer that grows as chunks arrive.
///
/// Chunk boundaries carry no meaning: a line, or even a single `\r\n`
/// terminator, may be split across chunks. The trailing partial-line
/// fragment stays buffered until its terminator (or [`finalize`]) shows
/// up, so no partial group ever surfaces.
///
/// [`finalize`]: StreamScanner::finalize
#[derive(Debug, Default)]
pub struct StreamScanner {
    /// Raw trailing fragment not yet terminated by a line ending
    pending: String,
    /// Completed lines seen so far
    lines: Vec<String>,
    pointer: usize,
    line: usize,
    eof: bool,
    finalized: bool,
}

impl StreamScanner {
    /// Create an empty scanner awaiting its first chunk.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk of source text, splitting any newly completed
    /// lines out of the trailing buffer. Returns the number of lines
    /// completed by this chunk, letting the driver decide whether another
    /// parse pass is worthwhile.
    pub fn feed(&mut self, chunk: &str) -> usize {
        self.pending.push_str(chunk);
        let mut completed = 0;
        loop {
            let Some(i) = self.pending.find(['\r', '\n']) else {
                break;
            };
            let skip = if self.pending.as_bytes()[i] == b'\r' {
                if i + 1 == self.pending.len() {
                    // bare CR at the buffer end may be half of a CRLF
                    // split across chunks; defer until more data arrives
                    break;
                }
                if self.pending.as_bytes()[i + 1] == b'\n' {
                    2
                } else {
                    1
                }
            } else {
                1
            };
            let line = self.pending[..i].to_string();
            self.pending.drain(..i + skip);
            self.lines.push(line);
            completed += 1;
        }
        completed
    }

    /// Signal end of the source: flushes a non-empty trailing buffer as a
    /// final line, so files without a trailing newline still parse.
    pub fn finalize(&mut self) {
        self.finalized = true;
        if self.pending.is_empty() {
            return;
        }
        // only a deferred bare CR can remain besides plain text;
        // it terminates the final line
        let line = self.pending.trim_end_matches('\r').to_string();
        self.pending.clear();
        if !line.is_empty() || !self.lines.is_empty() {
            self.lines.push(line);
        }
    }

    /// True while a complete group is buffered and the EOF group has not
    /// been consumed.
    pub fn has_next(&self) -> bool {
        !self.eof && self.pointer + 2 <= self.lines.len()
    }

    /// True when the driver should wait for another chunk before
    /// attempting further parsing: fewer than two unread lines remain.
    pub fn needs_data(&self) -> bool {
        self.pointer + 2 > self.lines.len()
    }

    /// Total number of completed lines buffered so far.
    pub fn buffered_lines(&self) -> usize {
        self.lines.len()
    }

    /// True while no buffered line has any content: the source is still
    /// indistinguishable from empty input.
    pub fn is_blank(&self) -> bool {
        self.lines.iter().all(|l| l.trim().is_empty())
    }

    fn parse_group_at(&self, pointer: usize) -> Result<Group> {
        let code_line = &self.lines[pointer];
        let code = code_line.trim().parse::<i32>().map_err(|_| {
            DxfError::scanner_group(
                "invalid group code",
                pointer,
                None,
                Some(code_line.clone()),
            )
        })?;
        Group::from_raw(code, &self.lines[pointer + 1])
    }

    fn exhausted_error(&self, after_eof_message: &str) -> DxfError {
        if self.eof {
            DxfError::scanner(after_eof_message, self.pointer)
        } else if self.finalized {
            DxfError::scanner("unexpected end of input", self.pointer)
        } else {
            // transient: more chunks may still arrive
            DxfError::scanner("unexpected end of input: need more data", self.pointer)
        }
    }
}

impl GroupRead for StreamScanner {
    fn read_group(&mut self) -> Result<Group> {
        if self.eof || self.pointer + 2 > self.lines.len() {
            return Err(self.exhausted_error("cannot call next after EOF"));
        }
        let group = self.parse_group_at(self.pointer)?;
        self.pointer += 2;
        self.line += 2;
        if group.is_eof_marker() {
            self.eof = true;
        }
        Ok(group)
    }

    fn peek_group(&mut self) -> Result<Group> {
        if self.eof || self.pointer + 2 > self.lines.len() {
            return Err(self.exhausted_error("cannot call peek after EOF"));
        }
        self.parse_group_at(self.pointer)
    }

    fn rewind(&mut self, n: usize) {
        let delta = 2 * n;
        self.pointer = self.pointer.saturating_sub(delta);
        self.line = self.line.saturating_sub(delta);
    }

    fn line_number(&self) -> usize {
        self.line
    }

    fn at_eof(&self) -> bool {
        self.eof
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_counts_completed_lines() {
        let mut s = StreamScanner::new();
        assert_eq!(s.feed("0\nSEC"), 1);
        assert_eq!(s.feed("TION\n"), 1);
        assert_eq!(s.feed("2"), 0);
        assert_eq!(s.feed("\nHEADER\n"), 2);
        assert_eq!(s.buffered_lines(), 4);
    }

    #[test]
    fn test_crlf_split_across_chunks() {
        let mut s = StreamScanner::new();
        assert_eq!(s.feed("0\r"), 0); // bare CR deferred
        assert_eq!(s.feed("\nSECTION\r\n"), 2);
        assert_eq!(s.buffered_lines(), 2);

        let g = s.read_group().unwrap();
        assert_eq!(g.code, 0);
        assert_eq!(g.as_str(), Some("SECTION"));
    }

    #[test]
    fn test_bare_cr_terminates_on_next_chunk() {
        let mut s = StreamScanner::new();
        assert_eq!(s.feed("0\r"), 0);
        assert_eq!(s.feed("EOF\n"), 2);
        assert!(s.read_group().unwrap().is_eof_marker());
    }

    #[test]
    fn test_need_more_data_is_transient() {
        let mut s = StreamScanner::new();
        s.feed("0\n");
        assert!(s.needs_data());
        let err = s.read_group().unwrap_err();
        assert!(err
            .to_string()
            .contains("unexpected end of input: need more data"));

        s.feed("EOF\n");
        assert!(!s.needs_data());
        assert!(s.read_group().unwrap().is_eof_marker());
    }

    #[test]
    fn test_finalize_flushes_unterminated_line() {
        let mut s = StreamScanner::new();
        s.feed("0\nEOF");
        assert!(s.needs_data());
        s.finalize();
        assert!(s.has_next());
        assert!(s.read_group().unwrap().is_eof_marker());
    }

    #[test]
    fn test_finalize_with_trailing_cr() {
        let mut s = StreamScanner::new();
        s.feed("0\nEOF\r");
        s.finalize();
        assert!(s.read_group().unwrap().is_eof_marker());
    }

    #[test]
    fn test_exhausted_after_finalize_is_terminal() {
        let mut s = StreamScanner::new();
        s.feed("0\nSECTION\n2\n");
        s.read_group().unwrap();
        s.finalize();
        let err = s.read_group().unwrap_err();
        assert_eq!(err.to_string(), "scanner error at pointer 2: unexpected end of input");
    }

    #[test]
    fn test_eof_remains_terminal() {
        let mut s = StreamScanner::new();
        s.feed("0\nEOF\n0\nLINE\n");
        s.read_group().unwrap();
        assert!(s.at_eof());
        assert!(!s.has_next());
        let err = s.read_group().unwrap_err();
        assert!(err.to_string().contains("cannot call next after EOF"));
        let err = s.peek_group().unwrap_err();
        assert!(err.to_string().contains("cannot call peek after EOF"));
    }

    #[test]
    fn test_rewind_matches_array_semantics() {
        let mut s = StreamScanner::new();
        s.feed("0\nSECTION\n2\nHEADER\n");
        let first = s.read_group().unwrap();
        assert_eq!(s.line_number(), 2);

        s.rewind(1);
        assert_eq!(s.line_number(), 0);
        assert_eq!(s.read_group().unwrap(), first);

        s.rewind(5);
        assert_eq!(s.line_number(), 0);
    }

    #[test]
    fn test_single_char_chunks() {
        let mut s = StreamScanner::new();
        for c in "0\nSECTION\n2\nENTITIES\n".chars() {
            s.feed(&c.to_string());
        }
        assert_eq!(s.buffered_lines(), 4);
        assert_eq!(s.read_group().unwrap().as_str(), Some("SECTION"));
        assert_eq!(s.read_group().unwrap().as_str(), Some("ENTITIES"));
    }
}
