//! Whole-buffer group cursor

use super::GroupRead;
use crate::error::{DxfError, Result};
use crate::group::Group;

/// Cursor over a fully buffered, pre-split line vector.
///
/// Pointer and line counter advance by 2 for every group read (one line
/// for the code, one for the value).
#[derive(Debug)]
pub struct ArrayScanner {
    lines: Vec<String>,
    pointer: usize,
    line: usize,
    eof: bool,
}

impl ArrayScanner {
    /// Create a scanner over pre-split lines.
    pub fn new(lines: Vec<String>) -> Self {
        Self {
            lines,
            pointer: 0,
            line: 0,
            eof: false,
        }
    }

    /// Create a scanner by splitting source text on any of the three
    /// line-ending conventions.
    pub fn from_text(text: &str) -> Self {
        Self::new(super::split_lines(text))
    }

    /// True while at least one complete group remains unread and the EOF
    /// group has not been consumed.
    pub fn has_next(&self) -> bool {
        !self.eof && self.pointer + 2 <= self.lines.len()
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
}

impl GroupRead for ArrayScanner {
    fn read_group(&mut self) -> Result<Group> {
        if self.eof {
            return Err(DxfError::scanner("cannot call next after EOF", self.pointer));
        }
        if self.pointer + 2 > self.lines.len() {
            return Err(DxfError::scanner("unexpected end of input", self.pointer));
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
        if self.eof {
            return Err(DxfError::scanner("cannot call peek after EOF", self.pointer));
        }
        if self.pointer + 2 > self.lines.len() {
            return Err(DxfError::scanner("unexpected end of input", self.pointer));
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
    use crate::group::GroupValue;

    fn scanner(text: &str) -> ArrayScanner {
        ArrayScanner::from_text(text)
    }

    #[test]
    fn test_read_advances_by_two_lines() {
        let mut s = scanner("0\nSECTION\n2\nHEADER\n");
        assert_eq!(s.line_number(), 0);

        let g = s.read_group().unwrap();
        assert_eq!(g.code, 0);
        assert_eq!(g.as_str(), Some("SECTION"));
        assert_eq!(s.line_number(), 2);

        let g = s.read_group().unwrap();
        assert_eq!(g.code, 2);
        assert_eq!(g.as_str(), Some("HEADER"));
        assert_eq!(s.line_number(), 4);
    }

    #[test]
    fn test_peek_does_not_advance() {
        let mut s = scanner("70\n42\n");
        let peeked = s.peek_group().unwrap();
        assert_eq!(peeked.value, GroupValue::Integer(42));
        assert_eq!(s.line_number(), 0);

        let read = s.read_group().unwrap();
        assert_eq!(read, peeked);
        assert_eq!(s.line_number(), 2);
    }

    #[test]
    fn test_truncated_group_is_scanner_error() {
        let mut s = scanner("0\nSECTION\n2\n");
        s.read_group().unwrap();
        let err = s.read_group().unwrap_err();
        match err {
            DxfError::Scanner { message, pointer, .. } => {
                assert_eq!(message, "unexpected end of input");
                assert_eq!(pointer, 2);
            }
            other => panic!("expected scanner error, got {other:?}"),
        }
    }

    #[test]
    fn test_has_next() {
        let mut s = scanner("0\nSECTION\n2\n");
        assert!(s.has_next());
        s.read_group().unwrap();
        // a lone code line is not a complete group
        assert!(!s.has_next());
    }

    #[test]
    fn test_eof_is_terminal_and_distinct() {
        let mut s = scanner("0\nEOF\n0\nLINE\n");
        let g = s.read_group().unwrap();
        assert!(g.is_eof_marker());
        assert!(s.at_eof());

        // more lines exist in the buffer, but EOF is permanent
        let err = s.read_group().unwrap_err();
        assert!(err.to_string().contains("cannot call next after EOF"));
        let err = s.peek_group().unwrap_err();
        assert!(err.to_string().contains("cannot call peek after EOF"));
    }

    #[test]
    fn test_rewind_restores_position() {
        let mut s = scanner("0\nSECTION\n2\nHEADER\n");
        let before_line = s.line_number();
        let first = s.read_group().unwrap();

        s.rewind(1);
        assert_eq!(s.line_number(), before_line);
        assert_eq!(s.read_group().unwrap(), first);
    }

    #[test]
    fn test_rewind_clamps_at_start() {
        let mut s = scanner("0\nSECTION\n");
        s.read_group().unwrap();
        s.rewind(10);
        assert_eq!(s.line_number(), 0);
        assert_eq!(s.read_group().unwrap().as_str(), Some("SECTION"));
    }

    #[test]
    fn test_invalid_code_line() {
        let mut s = scanner("notacode\nSECTION\n");
        let err = s.read_group().unwrap_err();
        match err {
            DxfError::Scanner { value, .. } => assert_eq!(value.as_deref(), Some("notacode")),
            other => panic!("expected scanner error, got {other:?}"),
        }
    }

    #[test]
    fn test_code_lines_with_leading_whitespace() {
        let mut s = scanner("  0\nSECTION\n 70\n6\n");
        assert_eq!(s.read_group().unwrap().code, 0);
        assert_eq!(s.read_group().unwrap().as_int(), Some(6));
    }
}
