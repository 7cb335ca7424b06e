//! Error types for dxfscan operations

use crate::group::GroupValueType;
use std::io;
use thiserror::Error;

/// Main error type for dxfscan operations.
///
/// Three kinds of failure, each carrying structured context for
/// programmatic inspection rather than a flat string:
///
/// - [`DxfError::Parse`] — source-level problems (empty input, structural
///   mismatch in the section state machine, wrapped transport causes).
/// - [`DxfError::Scanner`] — cursor-level problems (insufficient buffered
///   input, reading past the EOF group).
/// - [`DxfError::Value`] — a raw value that cannot be coerced to the type
///   its group code demands.
#[derive(Debug, Error)]
pub enum DxfError {
    /// Source-level parse failure
    #[error("parse error: {message}{}", position_suffix(.line, .section))]
    Parse {
        /// Human-readable description
        message: String,
        /// Line number where the problem surfaced, when known
        line: Option<usize>,
        /// Name of the section open at the time, when any
        section: Option<String>,
        /// Wrapped cause (transport/IO failure)
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Cursor-level scan failure
    #[error("scanner error at pointer {pointer}: {message}{}", group_suffix(.code, .value))]
    Scanner {
        /// Human-readable description
        message: String,
        /// The scanner's pointer (index into its line buffer)
        pointer: usize,
        /// Offending group code, if one was read
        code: Option<i32>,
        /// Offending raw value, if one was read
        value: Option<String>,
    },

    /// A raw value could not be coerced to its code's type
    #[error("value error at group code {code}: cannot coerce {raw:?} to {expected}")]
    Value {
        /// The group code that determined the expected type
        code: i32,
        /// The raw literal exactly as it appeared in the source
        raw: String,
        /// The type the code demanded
        expected: GroupValueType,
    },
}

fn position_suffix(line: &Option<usize>, section: &Option<String>) -> String {
    let mut s = String::new();
    if let Some(line) = line {
        s.push_str(&format!(" at line {}", line));
    }
    if let Some(section) = section {
        s.push_str(&format!(" in section {}", section));
    }
    s
}

fn group_suffix(code: &Option<i32>, value: &Option<String>) -> String {
    match (code, value) {
        (Some(code), Some(value)) => format!(" (group {} {:?})", code, value),
        (Some(code), None) => format!(" (group {})", code),
        (None, Some(value)) => format!(" ({:?})", value),
        (None, None) => String::new(),
    }
}

impl DxfError {
    /// Parse error with no positional context.
    pub fn parse(message: impl Into<String>) -> Self {
        DxfError::Parse {
            message: message.into(),
            line: None,
            section: None,
            source: None,
        }
    }

    /// Parse error annotated with a line number.
    pub fn parse_at(message: impl Into<String>, line: usize) -> Self {
        DxfError::Parse {
            message: message.into(),
            line: Some(line),
            section: None,
            source: None,
        }
    }

    /// Parse error annotated with a line number and the open section.
    pub fn parse_in(message: impl Into<String>, line: usize, section: impl Into<String>) -> Self {
        DxfError::Parse {
            message: message.into(),
            line: Some(line),
            section: Some(section.into()),
            source: None,
        }
    }

    /// Parse error wrapping an underlying transport/IO cause.
    pub fn parse_with_cause(
        message: impl Into<String>,
        cause: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        DxfError::Parse {
            message: message.into(),
            line: None,
            section: None,
            source: Some(Box::new(cause)),
        }
    }

    /// Scanner error carrying only the pointer.
    pub fn scanner(message: impl Into<String>, pointer: usize) -> Self {
        DxfError::Scanner {
            message: message.into(),
            pointer,
            code: None,
            value: None,
        }
    }

    /// Scanner error carrying the offending group, when known.
    pub fn scanner_group(
        message: impl Into<String>,
        pointer: usize,
        code: Option<i32>,
        value: Option<String>,
    ) -> Self {
        DxfError::Scanner {
            message: message.into(),
            pointer,
            code,
            value,
        }
    }
}

impl From<io::Error> for DxfError {
    fn from(e: io::Error) -> Self {
        DxfError::parse_with_cause("I/O failure reading source", e)
    }
}

/// Result type alias for dxfscan operations
pub type Result<T> = std::result::Result<T, DxfError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_display() {
        let err = DxfError::parse("empty input");
        assert_eq!(err.to_string(), "parse error: empty input");

        let err = DxfError::parse_in("unexpected EOF marker", 12, "ENTITIES");
        assert_eq!(
            err.to_string(),
            "parse error: unexpected EOF marker at line 12 in section ENTITIES"
        );
    }

    #[test]
    fn test_scanner_display() {
        let err = DxfError::scanner("unexpected end of input", 7);
        assert_eq!(
            err.to_string(),
            "scanner error at pointer 7: unexpected end of input"
        );

        let err = DxfError::scanner_group("invalid group code", 4, None, Some("XYZ".into()));
        assert!(err.to_string().contains("\"XYZ\""));
    }

    #[test]
    fn test_value_display() {
        let err = DxfError::Value {
            code: 290,
            raw: "invalid".into(),
            expected: GroupValueType::Boolean,
        };
        assert_eq!(
            err.to_string(),
            "value error at group code 290: cannot coerce \"invalid\" to boolean"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: DxfError = io_err.into();
        assert!(matches!(err, DxfError::Parse { source: Some(_), .. }));
    }
}
