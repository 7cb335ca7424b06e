//! Group cursors over the tagged text stream
//!
//! Two backends share one contract: [`ArrayScanner`] walks a fully
//! buffered line vector, [`StreamScanner`] grows from incrementally fed
//! chunks. The dispatch engine is written once against [`GroupRead`] and
//! is oblivious to which backend it runs over.

mod array;
mod stream;

pub use array::ArrayScanner;
pub use stream::StreamScanner;

use crate::error::Result;
use crate::group::Group;

/// Position-aware cursor over a sequence of groups.
///
/// A group is only surfaced once both its code line and value line are
/// available; the line number advances by exactly 2 per group read.
/// Reading the distinguished `(0, "EOF")` group latches a permanent EOF
/// state: further reads fail distinctly from running out of buffered
/// input, and `rewind` does not unlatch it. Callers must not rewind past
/// the EOF group and expect to resume normal iteration.
pub trait GroupRead {
    /// Read the next group, advancing the cursor.
    fn read_group(&mut self) -> Result<Group>;

    /// Return the group a following `read_group` would return, without
    /// advancing the cursor.
    fn peek_group(&mut self) -> Result<Group>;

    /// Move the cursor back by `n` groups, clamped at the start.
    fn rewind(&mut self, n: usize);

    /// Current line counter (number of source lines consumed so far).
    fn line_number(&self) -> usize;

    /// True once the EOF group has been read.
    fn at_eof(&self) -> bool;
}

/// Split source text into lines, tolerating `\n`, `\r`, `\r\n` and any
/// mixture of the three. A trailing terminator does not produce an empty
/// final line.
pub fn split_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\n' => lines.push(std::mem::take(&mut current)),
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                lines.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
