//! Section/entity dispatch engine
//!
//! Drives a [`GroupRead`] cursor through the section state machine and
//! routes every group to the handler registered for the open section.
//! The engine recognizes only the structural marker vocabulary; all
//! entity- and table-specific knowledge lives in the handlers.
//!
//! Two driving modes share the engine: whole-buffer parsing over an
//! [`ArrayScanner`] runs to completion synchronously, and
//! [`StreamingParser`] re-enters the engine once per fed chunk,
//! consuming exactly one group per step so it can suspend between any
//! two groups.

mod handlers;

pub use handlers::{
    BlocksHandler, EntityListHandler, HandlerRegistry, HeaderHandler, OpaqueHandler,
    SectionHandler, TablesHandler,
};

use crate::document::Document;
use crate::error::{DxfError, Result};
use crate::group::Group;
use crate::scanner::{ArrayScanner, GroupRead, StreamScanner};
use std::io::Read;

/// Structural marker vocabulary.
///
/// Every code-0 group is classified into one of these; any non-zero code
/// is [`Marker::Data`]. Unknown code-0 values are [`Marker::EntityStart`]
/// records, so unrecognized markers surface as data instead of being
/// silently skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    /// `(0, "SECTION")`
    SectionStart,
    /// `(0, "ENDSEC")`
    SectionEnd,
    /// `(0, "TABLE")`
    TableStart,
    /// `(0, "ENDTAB")`
    TableEnd,
    /// `(0, "BLOCK")`
    BlockStart,
    /// `(0, "ENDBLK")`
    BlockEnd,
    /// Any other code-0 value: an entity/record type name
    EntityStart,
    /// `(0, "EOF")`
    Eof,
    /// Any group with a non-zero code
    Data,
}

impl Marker {
    /// Classify a group against the structural vocabulary.
    pub fn classify(group: &Group) -> Marker {
        if group.code != 0 {
            return Marker::Data;
        }
        match group.as_str() {
            Some("SECTION") => Marker::SectionStart,
            Some("ENDSEC") => Marker::SectionEnd,
            Some("TABLE") => Marker::TableStart,
            Some("ENDTAB") => Marker::TableEnd,
            Some("BLOCK") => Marker::BlockStart,
            Some("ENDBLK") => Marker::BlockEnd,
            Some("EOF") => Marker::Eof,
            _ => Marker::EntityStart,
        }
    }
}

#[derive(Debug)]
enum State {
    /// Between sections; only SECTION and EOF act here
    TopLevel,
    /// SECTION consumed, its code-2 name not yet
    AwaitSectionName,
    /// Inside a named section
    InSection(String),
    /// TABLE consumed inside a section, its code-2 name not yet
    AwaitTableName(String),
}

/// The section state machine. Consumes exactly one group per step.
pub struct DispatchEngine {
    registry: HandlerRegistry,
    doc: Document,
    state: State,
    groups_read: usize,
    done: bool,
}

impl DispatchEngine {
    /// Engine with the default handler set.
    pub fn new() -> Self {
        Self::with_registry(HandlerRegistry::default())
    }

    /// Engine over a custom handler registry.
    pub fn with_registry(registry: HandlerRegistry) -> Self {
        Self {
            registry,
            doc: Document::new(),
            state: State::TopLevel,
            groups_read: 0,
            done: false,
        }
    }

    /// True once the EOF group has been consumed.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Number of groups consumed so far.
    pub fn groups_read(&self) -> usize {
        self.groups_read
    }

    /// Consume one group from the cursor and advance the state machine.
    /// Scanner and value errors propagate unmodified.
    pub fn step(&mut self, cursor: &mut dyn GroupRead) -> Result<()> {
        let line = cursor.line_number();
        let group = cursor.read_group()?;
        self.groups_read += 1;

        // comments carry no structure and may appear anywhere
        if group.code == 999 {
            return Ok(());
        }

        match std::mem::replace(&mut self.state, State::TopLevel) {
            State::TopLevel => match Marker::classify(&group) {
                Marker::SectionStart => self.state = State::AwaitSectionName,
                Marker::Eof => self.done = true,
                Marker::Data => {
                    return Err(DxfError::parse_at(
                        format!("group {} outside any section", group.code),
                        line,
                    ));
                }
                _ => {
                    return Err(DxfError::parse_at(
                        format!(
                            "unexpected {:?} marker outside any section",
                            group.value
                        ),
                        line,
                    ));
                }
            },

            State::AwaitSectionName => {
                if group.code != 2 {
                    return Err(DxfError::parse_at(
                        "expected section name (group 2) after SECTION",
                        line,
                    ));
                }
                let name = group.as_str().unwrap_or_default().to_string();
                self.registry
                    .resolve(&name)
                    .section_start(&mut self.doc, &name, line)?;
                self.state = State::InSection(name);
            }

            State::InSection(section) => {
                let handler = self.registry.resolve(&section);
                match Marker::classify(&group) {
                    Marker::Data => {
                        handler.group(&mut self.doc, group, line)?;
                        self.state = State::InSection(section);
                    }
                    Marker::SectionEnd => {
                        handler.section_end(&mut self.doc, line)?;
                        self.state = State::TopLevel;
                    }
                    Marker::TableStart => {
                        self.state = State::AwaitTableName(section);
                    }
                    marker @ (Marker::TableEnd | Marker::BlockStart | Marker::BlockEnd) => {
                        handler.marker(&mut self.doc, marker, "", line)?;
                        self.state = State::InSection(section);
                    }
                    Marker::EntityStart => {
                        let name = group.as_str().unwrap_or_default();
                        handler.marker(&mut self.doc, Marker::EntityStart, name, line)?;
                        self.state = State::InSection(section);
                    }
                    Marker::SectionStart => {
                        return Err(DxfError::parse_in(
                            "nested SECTION marker",
                            line,
                            section,
                        ));
                    }
                    Marker::Eof => {
                        return Err(DxfError::parse_in(
                            "unexpected EOF marker inside open section",
                            line,
                            section,
                        ));
                    }
                }
            }

            State::AwaitTableName(section) => {
                if group.code != 2 {
                    return Err(DxfError::parse_in(
                        "expected table name (group 2) after TABLE",
                        line,
                        section,
                    ));
                }
                let name = group.as_str().unwrap_or_default().to_string();
                self.registry
                    .resolve(&section)
                    .marker(&mut self.doc, Marker::TableStart, &name, line)?;
                self.state = State::InSection(section);
            }
        }
        Ok(())
    }

    /// Take the assembled document.
    pub fn into_document(self) -> Document {
        self.doc
    }
}

impl Default for DispatchEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a whole in-memory document string with the default handlers.
pub fn parse_str(text: &str) -> Result<Document> {
    parse_str_with(text, HandlerRegistry::default())
}

/// Parse a whole document string over a custom handler registry.
pub fn parse_str_with(text: &str, registry: HandlerRegistry) -> Result<Document> {
    if text.trim().is_empty() {
        return Err(DxfError::parse("empty input"));
    }
    drive(ArrayScanner::from_text(text), registry)
}

/// Parse a pre-split line sequence.
pub fn parse_lines(lines: Vec<String>) -> Result<Document> {
    if lines.iter().all(|l| l.trim().is_empty()) {
        return Err(DxfError::parse("empty input"));
    }
    drive(ArrayScanner::new(lines), HandlerRegistry::default())
}

/// Parse a byte source. Decodes UTF-8, falling back to Windows-1252 for
/// encoding-irregular files; IO failures are wrapped as parse errors
/// with the cause attached.
pub fn parse_reader<R: Read>(mut reader: R) -> Result<Document> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    let text = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(e.as_bytes());
            decoded.into_owned()
        }
    };
    parse_str(text.trim_start_matches('\u{feff}'))
}

fn drive(mut scanner: ArrayScanner, registry: HandlerRegistry) -> Result<Document> {
    let mut engine = DispatchEngine::with_registry(registry);
    while !engine.is_done() {
        engine.step(&mut scanner)?;
    }
    Ok(engine.into_document())
}

/// Incremental parser fed by chunks of source text.
///
/// Chunk boundaries carry no semantic meaning: any partition of a
/// document, including splits inside a line or inside a code/value pair,
/// yields the same tree as [`parse_str`]. Each [`feed`] performs a
/// bounded amount of work (everything currently bufferable) before
/// returning control to the event source; abandoning a parse is just
/// dropping the instance.
///
/// [`feed`]: StreamingParser::feed
pub struct StreamingParser {
    scanner: StreamScanner,
    engine: DispatchEngine,
}

impl StreamingParser {
    /// Streaming parser with the default handlers.
    pub fn new() -> Self {
        Self::with_registry(HandlerRegistry::default())
    }

    /// Streaming parser over a custom handler registry.
    pub fn with_registry(registry: HandlerRegistry) -> Self {
        Self {
            scanner: StreamScanner::new(),
            engine: DispatchEngine::with_registry(registry),
        }
    }

    /// Feed one chunk and parse every group it completes.
    pub fn feed(&mut self, chunk: &str) -> Result<()> {
        self.scanner.feed(chunk);
        self.pump()
    }

    /// Signal end of the source and return the assembled document.
    ///
    /// Fails with a scanner error if the source was truncated before its
    /// EOF group, or a parse error for a source with no content at all.
    pub fn finish(mut self) -> Result<Document> {
        self.scanner.finalize();
        self.pump()?;
        if self.engine.is_done() {
            return Ok(self.engine.into_document());
        }
        if self.engine.groups_read() == 0 && self.scanner.is_blank() {
            return Err(DxfError::parse("empty input"));
        }
        // one more step surfaces the terminal exhaustion error
        self.engine.step(&mut self.scanner)?;
        Err(DxfError::parse("unexpected end of input mid-document"))
    }

    /// Wrap a transport failure, abandoning the in-flight parse.
    pub fn fail(
        self,
        cause: impl std::error::Error + Send + Sync + 'static,
    ) -> DxfError {
        DxfError::parse_with_cause("stream transport failure", cause)
    }

    fn pump(&mut self) -> Result<()> {
        while !self.engine.is_done() && self.scanner.has_next() {
            self.engine.step(&mut self.scanner)?;
        }
        Ok(())
    }
}

impl Default for StreamingParser {
    fn default() -> Self {
        Self::new()
    }
}
