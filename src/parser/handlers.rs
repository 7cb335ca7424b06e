//! Section handlers and the handler registry
//!
//! The dispatch engine holds no entity-specific knowledge; it forwards
//! typed groups and structural transitions to whichever handler is
//! registered for the open section. The built-in handlers assemble the
//! record-based [`Document`] tree; sections nobody registered for go to
//! the opaque fallback instead of being silently dropped.

use super::Marker;
use crate::document::{Block, Document, EntityRecord, TableRecord, TableSection};
use crate::error::Result;
use crate::group::Group;
use crate::xdata::XDataBuilder;
use ahash::AHashMap;

/// Receives a section's groups and structural transitions, in file
/// order, each annotated with the scanner's current line number.
///
/// The engine guarantees `section_start` before any other call and
/// `section_end` after the last one; `marker` is never called with
/// [`Marker::SectionStart`], [`Marker::SectionEnd`], [`Marker::Eof`] or
/// [`Marker::Data`].
pub trait SectionHandler {
    /// The section's opening, with its code-2 name.
    fn section_start(&mut self, doc: &mut Document, name: &str, line: usize) -> Result<()>;

    /// A structural transition inside the section. `name` is the table
    /// name for [`Marker::TableStart`] and the record type for
    /// [`Marker::EntityStart`]; empty otherwise.
    fn marker(&mut self, doc: &mut Document, marker: Marker, name: &str, line: usize)
        -> Result<()>;

    /// A data group belonging to the current context.
    fn group(&mut self, doc: &mut Document, group: Group, line: usize) -> Result<()>;

    /// The section's ENDSEC.
    fn section_end(&mut self, doc: &mut Document, line: usize) -> Result<()>;
}

/// Maps section names to their handlers, with an opaque fallback for
/// everything unregistered.
pub struct HandlerRegistry {
    handlers: AHashMap<String, Box<dyn SectionHandler>>,
    fallback: Box<dyn SectionHandler>,
}

impl HandlerRegistry {
    /// Registry with no built-in handlers; every section goes to the
    /// opaque fallback.
    pub fn empty() -> Self {
        Self {
            handlers: AHashMap::new(),
            fallback: Box::new(OpaqueHandler::default()),
        }
    }

    /// Register a handler for a section name, replacing any previous one.
    pub fn register(&mut self, name: impl Into<String>, handler: Box<dyn SectionHandler>) {
        self.handlers.insert(name.into(), handler);
    }

    /// Replace the fallback handler.
    pub fn set_fallback(&mut self, handler: Box<dyn SectionHandler>) {
        self.fallback = handler;
    }

    pub(crate) fn resolve(&mut self, name: &str) -> &mut dyn SectionHandler {
        match self.handlers.get_mut(name) {
            Some(handler) => handler.as_mut(),
            None => self.fallback.as_mut(),
        }
    }
}

impl Default for HandlerRegistry {
    /// The built-in handler set: HEADER, TABLES, BLOCKS, ENTITIES and
    /// OBJECTS, with the opaque fallback for everything else
    /// (CLASSES, THUMBNAILIMAGE, vendor sections).
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register("HEADER", Box::new(HeaderHandler::default()));
        registry.register("TABLES", Box::new(TablesHandler::default()));
        registry.register("BLOCKS", Box::new(BlocksHandler::default()));
        registry.register("ENTITIES", Box::new(EntityListHandler::entities()));
        registry.register("OBJECTS", Box::new(EntityListHandler::objects()));
        registry
    }
}

/// HEADER: code-9 groups open a `$VARIABLE`; following data groups
/// attach to it.
#[derive(Default)]
pub struct HeaderHandler {
    current: Option<String>,
}

impl SectionHandler for HeaderHandler {
    fn section_start(&mut self, _doc: &mut Document, _name: &str, _line: usize) -> Result<()> {
        self.current = None;
        Ok(())
    }

    fn marker(&mut self, _doc: &mut Document, _marker: Marker, _name: &str, _line: usize)
        -> Result<()> {
        // HEADER has no sub-blocks; tolerate stray markers
        Ok(())
    }

    fn group(&mut self, doc: &mut Document, group: Group, _line: usize) -> Result<()> {
        if group.code == 9 {
            self.current = group.as_str().map(str::to_string);
        } else if let Some(name) = &self.current {
            doc.header.push_group(name, group);
        }
        Ok(())
    }

    fn section_end(&mut self, _doc: &mut Document, _line: usize) -> Result<()> {
        self.current = None;
        Ok(())
    }
}

/// TABLES: TABLE/ENDTAB frame table sections, code-0 rows inside become
/// records.
#[derive(Default)]
pub struct TablesHandler {
    table: Option<TableSection>,
    record: Option<TableRecord>,
}

impl TablesHandler {
    fn flush_record(&mut self) {
        if let (Some(table), Some(record)) = (self.table.as_mut(), self.record.take()) {
            table.records.push(record);
        }
    }

    fn flush_table(&mut self, doc: &mut Document) {
        self.flush_record();
        if let Some(table) = self.table.take() {
            doc.tables.insert(table.name.clone(), table);
        }
    }
}

impl SectionHandler for TablesHandler {
    fn section_start(&mut self, _doc: &mut Document, _name: &str, _line: usize) -> Result<()> {
        Ok(())
    }

    fn marker(&mut self, doc: &mut Document, marker: Marker, name: &str, _line: usize)
        -> Result<()> {
        match marker {
            Marker::TableStart => {
                self.flush_table(doc);
                self.table = Some(TableSection {
                    name: name.to_string(),
                    ..TableSection::default()
                });
            }
            Marker::TableEnd => self.flush_table(doc),
            Marker::EntityStart => {
                self.flush_record();
                self.record = Some(TableRecord {
                    record_type: name.to_string(),
                    groups: Vec::new(),
                });
            }
            _ => {}
        }
        Ok(())
    }

    fn group(&mut self, _doc: &mut Document, group: Group, _line: usize) -> Result<()> {
        if let Some(record) = self.record.as_mut() {
            record.groups.push(group);
        } else if let Some(table) = self.table.as_mut() {
            table.groups.push(group);
        }
        Ok(())
    }

    fn section_end(&mut self, doc: &mut Document, _line: usize) -> Result<()> {
        self.flush_table(doc);
        Ok(())
    }
}

/// BLOCKS: BLOCK/ENDBLK frame a definition; entity records inside become
/// the block's entities. The block's name is group 2 of its own data.
#[derive(Default)]
pub struct BlocksHandler {
    block: Option<Block>,
    entity: Option<EntityBuilder>,
}

impl BlocksHandler {
    fn flush_entity(&mut self) {
        if let (Some(block), Some(entity)) = (self.block.as_mut(), self.entity.take()) {
            block.entities.push(entity.finish());
        }
    }

    fn flush_block(&mut self, doc: &mut Document) {
        self.flush_entity();
        if let Some(block) = self.block.take() {
            doc.blocks.push(block);
        }
    }
}

impl SectionHandler for BlocksHandler {
    fn section_start(&mut self, _doc: &mut Document, _name: &str, _line: usize) -> Result<()> {
        Ok(())
    }

    fn marker(&mut self, doc: &mut Document, marker: Marker, name: &str, _line: usize)
        -> Result<()> {
        match marker {
            Marker::BlockStart => {
                self.flush_block(doc);
                self.block = Some(Block::default());
            }
            Marker::BlockEnd => self.flush_block(doc),
            Marker::EntityStart => {
                self.flush_entity();
                if self.block.is_some() {
                    self.entity = Some(EntityBuilder::new(name));
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn group(&mut self, _doc: &mut Document, group: Group, _line: usize) -> Result<()> {
        if let Some(entity) = self.entity.as_mut() {
            entity.push(group);
        } else if let Some(block) = self.block.as_mut() {
            if group.code == 2 && block.name.is_empty() {
                if let Some(name) = group.as_str() {
                    block.name = name.to_string();
                }
            }
            block.groups.push(group);
        }
        Ok(())
    }

    fn section_end(&mut self, doc: &mut Document, _line: usize) -> Result<()> {
        self.flush_block(doc);
        Ok(())
    }
}

/// ENTITIES and OBJECTS: a flat list of typed records with XDATA split
/// off at code 1000.
pub struct EntityListHandler {
    into_objects: bool,
    entity: Option<EntityBuilder>,
}

impl EntityListHandler {
    /// Handler storing into [`Document::entities`].
    pub fn entities() -> Self {
        Self {
            into_objects: false,
            entity: None,
        }
    }

    /// Handler storing into [`Document::objects`].
    pub fn objects() -> Self {
        Self {
            into_objects: true,
            entity: None,
        }
    }

    fn flush(&mut self, doc: &mut Document) {
        if let Some(entity) = self.entity.take() {
            let record = entity.finish();
            if self.into_objects {
                doc.objects.push(record);
            } else {
                doc.entities.push(record);
            }
        }
    }
}

impl SectionHandler for EntityListHandler {
    fn section_start(&mut self, _doc: &mut Document, _name: &str, _line: usize) -> Result<()> {
        Ok(())
    }

    fn marker(&mut self, doc: &mut Document, marker: Marker, name: &str, _line: usize)
        -> Result<()> {
        if marker == Marker::EntityStart {
            self.flush(doc);
            self.entity = Some(EntityBuilder::new(name));
        }
        Ok(())
    }

    fn group(&mut self, _doc: &mut Document, group: Group, _line: usize) -> Result<()> {
        if let Some(entity) = self.entity.as_mut() {
            entity.push(group);
        }
        Ok(())
    }

    fn section_end(&mut self, doc: &mut Document, _line: usize) -> Result<()> {
        self.flush(doc);
        Ok(())
    }
}

/// Fallback: records a section's raw groups keyed by its name.
#[derive(Default)]
pub struct OpaqueHandler {
    section: String,
}

impl SectionHandler for OpaqueHandler {
    fn section_start(&mut self, _doc: &mut Document, name: &str, _line: usize) -> Result<()> {
        self.section = name.to_string();
        Ok(())
    }

    fn marker(&mut self, doc: &mut Document, marker: Marker, name: &str, line: usize)
        -> Result<()> {
        // structural rows stay verbatim in the opaque stream
        let word = match marker {
            Marker::TableStart => "TABLE",
            Marker::TableEnd => "ENDTAB",
            Marker::BlockStart => "BLOCK",
            Marker::BlockEnd => "ENDBLK",
            Marker::EntityStart => name,
            _ => return Ok(()),
        };
        if word.is_empty() {
            return Ok(());
        }
        self.group(doc, Group::from_raw(0, word)?, line)?;
        if marker == Marker::TableStart {
            self.group(doc, Group::from_raw(2, name)?, line)?;
        }
        Ok(())
    }

    fn group(&mut self, doc: &mut Document, group: Group, _line: usize) -> Result<()> {
        doc.unrecognized
            .entry(self.section.clone())
            .or_default()
            .push(group);
        Ok(())
    }

    fn section_end(&mut self, doc: &mut Document, _line: usize) -> Result<()> {
        // an empty unknown section still shows up in the tree
        doc.unrecognized.entry(self.section.clone()).or_default();
        Ok(())
    }
}

/// Splits an entity's groups into plain data and XDATA.
struct EntityBuilder {
    record: EntityRecord,
    xdata: XDataBuilder,
}

impl EntityBuilder {
    fn new(entity_type: &str) -> Self {
        Self {
            record: EntityRecord::new(entity_type),
            xdata: XDataBuilder::new(),
        }
    }

    fn push(&mut self, group: Group) {
        if group.code >= 1000 {
            self.xdata.push(&group);
        } else {
            self.record.groups.push(group);
        }
    }

    fn finish(self) -> EntityRecord {
        let mut record = self.record;
        record.xdata = self.xdata.finish();
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::Group;

    fn g(code: i32, raw: &str) -> Group {
        Group::from_raw(code, raw).unwrap()
    }

    #[test]
    fn test_header_handler_pairs_variables() {
        let mut doc = Document::new();
        let mut h = HeaderHandler::default();
        h.section_start(&mut doc, "HEADER", 0).unwrap();
        h.group(&mut doc, g(9, "$ACADVER"), 2).unwrap();
        h.group(&mut doc, g(1, "AC1015"), 4).unwrap();
        h.group(&mut doc, g(9, "$EXTMIN"), 6).unwrap();
        h.group(&mut doc, g(10, "0.0"), 8).unwrap();
        h.group(&mut doc, g(20, "0.0"), 10).unwrap();
        h.section_end(&mut doc, 12).unwrap();

        assert_eq!(doc.header.str_var("$ACADVER"), Some("AC1015"));
        assert_eq!(doc.header.get("$EXTMIN").map(<[Group]>::len), Some(2));
    }

    #[test]
    fn test_tables_handler_builds_records() {
        let mut doc = Document::new();
        let mut h = TablesHandler::default();
        h.section_start(&mut doc, "TABLES", 0).unwrap();
        h.marker(&mut doc, Marker::TableStart, "LAYER", 2).unwrap();
        h.group(&mut doc, g(70, "2"), 4).unwrap();
        h.marker(&mut doc, Marker::EntityStart, "LAYER", 6).unwrap();
        h.group(&mut doc, g(2, "Walls"), 8).unwrap();
        h.marker(&mut doc, Marker::EntityStart, "LAYER", 10).unwrap();
        h.group(&mut doc, g(2, "Doors"), 12).unwrap();
        h.marker(&mut doc, Marker::TableEnd, "", 14).unwrap();
        h.section_end(&mut doc, 16).unwrap();

        let layers = doc.table("LAYER").unwrap();
        assert_eq!(layers.records.len(), 2);
        assert_eq!(layers.records[0].name(), Some("Walls"));
        assert_eq!(layers.records[1].name(), Some("Doors"));
        assert_eq!(layers.groups, vec![g(70, "2")]);
    }

    #[test]
    fn test_blocks_handler_names_and_entities() {
        let mut doc = Document::new();
        let mut h = BlocksHandler::default();
        h.section_start(&mut doc, "BLOCKS", 0).unwrap();
        h.marker(&mut doc, Marker::BlockStart, "", 2).unwrap();
        h.group(&mut doc, g(2, "DOOR"), 4).unwrap();
        h.group(&mut doc, g(10, "0.0"), 6).unwrap();
        h.marker(&mut doc, Marker::EntityStart, "LINE", 8).unwrap();
        h.group(&mut doc, g(10, "1.0"), 10).unwrap();
        h.marker(&mut doc, Marker::BlockEnd, "", 12).unwrap();
        h.section_end(&mut doc, 14).unwrap();

        assert_eq!(doc.blocks.len(), 1);
        let block = &doc.blocks[0];
        assert_eq!(block.name, "DOOR");
        assert_eq!(block.entities.len(), 1);
        assert_eq!(block.entities[0].entity_type, "LINE");
    }

    #[test]
    fn test_entities_handler_splits_xdata() {
        let mut doc = Document::new();
        let mut h = EntityListHandler::entities();
        h.section_start(&mut doc, "ENTITIES", 0).unwrap();
        h.marker(&mut doc, Marker::EntityStart, "LINE", 2).unwrap();
        h.group(&mut doc, g(8, "0"), 4).unwrap();
        h.group(&mut doc, g(1001, "ACAD"), 6).unwrap();
        h.group(&mut doc, g(1000, "note"), 8).unwrap();
        h.section_end(&mut doc, 10).unwrap();

        assert_eq!(doc.entities.len(), 1);
        let line = &doc.entities[0];
        assert_eq!(line.layer(), Some("0"));
        assert!(line.groups.iter().all(|grp| grp.code < 1000));
        assert!(line.xdata.get_record("ACAD").is_some());
    }

    #[test]
    fn test_opaque_handler_keeps_groups() {
        let mut doc = Document::new();
        let mut h = OpaqueHandler::default();
        h.section_start(&mut doc, "THUMBNAILIMAGE", 0).unwrap();
        h.group(&mut doc, g(90, "16"), 2).unwrap();
        h.section_end(&mut doc, 4).unwrap();

        assert_eq!(doc.unrecognized["THUMBNAILIMAGE"], vec![g(90, "16")]);
    }

    #[test]
    fn test_opaque_handler_keeps_marker_rows_verbatim() {
        let mut doc = Document::new();
        let mut h = OpaqueHandler::default();
        h.section_start(&mut doc, "ACME_DATA", 0).unwrap();
        h.marker(&mut doc, Marker::TableStart, "LAYER", 2).unwrap();
        h.group(&mut doc, g(70, "2"), 6).unwrap();
        h.marker(&mut doc, Marker::TableEnd, "", 8).unwrap();
        h.marker(&mut doc, Marker::BlockStart, "", 10).unwrap();
        h.marker(&mut doc, Marker::BlockEnd, "", 12).unwrap();
        h.marker(&mut doc, Marker::EntityStart, "WIDGET", 14).unwrap();
        h.section_end(&mut doc, 16).unwrap();

        assert_eq!(
            doc.unrecognized["ACME_DATA"],
            vec![
                g(0, "TABLE"),
                g(2, "LAYER"),
                g(70, "2"),
                g(0, "ENDTAB"),
                g(0, "BLOCK"),
                g(0, "ENDBLK"),
                g(0, "WIDGET"),
            ]
        );
    }
}
