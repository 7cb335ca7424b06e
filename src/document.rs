//! Parsed document tree
//!
//! A record-based representation: header variables, table sections,
//! block definitions, and flat entity/object lists, all carrying their
//! raw typed groups so downstream tools can read any code without this
//! crate knowing every entity's schema.

use crate::group::Group;
use crate::xdata::ExtendedData;
use indexmap::IndexMap;

/// Header variables in file order: `$NAME` to its value groups.
#[derive(Debug, Clone, Default)]
pub struct Header {
    variables: IndexMap<String, Vec<Group>>,
}

impl Header {
    /// Insert or extend a variable's value groups.
    pub fn push_group(&mut self, name: &str, group: Group) {
        self.variables
            .entry(name.to_string())
            .or_default()
            .push(group);
    }

    /// All value groups of a variable.
    pub fn get(&self, name: &str) -> Option<&[Group]> {
        self.variables.get(name).map(Vec::as_slice)
    }

    /// First string value of a variable (e.g. `$ACADVER`).
    pub fn str_var(&self, name: &str) -> Option<&str> {
        self.get(name)?.iter().find_map(|g| g.as_str())
    }

    /// First integer value of a variable.
    pub fn int_var(&self, name: &str) -> Option<i64> {
        self.get(name)?.iter().find_map(|g| g.as_int())
    }

    /// First float value of a variable.
    pub fn float_var(&self, name: &str) -> Option<f64> {
        self.get(name)?.iter().find_map(|g| g.as_float())
    }

    /// Number of variables.
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// True when no variables were read.
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Iterate variables in file order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Group])> {
        self.variables
            .iter()
            .map(|(name, groups)| (name.as_str(), groups.as_slice()))
    }
}

/// One row of a table (a LAYER, LTYPE, VPORT... record).
#[derive(Debug, Clone, PartialEq)]
pub struct TableRecord {
    /// Record type as written after code 0 (usually the table's name)
    pub record_type: String,
    /// All data groups of the record
    pub groups: Vec<Group>,
}

impl TableRecord {
    /// Record name (group 2).
    pub fn name(&self) -> Option<&str> {
        self.groups.iter().find(|g| g.code == 2).and_then(Group::as_str)
    }

    /// Record handle (group 5, hex).
    pub fn handle(&self) -> Option<u64> {
        self.groups.iter().find(|g| g.code == 5).and_then(Group::as_handle)
    }
}

/// One TABLE...ENDTAB block inside the TABLES section.
#[derive(Debug, Clone, Default)]
pub struct TableSection {
    /// Table name (LAYER, LTYPE, VPORT...)
    pub name: String,
    /// Groups between the table's name and its first record
    pub groups: Vec<Group>,
    /// Records in file order
    pub records: Vec<TableRecord>,
}

/// A block definition (BLOCK...ENDBLK).
#[derive(Debug, Clone, Default)]
pub struct Block {
    /// Block name (group 2 of the block's own data)
    pub name: String,
    /// The block's header groups (base point, flags, ...)
    pub groups: Vec<Group>,
    /// Entities defined inside the block
    pub entities: Vec<EntityRecord>,
}

/// A geometric entity (or OBJECTS-section object) as a typed record.
#[derive(Debug, Clone, Default)]
pub struct EntityRecord {
    /// Entity type as written after code 0 (LINE, ARC, MTEXT, ...)
    pub entity_type: String,
    /// All data groups below code 1000, in file order
    pub groups: Vec<Group>,
    /// Extended (vendor) data, codes 1000-1071
    pub xdata: ExtendedData,
}

impl EntityRecord {
    /// Create an empty record of the given type.
    pub fn new(entity_type: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            ..Self::default()
        }
    }

    /// Entity handle (group 5, hex).
    pub fn handle(&self) -> Option<u64> {
        self.groups.iter().find(|g| g.code == 5).and_then(Group::as_handle)
    }

    /// Layer name (group 8).
    pub fn layer(&self) -> Option<&str> {
        self.groups.iter().find(|g| g.code == 8).and_then(Group::as_str)
    }

    /// First value of a given group code.
    pub fn first(&self, code: i32) -> Option<&Group> {
        self.groups.iter().find(|g| g.code == code)
    }
}

/// The assembled document tree.
#[derive(Debug, Clone, Default)]
pub struct Document {
    /// HEADER section variables
    pub header: Header,
    /// TABLES section, keyed by table name in file order
    pub tables: IndexMap<String, TableSection>,
    /// BLOCKS section definitions
    pub blocks: Vec<Block>,
    /// ENTITIES section, flat and in file order
    pub entities: Vec<EntityRecord>,
    /// OBJECTS section records
    pub objects: Vec<EntityRecord>,
    /// Raw groups of sections with no registered handler
    pub unrecognized: IndexMap<String, Vec<Group>>,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a table section by name (case-insensitive, as table names
    /// are conventionally upper-case but not guaranteed to be).
    pub fn table(&self, name: &str) -> Option<&TableSection> {
        self.tables.get(name).or_else(|| {
            self.tables
                .values()
                .find(|t| t.name.eq_ignore_ascii_case(name))
        })
    }

    /// Look up a block definition by name.
    pub fn block(&self, name: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| b.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::Group;

    #[test]
    fn test_header_accessors() {
        let mut header = Header::default();
        header.push_group("$ACADVER", Group::from_raw(1, "AC1015").unwrap());
        header.push_group("$LTSCALE", Group::from_raw(40, "2.0").unwrap());

        assert_eq!(header.str_var("$ACADVER"), Some("AC1015"));
        assert_eq!(header.float_var("$LTSCALE"), Some(2.0));
        assert_eq!(header.int_var("$ACADVER"), None);
        assert!(header.get("$MISSING").is_none());
        assert_eq!(header.len(), 2);
    }

    #[test]
    fn test_entity_record_accessors() {
        let mut rec = EntityRecord::new("LINE");
        rec.groups.push(Group::from_raw(5, "2A").unwrap());
        rec.groups.push(Group::from_raw(8, "Walls").unwrap());
        rec.groups.push(Group::from_raw(10, "1.5").unwrap());

        assert_eq!(rec.entity_type, "LINE");
        assert_eq!(rec.handle(), Some(0x2A));
        assert_eq!(rec.layer(), Some("Walls"));
        assert_eq!(rec.first(10).and_then(Group::as_float), Some(1.5));
    }

    #[test]
    fn test_table_record_name() {
        let rec = TableRecord {
            record_type: "LAYER".into(),
            groups: vec![Group::from_raw(2, "Defpoints").unwrap()],
        };
        assert_eq!(rec.name(), Some("Defpoints"));
        assert_eq!(rec.handle(), None);
    }

    #[test]
    fn test_table_lookup_ignores_case() {
        let mut doc = Document::new();
        doc.tables.insert(
            "Layer".into(),
            TableSection {
                name: "Layer".into(),
                ..TableSection::default()
            },
        );

        assert!(doc.table("Layer").is_some());
        assert!(doc.table("layer").is_some());
        assert!(doc.table("LAYER").is_some());
        assert!(doc.table("VPORT").is_none());
    }
}
