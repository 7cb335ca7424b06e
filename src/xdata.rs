//! Extended Data (XDATA) support
//!
//! Application-specific data attached to entities, stored with group
//! codes 1000-1071. Each code 1001 opens a record for one registered
//! application; the values that follow belong to it until the next 1001
//! or the end of the entity.

use crate::group::{Group, GroupValue};

/// A 3D point assembled from an X/Y/Z coordinate triple.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Extended data value types
#[derive(Debug, Clone, PartialEq)]
pub enum XDataValue {
    /// String value (group code 1000)
    String(String),
    /// Control string (group code 1002) - "{" or "}"
    ControlString(String),
    /// Layer name (group code 1003)
    LayerName(String),
    /// Binary chunk (group code 1004), kept as the hex text
    BinaryChunk(String),
    /// Database handle (group code 1005)
    Handle(u64),
    /// 3D point (group codes 1010, 1020, 1030)
    Point(Point3),
    /// World space position (group codes 1011, 1021, 1031)
    Position(Point3),
    /// World space displacement (group codes 1012, 1022, 1032)
    Displacement(Point3),
    /// World direction (group codes 1013, 1023, 1033)
    Direction(Point3),
    /// Real value (group code 1040)
    Real(f64),
    /// Distance (group code 1041)
    Distance(f64),
    /// Scale factor (group code 1042)
    ScaleFactor(f64),
    /// 16-bit integer (group code 1070)
    Integer16(i16),
    /// 32-bit integer (group code 1071)
    Integer32(i32),
}

/// Extended data record for a single application
#[derive(Debug, Clone, PartialEq)]
pub struct ExtendedDataRecord {
    /// Application name (from group code 1001)
    pub application_name: String,
    /// Extended data values
    pub values: Vec<XDataValue>,
}

impl ExtendedDataRecord {
    /// Create a new extended data record
    pub fn new(application_name: impl Into<String>) -> Self {
        Self {
            application_name: application_name.into(),
            values: Vec::new(),
        }
    }

    /// Number of values in the record
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the record is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Extended data collection for an entity
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtendedData {
    records: Vec<ExtendedDataRecord>,
}

impl ExtendedData {
    /// Create a new extended data collection
    pub fn new() -> Self {
        Self::default()
    }

    /// All records
    pub fn records(&self) -> &[ExtendedDataRecord] {
        &self.records
    }

    /// Get a record by application name
    pub fn get_record(&self, application_name: &str) -> Option<&ExtendedDataRecord> {
        self.records
            .iter()
            .find(|r| r.application_name == application_name)
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the collection is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Accumulates XDATA groups of one entity into records, assembling
/// coordinate triples across consecutive groups.
#[derive(Debug, Default)]
pub struct XDataBuilder {
    records: Vec<ExtendedDataRecord>,
    pending_point: Option<(i32, Point3)>,
}

impl XDataBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// True if no XDATA group has been seen.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.pending_point.is_none()
    }

    /// Absorb one group with code >= 1000.
    pub fn push(&mut self, group: &Group) {
        if group.code == 1001 {
            self.flush_point();
            let name = group.as_str().unwrap_or_default().to_string();
            self.records.push(ExtendedDataRecord::new(name));
            return;
        }

        // values before any 1001 get an anonymous record, so malformed
        // input is still preserved rather than dropped
        if self.records.is_empty() {
            self.records.push(ExtendedDataRecord::new(""));
        }

        match (group.code, &group.value) {
            // coordinate triples: 101x opens, 102x/103x complete
            (1010..=1013, GroupValue::Float(x)) => {
                self.flush_point();
                self.pending_point = Some((group.code, Point3 { x: *x, ..Point3::default() }));
            }
            (1020..=1023, GroupValue::Float(y)) => {
                if let Some((base, point)) = self.pending_point.as_mut() {
                    if group.code - 1010 == *base - 1000 {
                        point.y = *y;
                        return;
                    }
                }
                // unpaired coordinate: keep its numeric value
                self.flush_point();
                self.push_value(XDataValue::Real(*y));
            }
            (1030..=1033, GroupValue::Float(z)) => {
                if let Some((base, point)) = self.pending_point.as_mut() {
                    if group.code - 1020 == *base - 1000 {
                        point.z = *z;
                        self.flush_point();
                        return;
                    }
                }
                self.flush_point();
                self.push_value(XDataValue::Real(*z));
            }
            _ => {
                self.flush_point();
                self.push_value(scalar_value(group));
            }
        }
    }

    fn push_value(&mut self, value: XDataValue) {
        if let Some(record) = self.records.last_mut() {
            record.values.push(value);
        }
    }

    fn flush_point(&mut self) {
        if let Some((base, point)) = self.pending_point.take() {
            let value = match base {
                1010 => XDataValue::Point(point),
                1011 => XDataValue::Position(point),
                1012 => XDataValue::Displacement(point),
                _ => XDataValue::Direction(point),
            };
            if self.records.is_empty() {
                self.records.push(ExtendedDataRecord::new(""));
            }
            self.push_value(value);
        }
    }

    /// Finish the entity, returning the assembled collection.
    pub fn finish(mut self) -> ExtendedData {
        self.flush_point();
        ExtendedData {
            records: self.records,
        }
    }
}

/// Total over all groups: every value lands in some variant, widening
/// where the code's nominal width does not fit.
fn scalar_value(group: &Group) -> XDataValue {
    match (group.code, &group.value) {
        (1002, GroupValue::Str(s)) => XDataValue::ControlString(s.clone()),
        (1003, GroupValue::Str(s)) => XDataValue::LayerName(s.clone()),
        (1004, GroupValue::Str(s)) => XDataValue::BinaryChunk(s.clone()),
        (1005, GroupValue::Str(s)) => match u64::from_str_radix(s.trim(), 16) {
            Ok(handle) => XDataValue::Handle(handle),
            // a handle that is not valid hex keeps its text form
            Err(_) => XDataValue::String(s.clone()),
        },
        (1041, GroupValue::Float(v)) => XDataValue::Distance(*v),
        (1042, GroupValue::Float(v)) => XDataValue::ScaleFactor(*v),
        (1070, GroupValue::Integer(v)) if i16::try_from(*v).is_ok() => {
            XDataValue::Integer16(*v as i16)
        }
        // 1040 and the unnamed real codes 1043-1059
        (_, GroupValue::Float(v)) => XDataValue::Real(*v),
        // 1060-1069, 1071 and oversized 1070 values
        (_, GroupValue::Integer(v)) => match i32::try_from(*v) {
            Ok(v) => XDataValue::Integer32(v),
            Err(_) => XDataValue::String(v.to_string()),
        },
        (_, GroupValue::Boolean(b)) => XDataValue::Integer16(*b as i16),
        (_, GroupValue::Str(s)) => XDataValue::String(s.clone()),
    }
}
