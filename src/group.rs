//! DXF groups and group-code value coercion
//!
//! A group is the atomic token of the tagged text format: one integer
//! group code followed by one raw value line. The code alone decides the
//! value's type; the ranges below follow the DXF reference.

use crate::error::{DxfError, Result};
use std::fmt;

/// The four value categories a group code can demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupValueType {
    /// Text value
    Str,
    /// Integer value (16/32/64-bit ranges collapse to i64 here)
    Integer,
    /// Double-precision floating-point value
    Float,
    /// Boolean flag, written as the literal `0` or `1`
    Boolean,
}

impl GroupValueType {
    /// Value type demanded by a group code.
    ///
    /// Total over all codes; unlisted ranges default to string, which
    /// also covers handle and binary-chunk codes (kept as hex text).
    pub fn for_code(code: i32) -> Self {
        match code {
            0..=9 => GroupValueType::Str,
            10..=59 => GroupValueType::Float,
            60..=99 => GroupValueType::Integer,
            100..=109 => GroupValueType::Str,
            110..=149 => GroupValueType::Float,
            160..=179 => GroupValueType::Integer,
            210..=239 => GroupValueType::Float,
            270..=289 => GroupValueType::Integer,
            290..=299 => GroupValueType::Boolean,
            300..=369 => GroupValueType::Str,
            370..=389 => GroupValueType::Integer,
            390..=399 => GroupValueType::Str,
            400..=409 => GroupValueType::Integer,
            410..=419 => GroupValueType::Str,
            420..=429 => GroupValueType::Integer,
            430..=439 => GroupValueType::Str,
            440..=459 => GroupValueType::Integer,
            460..=469 => GroupValueType::Float,
            470..=481 => GroupValueType::Str,
            999 => GroupValueType::Str,
            1000..=1009 => GroupValueType::Str,
            1010..=1059 => GroupValueType::Float,
            1060..=1071 => GroupValueType::Integer,
            _ => GroupValueType::Str,
        }
    }
}

impl fmt::Display for GroupValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str => write!(f, "string"),
            Self::Integer => write!(f, "integer"),
            Self::Float => write!(f, "float"),
            Self::Boolean => write!(f, "boolean"),
        }
    }
}

/// A typed group value.
#[derive(Debug, Clone, PartialEq)]
pub enum GroupValue {
    /// String value
    Str(String),
    /// Integer value
    Integer(i64),
    /// Floating-point value
    Float(f64),
    /// Boolean value
    Boolean(bool),
}

impl GroupValue {
    /// Category of this value.
    pub fn value_type(&self) -> GroupValueType {
        match self {
            Self::Str(_) => GroupValueType::Str,
            Self::Integer(_) => GroupValueType::Integer,
            Self::Float(_) => GroupValueType::Float,
            Self::Boolean(_) => GroupValueType::Boolean,
        }
    }
}

impl fmt::Display for GroupValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => write!(f, "{}", s),
            Self::Integer(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::Boolean(v) => write!(f, "{}", if *v { 1 } else { 0 }),
        }
    }
}

/// Coerce a raw value line to the type its group code demands.
///
/// Pure and total over all codes. Boolean codes accept exactly the
/// literals `0` and `1`; malformed boolean and numeric literals fail with
/// [`DxfError::Value`] carrying the code and the raw text.
pub fn coerce(code: i32, raw: &str) -> Result<GroupValue> {
    let expected = GroupValueType::for_code(code);
    let trimmed = raw.trim();
    match expected {
        GroupValueType::Str => Ok(GroupValue::Str(decode_control_sequences(trimmed))),
        GroupValueType::Integer => trimmed
            .parse::<i64>()
            .map(GroupValue::Integer)
            .map_err(|_| value_error(code, raw, expected)),
        GroupValueType::Float => trimmed
            .parse::<f64>()
            .map(GroupValue::Float)
            .map_err(|_| value_error(code, raw, expected)),
        GroupValueType::Boolean => match trimmed {
            "0" => Ok(GroupValue::Boolean(false)),
            "1" => Ok(GroupValue::Boolean(true)),
            _ => Err(value_error(code, raw, expected)),
        },
    }
}

fn value_error(code: i32, raw: &str, expected: GroupValueType) -> DxfError {
    DxfError::Value {
        code,
        raw: raw.to_string(),
        expected,
    }
}

/// Decode caret control sequences in DXF strings.
fn decode_control_sequences(value: &str) -> String {
    if !value.contains('^') {
        return value.to_string();
    }
    value
        .replace("^J", "\n")
        .replace("^M", "\r")
        .replace("^I", "\t")
        .replace("^ ", "^")
}

/// One `(code, value)` pair, immutable once produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    /// The group code
    pub code: i32,
    /// The typed value, chosen solely by `code`
    pub value: GroupValue,
}

impl Group {
    /// Build a group by coercing a raw value line.
    pub fn from_raw(code: i32, raw: &str) -> Result<Self> {
        Ok(Group {
            code,
            value: coerce(code, raw)?,
        })
    }

    /// String content, if this is a string-typed group.
    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            GroupValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Integer content, if this is an integer-typed group.
    pub fn as_int(&self) -> Option<i64> {
        match self.value {
            GroupValue::Integer(v) => Some(v),
            _ => None,
        }
    }

    /// Float content, if this is a float-typed group.
    pub fn as_float(&self) -> Option<f64> {
        match self.value {
            GroupValue::Float(v) => Some(v),
            _ => None,
        }
    }

    /// Boolean content, if this is a boolean-typed group.
    pub fn as_bool(&self) -> Option<bool> {
        match self.value {
            GroupValue::Boolean(v) => Some(v),
            _ => None,
        }
    }

    /// Handle value: a string-typed group parsed as hex.
    pub fn as_handle(&self) -> Option<u64> {
        self.as_str()
            .and_then(|s| u64::from_str_radix(s.trim(), 16).ok())
    }

    /// True for the distinguished `(0, "EOF")` end-of-file marker.
    pub fn is_eof_marker(&self) -> bool {
        self.code == 0 && self.as_str() == Some("EOF")
    }
}
