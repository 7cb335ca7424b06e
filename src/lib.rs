//! # dxfscan
//!
//! A pure Rust scanner and section parser for ASCII DXF (tagged text)
//! CAD files.
//!
//! The tagged text format is line-oriented: one integer group code per
//! line, followed by one raw value line, organized into SECTION/ENTITY
//! blocks. This crate turns that stream into an in-memory document tree
//! — header variables, tables, block definitions, and a flat list of
//! typed entity records with their extended (vendor) data — without
//! depending on a native CAD SDK.
//!
//! ## Quick Start
//!
//! ```rust
//! use dxfscan::parse_str;
//!
//! let doc = parse_str(
//!     "0\nSECTION\n2\nHEADER\n9\n$ACADVER\n1\nAC1015\n0\nENDSEC\n0\nEOF\n",
//! )?;
//! assert_eq!(doc.header.str_var("$ACADVER"), Some("AC1015"));
//! # Ok::<(), dxfscan::DxfError>(())
//! ```
//!
//! ## Streaming
//!
//! The same engine runs incrementally over chunked input; chunk
//! boundaries carry no semantic meaning:
//!
//! ```rust
//! use dxfscan::StreamingParser;
//!
//! let mut parser = StreamingParser::new();
//! parser.feed("0\nSECTION\n2\nENTIT")?;
//! parser.feed("IES\n0\nENDSEC\n0\nEOF")?;
//! let doc = parser.finish()?;
//! assert!(doc.entities.is_empty());
//! # Ok::<(), dxfscan::DxfError>(())
//! ```
//!
//! ## Architecture
//!
//! - [`scanner`] — two position-aware group cursors (whole-buffer and
//!   chunk-fed) behind one [`scanner::GroupRead`] contract
//! - [`group`] — group-code range table and value coercion
//! - [`parser`] — the section/entity dispatch engine and its
//!   [`parser::SectionHandler`] registry
//! - [`document`] — the assembled record-based tree
//! - [`error`] — the three-way Parse/Scanner/Value error taxonomy

#![warn(rustdoc::missing_crate_level_docs)]

pub mod document;
pub mod error;
pub mod group;
pub mod parser;
pub mod scanner;
pub mod xdata;

// Re-export commonly used types
pub use document::{Block, Document, EntityRecord, Header, TableRecord, TableSection};
pub use error::{DxfError, Result};
pub use group::{coerce, Group, GroupValue, GroupValueType};
pub use parser::{
    parse_lines, parse_reader, parse_str, parse_str_with, DispatchEngine, HandlerRegistry,
    Marker, SectionHandler, StreamingParser,
};
pub use scanner::{ArrayScanner, GroupRead, StreamScanner};
pub use xdata::{ExtendedData, ExtendedDataRecord, XDataValue};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
