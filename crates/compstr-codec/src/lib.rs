//! Composition-string codec.
//!
//! A composition string is stored either as narrow (code-page) text or as
//! wide (UTF-16) text. This crate answers field queries in either encoding,
//! re-encoding text and re-measuring the per-character arrays on the fly.
//!
//! # Architecture
//!
//! - [`format`] -- Binary header layout and parsing
//! - [`record`] -- Record locator: field spans, kinds and reference texts
//! - [`builder`] -- Produces well-formed record blobs
//! - [`offset`] -- Character-offset re-measurement between encodings
//! - [`text`] -- Text transcoder and raw copy
//! - [`attr`] -- Attribute array remapping
//! - [`clause`] -- Clause boundary remapping
//! - [`dispatch`] -- Field dispatcher (the query entry point)

pub mod attr;
pub mod builder;
pub mod clause;
pub mod dispatch;
pub mod format;
pub mod offset;
pub mod record;
pub mod text;

pub use builder::CompositionStringBuilder;
pub use dispatch::{ConversionRequest, get_comp_str, get_comp_str_a, get_comp_str_w};
pub use record::CompositionString;

use compstr_core::enums::IMM_ERROR_GENERAL;

/// Error type for malformed composition-string records.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    #[error("record too short: expected at least {expected} bytes, got {actual}")]
    TooShort { expected: usize, actual: usize },
    #[error("declared record size {declared} exceeds the {actual} bytes available")]
    SizeMismatch { declared: usize, actual: usize },
    #[error("field {field} spans {start}..{end}, outside the {size}-byte record")]
    FieldOutOfRange {
        field: &'static str,
        start: usize,
        end: usize,
        size: usize,
    },
    #[error("field {field} is {len} bytes, not a whole number of clause entries")]
    MisalignedClause { field: &'static str, len: usize },
}

/// Error type for field queries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("unknown composition string index {0:#x}")]
    UnknownIndex(u32),
}

impl QueryError {
    /// The sentinel the query entry points return for this error.
    pub fn code(&self) -> i32 {
        match self {
            QueryError::UnknownIndex(_) => IMM_ERROR_GENERAL,
        }
    }
}
