// Record locator: resolves field spans inside a composition-string blob.

use std::ops::Range;

use compstr_core::{CompStrIndex, Encoding};

use crate::FormatError;
use crate::format::{self, CompStrHeader};

/// Size of one clause boundary entry in bytes.
pub const CLAUSE_ENTRY_SIZE: usize = 4;

/// What kind of data a field holds, which decides how it is re-encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Text in the stored encoding; length counts stored code units.
    Text,
    /// One attribute byte per stored character.
    Attr,
    /// `u32` character offsets; length counts bytes.
    Clause,
    /// A character offset kept directly in the header.
    Scalar,
}

/// Kind of a queryable field.
pub fn field_kind(index: CompStrIndex) -> FieldKind {
    match index {
        CompStrIndex::CompReadStr
        | CompStrIndex::CompStr
        | CompStrIndex::ResultReadStr
        | CompStrIndex::ResultStr => FieldKind::Text,
        CompStrIndex::CompReadAttr | CompStrIndex::CompAttr => FieldKind::Attr,
        CompStrIndex::CompReadClause
        | CompStrIndex::CompClause
        | CompStrIndex::ResultReadClause
        | CompStrIndex::ResultClause => FieldKind::Clause,
        CompStrIndex::CursorPos | CompStrIndex::DeltaStart => FieldKind::Scalar,
    }
}

/// The text whose characters a non-text field counts.
///
/// Attributes and clauses describe their own text; the cursor and the
/// delta start are offsets into the composition text. Text fields return
/// themselves.
pub fn reference_text(index: CompStrIndex) -> CompStrIndex {
    match index {
        CompStrIndex::CompReadAttr | CompStrIndex::CompReadClause => CompStrIndex::CompReadStr,
        CompStrIndex::CompAttr
        | CompStrIndex::CompClause
        | CompStrIndex::CursorPos
        | CompStrIndex::DeltaStart => CompStrIndex::CompStr,
        CompStrIndex::ResultReadClause => CompStrIndex::ResultReadStr,
        CompStrIndex::ResultClause => CompStrIndex::ResultStr,
        text => text,
    }
}

/// Read-only view of a composition-string record.
///
/// The view does not know which encoding the record is stored in; every
/// accessor that depends on it takes the stored encoding as an argument.
/// Reads are clamped to the blob, so a view over a record that failed
/// [`validate`](Self::validate) yields truncated fields rather than panicking.
#[derive(Debug, Clone, Copy)]
pub struct CompositionString<'a> {
    data: &'a [u8],
    header: CompStrHeader,
}

impl<'a> CompositionString<'a> {
    /// Create a view over a record blob. Only the header is checked here.
    pub fn new(data: &'a [u8]) -> Result<Self, FormatError> {
        let header = format::parse_header(data)?;
        let data = if header.size == 0 {
            data
        } else {
            &data[..header.size as usize]
        };
        Ok(Self { data, header })
    }

    /// Parsed header.
    pub fn header(&self) -> &CompStrHeader {
        &self.header
    }

    /// The record bytes (trimmed to the declared size).
    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    /// Check every field span against the blob for the given stored encoding.
    pub fn validate(&self, stored: Encoding) -> Result<(), FormatError> {
        for index in CompStrIndex::ALL {
            let Some(range) = self.byte_range(index, stored) else {
                continue;
            };
            if range.is_empty() {
                continue;
            }
            if range.end > self.data.len() {
                return Err(FormatError::FieldOutOfRange {
                    field: index.name(),
                    start: range.start,
                    end: range.end,
                    size: self.data.len(),
                });
            }
            if field_kind(index) == FieldKind::Clause && range.len() % CLAUSE_ENTRY_SIZE != 0 {
                return Err(FormatError::MisalignedClause {
                    field: index.name(),
                    len: range.len(),
                });
            }
        }
        Ok(())
    }

    /// Stored length of an array field in its own units (characters for
    /// text, bytes for attributes and clauses). Scalars report 0.
    pub fn len(&self, index: CompStrIndex) -> usize {
        self.header.span(index).map_or(0, |span| span.len as usize)
    }

    /// Byte length of an array field for the given stored encoding.
    pub fn byte_len(&self, index: CompStrIndex, stored: Encoding) -> usize {
        let len = self.len(index);
        match field_kind(index) {
            FieldKind::Text => len * stored.unit_size(),
            FieldKind::Attr | FieldKind::Clause => len,
            FieldKind::Scalar => 0,
        }
    }

    /// Declared byte range of an array field, unchecked against the blob.
    pub fn byte_range(&self, index: CompStrIndex, stored: Encoding) -> Option<Range<usize>> {
        let span = self.header.span(index)?;
        let start = span.offset as usize;
        Some(start..start.saturating_add(self.byte_len(index, stored)))
    }

    /// Raw bytes of an array field, clamped to the blob. Scalars yield an
    /// empty slice.
    pub fn bytes(&self, index: CompStrIndex, stored: Encoding) -> &'a [u8] {
        let Some(range) = self.byte_range(index, stored) else {
            return &[];
        };
        let end = range.end.min(self.data.len());
        let start = range.start.min(end);
        &self.data[start..end]
    }

    /// A text field of a narrow record.
    pub fn narrow_text(&self, index: CompStrIndex) -> &'a [u8] {
        self.bytes(index, Encoding::Narrow)
    }

    /// A text field of a wide record, as UTF-16 code units.
    pub fn wide_text(&self, index: CompStrIndex) -> Vec<u16> {
        self.bytes(index, Encoding::Wide)
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect()
    }

    /// Attribute bytes of an attribute field.
    pub fn attrs(&self, index: CompStrIndex) -> &'a [u8] {
        self.bytes(index, Encoding::Narrow)
    }

    /// Clause boundaries of a clause field. A trailing partial entry is ignored.
    pub fn clauses(&self, index: CompStrIndex) -> Vec<u32> {
        self.bytes(index, Encoding::Narrow)
            .chunks_exact(CLAUSE_ENTRY_SIZE)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect()
    }

    /// Cursor position, in characters of the stored encoding.
    pub fn cursor_pos(&self) -> u32 {
        self.header.cursor_pos
    }

    /// Start of the changed part of the composition text, in characters of
    /// the stored encoding.
    pub fn delta_start(&self) -> u32 {
        self.header.delta_start
    }

    /// Value of a scalar field. Array fields yield `None`.
    pub fn scalar(&self, index: CompStrIndex) -> Option<u32> {
        match index {
            CompStrIndex::CursorPos => Some(self.header.cursor_pos),
            CompStrIndex::DeltaStart => Some(self.header.delta_start),
            _ => None,
        }
    }

    /// The IME-private area. Located but never interpreted.
    pub fn private_data(&self) -> &'a [u8] {
        let start = self.header.private_offset as usize;
        let end = start
            .saturating_add(self.header.private_size as usize)
            .min(self.data.len());
        &self.data[start.min(end)..end]
    }
}
