// Composition-string binary format: fixed header of offset/length pairs

use bytemuck::{Pod, Zeroable};
use compstr_core::CompStrIndex;

use crate::FormatError;

/// Size of the composition-string header in bytes (25 `u32` values).
pub const HEADER_SIZE: usize = 100;

/// Composition-string header.
///
/// Layout (all `u32`, native little-endian):
/// - `size`: total record size in bytes (0 = unknown, use the blob length)
/// - a `(len, offset)` pair per array field, in the order below
/// - `cursor_pos`, `delta_start`: character offsets into the composition text
/// - `private_size`, `private_offset`: IME-private area, never interpreted
///
/// Offsets are relative to the start of the record. Text lengths count
/// characters of the stored encoding; attribute and clause lengths count bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct CompStrHeader {
    pub size: u32,
    pub comp_read_attr_len: u32,
    pub comp_read_attr_offset: u32,
    pub comp_read_clause_len: u32,
    pub comp_read_clause_offset: u32,
    pub comp_read_str_len: u32,
    pub comp_read_str_offset: u32,
    pub comp_attr_len: u32,
    pub comp_attr_offset: u32,
    pub comp_clause_len: u32,
    pub comp_clause_offset: u32,
    pub comp_str_len: u32,
    pub comp_str_offset: u32,
    pub cursor_pos: u32,
    pub delta_start: u32,
    pub result_read_clause_len: u32,
    pub result_read_clause_offset: u32,
    pub result_read_str_len: u32,
    pub result_read_str_offset: u32,
    pub result_clause_len: u32,
    pub result_clause_offset: u32,
    pub result_str_len: u32,
    pub result_str_offset: u32,
    pub private_size: u32,
    pub private_offset: u32,
}

const _: () = assert!(size_of::<CompStrHeader>() == HEADER_SIZE);

/// Raw `(len, offset)` pair of one array field, as stored in the header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldSpan {
    pub len: u32,
    pub offset: u32,
}

impl CompStrHeader {
    /// The `(len, offset)` pair of an array field. Scalars have no span.
    pub fn span(&self, index: CompStrIndex) -> Option<FieldSpan> {
        let (len, offset) = match index {
            CompStrIndex::CompReadStr => (self.comp_read_str_len, self.comp_read_str_offset),
            CompStrIndex::CompReadAttr => (self.comp_read_attr_len, self.comp_read_attr_offset),
            CompStrIndex::CompReadClause => {
                (self.comp_read_clause_len, self.comp_read_clause_offset)
            }
            CompStrIndex::CompStr => (self.comp_str_len, self.comp_str_offset),
            CompStrIndex::CompAttr => (self.comp_attr_len, self.comp_attr_offset),
            CompStrIndex::CompClause => (self.comp_clause_len, self.comp_clause_offset),
            CompStrIndex::ResultReadStr => {
                (self.result_read_str_len, self.result_read_str_offset)
            }
            CompStrIndex::ResultReadClause => {
                (self.result_read_clause_len, self.result_read_clause_offset)
            }
            CompStrIndex::ResultStr => (self.result_str_len, self.result_str_offset),
            CompStrIndex::ResultClause => (self.result_clause_len, self.result_clause_offset),
            CompStrIndex::CursorPos | CompStrIndex::DeltaStart => return None,
        };
        Some(FieldSpan { len, offset })
    }

    /// Set the `(len, offset)` pair of an array field.
    ///
    /// Returns `false` (and changes nothing) for scalar fields.
    pub fn set_span(&mut self, index: CompStrIndex, span: FieldSpan) -> bool {
        let (len, offset) = match index {
            CompStrIndex::CompReadStr => (&mut self.comp_read_str_len, &mut self.comp_read_str_offset),
            CompStrIndex::CompReadAttr => {
                (&mut self.comp_read_attr_len, &mut self.comp_read_attr_offset)
            }
            CompStrIndex::CompReadClause => {
                (&mut self.comp_read_clause_len, &mut self.comp_read_clause_offset)
            }
            CompStrIndex::CompStr => (&mut self.comp_str_len, &mut self.comp_str_offset),
            CompStrIndex::CompAttr => (&mut self.comp_attr_len, &mut self.comp_attr_offset),
            CompStrIndex::CompClause => (&mut self.comp_clause_len, &mut self.comp_clause_offset),
            CompStrIndex::ResultReadStr => {
                (&mut self.result_read_str_len, &mut self.result_read_str_offset)
            }
            CompStrIndex::ResultReadClause => {
                (&mut self.result_read_clause_len, &mut self.result_read_clause_offset)
            }
            CompStrIndex::ResultStr => (&mut self.result_str_len, &mut self.result_str_offset),
            CompStrIndex::ResultClause => {
                (&mut self.result_clause_len, &mut self.result_clause_offset)
            }
            CompStrIndex::CursorPos | CompStrIndex::DeltaStart => return false,
        };
        *len = span.len;
        *offset = span.offset;
        true
    }

    /// Serialize the header to its 100-byte binary form.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out.copy_from_slice(bytemuck::bytes_of(self));
        out
    }
}

/// Parses the composition-string header from the start of `data`.
///
/// The header is copied out, so `data` needs no particular alignment.
/// A declared `size` larger than `data` is rejected; field spans are checked
/// separately by [`crate::record::CompositionString::validate`] because their
/// byte length depends on the stored encoding.
pub fn parse_header(data: &[u8]) -> Result<CompStrHeader, FormatError> {
    if data.len() < HEADER_SIZE {
        return Err(FormatError::TooShort {
            expected: HEADER_SIZE,
            actual: data.len(),
        });
    }

    let header: CompStrHeader = bytemuck::pod_read_unaligned(&data[..HEADER_SIZE]);

    if header.size as usize > data.len() {
        return Err(FormatError::SizeMismatch {
            declared: header.size as usize,
            actual: data.len(),
        });
    }

    Ok(header)
}
