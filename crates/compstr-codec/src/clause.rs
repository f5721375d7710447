// Clause remapper: re-measures clause boundary offsets in the other encoding
//
// Clause tables are arrays of little-endian u32 character offsets. Entry
// width is the same on both sides; only the character counting changes.

use compstr_core::CodePage;

use crate::offset;
use crate::record::CLAUSE_ENTRY_SIZE;

/// Remap clause boundaries of a wide record for narrow output.
///
/// `clauses` is the raw stored table; its byte length is the probe answer.
pub fn wide_to_narrow(clauses: &[u8], text: &[u16], out: &mut [u8], code_page: &CodePage) -> usize {
    remap(clauses, out, |boundary| {
        offset::narrow_from_wide(boundary, text, code_page)
    })
}

/// Remap clause boundaries of a narrow record for wide output.
pub fn narrow_to_wide(clauses: &[u8], text: &[u8], out: &mut [u8], code_page: &CodePage) -> usize {
    remap(clauses, out, |boundary| {
        offset::wide_from_narrow(boundary, text, code_page)
    })
}

/// Shared walk.
///
/// A probe returns the source table size unchanged: entries have the same
/// width on both sides, so the destination encoding is not consulted.
/// Otherwise `min(out.len(), clauses.len()) / 4` entries are converted and
/// four bytes per entry are reported.
fn remap(clauses: &[u8], out: &mut [u8], mut measure: impl FnMut(u32) -> u32) -> usize {
    if clauses.is_empty() {
        return 0;
    }
    if out.is_empty() {
        return clauses.len();
    }

    let entries = out.len().min(clauses.len()) / CLAUSE_ENTRY_SIZE;
    let src = clauses.chunks_exact(CLAUSE_ENTRY_SIZE).take(entries);
    let dst = out.chunks_exact_mut(CLAUSE_ENTRY_SIZE);
    for (src, dst) in src.zip(dst) {
        let boundary = u32::from_le_bytes([src[0], src[1], src[2], src[3]]);
        dst.copy_from_slice(&measure(boundary).to_le_bytes());
    }
    entries * CLAUSE_ENTRY_SIZE
}
