// Character-offset re-measurement between encodings
//
// Used for clause boundaries and for the cursor / delta-start scalars. An
// offset is converted by transcoding the text prefix it delimits and taking
// the destination length of that prefix.

use compstr_core::CodePage;

/// Narrow (byte) offset of the position `wide_pos` code units into `text`.
///
/// Positions past the end of the text are measured up to the end; the
/// excess carries over one-to-one.
pub fn narrow_from_wide(wide_pos: u32, text: &[u16], code_page: &CodePage) -> u32 {
    let pos = wide_pos as usize;
    let within = pos.min(text.len());
    let excess = pos - within;
    let measured = code_page.narrow_len(&text[..within]);
    saturate(measured + excess)
}

/// Wide (UTF-16 unit) offset of the position `narrow_pos` bytes into `text`.
///
/// A prefix that ends in the middle of a double-byte character counts the
/// dangling lead byte as one character. Positions past the end carry over
/// one-to-one.
pub fn wide_from_narrow(narrow_pos: u32, text: &[u8], code_page: &CodePage) -> u32 {
    let pos = narrow_pos as usize;
    let within = pos.min(text.len());
    let excess = pos - within;
    let measured = code_page.wide_len(&text[..within]);
    saturate(measured + excess)
}

fn saturate(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
