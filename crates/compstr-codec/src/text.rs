// Text transcoder: narrow <-> wide conversion of one text run into a caller buffer
//
// Buffer policy shared by every field:
// - an empty output buffer is a size probe: nothing is written and the
//   required byte count is returned;
// - otherwise at most `out.len()` bytes are written and the number of bytes
//   written is returned.
//
// Only a real conversion appends a terminator, and only when the written
// content plus one terminator unit fits. Raw copies never do.

use compstr_core::{CodePage, Encoding};

/// Copy a field that is already in the requested encoding.
///
/// Returns `src.len()` for a probe, otherwise `min(out.len(), src.len())`.
/// No terminator is added.
pub fn copy_raw(src: &[u8], out: &mut [u8]) -> usize {
    if out.is_empty() {
        return src.len();
    }
    let n = out.len().min(src.len());
    out[..n].copy_from_slice(&src[..n]);
    n
}

/// Convert narrow text to wide (UTF-16LE) output.
///
/// Returns the converted size in bytes (two per code unit), excluding the
/// terminator. A truncated conversion never ends in half a surrogate pair.
pub fn narrow_to_wide(text: &[u8], out: &mut [u8], code_page: &CodePage) -> usize {
    let converted = code_page.decode(text);
    if out.is_empty() {
        return converted.len() * 2;
    }

    let capacity = out.len() / 2;
    let mut n = converted.len().min(capacity);
    if n < converted.len() && n > 0 && is_high_surrogate(converted[n - 1]) {
        n -= 1;
    }

    for (dst, unit) in out.chunks_exact_mut(2).zip(&converted[..n]) {
        dst.copy_from_slice(&unit.to_le_bytes());
    }
    if (n + 1) * 2 <= out.len() {
        out[n * 2..n * 2 + 2].copy_from_slice(&[0, 0]);
    }
    n * 2
}

/// Convert wide text to narrow output.
///
/// Returns the converted size in bytes, excluding the terminator. A
/// truncated conversion never ends in the middle of a multi-byte character.
pub fn wide_to_narrow(text: &[u16], out: &mut [u8], code_page: &CodePage) -> usize {
    let converted = code_page.encode(text);
    if out.is_empty() {
        return converted.len();
    }

    let n = whole_chars_within(&converted, out.len(), code_page);
    out[..n].copy_from_slice(&converted[..n]);
    if n < out.len() {
        out[n] = 0;
    }
    n
}

/// Convert a text run between encodings.
///
/// `text` holds the source encoding's bytes (UTF-16LE for wide). When both
/// encodings match the bytes are copied as-is, without a terminator.
pub fn transcode(
    from: Encoding,
    to: Encoding,
    text: &[u8],
    out: &mut [u8],
    code_page: &CodePage,
) -> usize {
    match (from, to) {
        (Encoding::Narrow, Encoding::Wide) => narrow_to_wide(text, out, code_page),
        (Encoding::Wide, Encoding::Narrow) => {
            let units: Vec<u16> = text
                .chunks_exact(2)
                .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                .collect();
            wide_to_narrow(&units, out, code_page)
        }
        _ => copy_raw(text, out),
    }
}

/// Longest prefix of `narrow` no longer than `limit` bytes that ends on a
/// character boundary.
fn whole_chars_within(narrow: &[u8], limit: usize, code_page: &CodePage) -> usize {
    if limit >= narrow.len() {
        return narrow.len();
    }
    let mut pos = 0;
    loop {
        let width = code_page.char_len_at(narrow, pos);
        if width == 0 || pos + width > limit {
            return pos;
        }
        pos += width;
    }
}

#[inline]
fn is_high_surrogate(unit: u16) -> bool {
    (0xD800..=0xDBFF).contains(&unit)
}
