// Attribute remapper: keeps one attribute byte per destination character
//
// Attribute arrays hold one entry per character of their text in the stored
// encoding. When the text changes encoding, the array is walked in lockstep
// with the reference text and entries are repeated or dropped so the output
// again has one entry per character (wide: per code unit; narrow: per byte).

use compstr_core::CodePage;

/// Remap attributes of a wide record for narrow output.
///
/// Each wide character's attribute is repeated once per byte that character
/// occupies in the code page, so a double-byte character gets its attribute
/// twice. A surrogate pair is measured as one character and takes the entry
/// of its high surrogate; the entry of the low surrogate is skipped. The
/// probe answer is the narrow byte length of `text`. The walk stops when the
/// output is full or when `attrs` runs out.
pub fn wide_to_narrow(attrs: &[u8], text: &[u16], out: &mut [u8], code_page: &CodePage) -> usize {
    if attrs.is_empty() {
        return 0;
    }
    let total = code_page.narrow_len(text);
    if out.is_empty() {
        return total;
    }

    let limit = out.len().min(total);
    if limit == 0 {
        return 0;
    }

    let mut written = 0;
    let mut pos = 0;
    'walk: while pos < text.len() {
        let Some(&attr) = attrs.get(pos) else {
            break;
        };
        let units = wide_char_len_at(text, pos);
        let width = code_page.narrow_len(&text[pos..pos + units]);
        for _ in 0..width {
            out[written] = attr;
            written += 1;
            if written >= limit {
                break 'walk;
            }
        }
        pos += units;
    }
    written
}

/// Code units in the wide character at `text[pos]`: 2 for a surrogate pair.
fn wide_char_len_at(text: &[u16], pos: usize) -> usize {
    let is_pair = matches!(text[pos], 0xD800..=0xDBFF)
        && text.get(pos + 1).is_some_and(|&u| matches!(u, 0xDC00..=0xDFFF));
    if is_pair { 2 } else { 1 }
}

/// Remap attributes of a narrow record for wide output.
///
/// A double-byte character (lead byte plus a non-zero trailing byte) is one
/// wide character: the entry of its trailing byte is kept and the entry of
/// its lead byte is skipped. A UTF-8 sequence likewise keeps the entry of its
/// last byte, repeated once per UTF-16 unit it decodes to (twice for a
/// character outside the BMP). The probe answer is the wide length of `text`.
pub fn narrow_to_wide(attrs: &[u8], text: &[u8], out: &mut [u8], code_page: &CodePage) -> usize {
    if attrs.is_empty() {
        return 0;
    }
    let total = code_page.wide_len(text);
    if out.is_empty() {
        return total;
    }

    let limit = out.len().min(total);
    let mut written = 0;
    let mut pos = 0;
    'walk: while pos < text.len() && written < limit {
        let width = code_page.char_len_at(text, pos);
        let Some(&attr) = attrs.get(pos + width - 1) else {
            break;
        };
        let units = code_page.wide_len(&text[pos..pos + width]);
        for _ in 0..units {
            out[written] = attr;
            written += 1;
            if written >= limit {
                break 'walk;
            }
        }
        pos += width;
    }
    written
}

#[cfg(test)]
mod tests {
    use super::*;
    use compstr_core::enums::{ATTR_CONVERTED, ATTR_INPUT, ATTR_TARGET_CONVERTED};

    fn sjis() -> CodePage {
        CodePage::new(932).unwrap()
    }

    fn wide(s: &str) -> Vec<u16> {
        s.encode_utf16().collect()
    }

    const A: u8 = ATTR_INPUT;
    const T: u8 = ATTR_TARGET_CONVERTED;
    const C: u8 = ATTR_CONVERTED;

    #[test]
    fn empty_attrs_short_circuit() {
        let mut probe: [u8; 0] = [];
        assert_eq!(wide_to_narrow(&[], &wide("あ"), &mut probe, &sjis()), 0);
        let mut out = [0u8; 8];
        assert_eq!(narrow_to_wide(&[], b"ab", &mut out, &sjis()), 0);
    }

    #[test]
    fn wide_to_narrow_repeats_for_double_bytes() {
        let text = wide("aあb");
        let attrs = [A, T, C];
        let mut probe: [u8; 0] = [];
        assert_eq!(wide_to_narrow(&attrs, &text, &mut probe, &sjis()), 4);
        let mut out = [0xFFu8; 8];
        assert_eq!(wide_to_narrow(&attrs, &text, &mut out, &sjis()), 4);
        assert_eq!(&out[..5], &[A, T, T, C, 0xFF]);
    }

    #[test]
    fn wide_to_narrow_stops_when_full() {
        let text = wide("あい");
        let attrs = [T, C];
        let mut out = [0xFFu8; 3];
        assert_eq!(wide_to_narrow(&attrs, &text, &mut out, &sjis()), 3);
        assert_eq!(out, [T, T, C]);
    }

    #[test]
    fn wide_to_narrow_short_attr_array() {
        let text = wide("abc");
        let attrs = [T];
        let mut out = [0xFFu8; 4];
        assert_eq!(wide_to_narrow(&attrs, &text, &mut out, &sjis()), 1);
    }

    #[test]
    fn narrow_to_wide_collapses_double_bytes() {
        let cp = sjis();
        let text = cp.encode(&wide("aあb"));
        assert_eq!(text.len(), 4);
        let attrs = [A, T, C, A];
        let mut probe: [u8; 0] = [];
        assert_eq!(narrow_to_wide(&attrs, &text, &mut probe, &cp), 3);
        let mut out = [0xFFu8; 4];
        assert_eq!(narrow_to_wide(&attrs, &text, &mut out, &cp), 3);
        // the trailing byte's entry represents the double-byte character
        assert_eq!(out, [A, C, A, 0xFF]);
    }

    #[test]
    fn narrow_to_wide_stops_when_full() {
        let cp = sjis();
        let text = cp.encode(&wide("あいう"));
        let attrs = [T, T, C, C, A, A];
        let mut out = [0xFFu8; 2];
        assert_eq!(narrow_to_wide(&attrs, &text, &mut out, &cp), 2);
        assert_eq!(out, [T, C]);
    }

    #[test]
    fn single_byte_page_is_one_to_one() {
        let cp = CodePage::new(1252).unwrap();
        let attrs = [A, T, C];
        let mut out = [0u8; 3];
        assert_eq!(narrow_to_wide(&attrs, b"xyz", &mut out, &cp), 3);
        assert_eq!(out, attrs);
        let mut out = [0u8; 3];
        assert_eq!(wide_to_narrow(&attrs, &wide("xyz"), &mut out, &cp), 3);
        assert_eq!(out, attrs);
    }

    #[test]
    fn narrow_to_wide_repeats_for_surrogate_pairs() {
        let cp = CodePage::new(65001).unwrap();
        let text = "a😀b".as_bytes();
        let attrs = [A, T, T, T, T, C];
        let mut probe: [u8; 0] = [];
        let needed = narrow_to_wide(&attrs, text, &mut probe, &cp);
        assert_eq!(needed, 4);
        let mut out = vec![0xCCu8; needed];
        assert_eq!(narrow_to_wide(&attrs, text, &mut out, &cp), needed);
        // both halves of the pair carry the emoji's entry
        assert_eq!(out, [A, T, T, C]);

        let mut out = [0xCCu8; 2];
        assert_eq!(narrow_to_wide(&attrs[1..5], "😀".as_bytes(), &mut out, &cp), 2);
        assert_eq!(out, [T, T]);
    }

    #[test]
    fn wide_to_narrow_measures_surrogate_pairs_whole() {
        let cp = CodePage::new(65001).unwrap();
        let text = wide("a😀b");
        assert_eq!(text.len(), 4);
        let attrs = [A, T, T, C];
        let mut probe: [u8; 0] = [];
        let needed = wide_to_narrow(&attrs, &text, &mut probe, &cp);
        assert_eq!(needed, 6);
        let mut out = vec![0xCCu8; needed];
        assert_eq!(wide_to_narrow(&attrs, &text, &mut out, &cp), needed);
        assert_eq!(out, [A, T, T, T, T, C]);
    }

    #[test]
    fn attribute_count_matches_transcoded_length() {
        let cp = sjis();
        let text = wide("かな漢字abc");
        let attrs = [C; 7];
        let mut probe: [u8; 0] = [];
        let needed = wide_to_narrow(&attrs, &text, &mut probe, &cp);
        assert_eq!(needed, cp.narrow_len(&text));
        let mut out = vec![0u8; needed];
        assert_eq!(wide_to_narrow(&attrs, &text, &mut out, &cp), needed);
    }
}
