// Legacy code pages: resolution, lead-byte classification, UTF-16 conversion
//
// Conversions are built on encoding_rs. A fresh encoder/decoder is created
// per call; neither is reusable once a stream has ended.

use encoding_rs::{CoderResult, EncoderResult, Encoding};

/// The system "ANSI" code page placeholder.
pub const CP_ACP: u32 = 0;
/// UTF-8 as a Windows code page.
pub const CP_UTF8: u32 = 65001;
/// ANSI code page used for `CP_ACP` when nothing else is configured.
pub const DEFAULT_ANSI_CODE_PAGE: u32 = 1252;

/// Byte written in place of characters the code page cannot represent.
pub const DEFAULT_CHAR: u8 = b'?';

/// Error type for code-page resolution.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodePageError {
    #[error("unsupported code page {0}")]
    Unsupported(u32),
}

/// Lead-byte ranges of the double-byte code pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LeadBytes {
    None,
    /// Shift-JIS style: 0x81-0x9F and 0xE0-0xFC.
    ShiftJis,
    /// GBK / UHC / Big5 style: 0x81-0xFE.
    HighRange,
    /// Not DBCS, but multi-byte: character width follows UTF-8 sequence length.
    Utf8,
}

/// A resolved legacy code page.
///
/// Wraps the encoding_rs converter for the code page together with its
/// lead-byte table, so that narrow text can be walked one character at a time.
#[derive(Clone, Copy)]
pub struct CodePage {
    id: u32,
    encoding: &'static Encoding,
    lead_bytes: LeadBytes,
}

impl std::fmt::Debug for CodePage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodePage")
            .field("id", &self.id)
            .field("encoding", &self.encoding.name())
            .finish()
    }
}

impl PartialEq for CodePage {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for CodePage {}

impl CodePage {
    /// Resolve a concrete code-page identifier.
    ///
    /// `CP_ACP` is rejected here; use [`CodePage::resolve`] to substitute a
    /// configured ANSI code page.
    pub fn new(id: u32) -> Result<Self, CodePageError> {
        let (encoding, lead_bytes) = lookup(id).ok_or(CodePageError::Unsupported(id))?;
        Ok(Self {
            id,
            encoding,
            lead_bytes,
        })
    }

    /// Resolve an identifier, mapping `CP_ACP` to `ansi_code_page`.
    pub fn resolve(id: u32, ansi_code_page: u32) -> Result<Self, CodePageError> {
        if id == CP_ACP {
            Self::new(ansi_code_page)
        } else {
            Self::new(id)
        }
    }

    /// Numeric code-page identifier.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Name of the underlying encoding (WHATWG label).
    pub fn encoding_name(&self) -> &'static str {
        self.encoding.name()
    }

    /// Whether the code page has double-byte lead bytes at all.
    pub fn is_dbcs(&self) -> bool {
        matches!(self.lead_bytes, LeadBytes::ShiftJis | LeadBytes::HighRange)
    }

    /// Whether `byte` starts a two-byte sequence in this code page.
    ///
    /// Only double-byte code pages have lead bytes; UTF-8 reports `false` for
    /// every byte.
    pub fn is_lead_byte(&self, byte: u8) -> bool {
        match self.lead_bytes {
            LeadBytes::ShiftJis => matches!(byte, 0x81..=0x9F | 0xE0..=0xFC),
            LeadBytes::HighRange => matches!(byte, 0x81..=0xFE),
            LeadBytes::None | LeadBytes::Utf8 => false,
        }
    }

    /// Width in bytes of the narrow character starting at `text[pos]`.
    ///
    /// A lead byte counts as a pair only when a non-zero byte follows it.
    /// Never returns more than the bytes remaining. Returns 0 at or past the end.
    pub fn char_len_at(&self, text: &[u8], pos: usize) -> usize {
        let Some(&byte) = text.get(pos) else {
            return 0;
        };
        let remaining = text.len() - pos;
        match self.lead_bytes {
            LeadBytes::Utf8 => {
                let width = match byte {
                    0xC0..=0xDF => 2,
                    0xE0..=0xEF => 3,
                    0xF0..=0xF7 => 4,
                    _ => 1,
                };
                width.min(remaining)
            }
            _ => {
                if self.is_lead_byte(byte) && text.get(pos + 1).is_some_and(|&b| b != 0) {
                    2
                } else {
                    1
                }
            }
        }
    }

    /// Convert narrow text to UTF-16. Malformed sequences become U+FFFD.
    pub fn decode(&self, src: &[u8]) -> Vec<u16> {
        let mut decoder = self.encoding.new_decoder_without_bom_handling();
        let capacity = decoder
            .max_utf16_buffer_length(src.len())
            .unwrap_or(src.len() * 2 + 2);
        let mut out = vec![0u16; capacity.max(1)];
        let mut read_total = 0;
        let mut written_total = 0;
        loop {
            let (result, read, written, _) =
                decoder.decode_to_utf16(&src[read_total..], &mut out[written_total..], true);
            read_total += read;
            written_total += written;
            match result {
                CoderResult::InputEmpty => break,
                CoderResult::OutputFull => {
                    let grown = out.len() * 2 + 2;
                    out.resize(grown, 0);
                }
            }
        }
        out.truncate(written_total);
        out
    }

    /// Convert UTF-16 text to narrow text. Unmappable characters and unpaired
    /// surrogates become [`DEFAULT_CHAR`].
    pub fn encode(&self, src: &[u16]) -> Vec<u8> {
        let mut encoder = self.encoding.new_encoder();
        let capacity = encoder
            .max_buffer_length_from_utf16_without_replacement(src.len())
            .unwrap_or(src.len() * 4 + 4);
        let mut out = vec![0u8; capacity.max(1)];
        let mut read_total = 0;
        let mut written_total = 0;
        loop {
            let (result, read, written) = encoder.encode_from_utf16_without_replacement(
                &src[read_total..],
                &mut out[written_total..],
                true,
            );
            read_total += read;
            written_total += written;
            match result {
                EncoderResult::InputEmpty => break,
                EncoderResult::Unmappable(_) => {
                    if written_total == out.len() {
                        out.push(0);
                    }
                    out[written_total] = DEFAULT_CHAR;
                    written_total += 1;
                }
                EncoderResult::OutputFull => {
                    let grown = out.len() * 2 + 4;
                    out.resize(grown, 0);
                }
            }
        }
        out.truncate(written_total);
        out
    }

    /// Number of UTF-16 code units `src` decodes to.
    pub fn wide_len(&self, src: &[u8]) -> usize {
        self.decode(src).len()
    }

    /// Number of bytes `src` encodes to.
    pub fn narrow_len(&self, src: &[u16]) -> usize {
        self.encode(src).len()
    }
}

/// Code-page table.
fn lookup(id: u32) -> Option<(&'static Encoding, LeadBytes)> {
    use LeadBytes::{HighRange, None as Sbcs, ShiftJis, Utf8};
    let entry = match id {
        874 => (encoding_rs::WINDOWS_874, Sbcs),
        932 => (encoding_rs::SHIFT_JIS, ShiftJis),
        936 => (encoding_rs::GBK, HighRange),
        949 => (encoding_rs::EUC_KR, HighRange),
        950 => (encoding_rs::BIG5, HighRange),
        866 => (encoding_rs::IBM866, Sbcs),
        1250 => (encoding_rs::WINDOWS_1250, Sbcs),
        1251 => (encoding_rs::WINDOWS_1251, Sbcs),
        1252 => (encoding_rs::WINDOWS_1252, Sbcs),
        1253 => (encoding_rs::WINDOWS_1253, Sbcs),
        1254 => (encoding_rs::WINDOWS_1254, Sbcs),
        1255 => (encoding_rs::WINDOWS_1255, Sbcs),
        1256 => (encoding_rs::WINDOWS_1256, Sbcs),
        1257 => (encoding_rs::WINDOWS_1257, Sbcs),
        1258 => (encoding_rs::WINDOWS_1258, Sbcs),
        10000 => (encoding_rs::MACINTOSH, Sbcs),
        10007 => (encoding_rs::X_MAC_CYRILLIC, Sbcs),
        20866 => (encoding_rs::KOI8_R, Sbcs),
        21866 => (encoding_rs::KOI8_U, Sbcs),
        28592 => (encoding_rs::ISO_8859_2, Sbcs),
        28593 => (encoding_rs::ISO_8859_3, Sbcs),
        28594 => (encoding_rs::ISO_8859_4, Sbcs),
        28595 => (encoding_rs::ISO_8859_5, Sbcs),
        28596 => (encoding_rs::ISO_8859_6, Sbcs),
        28597 => (encoding_rs::ISO_8859_7, Sbcs),
        28598 => (encoding_rs::ISO_8859_8, Sbcs),
        28599 => (encoding_rs::WINDOWS_1254, Sbcs),
        28603 => (encoding_rs::ISO_8859_13, Sbcs),
        28605 => (encoding_rs::ISO_8859_15, Sbcs),
        CP_UTF8 => (encoding_rs::UTF_8, Utf8),
        _ => return None,
    };
    Some(entry)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wide(s: &str) -> Vec<u16> {
        s.encode_utf16().collect()
    }

    #[test]
    fn resolve_acp_uses_configured_page() {
        let cp = CodePage::resolve(CP_ACP, 932).unwrap();
        assert_eq!(cp.id(), 932);
        let cp = CodePage::resolve(1251, 932).unwrap();
        assert_eq!(cp.id(), 1251);
    }

    #[test]
    fn unsupported_code_pages_rejected() {
        assert_eq!(CodePage::new(CP_ACP), Err(CodePageError::Unsupported(0)));
        assert_eq!(CodePage::new(12345), Err(CodePageError::Unsupported(12345)));
    }

    #[test]
    fn shift_jis_lead_bytes() {
        let cp = CodePage::new(932).unwrap();
        assert!(cp.is_dbcs());
        assert!(cp.is_lead_byte(0x81));
        assert!(cp.is_lead_byte(0x9F));
        assert!(cp.is_lead_byte(0xE0));
        assert!(cp.is_lead_byte(0xFC));
        assert!(!cp.is_lead_byte(b'A'));
        assert!(!cp.is_lead_byte(0xB1)); // half-width katakana
        assert!(!cp.is_lead_byte(0xFD));
    }

    #[test]
    fn single_byte_pages_have_no_lead_bytes() {
        let cp = CodePage::new(1252).unwrap();
        assert!(!cp.is_dbcs());
        assert!((0u8..=255).all(|b| !cp.is_lead_byte(b)));
        let utf8 = CodePage::new(CP_UTF8).unwrap();
        assert!(!utf8.is_lead_byte(0xE3));
    }

    #[test]
    fn char_len_requires_nonzero_trail() {
        let cp = CodePage::new(932).unwrap();
        assert_eq!(cp.char_len_at(&[0x82, 0xA0], 0), 2);
        assert_eq!(cp.char_len_at(&[0x82, 0x00], 0), 1);
        assert_eq!(cp.char_len_at(&[0x82], 0), 1);
        assert_eq!(cp.char_len_at(&[b'A'], 0), 1);
        assert_eq!(cp.char_len_at(&[b'A'], 1), 0);
    }

    #[test]
    fn char_len_utf8_sequences() {
        let cp = CodePage::new(CP_UTF8).unwrap();
        let text = "aé漢😀".as_bytes();
        assert_eq!(cp.char_len_at(text, 0), 1);
        assert_eq!(cp.char_len_at(text, 1), 2);
        assert_eq!(cp.char_len_at(text, 3), 3);
        assert_eq!(cp.char_len_at(text, 6), 4);
        // truncated sequence never runs past the end
        assert_eq!(cp.char_len_at(&[0xE6, 0xBC], 0), 2);
    }

    #[test]
    fn shift_jis_round_trip() {
        let cp = CodePage::new(932).unwrap();
        let narrow = cp.encode(&wide("aあ漢ｱ"));
        assert_eq!(narrow, vec![b'a', 0x82, 0xA0, 0x8A, 0xBF, 0xB1]);
        assert_eq!(cp.decode(&narrow), wide("aあ漢ｱ"));
        assert_eq!(cp.narrow_len(&wide("あ")), 2);
        assert_eq!(cp.wide_len(&[0x82, 0xA0]), 1);
    }

    #[test]
    fn gbk_and_windows_1252() {
        let gbk = CodePage::new(936).unwrap();
        assert_eq!(gbk.encode(&wide("中")), vec![0xD6, 0xD0]);
        let latin = CodePage::new(1252).unwrap();
        assert_eq!(latin.encode(&wide("é€")), vec![0xE9, 0x80]);
        assert_eq!(latin.decode(&[0xE9, 0x80]), wide("é€"));
    }

    #[test]
    fn unmappable_becomes_default_char() {
        let latin = CodePage::new(1252).unwrap();
        assert_eq!(latin.encode(&wide("aあb")), b"a?b".to_vec());
        // unpaired surrogate
        assert_eq!(latin.encode(&[0xD800, u16::from(b'x')]), b"?x".to_vec());
    }

    #[test]
    fn malformed_narrow_becomes_replacement() {
        let cp = CodePage::new(932).unwrap();
        let decoded = cp.decode(&[b'a', 0x82]);
        assert_eq!(decoded, vec![u16::from(b'a'), 0xFFFD]);
    }

    #[test]
    fn embedded_nul_is_converted() {
        let cp = CodePage::new(1252).unwrap();
        assert_eq!(cp.decode(b"a\0b"), vec![0x61, 0, 0x62]);
        assert_eq!(cp.encode(&[0x61, 0, 0x62]), b"a\0b".to_vec());
    }

    #[test]
    fn empty_input() {
        let cp = CodePage::new(932).unwrap();
        assert!(cp.decode(&[]).is_empty());
        assert!(cp.encode(&[]).is_empty());
    }
}
