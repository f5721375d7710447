// Builder for well-formed composition-string record blobs.
//
// Produces fresh records for fixtures, tests and tools. Fields are laid out
// after the header in header order, each starting on a 4-byte boundary.

use compstr_core::{CodePage, CompStrIndex, Encoding};

use crate::format::{CompStrHeader, FieldSpan, HEADER_SIZE};
use crate::record::{FieldKind, field_kind};

/// Number of array fields in a record.
const ARRAY_FIELDS: usize = 10;

/// Array fields in header order.
const LAYOUT: [CompStrIndex; ARRAY_FIELDS] = [
    CompStrIndex::CompReadAttr,
    CompStrIndex::CompReadClause,
    CompStrIndex::CompReadStr,
    CompStrIndex::CompAttr,
    CompStrIndex::CompClause,
    CompStrIndex::CompStr,
    CompStrIndex::ResultReadClause,
    CompStrIndex::ResultReadStr,
    CompStrIndex::ResultClause,
    CompStrIndex::ResultStr,
];

/// Builds a composition-string record stored in one encoding.
///
/// Text given as `&str` is encoded for the record's encoding (through the
/// code page for narrow records). Attributes and clauses are stored as given;
/// keeping them consistent with the text is up to the caller.
#[derive(Debug, Clone)]
pub struct CompositionStringBuilder {
    encoding: Encoding,
    code_page: CodePage,
    /// Stored bytes and header length value per array field, in `LAYOUT` order.
    fields: [(Vec<u8>, u32); ARRAY_FIELDS],
    cursor_pos: u32,
    delta_start: u32,
    private: Vec<u8>,
}

impl CompositionStringBuilder {
    /// Start an empty record in `encoding`. `code_page` encodes narrow text.
    pub fn new(encoding: Encoding, code_page: CodePage) -> Self {
        Self {
            encoding,
            code_page,
            fields: Default::default(),
            cursor_pos: 0,
            delta_start: 0,
            private: Vec::new(),
        }
    }

    /// Set a text field. Non-text fields are ignored.
    pub fn text(mut self, index: CompStrIndex, text: &str) -> Self {
        if field_kind(index) != FieldKind::Text {
            return self;
        }
        let units: Vec<u16> = text.encode_utf16().collect();
        let (bytes, len) = match self.encoding {
            Encoding::Narrow => {
                let narrow = self.code_page.encode(&units);
                let len = narrow.len() as u32;
                (narrow, len)
            }
            Encoding::Wide => {
                let bytes = units.iter().flat_map(|u| u.to_le_bytes()).collect();
                (bytes, units.len() as u32)
            }
        };
        self.set(index, bytes, len);
        self
    }

    /// Set an attribute field. Non-attribute fields are ignored.
    pub fn attrs(mut self, index: CompStrIndex, attrs: &[u8]) -> Self {
        if field_kind(index) == FieldKind::Attr {
            self.set(index, attrs.to_vec(), attrs.len() as u32);
        }
        self
    }

    /// Set a clause field. Non-clause fields are ignored.
    pub fn clauses(mut self, index: CompStrIndex, clauses: &[u32]) -> Self {
        if field_kind(index) == FieldKind::Clause {
            let bytes: Vec<u8> = clauses.iter().flat_map(|c| c.to_le_bytes()).collect();
            let len = bytes.len() as u32;
            self.set(index, bytes, len);
        }
        self
    }

    /// Store raw bytes for any array field with an explicit header length,
    /// bypassing encoding. Scalars are ignored.
    pub fn raw(mut self, index: CompStrIndex, bytes: &[u8], len: u32) -> Self {
        self.set(index, bytes.to_vec(), len);
        self
    }

    pub fn cursor_pos(mut self, pos: u32) -> Self {
        self.cursor_pos = pos;
        self
    }

    pub fn delta_start(mut self, pos: u32) -> Self {
        self.delta_start = pos;
        self
    }

    /// Set the IME-private area.
    pub fn private_data(mut self, data: &[u8]) -> Self {
        self.private = data.to_vec();
        self
    }

    /// Lay out the record and return its bytes.
    pub fn build(&self) -> Vec<u8> {
        let mut header = CompStrHeader {
            cursor_pos: self.cursor_pos,
            delta_start: self.delta_start,
            ..Default::default()
        };
        let mut body = Vec::new();
        let mut place = |bytes: &[u8]| -> u32 {
            while (HEADER_SIZE + body.len()) % 4 != 0 {
                body.push(0);
            }
            let offset = (HEADER_SIZE + body.len()) as u32;
            body.extend_from_slice(bytes);
            offset
        };

        for (index, (bytes, len)) in LAYOUT.iter().zip(&self.fields) {
            let offset = place(bytes);
            header.set_span(*index, FieldSpan { len: *len, offset });
        }
        header.private_offset = place(&self.private);
        header.private_size = self.private.len() as u32;
        header.size = (HEADER_SIZE + body.len()) as u32;

        let mut data = header.to_bytes().to_vec();
        data.extend_from_slice(&body);
        data
    }

    fn set(&mut self, index: CompStrIndex, bytes: Vec<u8>, len: u32) {
        if let Some(slot) = LAYOUT.iter().position(|&i| i == index) {
            self.fields[slot] = (bytes, len);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::CompositionString;

    fn sjis() -> CodePage {
        CodePage::new(932).unwrap()
    }

    #[test]
    fn narrow_record_round_trip() {
        let data = CompositionStringBuilder::new(Encoding::Narrow, sjis())
            .text(CompStrIndex::CompStr, "aあ")
            .attrs(CompStrIndex::CompAttr, &[0, 1, 1])
            .clauses(CompStrIndex::CompClause, &[0, 3])
            .cursor_pos(3)
            .build();
        let record = CompositionString::new(&data).unwrap();
        assert!(record.validate(Encoding::Narrow).is_ok());
        assert_eq!(record.len(CompStrIndex::CompStr), 3);
        assert_eq!(record.narrow_text(CompStrIndex::CompStr), &[b'a', 0x82, 0xA0]);
        assert_eq!(record.attrs(CompStrIndex::CompAttr), &[0, 1, 1]);
        assert_eq!(record.clauses(CompStrIndex::CompClause), vec![0, 3]);
        assert_eq!(record.cursor_pos(), 3);
        assert_eq!(record.header().size as usize, data.len());
    }

    #[test]
    fn wide_record_counts_code_units() {
        let data = CompositionStringBuilder::new(Encoding::Wide, sjis())
            .text(CompStrIndex::ResultStr, "漢字")
            .build();
        let record = CompositionString::new(&data).unwrap();
        assert!(record.validate(Encoding::Wide).is_ok());
        assert_eq!(record.len(CompStrIndex::ResultStr), 2);
        assert_eq!(
            record.wide_text(CompStrIndex::ResultStr),
            "漢字".encode_utf16().collect::<Vec<_>>()
        );
    }

    #[test]
    fn fields_are_four_byte_aligned() {
        let data = CompositionStringBuilder::new(Encoding::Narrow, sjis())
            .text(CompStrIndex::CompReadStr, "abc")
            .attrs(CompStrIndex::CompAttr, &[0])
            .clauses(CompStrIndex::CompClause, &[0, 1])
            .build();
        let record = CompositionString::new(&data).unwrap();
        for index in LAYOUT {
            let span = record.header().span(index).unwrap();
            assert_eq!(span.offset % 4, 0, "{index:?}");
        }
    }

    #[test]
    fn mismatched_kinds_are_ignored() {
        let data = CompositionStringBuilder::new(Encoding::Narrow, sjis())
            .text(CompStrIndex::CompAttr, "abc")
            .attrs(CompStrIndex::CompStr, &[1, 2])
            .clauses(CompStrIndex::ResultStr, &[1])
            .build();
        let record = CompositionString::new(&data).unwrap();
        assert_eq!(record.len(CompStrIndex::CompAttr), 0);
        assert_eq!(record.len(CompStrIndex::CompStr), 0);
        assert_eq!(record.len(CompStrIndex::ResultStr), 0);
    }

    #[test]
    fn private_area_is_placed() {
        let data = CompositionStringBuilder::new(Encoding::Wide, sjis())
            .private_data(&[1, 2, 3])
            .build();
        let record = CompositionString::new(&data).unwrap();
        assert_eq!(record.private_data(), &[1, 2, 3]);
    }
}
