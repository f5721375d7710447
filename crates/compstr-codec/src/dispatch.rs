// Field dispatcher: materializes one field of a record in the requested encoding.
//
// A single dispatcher serves both output directions. When the requested
// encoding matches the stored one every field is copied raw (scalars pass
// through). Otherwise the field's kind picks the converter:
//
//   Text   -> text transcoder
//   Attr   -> attribute remapper, walking the field's own text
//   Clause -> clause remapper, walking the field's own text
//   Scalar -> offset re-measurement over the composition text

use compstr_core::{CodePage, CompStrIndex, Encoding};

use crate::record::{CompositionString, FieldKind, field_kind, reference_text};
use crate::{QueryError, attr, clause, offset, text};

/// Per-call parameters of a field query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionRequest {
    /// Raw GCS_* field identifier.
    pub index: u32,
    /// Encoding the caller wants the field in.
    pub requested: Encoding,
    /// Encoding the record is stored in.
    pub stored: Encoding,
    /// Code page of the narrow side.
    pub code_page: CodePage,
}

/// Materialize one field into `out`.
///
/// `out` empty is a size probe. Returns the byte count written or required;
/// for the cursor and delta-start scalars the value itself is returned and
/// `out` is not touched. Unknown identifiers fail without writing.
pub fn get_comp_str(
    record: &CompositionString<'_>,
    request: &ConversionRequest,
    out: &mut [u8],
) -> Result<usize, QueryError> {
    let Some(index) = CompStrIndex::from_gcs(request.index) else {
        tracing::warn!(index = request.index, "unknown composition string index");
        return Err(QueryError::UnknownIndex(request.index));
    };
    Ok(get_field(
        record,
        index,
        request.requested,
        request.stored,
        &request.code_page,
        out,
    ))
}

/// Materialize a field as narrow output.
pub fn get_comp_str_a(
    record: &CompositionString<'_>,
    index: u32,
    out: &mut [u8],
    stored: Encoding,
    code_page: CodePage,
) -> Result<usize, QueryError> {
    let request = ConversionRequest {
        index,
        requested: Encoding::Narrow,
        stored,
        code_page,
    };
    get_comp_str(record, &request, out)
}

/// Materialize a field as wide output.
pub fn get_comp_str_w(
    record: &CompositionString<'_>,
    index: u32,
    out: &mut [u8],
    stored: Encoding,
    code_page: CodePage,
) -> Result<usize, QueryError> {
    let request = ConversionRequest {
        index,
        requested: Encoding::Wide,
        stored,
        code_page,
    };
    get_comp_str(record, &request, out)
}

/// Typed form of [`get_comp_str`].
pub fn get_field(
    record: &CompositionString<'_>,
    index: CompStrIndex,
    requested: Encoding,
    stored: Encoding,
    code_page: &CodePage,
    out: &mut [u8],
) -> usize {
    let kind = field_kind(index);
    if requested == stored {
        return match kind {
            FieldKind::Scalar => record.scalar(index).unwrap_or(0) as usize,
            _ => text::copy_raw(record.bytes(index, stored), out),
        };
    }

    let reference = reference_text(index);
    match (kind, stored) {
        (FieldKind::Text, Encoding::Wide) => {
            text::wide_to_narrow(&record.wide_text(index), out, code_page)
        }
        (FieldKind::Text, Encoding::Narrow) => {
            text::narrow_to_wide(record.narrow_text(index), out, code_page)
        }
        (FieldKind::Attr, Encoding::Wide) => attr::wide_to_narrow(
            record.attrs(index),
            &record.wide_text(reference),
            out,
            code_page,
        ),
        (FieldKind::Attr, Encoding::Narrow) => attr::narrow_to_wide(
            record.attrs(index),
            record.narrow_text(reference),
            out,
            code_page,
        ),
        (FieldKind::Clause, Encoding::Wide) => clause::wide_to_narrow(
            record.bytes(index, stored),
            &record.wide_text(reference),
            out,
            code_page,
        ),
        (FieldKind::Clause, Encoding::Narrow) => clause::narrow_to_wide(
            record.bytes(index, stored),
            record.narrow_text(reference),
            out,
            code_page,
        ),
        (FieldKind::Scalar, Encoding::Wide) => {
            let value = record.scalar(index).unwrap_or(0);
            offset::narrow_from_wide(value, &record.wide_text(reference), code_page) as usize
        }
        (FieldKind::Scalar, Encoding::Narrow) => {
            let value = record.scalar(index).unwrap_or(0);
            offset::wide_from_narrow(value, record.narrow_text(reference), code_page) as usize
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::CompositionStringBuilder;
    use compstr_core::enums::*;

    fn sjis() -> CodePage {
        CodePage::new(932).unwrap()
    }

    fn wide_record() -> Vec<u8> {
        CompositionStringBuilder::new(Encoding::Wide, sjis())
            .text(CompStrIndex::CompStr, "aかな")
            .attrs(CompStrIndex::CompAttr, &[ATTR_INPUT, ATTR_CONVERTED, ATTR_CONVERTED])
            .clauses(CompStrIndex::CompClause, &[0, 1, 3])
            .text(CompStrIndex::CompReadStr, "aかな")
            .attrs(CompStrIndex::CompReadAttr, &[ATTR_INPUT, ATTR_INPUT, ATTR_INPUT])
            .clauses(CompStrIndex::CompReadClause, &[0, 3])
            .text(CompStrIndex::ResultStr, "漢")
            .clauses(CompStrIndex::ResultClause, &[0, 1])
            .cursor_pos(2)
            .delta_start(1)
            .build()
    }

    fn narrow_record() -> Vec<u8> {
        CompositionStringBuilder::new(Encoding::Narrow, sjis())
            .text(CompStrIndex::CompStr, "aかな")
            .attrs(CompStrIndex::CompAttr, &[0, 2, 2, 2, 2])
            .clauses(CompStrIndex::CompClause, &[0, 1, 5])
            .text(CompStrIndex::ResultReadStr, "かん")
            .cursor_pos(3)
            .delta_start(5)
            .build()
    }

    fn query(data: &[u8], index: u32, requested: Encoding, stored: Encoding, out: &mut [u8]) -> usize {
        let record = CompositionString::new(data).unwrap();
        let request = ConversionRequest {
            index,
            requested,
            stored,
            code_page: sjis(),
        };
        get_comp_str(&record, &request, out).unwrap()
    }

    #[test]
    fn unknown_index_is_general_error() {
        let data = wide_record();
        let record = CompositionString::new(&data).unwrap();
        let mut out = [0xAAu8; 8];
        let err = get_comp_str_a(&record, 0x4000, &mut out, Encoding::Wide, sjis()).unwrap_err();
        assert_eq!(err, QueryError::UnknownIndex(0x4000));
        assert_eq!(err.code(), IMM_ERROR_GENERAL);
        let err = get_comp_str_w(&record, 0, &mut out, Encoding::Wide, sjis()).unwrap_err();
        assert_eq!(err.code(), IMM_ERROR_GENERAL);
        assert_eq!(out, [0xAA; 8]);
    }

    #[test]
    fn wide_text_as_narrow() {
        let data = wide_record();
        let mut probe: [u8; 0] = [];
        assert_eq!(query(&data, GCS_COMPSTR, Encoding::Narrow, Encoding::Wide, &mut probe), 5);
        let mut out = [0xFFu8; 6];
        assert_eq!(query(&data, GCS_COMPSTR, Encoding::Narrow, Encoding::Wide, &mut out), 5);
        assert_eq!(out, [b'a', 0x82, 0xA9, 0x82, 0xC8, 0]);
    }

    #[test]
    fn wide_attrs_as_narrow() {
        let data = wide_record();
        let mut out = [0xFFu8; 5];
        assert_eq!(query(&data, GCS_COMPATTR, Encoding::Narrow, Encoding::Wide, &mut out), 5);
        assert_eq!(out, [ATTR_INPUT, ATTR_CONVERTED, ATTR_CONVERTED, ATTR_CONVERTED, ATTR_CONVERTED]);
    }

    #[test]
    fn wide_clauses_as_narrow() {
        let data = wide_record();
        let mut out = [0u8; 12];
        assert_eq!(query(&data, GCS_COMPCLAUSE, Encoding::Narrow, Encoding::Wide, &mut out), 12);
        let values: Vec<u32> = out
            .chunks_exact(4)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        assert_eq!(values, vec![0, 1, 5]);
    }

    #[test]
    fn result_clause_measures_result_text() {
        let data = wide_record();
        let mut out = [0u8; 8];
        assert_eq!(query(&data, GCS_RESULTCLAUSE, Encoding::Narrow, Encoding::Wide, &mut out), 8);
        assert_eq!(&out[4..], &2u32.to_le_bytes());
    }

    #[test]
    fn scalars_remapped_across_encodings() {
        let data = wide_record();
        let mut out: [u8; 0] = [];
        // cursor after "aか" = 1 + 2 bytes
        assert_eq!(query(&data, GCS_CURSORPOS, Encoding::Narrow, Encoding::Wide, &mut out), 3);
        assert_eq!(query(&data, GCS_DELTASTART, Encoding::Narrow, Encoding::Wide, &mut out), 1);
        assert_eq!(query(&data, GCS_CURSORPOS, Encoding::Wide, Encoding::Wide, &mut out), 2);

        let data = narrow_record();
        assert_eq!(query(&data, GCS_CURSORPOS, Encoding::Wide, Encoding::Narrow, &mut out), 2);
        assert_eq!(query(&data, GCS_DELTASTART, Encoding::Wide, Encoding::Narrow, &mut out), 3);
        assert_eq!(query(&data, GCS_DELTASTART, Encoding::Narrow, Encoding::Narrow, &mut out), 5);
    }

    #[test]
    fn narrow_fields_as_wide() {
        let data = narrow_record();
        let mut probe: [u8; 0] = [];
        assert_eq!(query(&data, GCS_COMPSTR, Encoding::Wide, Encoding::Narrow, &mut probe), 6);
        assert_eq!(query(&data, GCS_COMPATTR, Encoding::Wide, Encoding::Narrow, &mut probe), 3);
        assert_eq!(query(&data, GCS_COMPCLAUSE, Encoding::Wide, Encoding::Narrow, &mut probe), 12);

        let mut attrs = [0xFFu8; 3];
        assert_eq!(query(&data, GCS_COMPATTR, Encoding::Wide, Encoding::Narrow, &mut attrs), 3);
        assert_eq!(attrs, [0, 2, 2]);

        let mut clauses = [0u8; 12];
        query(&data, GCS_COMPCLAUSE, Encoding::Wide, Encoding::Narrow, &mut clauses);
        assert_eq!(&clauses[8..], &3u32.to_le_bytes());

        let mut text_out = [0u8; 8];
        assert_eq!(query(&data, GCS_RESULTREADSTR, Encoding::Wide, Encoding::Narrow, &mut text_out), 4);
        assert_eq!(&text_out[..4], &[0x4B, 0x30, 0x93, 0x30]);
    }

    #[test]
    fn same_encoding_copies_raw_without_terminator() {
        let data = wide_record();
        let mut probe: [u8; 0] = [];
        assert_eq!(query(&data, GCS_COMPSTR, Encoding::Wide, Encoding::Wide, &mut probe), 6);
        let mut out = [0xFFu8; 8];
        assert_eq!(query(&data, GCS_COMPSTR, Encoding::Wide, Encoding::Wide, &mut out), 6);
        assert_eq!(&out[6..], &[0xFF, 0xFF]);
        let mut small = [0xFFu8; 3];
        assert_eq!(query(&data, GCS_COMPSTR, Encoding::Wide, Encoding::Wide, &mut small), 3);
    }

    #[test]
    fn empty_fields_return_zero_everywhere() {
        let data = wide_record();
        for index in [GCS_RESULTREADSTR, GCS_RESULTREADCLAUSE] {
            for requested in [Encoding::Narrow, Encoding::Wide] {
                let mut probe: [u8; 0] = [];
                assert_eq!(query(&data, index, requested, Encoding::Wide, &mut probe), 0);
                let mut out = [0u8; 16];
                assert_eq!(query(&data, index, requested, Encoding::Wide, &mut out), 0);
            }
        }
        let data = narrow_record();
        for requested in [Encoding::Narrow, Encoding::Wide] {
            let mut out = [0u8; 16];
            assert_eq!(query(&data, GCS_COMPREADATTR, requested, Encoding::Narrow, &mut out), 0);
            assert_eq!(query(&data, GCS_RESULTCLAUSE, requested, Encoding::Narrow, &mut out), 0);
        }
    }

    #[test]
    fn clause_probe_ignores_partial_entries() {
        let data = CompositionStringBuilder::new(Encoding::Wide, sjis())
            .text(CompStrIndex::CompStr, "ab")
            .raw(CompStrIndex::CompClause, &[0, 0, 0, 0, 2, 0], 6)
            .build();
        let mut probe: [u8; 0] = [];
        assert_eq!(query(&data, GCS_COMPCLAUSE, Encoding::Narrow, Encoding::Wide, &mut probe), 6);
        let mut out = [0u8; 6];
        assert_eq!(query(&data, GCS_COMPCLAUSE, Encoding::Narrow, Encoding::Wide, &mut out), 4);
    }
}
