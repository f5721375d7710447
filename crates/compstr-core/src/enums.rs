// Shared enums: CompStrIndex, Encoding, attribute values, error sentinels

/// Text encoding of a composition string or of a client's requested output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// 8-bit text in a legacy code page ("ANSI"). Some characters take two bytes.
    Narrow,
    /// 16-bit UTF-16 code units.
    Wide,
}

impl Encoding {
    /// Size in bytes of one code unit (and of the terminator) in this encoding.
    #[inline]
    pub fn unit_size(self) -> usize {
        match self {
            Encoding::Narrow => 1,
            Encoding::Wide => 2,
        }
    }

    /// Encoding used by a client registered with the given wide flag.
    pub fn from_wide_flag(wide: bool) -> Self {
        if wide { Encoding::Wide } else { Encoding::Narrow }
    }
}

// ---------------------------------------------------------------------------
// Field identifiers (GCS_*)
// ---------------------------------------------------------------------------

pub const GCS_COMPREADSTR: u32 = 0x0001;
pub const GCS_COMPREADATTR: u32 = 0x0002;
pub const GCS_COMPREADCLAUSE: u32 = 0x0004;
pub const GCS_COMPSTR: u32 = 0x0008;
pub const GCS_COMPATTR: u32 = 0x0010;
pub const GCS_COMPCLAUSE: u32 = 0x0020;
pub const GCS_CURSORPOS: u32 = 0x0080;
pub const GCS_DELTASTART: u32 = 0x0100;
pub const GCS_RESULTREADSTR: u32 = 0x0200;
pub const GCS_RESULTREADCLAUSE: u32 = 0x0400;
pub const GCS_RESULTSTR: u32 = 0x0800;
pub const GCS_RESULTCLAUSE: u32 = 0x1000;

/// A queryable field of a composition string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompStrIndex {
    CompReadStr,
    CompReadAttr,
    CompReadClause,
    CompStr,
    CompAttr,
    CompClause,
    CursorPos,
    DeltaStart,
    ResultReadStr,
    ResultReadClause,
    ResultStr,
    ResultClause,
}

impl CompStrIndex {
    /// Every queryable field, in header order.
    pub const ALL: [CompStrIndex; 12] = [
        CompStrIndex::CompReadStr,
        CompStrIndex::CompReadAttr,
        CompStrIndex::CompReadClause,
        CompStrIndex::CompStr,
        CompStrIndex::CompAttr,
        CompStrIndex::CompClause,
        CompStrIndex::CursorPos,
        CompStrIndex::DeltaStart,
        CompStrIndex::ResultReadStr,
        CompStrIndex::ResultReadClause,
        CompStrIndex::ResultStr,
        CompStrIndex::ResultClause,
    ];

    /// Map a raw GCS_* value to a field. Combined flags and unknown bits yield `None`.
    pub fn from_gcs(value: u32) -> Option<Self> {
        let index = match value {
            GCS_COMPREADSTR => CompStrIndex::CompReadStr,
            GCS_COMPREADATTR => CompStrIndex::CompReadAttr,
            GCS_COMPREADCLAUSE => CompStrIndex::CompReadClause,
            GCS_COMPSTR => CompStrIndex::CompStr,
            GCS_COMPATTR => CompStrIndex::CompAttr,
            GCS_COMPCLAUSE => CompStrIndex::CompClause,
            GCS_CURSORPOS => CompStrIndex::CursorPos,
            GCS_DELTASTART => CompStrIndex::DeltaStart,
            GCS_RESULTREADSTR => CompStrIndex::ResultReadStr,
            GCS_RESULTREADCLAUSE => CompStrIndex::ResultReadClause,
            GCS_RESULTSTR => CompStrIndex::ResultStr,
            GCS_RESULTCLAUSE => CompStrIndex::ResultClause,
            _ => return None,
        };
        Some(index)
    }

    /// The raw GCS_* value of this field.
    pub fn gcs(self) -> u32 {
        match self {
            CompStrIndex::CompReadStr => GCS_COMPREADSTR,
            CompStrIndex::CompReadAttr => GCS_COMPREADATTR,
            CompStrIndex::CompReadClause => GCS_COMPREADCLAUSE,
            CompStrIndex::CompStr => GCS_COMPSTR,
            CompStrIndex::CompAttr => GCS_COMPATTR,
            CompStrIndex::CompClause => GCS_COMPCLAUSE,
            CompStrIndex::CursorPos => GCS_CURSORPOS,
            CompStrIndex::DeltaStart => GCS_DELTASTART,
            CompStrIndex::ResultReadStr => GCS_RESULTREADSTR,
            CompStrIndex::ResultReadClause => GCS_RESULTREADCLAUSE,
            CompStrIndex::ResultStr => GCS_RESULTSTR,
            CompStrIndex::ResultClause => GCS_RESULTCLAUSE,
        }
    }

    /// Parse a field name as printed by tools: `compstr`, `GCS_COMPSTR` and
    /// `CompStr` are all accepted.
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        let bare = lower.strip_prefix("gcs_").unwrap_or(&lower);
        Self::ALL
            .into_iter()
            .find(|index| index.name().eq_ignore_ascii_case(bare))
    }

    /// Short lowercase name, e.g. `compreadstr`.
    pub fn name(self) -> &'static str {
        match self {
            CompStrIndex::CompReadStr => "compreadstr",
            CompStrIndex::CompReadAttr => "compreadattr",
            CompStrIndex::CompReadClause => "compreadclause",
            CompStrIndex::CompStr => "compstr",
            CompStrIndex::CompAttr => "compattr",
            CompStrIndex::CompClause => "compclause",
            CompStrIndex::CursorPos => "cursorpos",
            CompStrIndex::DeltaStart => "deltastart",
            CompStrIndex::ResultReadStr => "resultreadstr",
            CompStrIndex::ResultReadClause => "resultreadclause",
            CompStrIndex::ResultStr => "resultstr",
            CompStrIndex::ResultClause => "resultclause",
        }
    }
}

// ---------------------------------------------------------------------------
// Attribute values
// ---------------------------------------------------------------------------

/// Character being entered, not yet converted.
pub const ATTR_INPUT: u8 = 0x00;
/// Selected and converted.
pub const ATTR_TARGET_CONVERTED: u8 = 0x01;
/// Converted, not selected.
pub const ATTR_CONVERTED: u8 = 0x02;
/// Selected, not yet converted.
pub const ATTR_TARGET_NOTCONVERTED: u8 = 0x03;
/// Entered but rejected by the IME.
pub const ATTR_INPUT_ERROR: u8 = 0x04;
/// Converted and fixed.
pub const ATTR_FIXEDCONVERTED: u8 = 0x05;

// ---------------------------------------------------------------------------
// Error sentinels returned by the field-query entry points
// ---------------------------------------------------------------------------

/// The requested data is not available.
pub const IMM_ERROR_NODATA: i32 = -1;
/// Unrecognized field identifier or other general failure.
pub const IMM_ERROR_GENERAL: i32 = -2;
