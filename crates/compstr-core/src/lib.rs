//! Shared vocabulary for IME composition-string codecs.
//!
//! - [`enums`] -- field identifiers, text encodings, attribute values, error sentinels
//! - [`codepage`] -- legacy code pages: lead-byte classification and UTF-16 conversion

pub mod codepage;
pub mod enums;

pub use codepage::{CodePage, CodePageError};
pub use enums::{CompStrIndex, Encoding};
