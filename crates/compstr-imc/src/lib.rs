//! Input contexts and the composition-string query entry points.
//!
//! An [`ImcTable`] owns every input context of a process, keyed by an opaque
//! [`Himc`] handle. Each context remembers how its client wants text
//! (narrow or wide, and which code page) and holds at most one
//! composition-string record. The two query entry points resolve the handle,
//! pick the stored encoding from the client, and hand the record to the
//! codec.

pub mod config;
pub mod context;
pub mod table;

pub use config::{ClientConfig, ImcConfig};
pub use context::InputContext;
pub use table::{Himc, ImcTable};

use compstr_codec::FormatError;
use compstr_core::CodePageError;

/// Error type for input-context operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImcError {
    #[error("unknown input context {0}")]
    UnknownContext(Himc),
    #[error("input context {0} has no composition string")]
    NoCompositionString(Himc),
    #[error("no free input context handles")]
    Exhausted,
    #[error(transparent)]
    CodePage(#[from] CodePageError),
    #[error("invalid composition string: {0}")]
    Format(#[from] FormatError),
}
