// Client and table configuration

use compstr_core::Encoding;
use compstr_core::codepage::{CP_ACP, DEFAULT_ANSI_CODE_PAGE};

/// Settings shared by every input context of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImcConfig {
    /// Code page that `CP_ACP` resolves to.
    pub default_ansi_code_page: u32,
}

impl Default for ImcConfig {
    fn default() -> Self {
        Self {
            default_ansi_code_page: DEFAULT_ANSI_CODE_PAGE,
        }
    }
}

impl ImcConfig {
    pub fn with_default_ansi_code_page(mut self, code_page: u32) -> Self {
        self.default_ansi_code_page = code_page;
        self
    }
}

/// Per-client settings of an input context.
///
/// A wide client stores its composition string as UTF-16; a narrow client
/// stores it in `code_page`. The code page also drives every narrow
/// conversion for the context, whichever way the record is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientConfig {
    pub wide: bool,
    pub code_page: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            wide: false,
            code_page: CP_ACP,
        }
    }
}

impl ClientConfig {
    pub fn narrow(code_page: u32) -> Self {
        Self {
            wide: false,
            code_page,
        }
    }

    pub fn wide(code_page: u32) -> Self {
        Self {
            wide: true,
            code_page,
        }
    }

    /// Encoding the client's composition strings are stored in.
    pub fn encoding(&self) -> Encoding {
        Encoding::from_wide_flag(self.wide)
    }
}
