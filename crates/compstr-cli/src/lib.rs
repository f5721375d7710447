// compstr-cli: shared utilities for CLI tools.

use std::path::Path;
use std::process;

use compstr_core::codepage::CP_ACP;
use compstr_core::{CodePage, Encoding};
use compstr_imc::{ClientConfig, Himc, ImcConfig, ImcTable};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter (e.g. `compstr_imc=trace`).
pub const LOG_ENV: &str = "COMPSTR_LOG";

/// Options shared by every tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommonOptions {
    /// Record is stored as UTF-16 (wide client).
    pub wide_record: bool,
    /// Client code page; `CP_ACP` resolves to the table default.
    pub code_page: u32,
}

impl Default for CommonOptions {
    fn default() -> Self {
        Self {
            wide_record: false,
            code_page: CP_ACP,
        }
    }
}

impl CommonOptions {
    pub fn client(&self) -> ClientConfig {
        ClientConfig {
            wide: self.wide_record,
            code_page: self.code_page,
        }
    }

    pub fn stored_encoding(&self) -> Encoding {
        Encoding::from_wide_flag(self.wide_record)
    }

    /// Resolved code page, with `CP_ACP` mapped the way the table maps it.
    pub fn resolve_code_page(&self) -> Result<CodePage, String> {
        CodePage::resolve(self.code_page, ImcConfig::default().default_ansi_code_page)
            .map_err(|e| e.to_string())
    }
}

/// Parse `--wide-record` and `--code-page N` (or `--code-page=N`).
///
/// Returns `(options, remaining_args)`.
pub fn parse_common(args: &[String]) -> (CommonOptions, Vec<String>) {
    let mut options = CommonOptions::default();
    let mut remaining = Vec::new();
    let mut skip_next = false;

    for (i, arg) in args.iter().enumerate() {
        if skip_next {
            skip_next = false;
            continue;
        }
        if arg == "--wide-record" {
            options.wide_record = true;
        } else if let Some(val) = arg.strip_prefix("--code-page=") {
            options.code_page = parse_code_page(val);
        } else if arg == "--code-page" || arg == "-c" {
            if i + 1 < args.len() {
                options.code_page = parse_code_page(&args[i + 1]);
                skip_next = true;
            } else {
                fatal(&format!("{arg} requires a value"));
            }
        } else {
            remaining.push(arg.clone());
        }
    }

    (options, remaining)
}

fn parse_code_page(val: &str) -> u32 {
    val.parse()
        .unwrap_or_else(|_| fatal(&format!("invalid code page: {val}")))
}

/// Read a record blob and install it on a fresh input context.
pub fn load_record(path: &Path, options: &CommonOptions) -> Result<(ImcTable, Himc), String> {
    let data =
        std::fs::read(path).map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
    let mut table = ImcTable::default();
    let himc = table
        .create_context(options.client())
        .map_err(|e| format!("failed to create input context: {e}"))?;
    table
        .attach_composition_string(himc, data)
        .map_err(|e| format!("{}: {e}", path.display()))?;
    Ok((table, himc))
}

/// Space-separated lowercase hex.
pub fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render text bytes in `encoding` for display.
pub fn display_text(bytes: &[u8], encoding: Encoding, code_page: &CodePage) -> String {
    let units: Vec<u16> = match encoding {
        Encoding::Narrow => code_page.decode(bytes),
        Encoding::Wide => bytes
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect(),
    };
    String::from_utf16_lossy(&units)
}

/// Install a stderr logger filtered by `COMPSTR_LOG` (default: warnings).
pub fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Print an error message and exit with code 1.
pub fn fatal(msg: &str) -> ! {
    eprintln!("error: {msg}");
    process::exit(1);
}

/// Check if `--help` or `-h` is in the args.
pub fn wants_help(args: &[String]) -> bool {
    args.iter().any(|a| a == "--help" || a == "-h")
}
