// compstr-dump: Print fields of a composition-string record.
//
// Loads a record blob from FILE into an input context and queries FIELD
// through the same entry points a client would use: first a size probe,
// then a read into a buffer of exactly that size.
//
// Usage:
//   compstr-dump [--wide-record] [--code-page N] [--wide|--narrow] FIELD FILE
//
// Options:
//   --wide-record        Record is stored as UTF-16 (default: narrow)
//   -c, --code-page N    Client code page (default: 0, the ANSI code page)
//   --wide               Request wide output
//   --narrow             Request narrow output (default)
//   -h, --help           Print help
//
// FIELD is a field name (compstr, GCS_COMPATTR, ...) or `all`.

use std::io::{self, Write};
use std::path::PathBuf;

use compstr_codec::record::{FieldKind, field_kind};
use compstr_core::{CompStrIndex, Encoding};
use compstr_imc::{Himc, ImcTable};

fn main() {
    compstr_cli::init_logging();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (options, args) = compstr_cli::parse_common(&args);

    if compstr_cli::wants_help(&args) {
        println!("compstr-dump: Print fields of a composition-string record.");
        println!();
        println!("Usage: compstr-dump [--wide-record] [--code-page N] [--wide|--narrow] FIELD FILE");
        println!();
        println!("FIELD is a field name (compstr, compattr, cursorpos, ...) or `all`.");
        println!();
        println!("Options:");
        println!("  --wide-record        Record is stored as UTF-16 (default: narrow)");
        println!("  -c, --code-page N    Client code page (default: 0, the ANSI code page)");
        println!("  --wide               Request wide output");
        println!("  --narrow             Request narrow output (default)");
        println!("  -h, --help           Print this help");
        println!();
        println!("Set COMPSTR_LOG (e.g. COMPSTR_LOG=trace) to see query logs.");
        return;
    }

    let mut output = Encoding::Narrow;
    let mut positional: Vec<&str> = Vec::new();
    for arg in &args {
        match arg.as_str() {
            "--wide" => output = Encoding::Wide,
            "--narrow" => output = Encoding::Narrow,
            s if s.starts_with('-') => compstr_cli::fatal(&format!("unknown option: {s}")),
            s => positional.push(s),
        }
    }
    let [field, file] = positional[..] else {
        compstr_cli::fatal("expected FIELD and FILE (see --help)");
    };

    let fields: Vec<CompStrIndex> = if field.eq_ignore_ascii_case("all") {
        CompStrIndex::ALL.to_vec()
    } else {
        match CompStrIndex::from_name(field) {
            Some(index) => vec![index],
            None => compstr_cli::fatal(&format!("unknown field: {field}")),
        }
    };

    let code_page = options
        .resolve_code_page()
        .unwrap_or_else(|e| compstr_cli::fatal(&e));
    let (table, himc) = compstr_cli::load_record(&PathBuf::from(file), &options)
        .unwrap_or_else(|e| compstr_cli::fatal(&e));

    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());

    for index in fields {
        let needed = get(&table, himc, output, index, &mut []);
        if needed < 0 {
            compstr_cli::fatal(&format!("{}: query failed ({needed})", index.name()));
        }

        if field_kind(index) == FieldKind::Scalar {
            let _ = writeln!(out, "{}: {needed}", index.name());
            continue;
        }

        let mut buf = vec![0u8; needed as usize];
        let written = get(&table, himc, output, index, &mut buf).max(0) as usize;
        buf.truncate(written);

        let _ = writeln!(out, "{}: {needed} bytes", index.name());
        if !buf.is_empty() {
            let _ = writeln!(out, "  hex:  {}", compstr_cli::hex(&buf));
        }
        if field_kind(index) == FieldKind::Text && !buf.is_empty() {
            let text = compstr_cli::display_text(&buf, output, &code_page);
            let _ = writeln!(out, "  text: {text}");
        }
    }
}

fn get(table: &ImcTable, himc: Himc, output: Encoding, index: CompStrIndex, buf: &mut [u8]) -> i32 {
    match output {
        Encoding::Narrow => table.get_composition_string_a(himc, index.gcs(), buf),
        Encoding::Wide => table.get_composition_string_w(himc, index.gcs(), buf),
    }
}
