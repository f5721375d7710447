// compstr-build: Write a composition-string record blob.
//
// Builds a record stored in the requested encoding from text arguments.
// Attribute arrays get one entry per stored character; the composition
// clause table defaults to a single clause over the whole text.
//
// Usage:
//   compstr-build [--wide-record] [--code-page N] [OPTIONS] OUT
//
// Options:
//   --wide-record        Store the record as UTF-16 (default: narrow)
//   -c, --code-page N    Client code page (default: 0, the ANSI code page)
//   --comp TEXT          Composition text
//   --comp-read TEXT     Composition reading text
//   --result TEXT        Result text
//   --result-read TEXT   Result reading text
//   --attr N             Attribute value for every composition character (default: 0)
//   --clauses LIST       Composition clause boundaries, comma-separated
//   --cursor N           Cursor position (default: end of composition text)
//   --delta N            Delta start (default: 0)
//   -h, --help           Print help

use compstr_codec::CompositionStringBuilder;
use compstr_codec::record::CompositionString;
use compstr_core::enums::ATTR_INPUT;
use compstr_core::{CompStrIndex, Encoding};

fn main() {
    compstr_cli::init_logging();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (options, args) = compstr_cli::parse_common(&args);

    if compstr_cli::wants_help(&args) {
        println!("compstr-build: Write a composition-string record blob.");
        println!();
        println!("Usage: compstr-build [--wide-record] [--code-page N] [OPTIONS] OUT");
        println!();
        println!("Options:");
        println!("  --wide-record        Store the record as UTF-16 (default: narrow)");
        println!("  -c, --code-page N    Client code page (default: 0, the ANSI code page)");
        println!("  --comp TEXT          Composition text");
        println!("  --comp-read TEXT     Composition reading text");
        println!("  --result TEXT        Result text");
        println!("  --result-read TEXT   Result reading text");
        println!("  --attr N             Attribute for every composition character (default: 0)");
        println!("  --clauses LIST       Composition clause boundaries, comma-separated");
        println!("  --cursor N           Cursor position (default: end of composition text)");
        println!("  --delta N            Delta start (default: 0)");
        println!("  -h, --help           Print this help");
        return;
    }

    let mut texts: Vec<(CompStrIndex, String)> = Vec::new();
    let mut attr = ATTR_INPUT;
    let mut clauses: Option<Vec<u32>> = None;
    let mut cursor: Option<u32> = None;
    let mut delta = 0u32;
    let mut out_path: Option<String> = None;
    let mut skip_next = false;

    for (i, arg) in args.iter().enumerate() {
        if skip_next {
            skip_next = false;
            continue;
        }
        let value = || option_value(&args, i, arg);
        match arg.as_str() {
            "--comp" => texts.push((CompStrIndex::CompStr, value().to_string())),
            "--comp-read" => texts.push((CompStrIndex::CompReadStr, value().to_string())),
            "--result" => texts.push((CompStrIndex::ResultStr, value().to_string())),
            "--result-read" => texts.push((CompStrIndex::ResultReadStr, value().to_string())),
            "--attr" => attr = parse_number(arg, value()) as u8,
            "--clauses" => {
                let list = value()
                    .split(',')
                    .filter(|s| !s.is_empty())
                    .map(|s| parse_number(arg, s))
                    .collect();
                clauses = Some(list);
            }
            "--cursor" => cursor = Some(parse_number(arg, value())),
            "--delta" => delta = parse_number(arg, value()),
            s if s.starts_with('-') => compstr_cli::fatal(&format!("unknown option: {s}")),
            s => {
                out_path = Some(s.to_string());
                continue;
            }
        }
        skip_next = true;
    }

    let Some(out_path) = out_path else {
        compstr_cli::fatal("expected OUT (see --help)");
    };
    let code_page = options
        .resolve_code_page()
        .unwrap_or_else(|e| compstr_cli::fatal(&e));
    let encoding = options.stored_encoding();

    let mut builder = CompositionStringBuilder::new(encoding, code_page);
    for (index, text) in &texts {
        builder = builder.text(*index, text);
    }

    // Stored character counts decide attribute lengths and default offsets.
    let draft = builder.build();
    let record =
        CompositionString::new(&draft).unwrap_or_else(|e| compstr_cli::fatal(&e.to_string()));
    let comp_len = record.len(CompStrIndex::CompStr) as u32;
    let comp_read_len = record.len(CompStrIndex::CompReadStr);

    if comp_len > 0 {
        builder = builder
            .attrs(CompStrIndex::CompAttr, &vec![attr; comp_len as usize])
            .clauses(
                CompStrIndex::CompClause,
                &clauses.unwrap_or_else(|| vec![0, comp_len]),
            );
    }
    if comp_read_len > 0 {
        builder = builder
            .attrs(CompStrIndex::CompReadAttr, &vec![ATTR_INPUT; comp_read_len])
            .clauses(CompStrIndex::CompReadClause, &[0, comp_read_len as u32]);
    }
    let data = builder
        .cursor_pos(cursor.unwrap_or(comp_len))
        .delta_start(delta)
        .build();

    std::fs::write(&out_path, &data)
        .unwrap_or_else(|e| compstr_cli::fatal(&format!("failed to write {out_path}: {e}")));

    let kind = match encoding {
        Encoding::Narrow => "narrow",
        Encoding::Wide => "wide",
    };
    println!("{out_path}: {} bytes, {kind} record, code page {}", data.len(), code_page.id());
}

fn option_value<'a>(args: &'a [String], i: usize, option: &str) -> &'a str {
    args.get(i + 1)
        .map(String::as_str)
        .unwrap_or_else(|| compstr_cli::fatal(&format!("{option} requires a value")))
}

fn parse_number(option: &str, val: &str) -> u32 {
    val.trim()
        .parse()
        .unwrap_or_else(|_| compstr_cli::fatal(&format!("invalid number for {option}: {val}")))
}
