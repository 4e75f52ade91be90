//! # svgraft CLI
//!
//! Usage:
//!   svgraft font.otf --list [--json]
//!   svgraft font.otf --embed 65 glyph.svg -o out.otf
//!   svgraft font.otf --remove 65 -o out.otf
//!   svgraft font.otf --export exported/
//!   svgraft --plan plan.json

use std::env;
use std::fs;
use std::path::Path;
use std::process;

use log::{LevelFilter, Metadata, Record};

use svgraft::FontEditor;

struct StderrLogger;

impl log::Log for StderrLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        eprintln!("[{}] {} {}", record.level(), record.target(), record.args());
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();

    if args.is_empty() || args.iter().any(|a| a == "--help") {
        print_usage();
        return;
    }

    if args.iter().any(|a| a == "--verbose") {
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(LevelFilter::Debug);
        }
    }

    match run(&args) {
        Ok(()) => {}
        Err(e) => {
            eprintln!("✗ {}", e);
            process::exit(1);
        }
    }
}

fn run(args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    // Plan mode stands alone: everything comes from the plan file.
    if let Some(plan_path) = flag_value(args, "--plan") {
        let json = fs::read_to_string(plan_path)?;
        let summary = svgraft::plan::run_json(&json)?;
        eprintln!(
            "✓ Ran {} operation(s), exported {} document(s)",
            summary.operations, summary.exported
        );
        return Ok(());
    }

    let font_path = args
        .iter()
        .find(|&a| !a.starts_with('-') && !is_flag_operand(args, a))
        .ok_or("no font file given (try --help)")?;
    let bytes = fs::read(font_path)?;
    let mut editor = FontEditor::load(bytes)?;
    let mut mutated = false;

    if let Some(gid) = flag_value(args, "--embed") {
        let glyph: u16 = gid.parse()?;
        let svg_path = second_flag_value(args, "--embed").ok_or("--embed needs GID and FILE")?;
        let svg = fs::read(svg_path)?;
        editor.embed(glyph, &svg)?;
        eprintln!("✓ Embedded {} for glyph {}", svg_path, glyph);
        mutated = true;
    }

    if let Some(gid) = flag_value(args, "--remove") {
        let glyph: u16 = gid.parse()?;
        editor.remove(glyph)?;
        eprintln!("✓ Removed document for glyph {}", glyph);
        mutated = true;
    }

    if let Some(dir) = flag_value(args, "--export") {
        fs::create_dir_all(dir)?;
        let count = editor.export(Path::new(dir))?;
        eprintln!("✓ Exported {} document(s) to {}", count, dir);
    }

    if args.iter().any(|a| a == "--list") {
        list_glyphs(&editor, args.iter().any(|a| a == "--json"))?;
    }

    if mutated {
        let output = flag_value(args, "-o").map(String::as_str).unwrap_or("output.otf");
        fs::write(output, editor.bytes())?;
        eprintln!("✓ Written {} bytes to {}", editor.bytes().len(), output);
    }

    Ok(())
}

fn list_glyphs(editor: &FontEditor, as_json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(editor.glyphs())?);
        return Ok(());
    }
    let documented = editor.documented_glyphs()?;
    println!("{}", editor.family_name());
    for glyph in editor.glyphs() {
        let marker = if documented.contains(&glyph.glyph_id) {
            " [svg]"
        } else {
            ""
        };
        println!(
            "  U+{:04X} {} -> glyph {}{}",
            glyph.code_point, glyph.display, glyph.glyph_id, marker
        );
    }
    Ok(())
}

/// The operand right after `flag`, if present.
fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a String> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| &w[1])
}

/// The second operand after `flag` (for flags taking two values).
fn second_flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a String> {
    args.windows(3).find(|w| w[0] == flag).map(|w| &w[2])
}

/// True when `arg` is consumed as an operand of some flag.
fn is_flag_operand(args: &[String], arg: &String) -> bool {
    for (i, a) in args.iter().enumerate() {
        let operands = match a.as_str() {
            "--embed" => 2,
            "--remove" | "--export" | "--plan" | "-o" => 1,
            _ => 0,
        };
        for j in 1..=operands {
            if let Some(operand) = args.get(i + j) {
                if std::ptr::eq(operand, arg) {
                    return true;
                }
            }
        }
    }
    false
}

fn print_usage() {
    eprintln!(
        "svgraft: embed, remove, and extract SVG glyph documents in OpenType fonts

Usage:
  svgraft <font> --list [--json]        list editable glyphs
  svgraft <font> --embed GID FILE       embed FILE as the document for GID
  svgraft <font> --remove GID           remove the document for GID
  svgraft <font> --export DIR           write every document to DIR/<gid>.svg
  svgraft --plan plan.json              run a JSON edit plan

Options:
  -o FILE      output path for mutated fonts (default: output.otf)
  --verbose    log engine bookkeeping to stderr
  --help       show this help"
    );
}
