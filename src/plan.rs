//! Batch edit plans.
//!
//! A plan is a JSON description of a font edit session: the input font, an
//! optional output path, and an ordered list of operations. This gives
//! scripted callers one entry point that mirrors what the CLI flags do one
//! at a time.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::engine::FontEditor;
use crate::error::SvgraftError;

type Result<T> = std::result::Result<T, SvgraftError>;

/// A deserialized edit plan.
#[derive(Debug, Deserialize)]
pub struct EditPlan {
    /// Path of the font to load.
    pub input: String,
    /// Where to write the mutated font; omitted for export-only plans.
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub operations: Vec<EditOp>,
}

/// One step of a plan, applied in order.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum EditOp {
    Embed { glyph: u16, svg: String },
    Remove { glyph: u16 },
    Export { dir: String },
}

/// What a finished plan did.
#[derive(Debug, PartialEq, Eq)]
pub struct PlanSummary {
    pub operations: usize,
    pub exported: usize,
    pub wrote_font: bool,
}

/// Parse a plan from JSON text and run it.
pub fn run_json(json: &str) -> Result<PlanSummary> {
    let plan: EditPlan = serde_json::from_str(json)?;
    run(&plan)
}

/// Run a plan: load the input font, apply each operation in order, then
/// write the result when an output path is set.
pub fn run(plan: &EditPlan) -> Result<PlanSummary> {
    let bytes = fs::read(&plan.input)?;
    let mut editor = FontEditor::load(bytes)?;

    let mut exported = 0;
    for op in &plan.operations {
        match op {
            EditOp::Embed { glyph, svg } => {
                let payload = fs::read(svg)?;
                editor.embed(*glyph, &payload)?;
            }
            EditOp::Remove { glyph } => editor.remove(*glyph)?,
            EditOp::Export { dir } => exported += editor.export(Path::new(dir))?,
        }
    }

    if let Some(output) = &plan.output {
        fs::write(output, editor.bytes())?;
    }
    Ok(PlanSummary {
        operations: plan.operations.len(),
        exported,
        wrote_font: plan.output.is_some(),
    })
}
