//! # svgraft
//!
//! A byte-level editor for SVG glyph documents inside OpenType/TrueType
//! fonts.
//!
//! Most font tooling treats a font as a bag of decoded tables and
//! re-serializes the whole file on save. svgraft does the opposite: **the
//! byte blob is the document.** Every edit is a surgical splice of the one
//! table that changed, followed by the bookkeeping the container demands:
//! shifted directory offsets, re-sorted records, 4-byte padding, per-table
//! checksums, and `head.checkSumAdjustment`. Everything the engine does not
//! touch stays byte-identical.
//!
//! ## Architecture
//!
//! ```text
//! Input (font bytes)
//!       ↓
//!   [sfnt]     — offset table + table records, FontImage blob surgery
//!       ↓
//!   [cmap]     — code point → glyph id pairs (formats 0/4/6/12)
//!   [name]     — family name (nameID 1)
//!       ↓
//!   [engine]   — FontEditor: embed / remove / export / bytes
//!       ↓
//!   [svg]      — 'SVG ' table edits + payload viewBox/id rewriting
//! ```

pub mod cmap;
pub mod codec;
pub mod engine;
pub mod error;
pub mod name;
pub mod plan;
pub mod sfnt;
pub mod svg;

pub use cmap::GlyphModel;
pub use engine::FontEditor;
pub use error::SvgraftError;

/// Load a font and return an editor for it.
///
/// This is the primary entry point. Takes the raw bytes of an `.otf` or
/// `.ttf` file and returns an editor exposing the family name, the editable
/// glyph list, and the mutation operations.
pub fn load(bytes: Vec<u8>) -> Result<FontEditor, SvgraftError> {
    FontEditor::load(bytes)
}
