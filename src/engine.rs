//! # Font Editor
//!
//! The callable surface of the engine: load a font, inspect its family name
//! and editable glyphs, embed/remove SVG documents, export them, and take
//! the current bytes back out.
//!
//! Mutations are staged: each edit runs against a copy of the `FontImage`
//! and is committed only on success, so a failed operation leaves the byte
//! blob exactly as it was.

use std::collections::HashSet;
use std::path::Path;

use log::debug;

use crate::cmap::{self, GlyphModel, CMAP_TAG};
use crate::error::SvgraftError;
use crate::name::{self, NAME_TAG};
use crate::sfnt::FontImage;
use crate::svg::{self, GZIP_MAGIC};

type Result<T> = std::result::Result<T, SvgraftError>;

/// A single loaded font plus the glyph view decoded from it. One editor
/// handles one font; the decoded glyph list is never mutated after load.
pub struct FontEditor {
    image: FontImage,
    family_name: String,
    glyphs: Vec<GlyphModel>,
    known_glyph_ids: HashSet<u16>,
}

impl FontEditor {
    /// Parse the font, decode its character map and family name.
    pub fn load(bytes: Vec<u8>) -> Result<Self> {
        let image = FontImage::parse(bytes)?;

        let cmap_idx = image.find_record(CMAP_TAG).ok_or_else(|| {
            SvgraftError::MalformedFont("required 'cmap' table is missing".into())
        })?;
        let pairs = cmap::decode(image.table_bytes(&image.records()[cmap_idx]))?;
        let known_glyph_ids: HashSet<u16> = pairs.iter().map(|&(_, gid)| gid).collect();
        let glyphs = cmap::editable_glyphs(&pairs);

        let name_idx = image.find_record(NAME_TAG).ok_or_else(|| {
            SvgraftError::MalformedFont("required 'name' table is missing".into())
        })?;
        let family_name = name::family_name(image.table_bytes(&image.records()[name_idx]))?
            .ok_or(SvgraftError::MissingName)?;

        debug!(
            "loaded '{}': {} tables, {} mapped glyphs, {} editable",
            family_name,
            image.offset_table().num_tables,
            known_glyph_ids.len(),
            glyphs.len()
        );
        Ok(FontEditor {
            image,
            family_name,
            glyphs,
            known_glyph_ids,
        })
    }

    pub fn family_name(&self) -> &str {
        &self.family_name
    }

    /// Editable glyphs, deduplicated by glyph id and with control and
    /// whitespace code points filtered out.
    pub fn glyphs(&self) -> &[GlyphModel] {
        &self.glyphs
    }

    /// The current byte blob, suitable for writing to `.otf` or `.ttf`.
    pub fn bytes(&self) -> &[u8] {
        self.image.data()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.image.into_data()
    }

    /// Glyph ids with a stored SVG document.
    pub fn documented_glyphs(&self) -> Result<Vec<u16>> {
        Ok(svg::doc_index(&self.image)?
            .iter()
            .map(|e| e.start_id)
            .collect())
    }

    /// Embed an SVG document for `glyph_id`, replacing any existing one.
    pub fn embed(&mut self, glyph_id: u16, svg_bytes: &[u8]) -> Result<()> {
        if !self.known_glyph_ids.contains(&glyph_id) {
            return Err(SvgraftError::UnknownGlyph(glyph_id));
        }
        if svg_bytes.starts_with(&GZIP_MAGIC) {
            return Err(SvgraftError::UnsupportedFormat);
        }
        let payload = svg::document::rewrite_for_embed(svg_bytes, glyph_id)?;

        let mut staged = self.image.clone();
        svg::embed(&mut staged, glyph_id, &payload)?;
        self.image = staged;
        Ok(())
    }

    /// Remove the SVG document for `glyph_id`; no-op when there is none.
    pub fn remove(&mut self, glyph_id: u16) -> Result<()> {
        let mut staged = self.image.clone();
        svg::remove(&mut staged, glyph_id)?;
        self.image = staged;
        Ok(())
    }

    /// Export every stored document to `out_dir/<glyphId>.svg`. Returns the
    /// number of files written.
    pub fn export(&self, out_dir: &Path) -> Result<usize> {
        svg::export(&self.image, out_dir)
    }
}
