//! # Character Map Decoder
//!
//! Walks the `cmap` table and decodes sub-tables of formats 0, 4, 6, and 12
//! into `(code point, glyph id)` pairs. Other formats are skipped. A code
//! point that maps to an already-seen glyph id is dropped; the editor keys
//! every SVG document by glyph id, so one entry per glyph is enough.
//!
//! The decoder also owns the editable-glyph filter: control characters,
//! spaces, and other invisible code points never show up in the glyph list
//! handed to callers.

use std::collections::HashSet;

use log::debug;
use serde::Serialize;

use crate::codec::{read_i16_array, read_u16, read_u16_array, read_u32, read_u32_array};
use crate::error::SvgraftError;

type Result<T> = std::result::Result<T, SvgraftError>;

pub const CMAP_TAG: [u8; 4] = *b"cmap";

/// One editable glyph as shown to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GlyphModel {
    pub code_point: u32,
    pub glyph_id: u16,
    pub display: String,
}

/// Decode every supported sub-table into `(code point, glyph id)` pairs,
/// deduplicated by glyph id. Errors with `UnsupportedCmap` when no sub-table
/// of format 0, 4, 6, or 12 exists.
pub fn decode(table: &[u8]) -> Result<Vec<(u32, u16)>> {
    let _version = read_u16(table, 0)?;
    let num_subtables = read_u16(table, 2)?;

    let mut pairs = Vec::new();
    let mut seen = HashSet::new();
    let mut supported = false;

    for i in 0..num_subtables as usize {
        let base = 4 + i * 8;
        let _platform_id = read_u16(table, base)?;
        let _encoding_id = read_u16(table, base + 2)?;
        let subtable_start = read_u32(table, base + 4)? as usize;

        let format = read_u16(table, subtable_start)?;
        match format {
            0 => decode_format0(table, subtable_start, &mut pairs, &mut seen)?,
            4 => decode_format4(table, subtable_start, &mut pairs, &mut seen)?,
            6 => decode_format6(table, subtable_start, &mut pairs, &mut seen)?,
            12 => decode_format12(table, subtable_start, &mut pairs, &mut seen)?,
            _ => {
                debug!("skipping cmap sub-table format {}", format);
                continue;
            }
        }
        supported = true;
    }

    if !supported {
        return Err(SvgraftError::UnsupportedCmap);
    }
    Ok(pairs)
}

fn push_pair(pairs: &mut Vec<(u32, u16)>, seen: &mut HashSet<u16>, code: u32, glyph_id: u16) {
    if glyph_id != 0 && seen.insert(glyph_id) {
        pairs.push((code, glyph_id));
    }
}

/// Format 0: 256 bytes of direct code-point to glyph-id mapping.
fn decode_format0(
    table: &[u8],
    start: usize,
    pairs: &mut Vec<(u32, u16)>,
    seen: &mut HashSet<u16>,
) -> Result<()> {
    // format, length, language
    let glyph_ids = crate::codec::read_bytes(table, start + 6, 256)?;
    for (code, &gid) in glyph_ids.iter().enumerate() {
        push_pair(pairs, seen, code as u32, gid as u16);
    }
    Ok(())
}

/// Format 4: segmented-range mapping over the BMP.
fn decode_format4(
    table: &[u8],
    start: usize,
    pairs: &mut Vec<(u32, u16)>,
    seen: &mut HashSet<u16>,
) -> Result<()> {
    let seg_count = read_u16(table, start + 6)? as usize / 2;
    let mut cursor = start + 14;
    let end_count = read_u16_array(table, &mut cursor, seg_count)?;
    let reserved_pad = read_u16(table, cursor)?;
    cursor += 2;
    if reserved_pad != 0 {
        return Err(SvgraftError::MalformedFont(format!(
            "cmap format 4 reserved pad is 0x{:04X}, expected 0",
            reserved_pad
        )));
    }
    let start_count = read_u16_array(table, &mut cursor, seg_count)?;
    let id_delta = read_i16_array(table, &mut cursor, seg_count)?;
    let id_range_offset_start = cursor;
    let id_range_offset = read_u16_array(table, &mut cursor, seg_count)?;

    for i in 0..seg_count {
        if start_count[i] > end_count[i] {
            return Err(SvgraftError::MalformedFont(format!(
                "cmap format 4 segment {} has startCount > endCount",
                i
            )));
        }
        for code in start_count[i]..=end_count[i] {
            if code == 0xFFFF {
                continue;
            }
            let glyph_id = if id_range_offset[i] == 0 {
                code.wrapping_add(id_delta[i] as u16)
            } else {
                let pos = id_range_offset_start
                    + id_range_offset[i] as usize
                    + 2 * i
                    + 2 * (code - start_count[i]) as usize;
                read_u16(table, pos)?
            };
            push_pair(pairs, seen, code as u32, glyph_id);
        }
    }
    Ok(())
}

/// Format 6: trimmed mapping of a contiguous code-point run.
fn decode_format6(
    table: &[u8],
    start: usize,
    pairs: &mut Vec<(u32, u16)>,
    seen: &mut HashSet<u16>,
) -> Result<()> {
    let first_code = read_u16(table, start + 6)?;
    let entry_count = read_u16(table, start + 8)? as usize;
    let mut cursor = start + 10;
    let glyph_ids = read_u16_array(table, &mut cursor, entry_count)?;
    for (i, &gid) in glyph_ids.iter().enumerate() {
        push_pair(pairs, seen, first_code as u32 + i as u32, gid);
    }
    Ok(())
}

/// Format 12: segmented coverage with 32-bit code points.
fn decode_format12(
    table: &[u8],
    start: usize,
    pairs: &mut Vec<(u32, u16)>,
    seen: &mut HashSet<u16>,
) -> Result<()> {
    let n_groups = read_u32(table, start + 12)? as usize;
    let mut cursor = start + 16;
    for _ in 0..n_groups {
        let group = read_u32_array(table, &mut cursor, 3)?;
        let (start_code, end_code, start_glyph) = (group[0], group[1], group[2]);
        if start_code > end_code || end_code > 0x10FFFF {
            return Err(SvgraftError::MalformedFont(
                "cmap format 12 group has an invalid code range".into(),
            ));
        }
        for code in start_code..=end_code {
            let glyph_id = start_glyph + (code - start_code);
            if glyph_id > u16::MAX as u32 {
                break;
            }
            push_pair(pairs, seen, code, glyph_id as u16);
        }
    }
    Ok(())
}

// ─── Editable-glyph filtering ───────────────────────────────────────

/// Code points never exposed as editable glyphs: C0/C1 controls, the many
/// flavors of space, and the BOM.
pub fn is_editable_code_point(code: u32) -> bool {
    !matches!(
        code,
        0x0000..=0x001F
            | 0x007F..=0x00A0
            | 0x2000..=0x200F
            | 0x202F
            | 0x205F
            | 0x3000
            | 0xFEFF
            | 0x0020
    )
}

/// Build the caller-facing glyph list from decoded pairs.
pub fn editable_glyphs(pairs: &[(u32, u16)]) -> Vec<GlyphModel> {
    pairs
        .iter()
        .filter(|(code, _)| is_editable_code_point(*code))
        .filter_map(|&(code, glyph_id)| {
            char::from_u32(code).map(|ch| GlyphModel {
                code_point: code,
                glyph_id,
                display: ch.to_string(),
            })
        })
        .collect()
}
