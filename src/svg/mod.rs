//! # SVG Table Editor
//!
//! Byte-level edits of the `SVG ` table: add, replace, or remove the
//! document associated with a glyph id, creating the table when the font
//! has none. Every edit keeps the container coherent: document-index
//! offsets, the table record's length, inter-table padding, trailing table
//! offsets, the table checksum, and `head.checkSumAdjustment`.
//!
//! Table layout:
//!
//! ```text
//! [main header : 10 bytes]   version u16, docIndexOffset u32, reserved u32
//! [document index]           numEntries u16, then 12-byte entries
//! [document payloads]        contiguous, in startId order
//! ```
//!
//! Entry `docOffset` fields are measured from the start of the entry array
//! (just past `numEntries`). Entries are sorted by `startId`; this editor
//! always writes single-glyph ranges (`endId == startId`) and keeps the
//! payloads in the same order as the entries.

pub mod document;

use std::fs;
use std::path::Path;

use log::debug;

use crate::codec::{read_u16, read_u32, write_u16, write_u32};
use crate::error::SvgraftError;
use crate::sfnt::FontImage;

type Result<T> = std::result::Result<T, SvgraftError>;

pub const SVG_TABLE_TAG: [u8; 4] = *b"SVG ";

/// Leading bytes of a gzip stream; SVGZ payloads are rejected, not inflated.
pub const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

/// version u16 + docIndexOffset u32 + reserved u32.
const MAIN_HEADER_LEN: u32 = 10;
const INDEX_ENTRY_LEN: u32 = 12;
/// An empty table: the main header plus a zero numEntries.
const INITIAL_TABLE_LEN: u32 = MAIN_HEADER_LEN + 2;

/// One document-index entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocIndexEntry {
    pub start_id: u16,
    pub end_id: u16,
    pub doc_offset: u32,
    pub doc_length: u32,
}

/// Absolute positions of the table's pieces for one visit, plus the decoded
/// index. Recomputed from the blob before every edit.
struct SvgView {
    rec_idx: usize,
    table_start: usize,
    table_len: u32,
    index_offset: u32,
    /// Absolute position of the entry array (index start + 2).
    entries_start: usize,
    entries: Vec<DocIndexEntry>,
}

fn parse_view(image: &FontImage, rec_idx: usize) -> Result<SvgView> {
    let record = image.records()[rec_idx];
    let table = image.table_bytes(&record);

    let version = read_u16(table, 0)?;
    if version != 0 {
        return Err(SvgraftError::MalformedFont(format!(
            "unsupported 'SVG ' table version {}",
            version
        )));
    }
    let index_offset = read_u32(table, 2)?;
    let num_entries = read_u16(table, index_offset as usize)?;

    let entries_rel = index_offset as usize + 2;
    let mut entries: Vec<DocIndexEntry> = Vec::with_capacity(num_entries as usize);
    for i in 0..num_entries as usize {
        let base = entries_rel + i * INDEX_ENTRY_LEN as usize;
        let entry = DocIndexEntry {
            start_id: read_u16(table, base)?,
            end_id: read_u16(table, base + 2)?,
            doc_offset: read_u32(table, base + 4)?,
            doc_length: read_u32(table, base + 8)?,
        };
        let doc_end = entries_rel + entry.doc_offset as usize + entry.doc_length as usize;
        if doc_end > table.len() {
            return Err(SvgraftError::MalformedFont(format!(
                "SVG document for glyph {} runs past the table end",
                entry.start_id
            )));
        }
        if let Some(prev) = entries.last() {
            if entry.start_id <= prev.end_id {
                return Err(SvgraftError::MalformedFont(
                    "SVG document index entries are not sorted by startId".into(),
                ));
            }
        }
        entries.push(entry);
    }

    Ok(SvgView {
        rec_idx,
        table_start: record.offset as usize,
        table_len: record.length,
        index_offset,
        entries_start: record.offset as usize + entries_rel,
        entries,
    })
}

/// Decode the document index of the `SVG ` table, if the font has one.
/// Exposed for inspection (the CLI's listing and the tests use it).
pub fn doc_index(image: &FontImage) -> Result<Vec<DocIndexEntry>> {
    match image.find_record(SVG_TABLE_TAG) {
        Some(rec_idx) => Ok(parse_view(image, rec_idx)?.entries),
        None => Ok(Vec::new()),
    }
}

/// Embed `payload` (already rewritten for storage) as the document for
/// `glyph_id`, replacing any existing document for that glyph. Creates the
/// `SVG ` table when the font has none.
pub fn embed(image: &mut FontImage, glyph_id: u16, payload: &[u8]) -> Result<()> {
    let rec_idx = match image.find_record(SVG_TABLE_TAG) {
        Some(idx) => idx,
        None => create_table(image),
    };
    let view = parse_view(image, rec_idx)?;
    match view.entries.iter().position(|e| e.start_id == glyph_id) {
        Some(i) => replace_document(image, &view, i, payload),
        None => insert_document(image, &view, glyph_id, payload),
    }
    finish_edit(image, rec_idx);
    Ok(())
}

/// Remove the document for `glyph_id`. Silent no-op when the font has no
/// `SVG ` table or no document for that glyph.
pub fn remove(image: &mut FontImage, glyph_id: u16) -> Result<()> {
    let Some(rec_idx) = image.find_record(SVG_TABLE_TAG) else {
        return Ok(());
    };
    let view = parse_view(image, rec_idx)?;
    let Some(i) = view.entries.iter().position(|e| e.start_id == glyph_id) else {
        debug!("glyph {} has no SVG document; nothing to remove", glyph_id);
        return Ok(());
    };
    remove_document(image, &view, i);
    finish_edit(image, rec_idx);
    Ok(())
}

/// Write every stored document to `out_dir/<startId>.svg`, overwriting
/// existing files. Returns the number of files written.
pub fn export(image: &FontImage, out_dir: &Path) -> Result<usize> {
    let Some(rec_idx) = image.find_record(SVG_TABLE_TAG) else {
        return Ok(0);
    };
    let view = parse_view(image, rec_idx)?;
    let mut written = 0;
    for entry in &view.entries {
        let start = view.entries_start + entry.doc_offset as usize;
        let bytes = &image.data()[start..start + entry.doc_length as usize];
        if bytes.starts_with(&GZIP_MAGIC) {
            return Err(SvgraftError::UnsupportedFormat);
        }
        let xml = document::rewrite_for_export(bytes)?;
        fs::write(out_dir.join(format!("{}.svg", entry.start_id)), xml)?;
        written += 1;
    }
    Ok(written)
}

// ─── Edit internals ─────────────────────────────────────────────────

/// Append an empty `SVG ` table after the last table and insert its
/// directory record in tag order. Returns the record index.
fn create_table(image: &mut FontImage) -> usize {
    image.align_end();
    let offset = (image.data().len() + crate::sfnt::TABLE_RECORD_LEN) as u32;
    let rec_idx = image.insert_record(SVG_TABLE_TAG, offset, INITIAL_TABLE_LEN);

    let mut table = [0u8; INITIAL_TABLE_LEN as usize];
    write_u32(&mut table, 2, MAIN_HEADER_LEN);
    image.append_bytes(&table);
    debug!("created empty 'SVG ' table at offset {}", offset);
    rec_idx
}

/// Case: the glyph already has a document. Splice the new payload over the
/// old one and slide everything behind it.
fn replace_document(image: &mut FontImage, view: &SvgView, i: usize, payload: &[u8]) {
    let entry = view.entries[i];
    let payload_start = view.entries_start + entry.doc_offset as usize;
    image.replace_range(payload_start, entry.doc_length as usize, payload);
    let delta = payload.len() as i64 - entry.doc_length as i64;

    let entry_pos = view.entries_start + i * INDEX_ENTRY_LEN as usize;
    image.write_u32_at(entry_pos + 8, payload.len() as u32);

    for (j, other) in view.entries.iter().enumerate() {
        if other.doc_offset > entry.doc_offset {
            let pos = view.entries_start + j * INDEX_ENTRY_LEN as usize + 4;
            image.write_u32_at(pos, (other.doc_offset as i64 + delta) as u32);
        }
    }

    debug!(
        "replaced {}-byte document for glyph {} with {} bytes",
        entry.doc_length,
        entry.start_id,
        payload.len()
    );
    image.resize_table(view.rec_idx, (view.table_len as i64 + delta) as u32);
}

/// Case: no document for the glyph yet. Insert a 12-byte index entry in
/// startId order and the payload between its neighbours' payloads.
fn insert_document(image: &mut FontImage, view: &SvgView, glyph_id: u16, payload: &[u8]) {
    let k = view.entries.partition_point(|e| e.start_id < glyph_id);

    // Where the payload lands, relative to the entry array after it has
    // grown: right behind the sorted predecessor's payload, or in front of
    // every payload when the glyph sorts first.
    let new_doc_offset = if k > 0 {
        let pred = view.entries[k - 1];
        pred.doc_offset + INDEX_ENTRY_LEN + pred.doc_length
    } else if let Some(first) = view.entries.iter().map(|e| e.doc_offset).min() {
        first + INDEX_ENTRY_LEN
    } else {
        INDEX_ENTRY_LEN
    };

    let mut entry_bytes = [0u8; INDEX_ENTRY_LEN as usize];
    write_u16(&mut entry_bytes, 0, glyph_id);
    write_u16(&mut entry_bytes, 2, glyph_id);
    write_u32(&mut entry_bytes, 4, new_doc_offset);
    write_u32(&mut entry_bytes, 8, payload.len() as u32);
    let entry_pos = view.entries_start + k * INDEX_ENTRY_LEN as usize;
    image.insert_bytes(entry_pos, &entry_bytes);

    let num_entries_pos = view.table_start + view.index_offset as usize;
    image.write_u16_at(num_entries_pos, view.entries.len() as u16 + 1);

    // Existing entries: +12 for the grown index, plus the payload length
    // for those whose documents now sit behind the new one.
    for (j, other) in view.entries.iter().enumerate() {
        let slot = if j >= k { j + 1 } else { j };
        let pos = view.entries_start + slot * INDEX_ENTRY_LEN as usize + 4;
        let mut doc_offset = other.doc_offset + INDEX_ENTRY_LEN;
        if doc_offset >= new_doc_offset {
            doc_offset += payload.len() as u32;
        }
        image.write_u32_at(pos, doc_offset);
    }

    image.insert_bytes(view.entries_start + new_doc_offset as usize, payload);

    debug!(
        "inserted {}-byte document for glyph {} at index position {}",
        payload.len(),
        glyph_id,
        k
    );
    let new_len = view.table_len + INDEX_ENTRY_LEN + payload.len() as u32;
    image.resize_table(view.rec_idx, new_len);
}

/// Delete entry `i` and its payload bytes.
fn remove_document(image: &mut FontImage, view: &SvgView, i: usize) {
    let entry = view.entries[i];

    // Payload first (it sits behind the index), then the entry.
    let payload_start = view.entries_start + entry.doc_offset as usize;
    image.remove_bytes(payload_start, entry.doc_length as usize);
    let entry_pos = view.entries_start + i * INDEX_ENTRY_LEN as usize;
    image.remove_bytes(entry_pos, INDEX_ENTRY_LEN as usize);

    let num_entries_pos = view.table_start + view.index_offset as usize;
    image.write_u16_at(num_entries_pos, view.entries.len() as u16 - 1);

    for (j, other) in view.entries.iter().enumerate() {
        if j == i {
            continue;
        }
        let slot = if j > i { j - 1 } else { j };
        let pos = view.entries_start + slot * INDEX_ENTRY_LEN as usize + 4;
        let mut doc_offset = other.doc_offset - INDEX_ENTRY_LEN;
        if other.doc_offset > entry.doc_offset {
            doc_offset -= entry.doc_length;
        }
        image.write_u32_at(pos, doc_offset);
    }

    debug!(
        "removed {}-byte document for glyph {}",
        entry.doc_length, entry.start_id
    );
    let new_len = view.table_len - INDEX_ENTRY_LEN - entry.doc_length;
    image.resize_table(view.rec_idx, new_len);
}

/// Refresh the checksums a finished edit invalidated.
fn finish_edit(image: &mut FontImage, rec_idx: usize) {
    image.recompute_table_checksum(rec_idx);
    image.update_head_adjustment();
}
