//! # Sfnt Container
//!
//! The font directory: the 12-byte offset table at the start of the file and
//! the sorted array of 16-byte table records after it. `FontImage` owns the
//! byte blob being edited together with a parsed directory view, and exposes
//! the low-level mutations every table edit is built from: splicing bytes,
//! inserting a directory record in tag order, re-padding a resized table,
//! and keeping record offsets, per-table checksums, and
//! `head.checkSumAdjustment` coherent with the bytes.

pub mod checksum;

use log::debug;

use crate::codec::{read_tag, read_u16, read_u32, write_u16, write_u32};
use crate::error::SvgraftError;
use checksum::{pad_len, table_checksum, CHECKSUM_MAGIC};

type Result<T> = std::result::Result<T, SvgraftError>;

pub const OFFSET_TABLE_LEN: usize = 12;
pub const TABLE_RECORD_LEN: usize = 16;

/// sfnt version for TrueType-flavored fonts.
pub const SFNT_VERSION_TRUETYPE: u32 = 0x0001_0000;
/// sfnt version tag `OTTO` for CFF-flavored fonts.
pub const SFNT_VERSION_CFF: u32 = u32::from_be_bytes(*b"OTTO");

pub const HEAD_TAG: [u8; 4] = *b"head";
/// Byte position of checkSumAdjustment within the head table.
const HEAD_ADJUSTMENT_OFFSET: usize = 8;

/// The 12-byte font header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffsetTable {
    pub sfnt_version: u32,
    pub num_tables: u16,
    pub search_range: u16,
    pub entry_selector: u16,
    pub range_shift: u16,
}

impl OffsetTable {
    /// Binary-search hints for a directory of `num_tables` records:
    /// `searchRange = 16 × 2^floor(log2 n)`, `entrySelector = floor(log2 n)`,
    /// `rangeShift = 16n − searchRange`.
    pub fn search_hints(num_tables: u16) -> (u16, u16, u16) {
        let entry_selector = num_tables.ilog2() as u16;
        let search_range = 16 * (1u16 << entry_selector);
        let range_shift = 16 * num_tables - search_range;
        (search_range, entry_selector, range_shift)
    }
}

/// One directory entry, plus the absolute file position of its `offset`
/// field so the record can be rewritten in place after a shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableRecord {
    pub tag: [u8; 4],
    pub checksum: u32,
    pub offset: u32,
    pub length: u32,
    pub offset_of_offset: u32,
}

impl TableRecord {
    /// Absolute position of the 16-byte record itself.
    pub fn record_start(&self) -> usize {
        self.offset_of_offset as usize - 8
    }
}

/// The owned byte sequence being edited plus its parsed directory view.
#[derive(Debug, Clone)]
pub struct FontImage {
    data: Vec<u8>,
    offset_table: OffsetTable,
    records: Vec<TableRecord>,
}

impl FontImage {
    /// Parse the offset table and the table-record array.
    pub fn parse(data: Vec<u8>) -> Result<Self> {
        let sfnt_version = read_u32(&data, 0)?;
        if sfnt_version != SFNT_VERSION_TRUETYPE && sfnt_version != SFNT_VERSION_CFF {
            return Err(SvgraftError::MalformedFont(format!(
                "unrecognized sfnt version 0x{:08X}",
                sfnt_version
            )));
        }
        let num_tables = read_u16(&data, 4)?;
        if num_tables == 0 {
            return Err(SvgraftError::MalformedFont("font declares no tables".into()));
        }
        let offset_table = OffsetTable {
            sfnt_version,
            num_tables,
            search_range: read_u16(&data, 6)?,
            entry_selector: read_u16(&data, 8)?,
            range_shift: read_u16(&data, 10)?,
        };

        let mut records = Vec::with_capacity(num_tables as usize);
        for i in 0..num_tables as usize {
            let base = OFFSET_TABLE_LEN + i * TABLE_RECORD_LEN;
            let record = TableRecord {
                tag: read_tag(&data, base)?,
                checksum: read_u32(&data, base + 4)?,
                offset: read_u32(&data, base + 8)?,
                length: read_u32(&data, base + 12)?,
                offset_of_offset: (base + 8) as u32,
            };
            let end = record.offset as usize + record.length as usize;
            if end > data.len() {
                return Err(SvgraftError::MalformedFont(format!(
                    "table '{}' declares {} bytes at offset {} but the file is {} bytes",
                    String::from_utf8_lossy(&record.tag),
                    record.length,
                    record.offset,
                    data.len()
                )));
            }
            records.push(record);
        }

        Ok(FontImage {
            data,
            offset_table,
            records,
        })
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    pub fn offset_table(&self) -> &OffsetTable {
        &self.offset_table
    }

    pub fn records(&self) -> &[TableRecord] {
        &self.records
    }

    /// Index of the record with the given tag, if present. Independent of
    /// directory iteration order.
    pub fn find_record(&self, tag: [u8; 4]) -> Option<usize> {
        self.records.iter().position(|r| r.tag == tag)
    }

    /// The payload bytes of a table, padding excluded.
    pub fn table_bytes(&self, record: &TableRecord) -> &[u8] {
        &self.data[record.offset as usize..record.offset as usize + record.length as usize]
    }

    // ─── Raw blob edits ─────────────────────────────────────────────

    pub(crate) fn write_u16_at(&mut self, offset: usize, val: u16) {
        write_u16(&mut self.data, offset, val);
    }

    pub(crate) fn write_u32_at(&mut self, offset: usize, val: u32) {
        write_u32(&mut self.data, offset, val);
    }

    pub(crate) fn insert_bytes(&mut self, offset: usize, bytes: &[u8]) {
        self.data.splice(offset..offset, bytes.iter().copied());
    }

    pub(crate) fn remove_bytes(&mut self, offset: usize, len: usize) {
        self.data.drain(offset..offset + len);
    }

    pub(crate) fn replace_range(&mut self, start: usize, len: usize, bytes: &[u8]) {
        self.data.splice(start..start + len, bytes.iter().copied());
    }

    pub(crate) fn append_bytes(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Pad the end of the file with zeros to a 4-byte boundary.
    pub(crate) fn align_end(&mut self) {
        let tail = pad_len(self.data.len());
        if tail != 0 {
            debug!("padding unaligned file end with {} zero bytes", tail);
            self.data.extend(std::iter::repeat(0u8).take(tail));
        }
    }

    // ─── Directory mutations ────────────────────────────────────────

    /// Rewrite record `idx`'s checksum/offset/length fields in the blob.
    fn write_record(&mut self, idx: usize) {
        let record = self.records[idx];
        let start = record.record_start();
        write_u32(&mut self.data, start + 4, record.checksum);
        write_u32(&mut self.data, start + 8, record.offset);
        write_u32(&mut self.data, start + 12, record.length);
    }

    /// Insert a new 16-byte record in sort-by-tag order. The directory grows
    /// by 16 bytes, so every existing table offset gains 16; `offset` must
    /// already account for that. Returns the new record's index.
    pub(crate) fn insert_record(&mut self, tag: [u8; 4], offset: u32, length: u32) -> usize {
        let idx = self.records.partition_point(|r| r.tag < tag);
        let pos = OFFSET_TABLE_LEN + idx * TABLE_RECORD_LEN;

        let mut record_bytes = [0u8; TABLE_RECORD_LEN];
        record_bytes[..4].copy_from_slice(&tag);
        write_u32(&mut record_bytes, 8, offset);
        write_u32(&mut record_bytes, 12, length);
        self.insert_bytes(pos, &record_bytes);

        self.offset_table.num_tables += 1;
        let (search_range, entry_selector, range_shift) =
            OffsetTable::search_hints(self.offset_table.num_tables);
        self.offset_table.search_range = search_range;
        self.offset_table.entry_selector = entry_selector;
        self.offset_table.range_shift = range_shift;
        write_u16(&mut self.data, 4, self.offset_table.num_tables);
        write_u16(&mut self.data, 6, search_range);
        write_u16(&mut self.data, 8, entry_selector);
        write_u16(&mut self.data, 10, range_shift);

        // Records at or past the insertion point moved down by 16 bytes, and
        // every table body now starts 16 bytes later.
        for (i, record) in self.records.iter_mut().enumerate() {
            if i >= idx {
                record.offset_of_offset += TABLE_RECORD_LEN as u32;
            }
            record.offset += TABLE_RECORD_LEN as u32;
        }
        for i in 0..self.records.len() {
            self.write_record(i);
        }

        self.records.insert(
            idx,
            TableRecord {
                tag,
                checksum: 0,
                offset,
                length,
                offset_of_offset: (pos + 8) as u32,
            },
        );
        debug!(
            "inserted directory record '{}' at index {} (numTables now {})",
            String::from_utf8_lossy(&tag),
            idx,
            self.offset_table.num_tables
        );
        idx
    }

    /// Commit a new payload length for table `idx` after its content bytes
    /// have been spliced: re-pad to a 4-byte boundary and shift every later
    /// table's offset by the total change.
    pub(crate) fn resize_table(&mut self, idx: usize, new_len: u32) {
        let record = self.records[idx];
        let old_len = record.length;
        let old_pad = pad_len(old_len as usize);
        let new_pad = pad_len(new_len as usize);
        let pad_pos = record.offset as usize + new_len as usize;
        self.data
            .splice(pad_pos..pad_pos + old_pad, std::iter::repeat(0u8).take(new_pad));

        self.records[idx].length = new_len;
        self.write_record(idx);

        let delta = (new_len as i64 + new_pad as i64) - (old_len as i64 + old_pad as i64);
        if delta != 0 {
            self.shift_offsets_after(record.offset, delta);
        }
    }

    /// Add `delta` to the offset of every record whose table starts after
    /// `threshold`, rewriting each record in place.
    fn shift_offsets_after(&mut self, threshold: u32, delta: i64) {
        for i in 0..self.records.len() {
            if self.records[i].offset > threshold {
                self.records[i].offset = (self.records[i].offset as i64 + delta) as u32;
                self.write_record(i);
            }
        }
    }

    /// Recompute record `idx`'s checksum over its current payload bytes.
    pub(crate) fn recompute_table_checksum(&mut self, idx: usize) {
        let record = self.records[idx];
        let sum = table_checksum(self.table_bytes(&record));
        self.records[idx].checksum = sum;
        self.write_record(idx);
    }

    /// Reconcile `head.checkSumAdjustment` with the current bytes: zero the
    /// field, refresh the head record's checksum (the head checksum is
    /// defined over the table with the adjustment zeroed), then store
    /// `0xB1B0AFBA − whole-file-sum`. No-op for fonts without a head table.
    pub(crate) fn update_head_adjustment(&mut self) {
        let Some(idx) = self.find_record(HEAD_TAG) else {
            debug!("no head table; skipping checkSumAdjustment");
            return;
        };
        let record = self.records[idx];
        if (record.length as usize) < HEAD_ADJUSTMENT_OFFSET + 4 {
            return;
        }
        let field_pos = record.offset as usize + HEAD_ADJUSTMENT_OFFSET;
        write_u32(&mut self.data, field_pos, 0);
        self.recompute_table_checksum(idx);
        let file_sum = table_checksum(&self.data);
        write_u32(&mut self.data, field_pos, CHECKSUM_MAGIC.wrapping_sub(file_sum));
    }
}
