//! # Name Decoder
//!
//! Extracts the family name (nameID 1) from the `name` table. The string
//! encoding is guessed from the first byte: a leading zero means big-endian
//! UTF-16 (the usual Windows-platform storage for ASCII names), anything
//! else is treated as UTF-8.

use crate::codec::{read_bytes, read_u16};
use crate::error::SvgraftError;

type Result<T> = std::result::Result<T, SvgraftError>;

pub const NAME_TAG: [u8; 4] = *b"name";

const FAMILY_NAME_ID: u16 = 1;

/// The string of the first record with `nameID == 1` and positive length,
/// or `None` when no such record exists.
pub fn family_name(table: &[u8]) -> Result<Option<String>> {
    let _format = read_u16(table, 0)?;
    let count = read_u16(table, 2)?;
    let string_offset = read_u16(table, 4)? as usize;

    for i in 0..count as usize {
        let base = 6 + i * 12;
        let name_id = read_u16(table, base + 6)?;
        let length = read_u16(table, base + 8)? as usize;
        if name_id != FAMILY_NAME_ID || length == 0 {
            continue;
        }
        let offset = read_u16(table, base + 10)? as usize;
        let bytes = read_bytes(table, string_offset + offset, length)?;
        let value = if bytes[0] == 0 {
            let units: Vec<u16> = bytes
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        } else {
            String::from_utf8_lossy(bytes).into_owned()
        };
        return Ok(Some(value));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name_table(records: &[(u16, &[u8])]) -> Vec<u8> {
        let mut table = Vec::new();
        table.extend_from_slice(&0u16.to_be_bytes());
        table.extend_from_slice(&(records.len() as u16).to_be_bytes());
        let string_offset = 6 + records.len() * 12;
        table.extend_from_slice(&(string_offset as u16).to_be_bytes());
        let mut strings = Vec::new();
        for &(name_id, bytes) in records {
            table.extend_from_slice(&3u16.to_be_bytes()); // platformID
            table.extend_from_slice(&1u16.to_be_bytes()); // encodingID
            table.extend_from_slice(&0x0409u16.to_be_bytes()); // languageID
            table.extend_from_slice(&name_id.to_be_bytes());
            table.extend_from_slice(&(bytes.len() as u16).to_be_bytes());
            table.extend_from_slice(&(strings.len() as u16).to_be_bytes());
            strings.extend_from_slice(bytes);
        }
        table.extend_from_slice(&strings);
        table
    }

    fn utf16_be(s: &str) -> Vec<u8> {
        s.encode_utf16().flat_map(|u| u.to_be_bytes()).collect()
    }

    #[test]
    fn test_family_name_utf16() {
        let table = name_table(&[(0, b"Copyright"), (1, &utf16_be("Graftline"))]);
        assert_eq!(family_name(&table).unwrap().as_deref(), Some("Graftline"));
    }

    #[test]
    fn test_family_name_utf8() {
        let table = name_table(&[(1, b"Graftline Sans")]);
        assert_eq!(
            family_name(&table).unwrap().as_deref(),
            Some("Graftline Sans")
        );
    }

    #[test]
    fn test_missing_family_name() {
        let table = name_table(&[(0, b"Copyright"), (4, b"Full Name")]);
        assert_eq!(family_name(&table).unwrap(), None);
    }

    #[test]
    fn test_empty_family_record_skipped() {
        let table = name_table(&[(1, b""), (1, &utf16_be("Second"))]);
        assert_eq!(family_name(&table).unwrap().as_deref(), Some("Second"));
    }

    #[test]
    fn test_truncated_table_is_error() {
        let table = name_table(&[(1, b"Graftline")]);
        assert!(family_name(&table[..10]).is_err());
    }
}
