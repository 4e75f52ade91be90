//! # Byte Codec
//!
//! Big-endian reads and writes of fixed-width integers and 4-byte tags at
//! arbitrary offsets, as used throughout the OpenType container. Reads that
//! would run past the end of the buffer are errors, never panics; writes go
//! into buffers the caller has already sized.

use crate::error::SvgraftError;

type Result<T> = std::result::Result<T, SvgraftError>;

fn out_of_range(what: &str, offset: usize, len: usize) -> SvgraftError {
    SvgraftError::MalformedFont(format!(
        "read past end of buffer ({} at offset {}, buffer is {} bytes)",
        what, offset, len
    ))
}

pub fn read_u16(data: &[u8], offset: usize) -> Result<u16> {
    match data.get(offset..offset + 2) {
        Some(b) => Ok(u16::from_be_bytes([b[0], b[1]])),
        None => Err(out_of_range("u16", offset, data.len())),
    }
}

pub fn read_i16(data: &[u8], offset: usize) -> Result<i16> {
    read_u16(data, offset).map(|v| v as i16)
}

pub fn read_u32(data: &[u8], offset: usize) -> Result<u32> {
    match data.get(offset..offset + 4) {
        Some(b) => Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]])),
        None => Err(out_of_range("u32", offset, data.len())),
    }
}

pub fn read_u64(data: &[u8], offset: usize) -> Result<u64> {
    match data.get(offset..offset + 8) {
        Some(b) => Ok(u64::from_be_bytes([
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
        ])),
        None => Err(out_of_range("u64", offset, data.len())),
    }
}

/// Read a 4-byte table tag.
pub fn read_tag(data: &[u8], offset: usize) -> Result<[u8; 4]> {
    match data.get(offset..offset + 4) {
        Some(b) => Ok([b[0], b[1], b[2], b[3]]),
        None => Err(out_of_range("tag", offset, data.len())),
    }
}

/// Borrow a run of `len` bytes starting at `offset`.
pub fn read_bytes(data: &[u8], offset: usize, len: usize) -> Result<&[u8]> {
    data.get(offset..offset + len)
        .ok_or_else(|| out_of_range("byte run", offset, data.len()))
}

/// Read `count` big-endian u16s, advancing the cursor.
pub fn read_u16_array(data: &[u8], cursor: &mut usize, count: usize) -> Result<Vec<u16>> {
    let mut values = Vec::with_capacity(count);
    for _ in 0..count {
        values.push(read_u16(data, *cursor)?);
        *cursor += 2;
    }
    Ok(values)
}

/// Read `count` big-endian i16s, advancing the cursor.
pub fn read_i16_array(data: &[u8], cursor: &mut usize, count: usize) -> Result<Vec<i16>> {
    let mut values = Vec::with_capacity(count);
    for _ in 0..count {
        values.push(read_i16(data, *cursor)?);
        *cursor += 2;
    }
    Ok(values)
}

/// Read `count` big-endian u32s, advancing the cursor.
pub fn read_u32_array(data: &[u8], cursor: &mut usize, count: usize) -> Result<Vec<u32>> {
    let mut values = Vec::with_capacity(count);
    for _ in 0..count {
        values.push(read_u32(data, *cursor)?);
        *cursor += 4;
    }
    Ok(values)
}

pub fn write_u16(data: &mut [u8], offset: usize, val: u16) {
    data[offset..offset + 2].copy_from_slice(&val.to_be_bytes());
}

pub fn write_u32(data: &mut [u8], offset: usize, val: u32) {
    data[offset..offset + 4].copy_from_slice(&val.to_be_bytes());
}
