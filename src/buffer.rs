//! Bounds-checked big-endian access over raw byte buffers.
//!
//! Every read and write checks the requested range against the buffer
//! length and reports [`PulError::BufferUnderrun`] instead of panicking.

use byteorder::{BigEndian, ByteOrder};

use crate::error::{PulError, Result};

/// Return the lowest index at which `magic` occurs contiguously in `buf`.
pub fn find_magic(buf: &[u8], magic: &[u8]) -> Option<usize> {
    if magic.is_empty() || magic.len() > buf.len() {
        return None;
    }
    buf.windows(magic.len()).position(|w| w == magic)
}

/// Split `buf` into two owned buffers at `index`.
///
/// The first buffer holds `buf[..index]`, the second `buf[index..]`.
/// An index past the end is clamped to the buffer length.
pub fn split_at(buf: &[u8], index: usize) -> (Vec<u8>, Vec<u8>) {
    let (before, after) = buf.split_at(index.min(buf.len()));
    (before.to_vec(), after.to_vec())
}

/// Read a big-endian `u32` at `offset`.
pub fn read_u32_be(buf: &[u8], offset: usize) -> Result<u32> {
    Ok(BigEndian::read_u32(range(buf, offset, 4)?))
}

/// Read a big-endian `u16` at `offset`.
pub fn read_u16_be(buf: &[u8], offset: usize) -> Result<u16> {
    Ok(BigEndian::read_u16(range(buf, offset, 2)?))
}

/// Write `value` as a big-endian `u16` at `offset`.
pub fn write_u16_be(buf: &mut [u8], offset: usize, value: u16) -> Result<()> {
    BigEndian::write_u16(range_mut(buf, offset, 2)?, value);
    Ok(())
}

/// Copy `bytes` into `buf` starting at `offset`.
pub fn write_bytes(buf: &mut [u8], offset: usize, bytes: &[u8]) -> Result<()> {
    range_mut(buf, offset, bytes.len())?.copy_from_slice(bytes);
    Ok(())
}

fn end_of(buf_len: usize, offset: usize, needed: usize) -> Result<usize> {
    offset
        .checked_add(needed)
        .filter(|&end| end <= buf_len)
        .ok_or_else(|| PulError::underrun(offset, needed, buf_len))
}

fn range(buf: &[u8], offset: usize, needed: usize) -> Result<&[u8]> {
    let end = end_of(buf.len(), offset, needed)?;
    Ok(&buf[offset..end])
}

fn range_mut(buf: &mut [u8], offset: usize, needed: usize) -> Result<&mut [u8]> {
    let end = end_of(buf.len(), offset, needed)?;
    Ok(&mut buf[offset..end])
}
