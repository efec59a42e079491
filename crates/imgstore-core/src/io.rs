//! Positioned file I/O over a store's three regions: header, slot array, payload heap.
//!
//! Every operation here seeks explicitly before reading or writing; none of it assumes
//! the file cursor was left in a useful place by the previous call.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};

use crate::error::Result;
use crate::layout::{Header, Slot};

/// Byte offset where the slot array begins.
#[must_use]
pub const fn slots_offset() -> u64 {
    Header::SIZE as u64
}

/// Byte offset of slot `idx` within the slot array.
#[must_use]
pub fn slot_offset(idx: usize) -> u64 {
    slots_offset() + (idx as u64) * Slot::SIZE as u64
}

/// Byte offset where the payload heap begins, given `max_files`.
#[must_use]
pub fn payload_heap_start(max_files: u32) -> u64 {
    slots_offset() + u64::from(max_files) * Slot::SIZE as u64
}

/// Writes the header at offset 0.
pub fn write_header(file: &mut File, header: &Header) -> Result<()> {
    file.seek(SeekFrom::Start(0))?;
    file.write_all(&header.to_bytes())?;
    Ok(())
}

/// Reads the header from offset 0.
pub fn read_header(file: &mut File) -> Result<Header> {
    file.seek(SeekFrom::Start(0))?;
    let mut buf = [0u8; Header::SIZE];
    file.read_exact(&mut buf)?;
    Header::from_bytes(&buf)
}

/// Writes slot `idx` to its fixed position in the slot array.
pub fn write_slot(file: &mut File, idx: usize, slot: &Slot) -> Result<()> {
    file.seek(SeekFrom::Start(slot_offset(idx)))?;
    file.write_all(&slot.to_bytes())?;
    Ok(())
}

/// Reads slot `idx` from its fixed position in the slot array.
pub fn read_slot(file: &mut File, idx: usize) -> Result<Slot> {
    file.seek(SeekFrom::Start(slot_offset(idx)))?;
    let mut buf = [0u8; Slot::SIZE];
    file.read_exact(&mut buf)?;
    Slot::from_bytes(&buf)
}

/// Reads all `max_files` slots in index order.
pub fn read_all_slots(file: &mut File, max_files: u32) -> Result<Vec<Slot>> {
    file.seek(SeekFrom::Start(slots_offset()))?;
    let mut slots = Vec::with_capacity(max_files as usize);
    let mut buf = [0u8; Slot::SIZE];
    for _ in 0..max_files {
        file.read_exact(&mut buf)?;
        slots.push(Slot::from_bytes(&buf)?);
    }
    Ok(slots)
}

/// Appends `bytes` to the end of the file and returns the offset they were written at.
pub fn append_payload(file: &mut File, bytes: &[u8]) -> Result<u64> {
    let offset = file.seek(SeekFrom::End(0))?;
    file.write_all(bytes)?;
    Ok(offset)
}

/// Reads `size` bytes starting at `offset`.
pub fn read_payload(file: &mut File, offset: u64, size: u32) -> Result<Vec<u8>> {
    file.seek(SeekFrom::Start(offset))?;
    let mut buf = vec![0u8; size as usize];
    file.read_exact(&mut buf)?;
    Ok(buf)
}
