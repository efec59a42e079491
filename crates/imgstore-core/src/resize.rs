//! Lazy resize-cache materialization.
//!
//! Thumb and small derivatives are not produced at insert time. The first `read` that
//! asks for a variant whose slot offset is still the ABSENT sentinel (0) triggers a
//! resize, appends the result to the payload heap, and persists the updated slot. Every
//! later read of that variant sees the PRESENT offset and skips straight to the payload.

use std::fs::File;

use crate::codec::ImageCodec;
use crate::error::Result;
use crate::index::Index;
use crate::io;
use crate::layout::{Variant, ORIG};

/// Ensures `variant` is materialized for the slot at `idx`, resizing and appending it
/// to the payload heap on first access.
///
/// A no-op for [`Variant::Orig`], which is always present, and for any variant whose
/// slot offset is already non-zero (PRESENT).
///
/// # Errors
///
/// Propagates I/O errors from reading the original payload or appending the derivative,
/// and codec errors from the resize itself.
pub fn materialize(
    file: &mut File,
    index: &mut Index,
    codec: &dyn ImageCodec,
    idx: usize,
    variant: Variant,
) -> Result<()> {
    if matches!(variant, Variant::Orig) {
        return Ok(());
    }
    let vi = variant.index();
    if index.slots[idx].offset[vi] != 0 {
        return Ok(());
    }

    let orig_offset = index.slots[idx].offset[ORIG];
    let orig_size = index.slots[idx].size[ORIG];
    let orig_bytes = io::read_payload(file, orig_offset, orig_size)?;

    let (max_w, max_h) = index.header.resolution_for(variant);
    let resized = codec.resize_to_fit(&orig_bytes, max_w, max_h)?;
    let offset = io::append_payload(file, &resized)?;

    index.slots[idx].offset[vi] = offset;
    #[allow(clippy::cast_possible_truncation)]
    {
        index.slots[idx].size[vi] = resized.len() as u32;
    }
    io::write_slot(file, idx, &index.slots[idx])?;
    Ok(())
}
