//! Content-addressed dedup scan run on every insert.
//!
//! Mirrors the original `do_name_and_content_dedup`: walk every valid slot once, reject
//! on an id collision, and graft the thumb/small offsets from the first content match.

use crate::error::{Error, Result};
use crate::index::Index;
use crate::layout::{ORIG, SMALL, THUMB};

/// Scans `index` for the slot at `idx` against every other valid slot.
///
/// On an `img_id` collision with another valid slot, returns [`Error::DuplicateId`].
/// On the first SHA-256 match, the candidate slot's original, thumb, and small offset
/// and size fields are all grafted from the matching slot, so the payload and any
/// already-materialized resize derivatives are shared rather than regenerated. If no
/// content match is found, the candidate's original offset is reset to 0 so the caller
/// knows to append fresh payload bytes.
///
/// # Errors
///
/// Returns [`Error::DuplicateId`] if another valid slot already carries the candidate's id.
pub fn scan(index: &mut Index, idx: usize) -> Result<()> {
    let candidate_id = index.slots[idx].img_id.clone();
    let candidate_sha = index.slots[idx].sha;

    let mut content_match: Option<([u64; 3], [u32; 3])> = None;

    for (i, slot) in index.slots.iter().enumerate() {
        if i == idx || !slot.is_valid {
            continue;
        }
        if slot.img_id == candidate_id {
            return Err(Error::DuplicateId(candidate_id));
        }
        if content_match.is_none() && slot.sha == candidate_sha {
            content_match = Some((slot.offset, slot.size));
        }
    }

    let candidate = &mut index.slots[idx];
    match content_match {
        Some((offset, size)) => {
            candidate.offset[ORIG] = offset[ORIG];
            candidate.offset[THUMB] = offset[THUMB];
            candidate.offset[SMALL] = offset[SMALL];
            candidate.size[ORIG] = size[ORIG];
            candidate.size[THUMB] = size[THUMB];
            candidate.size[SMALL] = size[SMALL];
        }
        None => {
            candidate.offset[ORIG] = 0;
        }
    }
    Ok(())
}
