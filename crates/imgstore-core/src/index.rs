//! In-memory mirror of a store's header and slot array.
//!
//! The index is the entire metadata working set: there is no secondary hash index,
//! because `max_files` is bounded to 100,000 and a linear scan over that many 208-byte
//! records stays well under a millisecond.

use crate::error::{Error, Result};
use crate::layout::{Header, Slot};

/// In-memory header plus slot array, kept in lock-step with the on-disk records.
#[derive(Debug, Clone)]
pub struct Index {
    /// Current header.
    pub header: Header,
    /// All `max_files` slots, in on-disk order.
    pub slots: Vec<Slot>,
}

impl Index {
    /// Builds an index from an already-loaded header and slot vector.
    #[must_use]
    pub fn new(header: Header, slots: Vec<Slot>) -> Self {
        Self { header, slots }
    }

    /// Finds the slot index of the valid slot whose `img_id` matches `id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no valid slot has that id.
    pub fn find_by_id(&self, id: &str) -> Result<usize> {
        self.slots
            .iter()
            .position(|slot| slot.is_valid && slot.img_id == id)
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    /// Finds the first empty (non-valid) slot index.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FullImgStore`] if every slot is valid.
    pub fn find_empty(&self) -> Result<usize> {
        self.slots
            .iter()
            .position(|slot| !slot.is_valid)
            .ok_or(Error::FullImgStore(self.header.max_files))
    }

    /// Increments the header version counter, as every committed mutation must.
    pub fn bump_version(&mut self) {
        self.header.version = self.header.version.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(id: &str, valid: bool) -> Slot {
        let mut slot = Slot::empty();
        slot.img_id = id.to_string();
        slot.is_valid = valid;
        slot
    }

    #[test]
    fn find_by_id_locates_the_matching_valid_slot() {
        let index = Index::new(
            Header::new(3, (64, 64), (256, 256)),
            vec![slot("a", true), slot("b", true), Slot::empty()],
        );
        assert_eq!(index.find_by_id("b").unwrap(), 1);
        assert!(matches!(index.find_by_id("z"), Err(Error::NotFound(_))));
    }

    #[test]
    fn find_by_id_ignores_stale_ids_in_non_valid_slots() {
        let index = Index::new(
            Header::new(1, (64, 64), (256, 256)),
            vec![slot("ghost", false)],
        );
        assert!(matches!(index.find_by_id("ghost"), Err(Error::NotFound(_))));
    }

    #[test]
    fn find_empty_returns_first_free_slot() {
        let index = Index::new(
            Header::new(3, (64, 64), (256, 256)),
            vec![slot("a", true), Slot::empty(), Slot::empty()],
        );
        assert_eq!(index.find_empty().unwrap(), 1);
    }

    #[test]
    fn find_empty_errors_when_full() {
        let index = Index::new(Header::new(1, (64, 64), (256, 256)), vec![slot("a", true)]);
        assert!(matches!(index.find_empty(), Err(Error::FullImgStore(1))));
    }

    #[test]
    fn bump_version_increments() {
        let mut index = Index::new(Header::new(1, (64, 64), (256, 256)), vec![Slot::empty()]);
        index.bump_version();
        index.bump_version();
        assert_eq!(index.header.version, 2);
    }
}
