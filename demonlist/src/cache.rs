//! In-memory store for the published lists.
//!
//! [`ListCache`] holds one slot per [`ListSource`]. Each slot is a sequence of
//! [`ListItem`] sorted by position plus a `loaded` flag. Slots are written only
//! by the loader and can be read from any thread at any time.
//!
//! While a reload is in progress the slot is empty and not loaded; readers
//! must treat that window the same as "not loaded yet".

use parking_lot::RwLock;

use crate::types::{ListItem, ListSource};

#[derive(Debug, Default)]
struct Slot {
    items: Vec<ListItem>,
    loaded: bool,
}

/// Published demonlists, one slot per source.
#[derive(Debug, Default)]
pub struct ListCache {
    slots: RwLock<[Slot; 2]>,
}

impl ListCache {
    /// Creates a cache with both slots empty and not loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the published list for `source`.
    pub fn collection(&self, source: ListSource) -> Vec<ListItem> {
        self.slots.read()[source.slot()].items.clone()
    }

    /// Returns true once a load cycle for `source` has completed.
    pub fn is_loaded(&self, source: ListSource) -> bool {
        self.slots.read()[source.slot()].loaded
    }

    /// Number of published entries for `source`.
    pub fn len(&self, source: ListSource) -> usize {
        self.slots.read()[source.slot()].items.len()
    }

    /// Returns true if `source` currently has no entries.
    pub fn is_empty(&self, source: ListSource) -> bool {
        self.len(source) == 0
    }

    /// Looks up the first entry with the given level ID.
    ///
    /// Duplicate manifest entries can place the same level at several
    /// positions; the highest-ranked one wins.
    pub fn find_by_id(&self, source: ListSource, id: i64) -> Option<ListItem> {
        self.slots.read()[source.slot()]
            .items
            .iter()
            .find(|item| item.id == id)
            .cloned()
    }

    /// Empties `source` and marks it not loaded.
    pub(crate) fn begin_reload(&self, source: ListSource) {
        let mut slots = self.slots.write();
        let slot = &mut slots[source.slot()];
        slot.items.clear();
        slot.loaded = false;
    }

    /// Replaces the list for `source` and marks it loaded.
    ///
    /// `items` must already be sorted by position.
    pub(crate) fn publish(&self, source: ListSource, items: Vec<ListItem>) {
        debug_assert!(items.windows(2).all(|w| w[0].position <= w[1].position));
        let mut slots = self.slots.write();
        let slot = &mut slots[source.slot()];
        slot.items = items;
        slot.loaded = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: i64, name: &str, position: u32) -> ListItem {
        ListItem {
            id,
            name: name.to_string(),
            position,
        }
    }

    #[test]
    fn test_new_cache_is_empty_and_not_loaded() {
        let cache = ListCache::new();
        for source in ListSource::ALL {
            assert!(!cache.is_loaded(source));
            assert!(cache.is_empty(source));
            assert!(cache.collection(source).is_empty());
        }
    }

    #[test]
    fn test_publish_only_touches_target_slot() {
        let cache = ListCache::new();
        cache.publish(ListSource::TslPlus, vec![item(7, "Seven", 1)]);

        assert!(cache.is_loaded(ListSource::TslPlus));
        assert_eq!(cache.len(ListSource::TslPlus), 1);
        assert!(!cache.is_loaded(ListSource::Tsl));
        assert!(cache.is_empty(ListSource::Tsl));
    }

    #[test]
    fn test_begin_reload_clears_slot() {
        let cache = ListCache::new();
        cache.publish(ListSource::Tsl, vec![item(1, "A", 1), item(2, "B", 2)]);

        cache.begin_reload(ListSource::Tsl);

        assert!(!cache.is_loaded(ListSource::Tsl));
        assert!(cache.is_empty(ListSource::Tsl));
    }

    #[test]
    fn test_find_by_id_prefers_highest_rank() {
        let cache = ListCache::new();
        cache.publish(
            ListSource::Tsl,
            vec![item(5, "Dup", 1), item(6, "Other", 2), item(5, "Dup", 3)],
        );

        assert_eq!(cache.find_by_id(ListSource::Tsl, 5).unwrap().position, 1);
        assert_eq!(cache.find_by_id(ListSource::Tsl, 6).unwrap().position, 2);
        assert!(cache.find_by_id(ListSource::Tsl, 99).is_none());
        assert!(cache.find_by_id(ListSource::TslPlus, 5).is_none());
    }
}
