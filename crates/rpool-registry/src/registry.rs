//! Ordered, deduplicated storage of loaded repositories.
//!
//! Entries live in an index-stable slot arena: removing an entry leaves a
//! hole instead of shifting its successors, so a traversal holding a slot
//! position stays valid while the current entry is unregistered. Holes are
//! squeezed out by `Registry::compact` once no traversal is running.

use crate::index::RepositoryIndex;

/// A repository whose index was loaded successfully.
#[derive(Debug)]
pub struct RepositoryEntry {
    location: String,
    index: RepositoryIndex,
}

impl RepositoryEntry {
    pub(crate) fn new(location: String, index: RepositoryIndex) -> Self {
        Self {
            location,
            index,
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn index(&self) -> &RepositoryIndex {
        &self.index
    }

    pub fn into_parts(self) -> (String, RepositoryIndex) {
        (self.location, self.index)
    }
}

#[derive(Debug, Default)]
pub struct Registry {
    slots: Vec<Option<RepositoryEntry>>,
    len: usize,
}

impl Registry {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn contains(&self, location: &str) -> bool {
        self.iter().any(|entry| entry.location == location)
    }

    /// Entries in priority order.
    pub fn iter(&self) -> impl Iterator<Item = &RepositoryEntry> {
        self.slots.iter().flatten()
    }

    pub fn get(&self, location: &str) -> Option<&RepositoryEntry> {
        self.iter().find(|entry| entry.location == location)
    }

    /// Appends `entry` at the lowest priority.
    pub(crate) fn push(&mut self, entry: RepositoryEntry) {
        debug_assert!(!self.contains(&entry.location));
        self.slots.push(Some(entry));
        self.len += 1;
    }

    /// Number of slots, holes included.
    pub(crate) fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn slot(&self, slot: usize) -> Option<&RepositoryEntry> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    /// Removes the entry at `slot`, leaving a hole so later slots keep their positions.
    pub(crate) fn take_slot(&mut self, slot: usize) -> Option<RepositoryEntry> {
        let entry = self.slots.get_mut(slot).and_then(Option::take);
        if entry.is_some() {
            self.len -= 1;
        }
        entry
    }

    pub(crate) fn compact(&mut self) {
        self.slots.retain(Option::is_some);
    }

    /// Empties the registry head first.
    pub(crate) fn drain(&mut self) -> impl Iterator<Item = RepositoryEntry> + '_ {
        self.len = 0;
        self.slots.drain(..).flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(location: &str) -> RepositoryEntry {
        RepositoryEntry::new(location.to_string(), RepositoryIndex::default())
    }

    fn locations(registry: &Registry) -> Vec<&str> {
        registry.iter().map(RepositoryEntry::location).collect()
    }

    #[test]
    fn test_push_preserves_order() {
        let mut registry = Registry::default();
        registry.push(entry("/a/noarch"));
        registry.push(entry("/b/noarch"));
        registry.push(entry("/c/noarch"));

        assert_eq!(registry.len(), 3);
        assert_eq!(locations(&registry), vec!["/a/noarch", "/b/noarch", "/c/noarch"]);
        assert!(registry.contains("/b/noarch"));
        assert!(!registry.contains("/d/noarch"));
        assert_eq!(registry.get("/c/noarch").unwrap().location(), "/c/noarch");
    }

    #[test]
    fn test_take_slot_keeps_positions() {
        let mut registry = Registry::default();
        registry.push(entry("/a/noarch"));
        registry.push(entry("/b/noarch"));
        registry.push(entry("/c/noarch"));

        let taken = registry.take_slot(1).unwrap();
        assert_eq!(taken.location(), "/b/noarch");
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.slot_count(), 3);
        assert!(registry.slot(1).is_none());
        assert_eq!(registry.slot(2).unwrap().location(), "/c/noarch");
        assert!(registry.take_slot(1).is_none());
        assert_eq!(registry.len(), 2);

        registry.compact();
        assert_eq!(registry.slot_count(), 2);
        assert_eq!(locations(&registry), vec!["/a/noarch", "/c/noarch"]);
    }

    #[test]
    fn test_drain_empties_in_order() {
        let mut registry = Registry::default();
        registry.push(entry("/a/noarch"));
        registry.push(entry("/b/noarch"));
        registry.take_slot(0);

        let drained: Vec<_> = registry.drain().map(|e| e.into_parts().0).collect();
        assert_eq!(drained, vec!["/b/noarch"]);
        assert!(registry.is_empty());
        assert_eq!(registry.slot_count(), 0);
    }
}
