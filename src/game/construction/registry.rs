// Object registry - the tracked collections the rest of the game iterates

use std::collections::HashMap;
use std::hash::Hash;

use crate::engine::physics::{BodyId, ConstraintId};

/// Insertion-ordered set with O(1) membership and in-place replacement.
///
/// Entries are references (ids) to objects owned by the physics world.
#[derive(Debug, Clone)]
pub struct TrackedSet<T> {
    entries: Vec<T>,
    index: HashMap<T, usize>,
}

impl<T: Copy + Eq + Hash> TrackedSet<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Append an entry; returns false if it was already tracked
    pub fn insert(&mut self, item: T) -> bool {
        if self.index.contains_key(&item) {
            return false;
        }
        self.index.insert(item, self.entries.len());
        self.entries.push(item);
        true
    }

    pub fn remove(&mut self, item: &T) -> bool {
        let Some(position) = self.index.remove(item) else {
            return false;
        };
        self.entries.remove(position);
        for (offset, entry) in self.entries[position..].iter().enumerate() {
            self.index.insert(*entry, position + offset);
        }
        true
    }

    /// Put `new` in the slot `old` occupied, keeping the order of everything else
    pub fn replace(&mut self, old: &T, new: T) -> bool {
        if self.index.contains_key(&new) {
            return false;
        }
        let Some(position) = self.index.remove(old) else {
            return false;
        };
        self.entries[position] = new;
        self.index.insert(new, position);
        true
    }

    pub fn contains(&self, item: &T) -> bool {
        self.index.contains_key(item)
    }

    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: Copy + Eq + Hash> Default for TrackedSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything the player has built, grouped by how it is used.
#[derive(Debug, Default)]
pub struct Registry {
    /// Driven by the turn inputs
    pub wheels: TrackedSet<BodyId>,
    /// Fruit payloads, followed by the camera
    pub lemons: TrackedSet<BodyId>,
    /// Dynamic solid shapes that later shapes may fuse with
    pub non_static_parts: TrackedSet<BodyId>,
    /// Joints and springs, in creation order
    pub constraints: TrackedSet<ConstraintId>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop a body from every body set; returns true if any set held it
    pub fn forget_body(&mut self, id: BodyId) -> bool {
        let wheel = self.wheels.remove(&id);
        let lemon = self.lemons.remove(&id);
        let part = self.non_static_parts.remove(&id);
        wheel || lemon || part
    }

    pub fn tracks_body(&self, id: BodyId) -> bool {
        self.wheels.contains(&id)
            || self.lemons.contains(&id)
            || self.non_static_parts.contains(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_is_idempotent() {
        let mut set = TrackedSet::new();
        assert!(set.insert(BodyId(1)));
        assert!(!set.insert(BodyId(1)));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_remove_keeps_order_and_index() {
        let mut set = TrackedSet::new();
        for id in 1..=4 {
            set.insert(BodyId(id));
        }
        assert!(set.remove(&BodyId(2)));
        assert!(!set.remove(&BodyId(2)));
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![BodyId(1), BodyId(3), BodyId(4)]
        );

        // Index must still point at the right slots after the shift
        assert!(set.replace(&BodyId(4), BodyId(9)));
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![BodyId(1), BodyId(3), BodyId(9)]
        );
    }

    #[test]
    fn test_replace_keeps_slot() {
        let mut set = TrackedSet::new();
        set.insert(ConstraintId(1));
        set.insert(ConstraintId(2));
        set.insert(ConstraintId(3));

        assert!(set.replace(&ConstraintId(2), ConstraintId(7)));
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![ConstraintId(1), ConstraintId(7), ConstraintId(3)]
        );
        assert!(!set.contains(&ConstraintId(2)));
        assert!(!set.replace(&ConstraintId(2), ConstraintId(8)));
    }

    #[test]
    fn test_forget_body_clears_every_set() {
        let mut registry = Registry::new();
        registry.wheels.insert(BodyId(1));
        registry.non_static_parts.insert(BodyId(1));
        registry.lemons.insert(BodyId(2));

        assert!(registry.forget_body(BodyId(1)));
        assert!(!registry.tracks_body(BodyId(1)));
        assert!(registry.tracks_body(BodyId(2)));
        assert!(!registry.forget_body(BodyId(5)));
    }
}
