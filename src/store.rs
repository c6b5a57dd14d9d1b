//! Element store and identity index
//!
//! [`Store`] is the unsynchronized core of a [`DaryHeap`](crate::DaryHeap): a
//! dense vector laid out as a complete d-ary tree, plus a map from each
//! element's identity to its current position. Both live in one struct and
//! every mutation below updates them together, so the position map can never
//! drift from the vector.
//!
//! # Layout
//!
//! For branching factor `d`, the element at position `i` has children at
//! `i*d + 1 ..= i*d + d` and its parent at `(i - 1) / d`.
//!
//! # Invariants
//!
//! - Complete tree: positions `0..len` are all occupied.
//! - Heap property: no child precedes its parent under `C`.
//! - Bijection: `index[elements[i].identity] == i` for every `i`, and
//!   `index.len() == elements.len()`.

use crate::error::{HeapError, Result};
use crate::order::Comparator;
use log::{debug, trace};
use rustc_hash::FxHashMap;
use std::marker::PhantomData;

/// A stored element
#[derive(Debug, Clone)]
pub(crate) struct Entry<V> {
    pub(crate) value: V,
    pub(crate) identity: u64,
    pub(crate) priority: f64,
}

/// Dense d-ary tree with an identity-to-position index
#[derive(Debug)]
pub(crate) struct Store<V, C> {
    elements: Vec<Entry<V>>,
    index: FxHashMap<u64, usize>,
    branching_factor: usize,
    _order: PhantomData<fn() -> C>,
}

fn check_priority(priority: f64) -> Result<()> {
    if priority.is_nan() {
        return Err(HeapError::InvalidPriority);
    }
    Ok(())
}

impl<V, C: Comparator> Store<V, C> {
    /// Creates an empty store. The branching factor must already be validated.
    pub(crate) fn new(branching_factor: usize, capacity: usize) -> Self {
        debug_assert!(branching_factor >= 2);
        Self {
            elements: Vec::with_capacity(capacity),
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            branching_factor,
            _order: PhantomData,
        }
    }

    /// Builds a store from unordered entries in O(n)
    ///
    /// Rejects NaN priorities and repeated identities.
    pub(crate) fn from_entries(
        branching_factor: usize,
        entries: Vec<Entry<V>>,
    ) -> Result<Self> {
        let mut store = Self::new(branching_factor, entries.len());
        for (pos, entry) in entries.iter().enumerate() {
            check_priority(entry.priority)?;
            if store.index.insert(entry.identity, pos).is_some() {
                debug!("bulk build rejected duplicate identity {:#x}", entry.identity);
                return Err(HeapError::DuplicateIdentity(entry.identity));
            }
        }
        store.elements = entries;
        store.heapify();
        debug!(
            "built {}-heap of {} elements with branching factor {}",
            C::NAME,
            store.len(),
            branching_factor
        );
        Ok(store)
    }

    #[inline]
    pub(crate) fn branching_factor(&self) -> usize {
        self.branching_factor
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.elements.len()
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    #[inline]
    pub(crate) fn contains(&self, identity: u64) -> bool {
        self.index.contains_key(&identity)
    }

    pub(crate) fn peek(&self) -> Option<&Entry<V>> {
        self.elements.first()
    }

    pub(crate) fn priority_of(&self, identity: u64) -> Result<f64> {
        let pos = self.position_of(identity)?;
        Ok(self.elements[pos].priority)
    }

    /// Appends a new element and sifts it up
    pub(crate) fn insert(&mut self, value: V, identity: u64, priority: f64) -> Result<()> {
        check_priority(priority)?;
        if self.index.contains_key(&identity) {
            debug!("insert rejected duplicate identity {identity:#x}");
            return Err(HeapError::DuplicateIdentity(identity));
        }

        let pos = self.elements.len();
        self.elements.push(Entry {
            value,
            identity,
            priority,
        });
        self.index.insert(identity, pos);
        let pos = self.sift_up(pos);
        trace!("inserted {identity:#x} with priority {priority} at {pos}");
        Ok(())
    }

    /// Removes and returns the root element
    pub(crate) fn pop(&mut self) -> Option<Entry<V>> {
        if self.elements.is_empty() {
            return None;
        }

        // swap_remove moves the last element into the root slot
        let top = self.elements.swap_remove(0);
        self.index.remove(&top.identity);
        if !self.elements.is_empty() {
            self.set_position(0);
            self.sift_down(0);
        }
        trace!("extracted {:#x} with priority {}", top.identity, top.priority);
        Some(top)
    }

    /// Overwrites an element's priority and re-sites it
    ///
    /// Moves in at most one direction: toward the root if the new priority
    /// precedes the old one, toward the leaves if it follows it.
    pub(crate) fn update_priority(&mut self, identity: u64, priority: f64) -> Result<()> {
        check_priority(priority)?;
        let pos = self.position_of(identity)?;

        let old = std::mem::replace(&mut self.elements[pos].priority, priority);
        let new_pos = if C::precedes(priority, old) {
            self.sift_up(pos)
        } else if C::precedes(old, priority) {
            self.sift_down(pos)
        } else {
            pos
        };
        trace!("updated {identity:#x} priority {old} -> {priority}, position {pos} -> {new_pos}");
        Ok(())
    }

    /// Removes an arbitrary element by identity
    pub(crate) fn remove(&mut self, identity: u64) -> Result<Entry<V>> {
        let pos = self.position_of(identity)?;

        let removed = self.elements.swap_remove(pos);
        self.index.remove(&identity);
        if pos < self.elements.len() {
            // The former last element now sits at `pos` and may violate the
            // heap property against either its new parent or its new children.
            self.set_position(pos);
            if self.sift_up(pos) == pos {
                self.sift_down(pos);
            }
        }
        trace!("removed {identity:#x} from position {pos}");
        Ok(removed)
    }

    pub(crate) fn clear(&mut self) {
        self.elements.clear();
        self.index.clear();
    }

    /// Validates the complete-tree, heap and bijection invariants
    pub(crate) fn check_invariants(&self) -> bool {
        if self.index.len() != self.elements.len() {
            return false;
        }
        self.elements.iter().enumerate().all(|(pos, entry)| {
            let indexed = self.index.get(&entry.identity) == Some(&pos);
            let ordered = pos == 0
                || !C::precedes(entry.priority, self.elements[self.parent(pos)].priority);
            indexed && ordered && !entry.priority.is_nan()
        })
    }

    pub(crate) fn into_entries(self) -> Vec<Entry<V>> {
        self.elements
    }

    fn position_of(&self, identity: u64) -> Result<usize> {
        match self.index.get(&identity) {
            Some(&pos) => {
                debug_assert!(pos < self.elements.len(), "index entry out of bounds");
                Ok(pos)
            }
            None => {
                debug!("identity {identity:#x} not found");
                Err(HeapError::ElementNotFound(identity))
            }
        }
    }

    #[inline]
    fn parent(&self, pos: usize) -> usize {
        (pos - 1) / self.branching_factor
    }

    #[inline]
    fn first_child(&self, pos: usize) -> usize {
        pos.saturating_mul(self.branching_factor).saturating_add(1)
    }

    /// Records the current position of the element at `pos`
    #[inline]
    fn set_position(&mut self, pos: usize) {
        let identity = self.elements[pos].identity;
        if let Some(slot) = self.index.get_mut(&identity) {
            *slot = pos;
        } else {
            debug_assert!(false, "element {identity:#x} missing from index");
        }
    }

    /// Swaps two elements and both of their index entries
    #[inline]
    fn swap(&mut self, a: usize, b: usize) {
        self.elements.swap(a, b);
        self.set_position(a);
        self.set_position(b);
    }

    /// Moves the element at `pos` toward the root; returns its final position
    fn sift_up(&mut self, mut pos: usize) -> usize {
        while pos > 0 {
            let parent = self.parent(pos);
            if C::precedes(self.elements[pos].priority, self.elements[parent].priority) {
                self.swap(pos, parent);
                pos = parent;
            } else {
                break;
            }
        }
        pos
    }

    /// Moves the element at `pos` toward the leaves; returns its final position
    ///
    /// Among several qualifying children the left-most wins ties.
    fn sift_down(&mut self, mut pos: usize) -> usize {
        let len = self.elements.len();
        loop {
            let first = self.first_child(pos);
            if first >= len {
                break;
            }
            let last = first.saturating_add(self.branching_factor).min(len);

            let mut best = first;
            for child in first + 1..last {
                if C::precedes(self.elements[child].priority, self.elements[best].priority) {
                    best = child;
                }
            }

            if C::precedes(self.elements[best].priority, self.elements[pos].priority) {
                self.swap(pos, best);
                pos = best;
            } else {
                break;
            }
        }
        pos
    }

    /// Restores the heap property over the whole vector, bottom-up
    fn heapify(&mut self) {
        let len = self.elements.len();
        if len < 2 {
            return;
        }
        let last_internal = self.parent(len - 1);
        for pos in (0..=last_internal).rev() {
            self.sift_down(pos);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{MaxFirst, MinFirst};

    fn entry(identity: u64, priority: f64) -> Entry<u64> {
        Entry {
            value: identity,
            identity,
            priority,
        }
    }

    fn drain<C: Comparator>(store: &mut Store<u64, C>) -> Vec<f64> {
        let mut out = Vec::new();
        while let Some(e) = store.pop() {
            assert!(store.check_invariants());
            out.push(e.priority);
        }
        out
    }

    #[test]
    fn test_layout_arithmetic() {
        let store: Store<u64, MaxFirst> = Store::new(3, 0);
        assert_eq!(store.first_child(0), 1);
        assert_eq!(store.first_child(1), 4);
        assert_eq!(store.parent(1), 0);
        assert_eq!(store.parent(3), 0);
        assert_eq!(store.parent(4), 1);
        assert_eq!(store.parent(6), 1);
        assert_eq!(store.parent(7), 2);
    }

    #[test]
    fn test_insert_keeps_bijection() {
        let mut store: Store<u64, MaxFirst> = Store::new(2, 0);
        for (i, p) in [20.0, 2.0, 987.0, 454.0, -2.0, 490.0].iter().enumerate() {
            store.insert(i as u64, i as u64, *p).unwrap();
            assert!(store.check_invariants());
        }
        assert_eq!(store.len(), 6);
        assert_eq!(store.peek().map(|e| e.priority), Some(987.0));
    }

    #[test]
    fn test_sift_down_prefers_leftmost_on_ties() {
        let mut store: Store<u64, MaxFirst> = Store::new(3, 0);
        store.insert(0, 0, 10.0).unwrap();
        store.insert(1, 1, 5.0).unwrap();
        store.insert(2, 2, 5.0).unwrap();
        store.insert(3, 3, 5.0).unwrap();
        store.pop().unwrap();
        // Last element (3) moved to the root; children 1 and 2 tie with it,
        // so nothing moves.
        assert_eq!(store.peek().map(|e| e.identity), Some(3));

        let mut store: Store<u64, MaxFirst> = Store::new(3, 0);
        store.insert(0, 0, 10.0).unwrap();
        store.insert(1, 1, 7.0).unwrap();
        store.insert(2, 2, 7.0).unwrap();
        store.insert(3, 3, 1.0).unwrap();
        store.pop().unwrap();
        // Root holds 1.0 after the move; the tie between 1 and 2 goes left.
        assert_eq!(store.peek().map(|e| e.identity), Some(1));
        assert!(store.check_invariants());
    }

    #[test]
    fn test_duplicate_identity_rejected() {
        let mut store: Store<u64, MaxFirst> = Store::new(2, 0);
        store.insert(1, 7, 1.0).unwrap();
        assert_eq!(
            store.insert(2, 7, 2.0),
            Err(HeapError::DuplicateIdentity(7))
        );
        assert_eq!(store.len(), 1);
        assert!(store.check_invariants());
    }

    #[test]
    fn test_nan_rejected() {
        let mut store: Store<u64, MinFirst> = Store::new(2, 0);
        assert_eq!(store.insert(1, 1, f64::NAN), Err(HeapError::InvalidPriority));
        store.insert(1, 1, 1.0).unwrap();
        assert_eq!(
            store.update_priority(1, f64::NAN),
            Err(HeapError::InvalidPriority)
        );
        assert_eq!(store.priority_of(1), Ok(1.0));
    }

    #[test]
    fn test_remove_last_position_truncates() {
        let mut store: Store<u64, MinFirst> = Store::new(2, 0);
        for i in 0..5 {
            store.insert(i, i, i as f64).unwrap();
        }
        let removed = store.remove(4).unwrap();
        assert_eq!(removed.identity, 4);
        assert_eq!(store.len(), 4);
        assert!(!store.contains(4));
        assert!(store.check_invariants());
    }

    #[test]
    fn test_remove_relocated_element_sifts_up() {
        // Min-heap, d = 2:
        //          0
        //      10      1
        //    11  12   2  3
        // Removing 11 moves 3 under 10, where it must rise.
        let mut store: Store<u64, MinFirst> = Store::new(2, 0);
        let layout = [
            (0, 0.0),
            (10, 10.0),
            (1, 1.0),
            (11, 11.0),
            (12, 12.0),
            (2, 2.0),
            (3, 3.0),
        ];
        for (id, p) in layout {
            store.insert(id, id, p).unwrap();
        }
        assert!(store.check_invariants());
        store.remove(11).unwrap();
        assert!(store.check_invariants());
        assert_eq!(drain(&mut store), vec![0.0, 1.0, 2.0, 3.0, 10.0, 12.0]);
    }

    #[test]
    fn test_remove_relocated_element_sifts_down() {
        let mut store: Store<u64, MinFirst> = Store::new(2, 0);
        for i in 0..15 {
            store.insert(i, i, i as f64).unwrap();
        }
        store.remove(1).unwrap();
        assert!(store.check_invariants());
        assert_eq!(store.len(), 14);
        assert_eq!(drain(&mut store).len(), 14);
    }

    #[test]
    fn test_update_priority_no_move_when_equal() {
        let mut store: Store<u64, MaxFirst> = Store::new(2, 0);
        store.insert(1, 1, 5.0).unwrap();
        store.insert(2, 2, 3.0).unwrap();
        store.update_priority(2, 3.0).unwrap();
        assert_eq!(store.peek().map(|e| e.identity), Some(1));
        assert_eq!(
            store.update_priority(9, 1.0),
            Err(HeapError::ElementNotFound(9))
        );
    }

    #[test]
    fn test_from_entries_heapifies_root() {
        // The largest value sits in a position that only a sift at the root
        // can fix.
        let entries = vec![entry(0, 1.0), entry(1, 2.0), entry(2, 3.0)];
        let mut store: Store<u64, MaxFirst> = Store::from_entries(2, entries).unwrap();
        assert!(store.check_invariants());
        assert_eq!(drain(&mut store), vec![3.0, 2.0, 1.0]);
    }

    #[test]
    fn test_from_entries_rejects_duplicates() {
        let entries = vec![entry(0, 1.0), entry(0, 2.0)];
        let result: Result<Store<u64, MaxFirst>> = Store::from_entries(2, entries);
        assert_eq!(result.err(), Some(HeapError::DuplicateIdentity(0)));
    }

    #[test]
    fn test_clear() {
        let mut store: Store<u64, MaxFirst> = Store::new(4, 16);
        for i in 0..10 {
            store.insert(i, i, i as f64).unwrap();
        }
        store.clear();
        assert!(store.is_empty());
        assert!(!store.contains(3));
        assert!(store.check_invariants());
    }
}
