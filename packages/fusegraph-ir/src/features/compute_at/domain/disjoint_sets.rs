//! Disjoint Sets over iteration-domain handles
//!
//! Union-find keyed by `IterDomainId` with:
//! - Path compression: O(α(n)) find operations
//! - Union by size: the larger class keeps its root
//! - Members index: every root owns the ordered member list of its class
//!
//! Member order is deterministic: on a merge of `a`'s class with `b`'s, the
//! merged list is `a`'s members followed by `b`'s, regardless of which root
//! survives. Class iteration follows root slot order, which is registration
//! order of the surviving root.

use crate::shared::models::IterDomainId;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

crate::define_id!(ClassId, "set");

/// Partition of registered iteration domains into equivalence classes
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisjointSets {
    /// Parent slot (self-loop = root)
    parent: Vec<u32>,

    /// Class size (only valid for roots)
    size: Vec<u32>,

    /// Class members (only non-empty for roots)
    members: Vec<Vec<IterDomainId>>,

    /// Slot → handle
    keys: Vec<IterDomainId>,

    /// Handle → slot
    slots: FxHashMap<IterDomainId, u32>,

    /// Number of disjoint sets
    set_count: usize,
}

impl DisjointSets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `id` as a singleton class
    ///
    /// Returns false if `id` was already registered.
    pub fn initialize_set(&mut self, id: IterDomainId) -> bool {
        if self.slots.contains_key(&id) {
            return false;
        }
        self.insert_slot(id);
        true
    }

    fn insert_slot(&mut self, id: IterDomainId) -> u32 {
        let slot = self.keys.len() as u32;
        self.parent.push(slot);
        self.size.push(1);
        self.members.push(vec![id]);
        self.keys.push(id);
        self.slots.insert(id, slot);
        self.set_count += 1;
        slot
    }

    fn slot_or_insert(&mut self, id: IterDomainId) -> u32 {
        match self.slots.get(&id) {
            Some(slot) => *slot,
            None => self.insert_slot(id),
        }
    }

    /// Find root slot with path compression
    fn find_slot(&mut self, slot: u32) -> u32 {
        let mut root = slot;
        while self.parent[root as usize] != root {
            root = self.parent[root as usize];
        }
        let mut current = slot;
        while self.parent[current as usize] != root {
            let next = self.parent[current as usize];
            self.parent[current as usize] = root;
            current = next;
        }
        root
    }

    /// Find root slot without path compression (for read-only queries)
    #[inline]
    fn find_slot_readonly(&self, slot: u32) -> u32 {
        let mut current = slot;
        while self.parent[current as usize] != current {
            current = self.parent[current as usize];
        }
        current
    }

    /// Union the classes of `a` and `b`, registering either if unseen
    ///
    /// Returns true if two distinct classes were merged.
    pub fn map_entries(&mut self, a: IterDomainId, b: IterDomainId) -> bool {
        let slot_a = self.slot_or_insert(a);
        let slot_b = self.slot_or_insert(b);
        let root_a = self.find_slot(slot_a);
        let root_b = self.find_slot(slot_b);
        if root_a == root_b {
            return false;
        }

        let (ra, rb) = (root_a as usize, root_b as usize);
        let mut merged = std::mem::take(&mut self.members[ra]);
        merged.append(&mut self.members[rb]);

        let new_root = if self.size[ra] < self.size[rb] {
            self.parent[ra] = root_b;
            self.size[rb] += self.size[ra];
            rb
        } else {
            self.parent[rb] = root_a;
            self.size[ra] += self.size[rb];
            ra
        };
        self.members[new_root] = merged;
        self.set_count -= 1;
        true
    }

    /// Whether `id` has been registered
    #[inline]
    pub fn mapping_exists(&self, id: IterDomainId) -> bool {
        self.slots.contains_key(&id)
    }

    /// Class handle of `id`, if registered
    pub fn class_of(&self, id: IterDomainId) -> Option<ClassId> {
        self.slots
            .get(&id)
            .map(|slot| ClassId::new(self.find_slot_readonly(*slot)))
    }

    /// Members of `class`, in merge order
    pub fn members(&self, class: ClassId) -> &[IterDomainId] {
        self.members
            .get(class.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Members of the class containing `id`
    pub fn set_of(&self, id: IterDomainId) -> Option<&[IterDomainId]> {
        self.class_of(id).map(|class| self.members(class))
    }

    /// Both registered and in the same class
    pub fn strict_are_mapped(&self, a: IterDomainId, b: IterDomainId) -> bool {
        match (self.class_of(a), self.class_of(b)) {
            (Some(ca), Some(cb)) => ca == cb,
            _ => false,
        }
    }

    /// All classes in root slot order
    pub fn classes(&self) -> impl Iterator<Item = (ClassId, &[IterDomainId])> {
        self.parent
            .iter()
            .enumerate()
            .filter(|(slot, parent)| **parent as usize == *slot)
            .map(move |(slot, _)| (ClassId::new(slot as u32), self.members[slot].as_slice()))
    }

    /// Registered handles in registration order
    pub fn ids(&self) -> &[IterDomainId] {
        &self.keys
    }

    /// Point every slot directly at its root
    pub fn freeze(&mut self) {
        for slot in 0..self.parent.len() as u32 {
            self.find_slot(slot);
        }
    }

    /// Number of disjoint sets
    #[inline]
    pub fn count(&self) -> usize {
        self.set_count
    }

    /// Total number of registered handles
    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
