//! Insertion-ordered map between iteration domains
//!
//! Union order decides class member order, and member order decides
//! concrete-id tie breaks, so maps iterate in insertion order.

use crate::shared::models::IterDomainId;
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdMap {
    pairs: Vec<(IterDomainId, IterDomainId)>,
    index: FxHashMap<IterDomainId, usize>,
}

impl IdMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite; overwrites keep the original position
    pub fn insert(&mut self, key: IterDomainId, value: IterDomainId) {
        match self.index.get(&key) {
            Some(&slot) => self.pairs[slot].1 = value,
            None => {
                self.index.insert(key, self.pairs.len());
                self.pairs.push((key, value));
            }
        }
    }

    pub fn get(&self, key: IterDomainId) -> Option<IterDomainId> {
        self.index.get(&key).map(|&slot| self.pairs[slot].1)
    }

    pub fn contains_key(&self, key: IterDomainId) -> bool {
        self.index.contains_key(&key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (IterDomainId, IterDomainId)> + '_ {
        self.pairs.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl FromIterator<(IterDomainId, IterDomainId)> for IdMap {
    fn from_iter<I: IntoIterator<Item = (IterDomainId, IterDomainId)>>(iter: I) -> Self {
        let mut map = IdMap::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: u32) -> IterDomainId {
        IterDomainId::new(raw)
    }

    #[test]
    fn test_insertion_order_is_kept() {
        let map: IdMap = [(id(5), id(1)), (id(2), id(3)), (id(9), id(0))]
            .into_iter()
            .collect();
        let keys: Vec<_> = map.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![id(5), id(2), id(9)]);
    }

    #[test]
    fn test_overwrite_keeps_position() {
        let mut map = IdMap::new();
        map.insert(id(1), id(10));
        map.insert(id(2), id(20));
        map.insert(id(1), id(11));
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(id(1)), Some(id(11)));
        assert_eq!(map.iter().next(), Some((id(1), id(11))));
        assert!(!map.contains_key(id(3)));
    }
}
