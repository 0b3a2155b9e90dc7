//! Sparse membership sets over the entity id space.
//!
//! [`IdSet`] stores one bit per id, grouped into 64-bit words that are only
//! materialized when a member falls inside them. Enumeration is always in
//! ascending id order, which the save format relies on.

use std::collections::BTreeMap;

use oly_core::EntityId;

const WORD_BITS: u32 = 64;

/// A sparse set of entity ids with ascending enumeration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IdSet {
    /// Word index (`id / 64`) → membership bits. Never holds a zero word.
    words: BTreeMap<u32, u64>,
    len: usize,
}

impl IdSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    fn split(id: EntityId) -> (u32, u64) {
        (id.get() / WORD_BITS, 1u64 << (id.get() % WORD_BITS))
    }

    /// Set the membership bit for `id`. Returns `true` if it was not set.
    pub fn insert(&mut self, id: EntityId) -> bool {
        let (word, bit) = Self::split(id);
        let slot = self.words.entry(word).or_insert(0);
        let added = *slot & bit == 0;
        *slot |= bit;
        if added {
            self.len += 1;
        }
        added
    }

    /// Clear the membership bit for `id`. Returns `true` if it was set.
    pub fn remove(&mut self, id: EntityId) -> bool {
        let (word, bit) = Self::split(id);
        let Some(slot) = self.words.get_mut(&word) else {
            return false;
        };
        if *slot & bit == 0 {
            return false;
        }
        *slot &= !bit;
        if *slot == 0 {
            self.words.remove(&word);
        }
        self.len -= 1;
        true
    }

    /// Whether `id` is a member.
    pub fn contains(&self, id: EntityId) -> bool {
        let (word, bit) = Self::split(id);
        self.words.get(&word).is_some_and(|w| w & bit != 0)
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the set has no members.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Remove every member.
    pub fn clear(&mut self) {
        self.words.clear();
        self.len = 0;
    }

    /// Members in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.words.iter().flat_map(|(&word, &bits)| {
            (0..WORD_BITS)
                .filter(move |b| bits & (1u64 << b) != 0)
                .filter_map(move |b| EntityId::new(word * WORD_BITS + b))
        })
    }
}

impl FromIterator<EntityId> for IdSet {
    fn from_iter<I: IntoIterator<Item = EntityId>>(iter: I) -> Self {
        let mut set = IdSet::new();
        set.extend(iter);
        set
    }
}

impl Extend<EntityId> for IdSet {
    fn extend<I: IntoIterator<Item = EntityId>>(&mut self, iter: I) {
        for id in iter {
            self.insert(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn id(raw: u32) -> EntityId {
        EntityId::new(raw).unwrap()
    }

    #[test]
    fn insert_remove_contains() {
        let mut set = IdSet::new();
        assert!(set.insert(id(10101)));
        assert!(!set.insert(id(10101)));
        assert!(set.contains(id(10101)));
        assert!(!set.contains(id(10102)));
        assert_eq!(set.len(), 1);
        assert!(set.remove(id(10101)));
        assert!(!set.remove(id(10101)));
        assert!(set.is_empty());
        assert!(set.words.is_empty(), "zero words are dropped");
    }

    #[test]
    fn enumerates_ascending_across_words() {
        let set: IdSet = [id(102400), id(63), id(64), id(1), id(20000)]
            .into_iter()
            .collect();
        let got: Vec<u32> = set.iter().map(EntityId::get).collect();
        assert_eq!(got, vec![1, 63, 64, 20000, 102400]);
    }

    proptest! {
        #[test]
        fn matches_sorted_dedup(raws in proptest::collection::vec(1u32..=102_400, 0..64)) {
            let set: IdSet = raws.iter().map(|&r| id(r)).collect();
            let mut expected = raws.clone();
            expected.sort_unstable();
            expected.dedup();
            let got: Vec<u32> = set.iter().map(EntityId::get).collect();
            prop_assert_eq!(set.len(), expected.len());
            prop_assert_eq!(got, expected);
        }
    }
}
