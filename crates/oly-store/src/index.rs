//! Sorted enumeration indices by kind and sub-kind.
//!
//! Each [`Chain`] holds the ids of one kind (or one sub-kind) in strictly
//! ascending order; output ordering of every save file and turn report
//! follows it. A [`TypeIndex`] maps each key to its chain.
//!
//! Ids are mostly handed out in ascending order while a world is loaded,
//! so insertion first checks the chain tail: an id above the current last
//! element is a plain push. Anything else falls back to a binary-searched
//! insert.

use std::hash::Hash;

use indexmap::IndexMap;
use oly_core::EntityId;

/// Ascending sequence of the ids sharing one kind or sub-kind.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Chain {
    ids: Vec<EntityId>,
}

impl Chain {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `id`, keeping ascending order.
    ///
    /// Returns `None` if the id was already linked, otherwise whether the
    /// insert took the append fast path.
    fn insert(&mut self, id: EntityId) -> Option<bool> {
        match self.ids.last() {
            None => {
                self.ids.push(id);
                Some(true)
            }
            Some(&last) if last < id => {
                self.ids.push(id);
                Some(true)
            }
            Some(_) => {
                let pos = self.ids.binary_search(&id).err()?;
                self.ids.insert(pos, id);
                Some(false)
            }
        }
    }

    /// Unlink `id`. Returns whether it was present.
    fn remove(&mut self, id: EntityId) -> bool {
        match self.ids.binary_search(&id) {
            Ok(pos) => {
                self.ids.remove(pos);
                true
            }
            Err(_) => false,
        }
    }

    /// Whether `id` is linked.
    pub fn contains(&self, id: EntityId) -> bool {
        self.ids.binary_search(&id).is_ok()
    }

    /// Number of linked ids.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the chain is empty.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Lowest linked id.
    pub fn first(&self) -> Option<EntityId> {
        self.ids.first().copied()
    }

    /// Linked ids in ascending order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = EntityId> + ExactSizeIterator + '_ {
        self.ids.iter().copied()
    }

    /// Linked ids as a slice.
    pub fn as_slice(&self) -> &[EntityId] {
        &self.ids
    }
}

/// Counters describing how insertions were served.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IndexStats {
    /// Insertions served by appending to the chain tail.
    pub appends: u64,
    /// Insertions that needed a sorted (binary search) insert.
    pub sorted_inserts: u64,
    /// Unlinks.
    pub removals: u64,
}

/// Per-key chains for one classification level.
#[derive(Clone, Debug)]
pub struct TypeIndex<K> {
    chains: IndexMap<K, Chain>,
    stats: IndexStats,
}

impl<K: Copy + Eq + Hash> TypeIndex<K> {
    /// Create an empty index.
    pub fn new() -> Self {
        Self {
            chains: IndexMap::new(),
            stats: IndexStats::default(),
        }
    }

    /// Link `id` into the chain for `key`. Returns `false` if it was
    /// already linked there.
    pub fn insert(&mut self, key: K, id: EntityId) -> bool {
        match self.chains.entry(key).or_default().insert(id) {
            Some(true) => {
                self.stats.appends += 1;
                true
            }
            Some(false) => {
                self.stats.sorted_inserts += 1;
                true
            }
            None => false,
        }
    }

    /// Unlink `id` from the chain for `key`. Returns whether it was there.
    pub fn remove(&mut self, key: K, id: EntityId) -> bool {
        let removed = self
            .chains
            .get_mut(&key)
            .is_some_and(|chain| chain.remove(id));
        if removed {
            self.stats.removals += 1;
        }
        removed
    }

    /// The chain for `key`, if anything was ever linked under it.
    pub fn chain(&self, key: K) -> Option<&Chain> {
        self.chains.get(&key)
    }

    /// Ids linked under `key`, ascending.
    pub fn iter(&self, key: K) -> impl Iterator<Item = EntityId> + '_ {
        self.chains.get(&key).into_iter().flat_map(Chain::iter)
    }

    /// Number of ids linked under `key`.
    pub fn count(&self, key: K) -> usize {
        self.chains.get(&key).map_or(0, Chain::len)
    }

    /// Total ids linked across every key.
    pub fn total(&self) -> usize {
        self.chains.values().map(Chain::len).sum()
    }

    /// Insertion counters.
    pub fn stats(&self) -> IndexStats {
        self.stats
    }

    /// Drop every chain.
    pub fn clear(&mut self) {
        self.chains.clear();
        self.stats = IndexStats::default();
    }
}

impl<K: Copy + Eq + Hash> Default for TypeIndex<K> {
    fn default() -> Self {
        Self::new()
    }
}
