//! The entity arena, its allocator and its type indices.
//!
//! [`Store`] owns one slot per possible id. A slot, once occupied, is
//! never emptied again: deletion turns the record into a tombstone and
//! unlinks it from both indices, but the id stays consumed for the life
//! of the world.

use std::ops::RangeInclusive;

use oly_core::{EntityId, IdRange, Kind, SubKind, MAX_ENTITY_ID};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, warn};

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::index::TypeIndex;
use crate::record::EntityRecord;

/// Owned world-state table.
///
/// All mutation goes through `&mut self`; the store is single-writer by
/// construction.
pub struct Store {
    config: StoreConfig,
    /// Dense id-indexed table; slot 0 is never used.
    slots: Vec<Option<Box<EntityRecord>>>,
    by_kind: TypeIndex<Kind>,
    by_sub_kind: TypeIndex<SubKind>,
    rng: ChaCha8Rng,
    allocated: usize,
    tombstones: usize,
}

impl Store {
    /// Create an empty store.
    pub fn new(config: StoreConfig) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        let mut slots = Vec::with_capacity(MAX_ENTITY_ID as usize + 1);
        slots.resize_with(MAX_ENTITY_ID as usize + 1, || None);
        Self {
            config,
            slots,
            by_kind: TypeIndex::new(),
            by_sub_kind: TypeIndex::new(),
            rng,
            allocated: 0,
            tombstones: 0,
        }
    }

    /// The configuration this store was built with.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    // ── Allocation ──────────────────────────────────────────────

    /// Candidate ranges for a new entity of `kind`, in order of
    /// preference.
    fn candidate_ranges(&self, kind: Kind) -> &'static [IdRange] {
        match kind {
            Kind::Player => &[IdRange::Player, IdRange::Overflow],
            Kind::Character if self.config.prime_ranges => {
                &[IdRange::PrimeCharacter, IdRange::Overflow]
            }
            Kind::Location if self.config.prime_ranges => {
                &[IdRange::PrimeLocation, IdRange::Overflow]
            }
            _ => &[IdRange::Overflow],
        }
    }

    /// Allocate a fresh id for a new entity and link it into both indices.
    ///
    /// # Errors
    ///
    /// [`StoreError::RangeExhausted`] when every candidate range is full.
    pub fn allocate(&mut self, kind: Kind, sub_kind: SubKind) -> Result<EntityId, StoreError> {
        let ranges = self.candidate_ranges(kind);
        let mut last = IdRange::Overflow;
        for &range in ranges {
            if let Some(id) = self.pick_free(range.bounds()) {
                self.occupy(id, kind, sub_kind);
                return Ok(id);
            }
            warn!(?range, %kind, "id range exhausted, falling through");
            last = range;
        }
        Err(StoreError::RangeExhausted { range: last })
    }

    /// Assign a known id directly, bypassing the random search.
    ///
    /// Used by the load path, which learns ids from disk. Allocating a
    /// `Deleted` record re-creates a tombstone without linking it.
    ///
    /// # Errors
    ///
    /// [`StoreError::DoubleAllocation`] if the slot is already occupied,
    /// tombstones included.
    pub fn allocate_at(
        &mut self,
        id: EntityId,
        kind: Kind,
        sub_kind: SubKind,
    ) -> Result<(), StoreError> {
        if self.slots[id.index()].is_some() {
            return Err(StoreError::DoubleAllocation { id });
        }
        self.occupy(id, kind, sub_kind);
        Ok(())
    }

    /// Find an unused slot in `bounds`.
    ///
    /// Starts at a uniformly random position, scans up to the high bound,
    /// then wraps and scans from the low bound. Returns `None` when every
    /// slot is taken.
    pub fn pick_free(&mut self, bounds: RangeInclusive<u32>) -> Option<EntityId> {
        let (low, high) = (*bounds.start(), *bounds.end());
        if low > high {
            return None;
        }
        let start = self.rng.random_range(low..=high);
        (start..=high)
            .chain(low..start)
            .filter_map(EntityId::new)
            .find(|id| self.slots[id.index()].is_none())
    }

    fn occupy(&mut self, id: EntityId, kind: Kind, sub_kind: SubKind) {
        self.slots[id.index()] = Some(Box::new(EntityRecord::new(id, kind, sub_kind)));
        self.allocated += 1;
        if kind.is_tombstone() {
            self.tombstones += 1;
        } else {
            self.link(id, kind, sub_kind);
        }
    }

    fn link(&mut self, id: EntityId, kind: Kind, sub_kind: SubKind) {
        let fresh_kind = self.by_kind.insert(kind, id);
        let fresh_sub = self.by_sub_kind.insert(sub_kind, id);
        debug_assert!(fresh_kind && fresh_sub, "entity {id} linked twice");
    }

    fn unlink(&mut self, id: EntityId, kind: Kind, sub_kind: SubKind) {
        let had_kind = self.by_kind.remove(kind, id);
        let had_sub = self.by_sub_kind.remove(sub_kind, id);
        debug_assert!(had_kind && had_sub, "entity {id} was not linked");
    }

    // ── Deletion and retyping ───────────────────────────────────

    /// Logically delete an entity.
    ///
    /// The record is unlinked from both indices, stripped of its name,
    /// facets and collections, and stamped [`Kind::Deleted`]. The id is
    /// never handed out again.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotAllocated`] for an unknown id,
    /// [`StoreError::Tombstone`] for a second delete.
    pub fn delete(&mut self, id: EntityId) -> Result<(), StoreError> {
        let (kind, sub_kind) = self.live_header(id)?;
        self.unlink(id, kind, sub_kind);
        if let Some(record) = self.slots[id.index()].as_deref_mut() {
            record.strip();
            record.set_header(Kind::Deleted, SubKind::None);
        }
        self.tombstones += 1;
        debug!(%id, %kind, "entity deleted");
        Ok(())
    }

    /// Change the kind and sub-kind of a live entity, moving it between
    /// chains. The id is unchanged. Retyping to [`Kind::Deleted`] is a
    /// [`delete`](Self::delete).
    ///
    /// # Errors
    ///
    /// As for [`delete`](Self::delete).
    pub fn set_kind(&mut self, id: EntityId, kind: Kind, sub_kind: SubKind) -> Result<(), StoreError> {
        if kind.is_tombstone() {
            return self.delete(id);
        }
        let (old_kind, old_sub) = self.live_header(id)?;
        if (old_kind, old_sub) == (kind, sub_kind) {
            return Ok(());
        }
        self.unlink(id, old_kind, old_sub);
        self.link(id, kind, sub_kind);
        if let Some(record) = self.slots[id.index()].as_deref_mut() {
            record.set_header(kind, sub_kind);
        }
        debug!(%id, from = %old_kind, to = %kind, "entity retyped");
        Ok(())
    }

    fn live_header(&self, id: EntityId) -> Result<(Kind, SubKind), StoreError> {
        let record = self.record(id)?;
        if record.is_tombstone() {
            return Err(StoreError::Tombstone { id });
        }
        Ok((record.kind(), record.sub_kind()))
    }

    // ── Lookup ──────────────────────────────────────────────────

    /// Whether the slot is occupied (tombstones included).
    pub fn is_allocated(&self, id: EntityId) -> bool {
        self.slots[id.index()].is_some()
    }

    /// Whether the slot holds a live (non-tombstone) record.
    pub fn is_live(&self, id: EntityId) -> bool {
        self.get(id).is_some_and(|r| !r.is_tombstone())
    }

    /// The record for `id`, if allocated.
    pub fn get(&self, id: EntityId) -> Option<&EntityRecord> {
        self.slots[id.index()].as_deref()
    }

    /// Mutable access to the record for `id`, if allocated.
    ///
    /// Header fields can only be changed through the store
    /// ([`set_kind`](Self::set_kind), [`delete`](Self::delete)).
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut EntityRecord> {
        self.slots[id.index()].as_deref_mut()
    }

    /// The record for `id`, or [`StoreError::NotAllocated`].
    pub fn record(&self, id: EntityId) -> Result<&EntityRecord, StoreError> {
        self.get(id).ok_or(StoreError::NotAllocated { id })
    }

    /// Mutable record for `id`, or [`StoreError::NotAllocated`].
    pub fn record_mut(&mut self, id: EntityId) -> Result<&mut EntityRecord, StoreError> {
        self.get_mut(id).ok_or(StoreError::NotAllocated { id })
    }

    /// Kind of an allocated entity.
    pub fn kind_of(&self, id: EntityId) -> Option<Kind> {
        self.get(id).map(EntityRecord::kind)
    }

    // ── Enumeration ─────────────────────────────────────────────

    /// Live entities of `kind`, ascending by id.
    pub fn of_kind(&self, kind: Kind) -> impl Iterator<Item = EntityId> + '_ {
        self.by_kind.iter(kind)
    }

    /// Live entities of `sub_kind`, ascending by id.
    pub fn of_sub_kind(&self, sub_kind: SubKind) -> impl Iterator<Item = EntityId> + '_ {
        self.by_sub_kind.iter(sub_kind)
    }

    /// Number of live entities of `kind`.
    pub fn count_of_kind(&self, kind: Kind) -> usize {
        self.by_kind.count(kind)
    }

    /// Number of live entities of `sub_kind`.
    pub fn count_of_sub_kind(&self, sub_kind: SubKind) -> usize {
        self.by_sub_kind.count(sub_kind)
    }

    /// Every allocated id, tombstones included, ascending.
    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.slots
            .iter()
            .filter_map(|slot| slot.as_deref().map(EntityRecord::id))
    }

    /// The kind index.
    pub fn kind_index(&self) -> &TypeIndex<Kind> {
        &self.by_kind
    }

    /// The sub-kind index.
    pub fn sub_kind_index(&self) -> &TypeIndex<SubKind> {
        &self.by_sub_kind
    }

    /// Number of occupied slots, tombstones included.
    pub fn len(&self) -> usize {
        self.allocated
    }

    /// Whether no slot is occupied.
    pub fn is_empty(&self) -> bool {
        self.allocated == 0
    }

    /// Number of tombstones.
    pub fn tombstone_count(&self) -> usize {
        self.tombstones
    }

    /// Empty every slot and index. The allocator's random stream is
    /// re-seeded from the config.
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
        self.by_kind.clear();
        self.by_sub_kind.clear();
        self.rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        self.allocated = 0;
        self.tombstones = 0;
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn id(raw: u32) -> EntityId {
        EntityId::new(raw).unwrap()
    }

    fn ids_of(store: &Store, kind: Kind) -> Vec<u32> {
        store.of_kind(kind).map(EntityId::get).collect()
    }

    #[test]
    fn players_come_from_the_player_range() {
        let mut store = Store::default();
        for _ in 0..100 {
            let pl = store.allocate(Kind::Player, SubKind::PlayerRegular).unwrap();
            assert_eq!(pl.range(), IdRange::Player);
        }
        assert_eq!(store.count_of_kind(Kind::Player), 100);
    }

    #[test]
    fn player_range_spills_into_overflow() {
        let mut store = Store::default();
        for raw in IdRange::Player.bounds() {
            store
                .allocate_at(id(raw), Kind::Player, SubKind::PlayerRegular)
                .unwrap();
        }
        let pl = store.allocate(Kind::Player, SubKind::PlayerRegular).unwrap();
        assert_eq!(pl.range(), IdRange::Overflow);
    }

    #[test]
    fn prime_routing_follows_config() {
        let mut store = Store::default();
        let ch = store.allocate(Kind::Character, SubKind::None).unwrap();
        let lo = store.allocate(Kind::Location, SubKind::City).unwrap();
        let it = store.allocate(Kind::Item, SubKind::Artifact).unwrap();
        assert_eq!(ch.range(), IdRange::PrimeCharacter);
        assert_eq!(lo.range(), IdRange::PrimeLocation);
        assert_eq!(it.range(), IdRange::Overflow);

        let mut plain = Store::new(StoreConfig::new().with_prime_ranges(false));
        let ch = plain.allocate(Kind::Character, SubKind::None).unwrap();
        assert_eq!(ch.range(), IdRange::Overflow);
    }

    #[test]
    fn same_seed_same_ids() {
        let mut a = Store::new(StoreConfig::new().with_seed(42));
        let mut b = Store::new(StoreConfig::new().with_seed(42));
        for _ in 0..20 {
            assert_eq!(
                a.allocate(Kind::Item, SubKind::None).unwrap(),
                b.allocate(Kind::Item, SubKind::None).unwrap()
            );
        }
    }

    #[test]
    fn pick_free_wraps_around() {
        let mut store = Store::default();
        // Fill all but the lowest slot of a tiny range; whatever the random
        // start, the scan must wrap to find it.
        for raw in 11..=20 {
            store.allocate_at(id(raw), Kind::Skill, SubKind::None).unwrap();
        }
        assert_eq!(store.pick_free(10..=20), Some(id(10)));
        store.allocate_at(id(10), Kind::Skill, SubKind::None).unwrap();
        assert_eq!(store.pick_free(10..=20), None);
    }

    #[test]
    fn exhaustion_is_an_error() {
        let mut store = Store::default();
        for raw in IdRange::Overflow.bounds() {
            store.allocate_at(id(raw), Kind::Item, SubKind::None).unwrap();
        }
        assert_eq!(
            store.allocate(Kind::Item, SubKind::None),
            Err(StoreError::RangeExhausted {
                range: IdRange::Overflow
            })
        );
    }

    #[test]
    fn double_allocation_is_an_error() {
        let mut store = Store::default();
        store.allocate_at(id(10101), Kind::Location, SubKind::Forest).unwrap();
        assert_eq!(
            store.allocate_at(id(10101), Kind::Item, SubKind::None),
            Err(StoreError::DoubleAllocation { id: id(10101) })
        );
        assert_eq!(store.kind_of(id(10101)), Some(Kind::Location));
    }

    #[test]
    fn delete_tombstones_forever() {
        let mut store = Store::default();
        store.allocate_at(id(10101), Kind::Location, SubKind::Forest).unwrap();
        store.get_mut(id(10101)).unwrap().set_name("Gone");
        store.delete(id(10101)).unwrap();

        assert!(store.is_allocated(id(10101)));
        assert!(!store.is_live(id(10101)));
        assert_eq!(store.kind_of(id(10101)), Some(Kind::Deleted));
        assert_eq!(store.get(id(10101)).unwrap().name(), "");
        assert!(ids_of(&store, Kind::Location).is_empty());
        assert_eq!(store.of_sub_kind(SubKind::Forest).count(), 0);
        assert_eq!(store.of_kind(Kind::Deleted).count(), 0);
        assert_eq!(store.tombstone_count(), 1);

        assert_eq!(
            store.allocate_at(id(10101), Kind::Location, SubKind::Forest),
            Err(StoreError::DoubleAllocation { id: id(10101) })
        );
        assert_eq!(
            store.delete(id(10101)),
            Err(StoreError::Tombstone { id: id(10101) })
        );
    }

    #[test]
    fn delete_unknown_is_an_error() {
        let mut store = Store::default();
        assert_eq!(
            store.delete(id(5)),
            Err(StoreError::NotAllocated { id: id(5) })
        );
    }

    #[test]
    fn tombstones_can_be_recreated_directly() {
        let mut store = Store::default();
        store.allocate_at(id(40000), Kind::Deleted, SubKind::None).unwrap();
        assert!(store.is_allocated(id(40000)));
        assert_eq!(store.kind_index().total(), 0);
        assert_eq!(store.tombstone_count(), 1);
    }

    #[test]
    fn retype_moves_between_chains() {
        let mut store = Store::default();
        for raw in [36200, 36100, 36300] {
            store.allocate_at(id(raw), Kind::Character, SubKind::None).unwrap();
        }
        store.set_kind(id(36200), Kind::DeadCharacter, SubKind::None).unwrap();
        assert_eq!(ids_of(&store, Kind::Character), vec![36100, 36300]);
        assert_eq!(ids_of(&store, Kind::DeadCharacter), vec![36200]);

        store.set_kind(id(36200), Kind::Character, SubKind::None).unwrap();
        assert_eq!(ids_of(&store, Kind::Character), vec![36100, 36200, 36300]);

        store.set_kind(id(36300), Kind::Deleted, SubKind::None).unwrap();
        assert_eq!(store.kind_of(id(36300)), Some(Kind::Deleted));
        assert_eq!(
            store.set_kind(id(36300), Kind::Character, SubKind::None),
            Err(StoreError::Tombstone { id: id(36300) })
        );
    }

    #[test]
    fn ids_include_tombstones_in_order() {
        let mut store = Store::default();
        store.allocate_at(id(30), Kind::Item, SubKind::None).unwrap();
        store.allocate_at(id(10), Kind::Skill, SubKind::None).unwrap();
        store.allocate_at(id(20), Kind::Item, SubKind::None).unwrap();
        store.delete(id(20)).unwrap();
        let all: Vec<u32> = store.ids().map(EntityId::get).collect();
        assert_eq!(all, vec![10, 20, 30]);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn clear_empties_everything() {
        let mut store = Store::default();
        store.allocate(Kind::Nation, SubKind::None).unwrap();
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.kind_index().total(), 0);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn enumeration_matches_live_records(
            ops in proptest::collection::vec((0u8..3, 0usize..64), 1..120),
        ) {
            let kinds = [Kind::Item, Kind::Character, Kind::Ship];
            let mut store = Store::default();
            let mut live: Vec<EntityId> = Vec::new();
            for (op, pick) in ops {
                if op == 0 && !live.is_empty() {
                    let victim = live.swap_remove(pick % live.len());
                    store.delete(victim).unwrap();
                } else {
                    let kind = kinds[pick % kinds.len()];
                    live.push(store.allocate(kind, SubKind::None).unwrap());
                }
            }
            for kind in kinds {
                let mut expected: Vec<EntityId> = live
                    .iter()
                    .copied()
                    .filter(|&id| store.kind_of(id) == Some(kind))
                    .collect();
                expected.sort_unstable();
                let got: Vec<EntityId> = store.of_kind(kind).collect();
                prop_assert_eq!(got, expected);
            }
        }
    }
}
