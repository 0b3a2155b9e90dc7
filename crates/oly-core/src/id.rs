//! Strongly-typed entity identifiers and the static id-space partition.

use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

/// Largest valid entity id. Raw value 0 is the null reference.
pub const MAX_ENTITY_ID: u32 = 102_400;

/// Identifies an entity record ("box") in the world store.
///
/// Always lies in `1..=MAX_ENTITY_ID`; construction goes through
/// [`EntityId::new`] so an out-of-range value can never be held. The null
/// reference of the on-disk format is represented as `Option::None`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct EntityId(u32);

impl EntityId {
    /// Validate a raw id. Returns `None` for 0 and anything past
    /// [`MAX_ENTITY_ID`].
    pub const fn new(raw: u32) -> Option<Self> {
        if raw >= 1 && raw <= MAX_ENTITY_ID {
            Some(Self(raw))
        } else {
            None
        }
    }

    /// The raw integer value.
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Slot index into a dense table of `MAX_ENTITY_ID + 1` entries.
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// The partition this id belongs to.
    pub fn range(self) -> IdRange {
        IdRange::of(self)
    }

    /// Short alphanumeric code, see [`crate::codec::encode`].
    pub fn code(self) -> String {
        crate::codec::encode(self)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u32> for EntityId {
    type Error = String;

    fn try_from(raw: u32) -> Result<Self, Self::Error> {
        Self::new(raw).ok_or_else(|| format!("entity id {raw} outside 1..={MAX_ENTITY_ID}"))
    }
}

impl From<EntityId> for u32 {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

/// One of the disjoint partitions of the id space.
///
/// The partition fixes both the printed shape of an id (see
/// [`crate::codec`]) and the pool the allocator draws from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IdRange {
    /// 1–9,999: static content (items, skills), printed as digits.
    Static,
    /// 10,000–19,999: provinces, printed `CCNN`.
    Province,
    /// 20,000–26,759: player entities, printed `CCN`.
    Player,
    /// 26,760–33,519: prime characters, printed `CNC`.
    PrimeCharacter,
    /// 33,520–36,119: prime locations, printed `CNN`.
    PrimeLocation,
    /// 36,120–102,400: overflow and sub-locations, printed `CCNC`.
    Overflow,
}

impl IdRange {
    /// Every partition, in ascending id order.
    pub const ALL: [IdRange; 6] = [
        IdRange::Static,
        IdRange::Province,
        IdRange::Player,
        IdRange::PrimeCharacter,
        IdRange::PrimeLocation,
        IdRange::Overflow,
    ];

    /// First raw id of the partition.
    pub const fn low(self) -> u32 {
        match self {
            Self::Static => 1,
            Self::Province => 10_000,
            Self::Player => 20_000,
            Self::PrimeCharacter => 26_760,
            Self::PrimeLocation => 33_520,
            Self::Overflow => 36_120,
        }
    }

    /// Last raw id of the partition (inclusive).
    pub const fn high(self) -> u32 {
        match self {
            Self::Static => 9_999,
            Self::Province => 19_999,
            Self::Player => 26_759,
            Self::PrimeCharacter => 33_519,
            Self::PrimeLocation => 36_119,
            Self::Overflow => MAX_ENTITY_ID,
        }
    }

    /// Inclusive raw bounds.
    pub const fn bounds(self) -> RangeInclusive<u32> {
        self.low()..=self.high()
    }

    /// Number of slots in the partition.
    pub const fn len(self) -> u32 {
        self.high() - self.low() + 1
    }

    /// Partitions are never empty.
    pub const fn is_empty(self) -> bool {
        false
    }

    /// Classify an id.
    pub fn of(id: EntityId) -> IdRange {
        let raw = id.get();
        // ALL is ascending, so the last partition whose low bound is
        // not above `raw` is the one containing it.
        Self::ALL
            .iter()
            .rev()
            .copied()
            .find(|r| r.low() <= raw)
            .unwrap_or(IdRange::Static)
    }
}
