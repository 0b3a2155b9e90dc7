//! Store-specific error types.

use oly_core::{EntityId, IdRange};

/// Errors raised by allocation, deletion and retyping.
///
/// `DoubleAllocation` and `RangeExhausted` are integrity failures: the
/// world graph can no longer be trusted and the turn run must stop.
/// `NotAllocated` and `Tombstone` signal a caller bug.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// `allocate_at` targeted a slot that is already occupied.
    #[error("entity {id} is already allocated")]
    DoubleAllocation {
        /// The occupied id.
        id: EntityId,
    },
    /// Every slot of the candidate range is in use.
    #[error("no free id left in range {low}..={high}", low = .range.low(), high = .range.high())]
    RangeExhausted {
        /// The range that ran dry.
        range: IdRange,
    },
    /// The id has never been allocated.
    #[error("entity {id} is not allocated")]
    NotAllocated {
        /// The missing id.
        id: EntityId,
    },
    /// The operation is not allowed on a deleted record.
    #[error("entity {id} has been deleted")]
    Tombstone {
        /// The tombstoned id.
        id: EntityId,
    },
}
