//! Field packer: spreads an ordered sample stream over bounded slots.
//!
//! A cycle stores its samples in a fixed number of slots, each holding at most
//! `slot_capacity` samples. Packing is a pure function of the concatenated
//! sample sequence and the slot layout.

use serde::{Deserialize, Serialize};

use super::Sample;

/// Default number of slots per cycle.
pub const DEFAULT_SLOT_COUNT: usize = 10;
/// Default number of samples per slot.
pub const DEFAULT_SLOT_CAPACITY: usize = 200;

/// Errors raised when constructing a [`SlotLayout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SlotLayoutError {
    #[error("slot count must be at least 1")]
    ZeroSlots,
    #[error("slot capacity must be at least 1")]
    ZeroCapacity,
}

/// Shape of the slot array: how many slots, and how large each one is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotLayout {
    slot_count: usize,
    slot_capacity: usize,
}

impl SlotLayout {
    pub fn new(slot_count: usize, slot_capacity: usize) -> Result<Self, SlotLayoutError> {
        if slot_count == 0 {
            return Err(SlotLayoutError::ZeroSlots);
        }
        if slot_capacity == 0 {
            return Err(SlotLayoutError::ZeroCapacity);
        }
        Ok(Self {
            slot_count,
            slot_capacity,
        })
    }

    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    pub fn slot_capacity(&self) -> usize {
        self.slot_capacity
    }

    /// Maximum number of samples a cycle can retain.
    pub fn max_samples(&self) -> usize {
        self.slot_count.saturating_mul(self.slot_capacity)
    }
}

impl Default for SlotLayout {
    fn default() -> Self {
        Self {
            slot_count: DEFAULT_SLOT_COUNT,
            slot_capacity: DEFAULT_SLOT_CAPACITY,
        }
    }
}

/// Ordered array of nullable sample batches.
///
/// Serialises as a JSON array whose entries are either `null` or an array of
/// sample objects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SampleSlots(Vec<Option<Vec<Sample>>>);

impl SampleSlots {
    /// Slots with every entry empty.
    pub fn empty(slot_count: usize) -> Self {
        Self(vec![None; slot_count])
    }

    /// Number of slots, used or not.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Batch stored in the 1-based `slot`, if any.
    pub fn slot(&self, slot: usize) -> Option<&[Sample]> {
        slot.checked_sub(1)
            .and_then(|index| self.0.get(index))
            .and_then(Option::as_deref)
    }

    /// Samples across all non-null slots, in slot order.
    pub fn samples(&self) -> impl Iterator<Item = &Sample> {
        self.0.iter().flatten().flatten()
    }

    /// Total number of stored samples.
    pub fn sample_count(&self) -> usize {
        self.0.iter().flatten().map(Vec::len).sum()
    }

    /// Consume the slots, yielding the stored samples in order.
    pub fn into_samples(self) -> Vec<Sample> {
        self.0.into_iter().flatten().flatten().collect()
    }
}

/// Result of packing a sample stream.
#[derive(Debug, Clone, PartialEq)]
pub struct PackOutcome {
    pub slots: SampleSlots,
    /// 1-based index of the last slot holding data; 1 when nothing is stored.
    pub active_slot_index: usize,
    pub total_stored: usize,
    pub capacity_exceeded: bool,
    /// Samples discarded because every slot was full.
    pub dropped: usize,
}

/// Pack `existing` followed by `incoming` into the slots described by `layout`.
///
/// Samples beyond `layout.max_samples()` are discarded and reported through
/// `capacity_exceeded`.
///
/// # Examples
/// ```
/// use equipment_movements::domain::movement::{pack, Sample, SlotLayout};
/// use serde_json::json;
///
/// let samples: Vec<Sample> = (0..5)
///     .map(|i| Sample::try_from(json!({ "seq": i })).expect("valid"))
///     .collect();
/// let outcome = pack(Vec::new(), samples, SlotLayout::new(3, 2).expect("layout"));
/// assert_eq!(outcome.active_slot_index, 3);
/// assert_eq!(outcome.total_stored, 5);
/// assert!(!outcome.capacity_exceeded);
/// ```
pub fn pack(existing: Vec<Sample>, incoming: Vec<Sample>, layout: SlotLayout) -> PackOutcome {
    let offered = existing.len() + incoming.len();
    let kept = offered.min(layout.max_samples());

    let mut stream = existing.into_iter().chain(incoming).take(kept);
    let mut slots = Vec::with_capacity(layout.slot_count());
    let mut active_slot_index = 1;
    for index in 0..layout.slot_count() {
        let batch: Vec<Sample> = stream.by_ref().take(layout.slot_capacity()).collect();
        if batch.is_empty() {
            slots.push(None);
        } else {
            active_slot_index = index + 1;
            slots.push(Some(batch));
        }
    }

    PackOutcome {
        slots: SampleSlots(slots),
        active_slot_index,
        total_stored: kept,
        capacity_exceeded: offered > kept,
        dropped: offered - kept,
    }
}
