//! Group arithmetic and caller-supplied group labels.
//!
//! Cycles are numbered from 1 within a group, and a group holds at most
//! `max_cycles_per_group` cycles. Groups are numbered from 1 per
//! route/equipment pair.

use std::fmt;

/// Default cap on cycles per group.
pub const DEFAULT_MAX_CYCLES_PER_GROUP: u32 = 6;

/// Longest accepted group label, in characters.
pub const GROUP_LABEL_MAX: usize = 64;

/// Position of a cycle within a route/equipment pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CycleKey {
    pub group_no: u32,
    pub cycle_number: u32,
}

impl CycleKey {
    pub const FIRST: CycleKey = CycleKey {
        group_no: 1,
        cycle_number: 1,
    };

    pub fn new(group_no: u32, cycle_number: u32) -> Self {
        Self {
            group_no,
            cycle_number,
        }
    }

    /// Key of the cycle opened after this one completes.
    ///
    /// Stays in the same group while under the cap, otherwise rolls to the
    /// first cycle of the next group.
    #[must_use]
    pub fn successor(self, max_cycles_per_group: u32) -> CycleKey {
        if self.cycle_number < max_cycles_per_group {
            CycleKey::new(self.group_no, self.cycle_number + 1)
        } else {
            CycleKey::new(self.group_no.saturating_add(1), 1)
        }
    }
}

impl fmt::Display for CycleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "group {} cycle {}", self.group_no, self.cycle_number)
    }
}

/// Cycle number outside `1..=max_cycles_per_group`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cycle number {cycle_number} is outside 1..={max_cycles_per_group}")]
pub struct CycleOutOfBounds {
    pub cycle_number: u32,
    pub max_cycles_per_group: u32,
}

/// Reject cycle numbers outside the per-group range.
pub fn check_cycle_bounds(
    cycle_number: u32,
    max_cycles_per_group: u32,
) -> Result<(), CycleOutOfBounds> {
    if (1..=max_cycles_per_group).contains(&cycle_number) {
        Ok(())
    } else {
        Err(CycleOutOfBounds {
            cycle_number,
            max_cycles_per_group,
        })
    }
}

/// Group holding the `ordinal`-th cycle of a pair: `ceil(ordinal / max)`.
///
/// # Examples
/// ```
/// use equipment_movements::domain::movement::group_for_ordinal;
///
/// assert_eq!(group_for_ordinal(7, 6), 2);
/// assert_eq!(group_for_ordinal(12, 6), 2);
/// assert_eq!(group_for_ordinal(13, 6), 3);
/// ```
pub fn group_for_ordinal(ordinal: u32, max_cycles_per_group: u32) -> u32 {
    ordinal.div_ceil(max_cycles_per_group.max(1))
}

/// Split a running cycle ordinal into its group and in-group cycle number.
///
/// Returns `None` for ordinal 0.
pub fn partition_ordinal(ordinal: u32, max_cycles_per_group: u32) -> Option<CycleKey> {
    let max = max_cycles_per_group.max(1);
    (ordinal >= 1).then(|| CycleKey::new(group_for_ordinal(ordinal, max), (ordinal - 1) % max + 1))
}

/// Errors raised when validating a group label.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GroupLabelError {
    #[error("group label must not be empty")]
    Empty,
    #[error("group label must be at most 64 characters")]
    TooLong,
}

/// Human-readable name bound durably to one group number.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupLabel(String);

impl GroupLabel {
    /// Validate and trim a label.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, GroupLabelError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(GroupLabelError::Empty);
        }
        if trimmed.chars().count() > GROUP_LABEL_MAX {
            return Err(GroupLabelError::TooLong);
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
