//! Shared helpers for Diesel repository implementations.
//!
//! - Integer casts between PostgreSQL `INTEGER` columns and domain counters
//! - Optimistic update bookkeeping
//! - Row collection with error mapping

/// Cast database revision (i32) to domain revision (u32).
///
/// Revisions are non-negative in the database (enforced by a check
/// constraint).
#[expect(
    clippy::cast_sign_loss,
    reason = "revision is always non-negative in database"
)]
pub fn cast_revision(revision: i32) -> u32 {
    revision as u32
}

/// Cast domain revision (u32) to database revision (i32).
#[expect(
    clippy::cast_possible_wrap,
    reason = "revision values are always small positive integers"
)]
pub fn cast_revision_for_db(revision: u32) -> i32 {
    revision as i32
}

/// Convert a domain counter to an `INTEGER` column value.
pub fn int_for_db<T>(value: T, column: &str) -> Result<i32, String>
where
    T: TryInto<i32> + Copy + std::fmt::Display,
{
    value
        .try_into()
        .map_err(|_| format!("{column} value {value} does not fit the column"))
}

/// Convert an `INTEGER` column value back to a domain counter.
pub fn int_from_db<T>(value: i32, column: &str) -> Result<T, String>
where
    T: TryFrom<i32>,
{
    T::try_from(value).map_err(|_| format!("{column} holds out-of-range value {value}"))
}

/// Result of an optimistic update operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateResult {
    /// Update succeeded (one or more rows affected).
    Success,
    /// Update affected zero rows (revision mismatch or record not found).
    ZeroRows,
}

/// Check if an update affected any rows.
///
/// Returns [`UpdateResult::ZeroRows`] if no rows were updated, allowing callers to
/// disambiguate revision mismatch from missing record.
pub fn execute_optimistic_update(updated_rows: usize) -> UpdateResult {
    if updated_rows == 0 {
        UpdateResult::ZeroRows
    } else {
        UpdateResult::Success
    }
}

/// Collect row conversion results, mapping the first error through `map_err`.
pub fn collect_rows<T, E>(
    results: impl Iterator<Item = Result<T, String>>,
    map_err: impl FnOnce(String) -> E,
) -> Result<Vec<T>, E> {
    results.collect::<Result<Vec<_>, _>>().map_err(map_err)
}
