//! Port for per-scope monotonic counters backing sequential identifiers.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

use crate::domain::IdScope;

use super::define_port_error;

define_port_error! {
    /// Errors raised by id sequence adapters.
    pub enum IdSequenceRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "id sequence connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "id sequence query failed: {message}",
    }
}

/// Port handing out the next counter value for a scope.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdSequenceRepository: Send + Sync {
    /// Atomically increment the counter for `scope` and return the new value.
    ///
    /// The first call for a scope returns `1`.
    async fn next_value(&self, scope: IdScope) -> Result<u64, IdSequenceRepositoryError>;
}

/// Fixture counter shared by every scope.
#[derive(Debug, Default)]
pub struct FixtureIdSequenceRepository {
    counter: AtomicU64,
}

#[async_trait]
impl IdSequenceRepository for FixtureIdSequenceRepository {
    async fn next_value(&self, _scope: IdScope) -> Result<u64, IdSequenceRepositoryError> {
        Ok(self.counter.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[tokio::test]
    async fn fixture_counts_from_one() {
        let repo = FixtureIdSequenceRepository::default();
        assert_eq!(repo.next_value(IdScope::EQUIPMENT).await, Ok(1));
        assert_eq!(repo.next_value(IdScope::EQUIPMENT).await, Ok(2));
    }
}
