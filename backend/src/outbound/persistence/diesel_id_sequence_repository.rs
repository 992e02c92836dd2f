//! PostgreSQL-backed `IdSequenceRepository` implementation using Diesel ORM.
//!
//! Each call is a single `INSERT … ON CONFLICT DO UPDATE … RETURNING`
//! statement, so concurrent callers never observe the same value.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::IdScope;
use crate::domain::ports::{IdSequenceRepository, IdSequenceRepositoryError};

use super::diesel_basic_error_mapping::{StoreFailure, classify_diesel_error, pool_error_message};
use super::models::NewIdSequenceRow;
use super::pool::{DbPool, PoolError};
use super::schema::id_sequences;

/// Diesel-backed implementation of the `IdSequenceRepository` port.
#[derive(Clone)]
pub struct DieselIdSequenceRepository {
    pool: DbPool,
}

impl DieselIdSequenceRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> IdSequenceRepositoryError {
    IdSequenceRepositoryError::connection(pool_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> IdSequenceRepositoryError {
    match classify_diesel_error(error) {
        StoreFailure::Connection(message) => IdSequenceRepositoryError::connection(message),
        StoreFailure::UniqueViolation(message)
        | StoreFailure::ForeignKeyViolation { message, .. }
        | StoreFailure::Query(message) => IdSequenceRepositoryError::query(message),
    }
}

#[async_trait]
impl IdSequenceRepository for DieselIdSequenceRepository {
    async fn next_value(&self, scope: IdScope) -> Result<u64, IdSequenceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let value: i64 = diesel::insert_into(id_sequences::table)
            .values(NewIdSequenceRow {
                scope: scope.scope(),
                prefix: scope.prefix(),
                last_value: 1,
            })
            .on_conflict(id_sequences::scope)
            .do_update()
            .set(id_sequences::last_value.eq(id_sequences::last_value + 1))
            .returning(id_sequences::last_value)
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        u64::try_from(value).map_err(|_| {
            IdSequenceRepositoryError::query(format!(
                "id sequence {} holds negative value {value}",
                scope.scope()
            ))
        })
    }
}
