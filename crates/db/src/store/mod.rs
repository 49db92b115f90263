//! `SeaORM` implementation of the receivables store traits.
//!
//! [`SeaLedgerDatabase`] opens a database transaction per unit of work.
//! Every query filters by tenant id explicitly. Row locks use
//! `SELECT ... FOR UPDATE` and last until commit or rollback; dropping an
//! uncommitted [`SeaLedgerTransaction`] rolls it back.

mod convert;
mod documents;
mod journal;
mod master;

use async_trait::async_trait;
use receiva_core::store::{LedgerDatabase, LedgerTransaction, StoreError, StoreResult};
use sea_orm::{DatabaseConnection, DatabaseTransaction, DbErr, SqlErr, TransactionTrait};
use tracing::warn;

/// Messages Postgres uses for retryable transaction failures.
const RETRYABLE_FAILURES: [&str; 4] = [
    "could not serialize access",
    "deadlock detected",
    "40001",
    "40P01",
];

/// Maps a `SeaORM` error onto the store error space.
///
/// Unique violations and serialization failures become
/// [`StoreError::Conflict`]; everything else is a database error.
pub(crate) fn db_err(err: DbErr) -> StoreError {
    if let Some(SqlErr::UniqueConstraintViolation(message)) = err.sql_err() {
        return StoreError::Conflict(message);
    }

    let message = err.to_string();
    if RETRYABLE_FAILURES.iter().any(|m| message.contains(m)) {
        warn!(error = %message, "Transaction conflict");
        StoreError::Conflict(message)
    } else {
        StoreError::Database(message)
    }
}

/// Opens receivables transactions on a Postgres connection pool.
#[derive(Debug, Clone)]
pub struct SeaLedgerDatabase {
    db: DatabaseConnection,
}

impl SeaLedgerDatabase {
    /// Wraps an existing connection.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Returns the underlying connection.
    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[async_trait]
impl LedgerDatabase for SeaLedgerDatabase {
    type Tx = SeaLedgerTransaction;

    async fn begin(&self) -> StoreResult<SeaLedgerTransaction> {
        let txn = self.db.begin().await.map_err(db_err)?;
        Ok(SeaLedgerTransaction { txn })
    }
}

/// One database transaction implementing every receivables store.
pub struct SeaLedgerTransaction {
    txn: DatabaseTransaction,
}

impl SeaLedgerTransaction {
    pub(crate) const fn conn(&self) -> &DatabaseTransaction {
        &self.txn
    }
}

#[async_trait]
impl LedgerTransaction for SeaLedgerTransaction {
    async fn commit(self) -> StoreResult<()> {
        self.txn.commit().await.map_err(db_err)
    }
}
