use super::errors::StorageFailure;
use sea_orm::{DatabaseConnection, DatabaseTransaction, DbErr, TransactionTrait};

/// One transactional unit of work, scoped to a single service operation.
///
/// Open it before touching the store, run every query through [`Session::conn`]
/// and hand the result of that work to [`Session::close`]: `Ok` commits, `Err`
/// rolls back. A session dropped without being closed (a panic, an early
/// return) is rolled back by sea-orm when the transaction is dropped.
pub struct Session {
    txn: DatabaseTransaction,
    operation: &'static str,
}

impl Session {
    pub async fn open(db: &DatabaseConnection, operation: &'static str) -> Result<Self, StorageFailure> {
        let txn = db.begin().await?;
        tracing::debug!(operation, "session opened");
        Ok(Self { txn, operation })
    }

    pub fn conn(&self) -> &DatabaseTransaction {
        &self.txn
    }

    pub async fn close<T>(self, outcome: Result<T, DbErr>) -> Result<T, StorageFailure> {
        let operation = self.operation;
        match outcome {
            Ok(value) => {
                self.txn.commit().await?;
                tracing::debug!(operation, "session committed");
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = self.txn.rollback().await {
                    tracing::warn!(operation, "rollback failed: {rollback_err}");
                }
                tracing::debug!(operation, "session rolled back: {err}");
                Err(err.into())
            }
        }
    }
}
