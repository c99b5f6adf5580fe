//! Transactional session shared by every repository of one unit of work.
//!
//! The session owns at most one open database transaction. It is begun
//! lazily on the first repository call, committed by
//! [`Session::commit`], and rolled back on [`Session::rollback`], on
//! cancellation, or when the session is dropped.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use sea_orm::{
    AccessMode, DatabaseConnection, DatabaseTransaction, IsolationLevel, TransactionTrait,
};
use tokio::sync::{MappedMutexGuard, Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;

use crate::errors::{AppError, AppResult};

pub struct Session {
    db: DatabaseConnection,
    isolation: Option<IsolationLevel>,
    txn: Mutex<Option<DatabaseTransaction>>,
    pending: AtomicU64,
    cancel: CancellationToken,
}

impl Session {
    pub fn new(
        db: DatabaseConnection,
        isolation: Option<IsolationLevel>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            db,
            isolation,
            txn: Mutex::new(None),
            pending: AtomicU64::new(0),
            cancel,
        }
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Rows written since the last commit.
    pub fn pending(&self) -> u64 {
        self.pending.load(Ordering::SeqCst)
    }

    pub(crate) fn record(&self, rows: u64) {
        self.pending.fetch_add(rows, Ordering::SeqCst);
    }

    /// Lock the session and hand out its transaction, beginning one if needed.
    ///
    /// The lock is held for as long as the guard lives, so calls on one
    /// unit of work never overlap.
    pub async fn connection(&self) -> AppResult<MappedMutexGuard<'_, DatabaseTransaction>> {
        let mut slot = self.txn.lock().await;
        if self.cancel.is_cancelled() {
            Self::discard(&mut slot, &self.pending).await;
            return Err(AppError::Cancelled);
        }

        if slot.is_none() {
            let txn = match self.isolation {
                Some(level) => {
                    self.db
                        .begin_with_config(Some(level), Some(AccessMode::ReadWrite))
                        .await?
                }
                None => self.db.begin().await?,
            };
            tracing::debug!("Transaction started");
            *slot = Some(txn);
        }

        MutexGuard::try_map(slot, |txn| txn.as_mut())
            .map_err(|_| AppError::internal("session transaction unavailable"))
    }

    /// Drive `fut` unless the session is cancelled first.
    pub async fn guarded<T, E, F>(&self, fut: F) -> AppResult<T>
    where
        F: Future<Output = Result<T, E>>,
        AppError: From<E>,
    {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(AppError::Cancelled),
            result = fut => result.map_err(AppError::from),
        }
    }

    /// Commit the open transaction and return the rows it wrote.
    pub async fn commit(&self) -> AppResult<u64> {
        let mut slot = self.txn.lock().await;
        if self.cancel.is_cancelled() {
            Self::discard(&mut slot, &self.pending).await;
            return Err(AppError::Cancelled);
        }

        let affected = self.pending.swap(0, Ordering::SeqCst);
        if let Some(txn) = slot.take() {
            txn.commit().await?;
            tracing::debug!(affected, "Transaction committed");
        }
        Ok(affected)
    }

    /// Roll back the open transaction, if any.
    pub async fn rollback(&self) -> AppResult<()> {
        let mut slot = self.txn.lock().await;
        self.pending.store(0, Ordering::SeqCst);
        if let Some(txn) = slot.take() {
            txn.rollback().await?;
            tracing::debug!("Transaction rolled back");
        }
        Ok(())
    }

    async fn discard(slot: &mut Option<DatabaseTransaction>, pending: &AtomicU64) {
        pending.store(0, Ordering::SeqCst);
        if let Some(txn) = slot.take() {
            if let Err(e) = txn.rollback().await {
                tracing::error!("Transaction rollback failed: {}", e);
            }
        }
    }
}
