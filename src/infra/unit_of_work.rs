//! Unit of Work pattern implementation.
//!
//! A [`UnitOfWork`] is one database transaction plus the repositories that
//! run inside it. Repositories are looked up by type and created on first
//! use, so a new entity needs no change here. Writes stay invisible to
//! other units of work until [`UnitOfWork::complete`]; anything not
//! completed is rolled back.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use sea_orm::{DatabaseConnection, IsolationLevel};
use tokio_util::sync::CancellationToken;

use super::repositories::{SegmentStore, SessionBound};
use super::session::Session;
use crate::errors::AppResult;

type Registry = HashMap<TypeId, Arc<dyn Any + Send + Sync>>;

/// Future returned by a [`Persistence::transaction`] closure.
pub type UnitFuture<'a, T> = Pin<Box<dyn Future<Output = AppResult<T>> + Send + 'a>>;

pub struct UnitOfWork {
    session: Arc<Session>,
    repositories: Mutex<Registry>,
}

impl UnitOfWork {
    fn new(session: Session) -> Self {
        Self {
            session: Arc::new(session),
            repositories: Mutex::new(HashMap::new()),
        }
    }

    /// The repository of type `R` for this unit of work.
    ///
    /// Built on first request and shared afterwards, so two calls with the
    /// same `R` return the same instance.
    pub fn repository<R: SessionBound>(&self) -> Arc<R> {
        let mut registry = self
            .repositories
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(existing) = registry.get(&TypeId::of::<R>()) {
            if let Ok(repository) = Arc::clone(existing).downcast::<R>() {
                return repository;
            }
        }

        let repository = Arc::new(R::bind(Arc::clone(&self.session)));
        registry.insert(TypeId::of::<R>(), repository.clone());
        repository
    }

    /// Segment repository, with membership operations
    pub fn segments(&self) -> Arc<SegmentStore> {
        self.repository::<SegmentStore>()
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        self.session.cancellation_token()
    }

    /// Rows written and not yet committed.
    pub fn pending(&self) -> u64 {
        self.session.pending()
    }

    /// Commit every pending write and return the number of affected rows.
    ///
    /// The unit of work stays usable; the next repository call opens a new
    /// transaction.
    pub async fn complete(&self) -> AppResult<u64> {
        self.session.commit().await
    }

    /// Discard every pending write.
    pub async fn dispose(self) -> AppResult<()> {
        self.session.rollback().await
    }
}

/// Factory for units of work over one connection pool.
#[derive(Clone)]
pub struct Persistence {
    db: DatabaseConnection,
    isolation: Option<IsolationLevel>,
}

impl Persistence {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            isolation: None,
        }
    }

    /// Open every transaction at `level` instead of the engine default.
    pub fn with_isolation(mut self, level: IsolationLevel) -> Self {
        self.isolation = Some(level);
        self
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn begin(&self) -> UnitOfWork {
        self.begin_with(CancellationToken::new())
    }

    /// Begin a unit of work that fails with `Cancelled` once `token` fires.
    pub fn begin_with(&self, token: CancellationToken) -> UnitOfWork {
        UnitOfWork::new(Session::new(self.db.clone(), self.isolation, token))
    }

    /// Execute a closure within a unit of work.
    ///
    /// Completed when the closure returns `Ok`, rolled back when it
    /// returns `Err`.
    pub async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(&'a UnitOfWork) -> UnitFuture<'a, T> + Send,
        T: Send,
    {
        let uow = self.begin();
        match f(&uow).await {
            Ok(result) => {
                uow.complete().await?;
                Ok(result)
            }
            Err(e) => {
                if let Err(rollback_err) = uow.dispose().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }
}

/// Simpler API for executing transactional operations.
///
/// ```ignore
/// let segment = with_transaction!(persistence, |uow| {
///     uow.segments().add(Segment::new(org.id, "seg1", "Youth")).await
/// })?;
/// ```
#[macro_export]
macro_rules! with_transaction {
    ($persistence:expr, |$uow:ident| $body:expr) => {
        $persistence
            .transaction(|$uow| Box::pin(async move { $body }))
            .await
    };
}
