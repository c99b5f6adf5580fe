//! Base repository traits following Interface Segregation Principle (ISP).
//!
//! [`ReadRepository`], [`WriteRepository`] and [`DeleteRepository`] carry
//! default implementations for every operation, written once against
//! [`DataEntity`]. A concrete repository only has to say which
//! [`Session`] it runs in; [`Store`] is the generic one used for every
//! entity without extra operations.

use std::collections::HashMap;
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, Condition, DatabaseTransaction,
    EntityTrait, FromQueryResult, IntoActiveModel, Iterable, ModelTrait, PaginatorTrait,
    PrimaryKeyToColumn, QueryFilter, QueryOrder, QuerySelect, Select,
};
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use super::query::{EntityKey, Includes, OrderBy, Predicate};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::session::Session;
use crate::types::{PageWindow, Paginated, PaginationParams};

/// Column type of an entity's table.
pub type ColumnOf<T> = <<T as DataEntity>::Table as EntityTrait>::Column;

/// Binding between a domain entity and the table that stores it.
#[async_trait]
pub trait DataEntity: Sized + Clone + Send + Sync + 'static {
    type Table: EntityTrait<Model = Self::Model>;
    type Model: ModelTrait<Entity = Self::Table>
        + FromQueryResult
        + IntoActiveModel<Self::ActiveModel>
        + Clone
        + Send
        + Sync;
    type ActiveModel: ActiveModelTrait<Entity = Self::Table> + ActiveModelBehavior + Send + Sync;

    /// Name used in errors and logs
    const NAME: &'static str;

    /// Relation names accepted in an include set
    const RELATIONS: &'static [&'static str] = &[];

    fn from_model(model: Self::Model) -> Self;

    /// Every column set, primary key included. Used for updates.
    fn into_active_model(self) -> Self::ActiveModel;

    /// Active model for an insert; generated columns are left unset.
    fn into_new_active_model(self) -> Self::ActiveModel {
        self.into_active_model()
    }

    fn key(&self) -> EntityKey;

    /// Nullable timestamp column marking soft-deleted rows.
    ///
    /// `None` means deletes are physical. When set, every read excludes
    /// rows where the column is not null.
    fn soft_delete_column() -> Option<ColumnOf<Self>> {
        None
    }

    /// Populate `relation` on every item with one batched query.
    async fn load_relation(
        items: &mut [Self],
        relation: &str,
        conn: &DatabaseTransaction,
    ) -> AppResult<()> {
        let _ = (items, conn);
        Err(AppError::invalid_include(Self::NAME, relation))
    }
}

/// Caller-facing input shape for creates and updates.
pub trait WriteModel<T: DataEntity>: Validate + Send + Sync + 'static {
    /// Row this input targets when used for an update.
    fn target(&self) -> Option<EntityKey>;

    fn into_new(self) -> T::ActiveModel;

    fn apply(self, row: &mut T::ActiveModel);
}

/// View model for entities that have no distinct input shape.
#[derive(Debug)]
pub enum NoViewModel {}

impl Validate for NoViewModel {
    fn validate(&self) -> Result<(), ValidationErrors> {
        match *self {}
    }
}

impl<T: DataEntity> WriteModel<T> for NoViewModel {
    fn target(&self) -> Option<EntityKey> {
        match *self {}
    }

    fn into_new(self) -> T::ActiveModel {
        match self {}
    }

    fn apply(self, _row: &mut T::ActiveModel) {
        match self {}
    }
}

/// A repository constructed for, and running inside, one session.
pub trait SessionBound: Send + Sync + 'static {
    fn bind(session: Arc<Session>) -> Self
    where
        Self: Sized;

    fn session(&self) -> &Session;
}

// =============================================================================
// Query helpers
// =============================================================================

/// Base select with the entity's soft-delete scope applied.
pub(crate) fn scoped<T: DataEntity>() -> Select<T::Table> {
    let select = T::Table::find();
    match T::soft_delete_column() {
        Some(column) => select.filter(column.is_null()),
        None => select,
    }
}

pub(crate) fn key_condition<T: DataEntity>(key: EntityKey) -> AppResult<Condition> {
    let column = <T::Table as EntityTrait>::PrimaryKey::iter()
        .next()
        .map(|pk| pk.into_column())
        .ok_or_else(|| AppError::internal(format!("{} has no primary key", T::NAME)))?;
    Ok(Condition::all().add(column.eq(key.into_value())))
}

/// Apply the caller's ordering, then the primary key as a tie-breaker so
/// that pagination is stable.
fn ordered<T: DataEntity>(
    select: Select<T::Table>,
    order: Option<OrderBy<ColumnOf<T>>>,
) -> Select<T::Table> {
    let select = match order {
        Some(order) => select.order_by(order.column, order.direction.into()),
        None => select,
    };
    <T::Table as EntityTrait>::PrimaryKey::iter()
        .fold(select, |select, pk| select.order_by_asc(pk.into_column()))
}

fn windowed<E: EntityTrait>(select: Select<E>, window: PageWindow) -> Select<E> {
    // SQLite rejects OFFSET without LIMIT
    let take = window
        .take
        .or_else(|| window.skip.map(|_| i64::MAX as u64));
    select.offset(window.skip).limit(take)
}

fn check_includes<T: DataEntity>(includes: &Includes) -> AppResult<()> {
    match includes
        .iter()
        .find(|name| !T::RELATIONS.iter().any(|known| known == name))
    {
        Some(unknown) => Err(AppError::invalid_include(T::NAME, unknown)),
        None => Ok(()),
    }
}

async fn materialize<T: DataEntity>(
    models: Vec<T::Model>,
    includes: &Includes,
    conn: &DatabaseTransaction,
) -> AppResult<Vec<T>> {
    let mut items: Vec<T> = models.into_iter().map(T::from_model).collect();
    if !items.is_empty() {
        for relation in includes.iter() {
            T::load_relation(&mut items, relation, conn).await?;
        }
    }
    Ok(items)
}

/// Live rows of `T` matching `condition`, in key order. Used by relation loaders.
pub(crate) async fn fetch_where<T: DataEntity>(
    condition: Condition,
    conn: &DatabaseTransaction,
) -> AppResult<Vec<T>> {
    let models = ordered::<T>(scoped::<T>().filter(condition), None)
        .all(conn)
        .await?;
    Ok(models.into_iter().map(T::from_model).collect())
}

async fn fetch_live<T: DataEntity>(
    session: &Session,
    conn: &DatabaseTransaction,
    key: EntityKey,
) -> AppResult<T::Model> {
    let model = session
        .guarded(scoped::<T>().filter(key_condition::<T>(key)?).one(conn))
        .await?;
    model.ok_or_not_found(T::NAME)
}

async fn insert<T: DataEntity>(session: &Session, active: T::ActiveModel) -> AppResult<T> {
    let conn = session.connection().await?;
    let model = session.guarded(active.insert(&*conn)).await?;
    session.record(1);
    tracing::debug!(entity = T::NAME, "Row inserted");
    Ok(T::from_model(model))
}

// =============================================================================
// Repository contract
// =============================================================================

/// Read operations (Query)
#[async_trait]
pub trait ReadRepository<T: DataEntity>: SessionBound {
    /// The single row matching `predicate`.
    ///
    /// Fails with `NotFound` on zero matches and `MultipleResults` when the
    /// predicate is not selective enough.
    async fn find_one(&self, predicate: Predicate, includes: &Includes) -> AppResult<T> {
        check_includes::<T>(includes)?;
        let session = self.session();
        let conn = session.connection().await?;

        let select = ordered::<T>(scoped::<T>().filter(predicate), None).limit(2);
        let mut models = session.guarded(select.all(&*conn)).await?;
        if models.len() > 1 {
            return Err(AppError::MultipleResults(T::NAME.to_string()));
        }
        let model = models.pop().ok_or_not_found(T::NAME)?;

        let mut items = session
            .guarded(materialize::<T>(vec![model], includes, &conn))
            .await?;
        items.pop().ok_or_not_found(T::NAME)
    }

    async fn find_by_key(&self, key: EntityKey, includes: &Includes) -> AppResult<T> {
        self.find_one(key_condition::<T>(key)?.into(), includes).await
    }

    async fn list_all(&self, includes: &Includes) -> AppResult<Vec<T>> {
        self.list_filtered_ordered(PageWindow::all(), Predicate::all(), None, includes)
            .await
    }

    async fn list_where(&self, predicate: Predicate, includes: &Includes) -> AppResult<Vec<T>> {
        self.list_filtered_ordered(PageWindow::all(), predicate, None, includes)
            .await
    }

    async fn list_page(&self, window: PageWindow, includes: &Includes) -> AppResult<Vec<T>> {
        self.list_filtered_ordered(window, Predicate::all(), None, includes)
            .await
    }

    async fn list_ordered(
        &self,
        window: PageWindow,
        order: Option<OrderBy<ColumnOf<T>>>,
        includes: &Includes,
    ) -> AppResult<Vec<T>> {
        self.list_filtered_ordered(window, Predicate::all(), order, includes)
            .await
    }

    /// Filter, then order, then cut the window.
    async fn list_filtered_ordered(
        &self,
        window: PageWindow,
        predicate: Predicate,
        order: Option<OrderBy<ColumnOf<T>>>,
        includes: &Includes,
    ) -> AppResult<Vec<T>> {
        check_includes::<T>(includes)?;
        let session = self.session();
        let conn = session.connection().await?;

        let select = windowed(ordered::<T>(scoped::<T>().filter(predicate), order), window);
        let models = session.guarded(select.all(&*conn)).await?;
        tracing::debug!(entity = T::NAME, rows = models.len(), "Rows fetched");

        session
            .guarded(materialize::<T>(models, includes, &conn))
            .await
    }

    /// One page plus the pre-pagination total.
    async fn page(
        &self,
        params: &PaginationParams,
        predicate: Predicate,
        order: Option<OrderBy<ColumnOf<T>>>,
        includes: &Includes,
    ) -> AppResult<Paginated<T>> {
        let total = self.count(predicate.clone()).await?;
        let items = self
            .list_filtered_ordered(params.window(), predicate, order, includes)
            .await?;
        Ok(Paginated::new(items, params, total))
    }

    async fn count(&self, predicate: Predicate) -> AppResult<u64> {
        let session = self.session();
        let conn = session.connection().await?;
        session
            .guarded(scoped::<T>().filter(predicate).count(&*conn))
            .await
    }

    /// `SELECT 1 ... LIMIT 1`; never materializes rows.
    async fn exists(&self, predicate: Predicate) -> AppResult<bool> {
        let session = self.session();
        let conn = session.connection().await?;
        let probe = scoped::<T>()
            .filter(predicate)
            .select_only()
            .expr(Expr::cust("1"))
            .limit(1)
            .into_tuple::<i32>();
        let hit = session.guarded(probe.one(&*conn)).await?;
        Ok(hit.is_some())
    }

    /// Group matching rows by `key_selector` and reduce each group.
    ///
    /// `filter` narrows the input before grouping. Groups come out in the
    /// order their key is first seen in primary-key order.
    async fn group_by<K, E, R, FK, FE, FR>(
        &self,
        key_selector: FK,
        element_selector: FE,
        result_selector: FR,
        filter: Option<Predicate>,
    ) -> AppResult<Vec<R>>
    where
        K: Eq + Hash + Clone + Send,
        E: Send,
        R: Send,
        FK: Fn(&T) -> K + Send,
        FE: Fn(T) -> E + Send,
        FR: Fn(K, Vec<E>) -> R + Send,
    {
        let rows = self
            .list_where(filter.unwrap_or_default(), &Includes::none())
            .await?;

        let mut slots: HashMap<K, usize> = HashMap::new();
        let mut groups: Vec<(K, Vec<E>)> = Vec::new();
        for row in rows {
            let key = key_selector(&row);
            let slot = match slots.get(&key) {
                Some(&slot) => slot,
                None => {
                    slots.insert(key.clone(), groups.len());
                    groups.push((key, Vec::new()));
                    groups.len() - 1
                }
            };
            groups[slot].1.push(element_selector(row));
        }

        Ok(groups
            .into_iter()
            .map(|(key, elements)| result_selector(key, elements))
            .collect())
    }
}

/// Write operations (Command)
#[async_trait]
pub trait WriteRepository<T: DataEntity, V: WriteModel<T>>: SessionBound {
    /// Insert an already-formed entity; returns it with generated columns.
    async fn add(&self, entity: T) -> AppResult<T> {
        insert::<T>(self.session(), entity.into_new_active_model()).await
    }

    async fn add_from(&self, input: V) -> AppResult<T> {
        input.validate()?;
        insert::<T>(self.session(), input.into_new()).await
    }

    async fn update(&self, entity: T) -> AppResult<T> {
        let session = self.session();
        let conn = session.connection().await?;
        fetch_live::<T>(session, &conn, entity.key()).await?;

        let model = session
            .guarded(entity.into_active_model().update(&*conn))
            .await?;
        session.record(1);
        Ok(T::from_model(model))
    }

    async fn update_from(&self, input: V) -> AppResult<T> {
        input.validate()?;
        let key = input
            .target()
            .ok_or_else(|| AppError::validation(format!("{} update requires an id", T::NAME)))?;

        let session = self.session();
        let conn = session.connection().await?;
        let mut row = fetch_live::<T>(session, &conn, key)
            .await?
            .into_active_model();
        input.apply(&mut row);

        let model = session.guarded(row.update(&*conn)).await?;
        session.record(1);
        Ok(T::from_model(model))
    }
}

/// Delete operations
///
/// Deleting a missing row is not an error: the `bool` results report
/// whether anything was removed.
#[async_trait]
pub trait DeleteRepository<T: DataEntity>: SessionBound {
    async fn delete_by_id(&self, id: i64) -> AppResult<bool> {
        self.delete_key(EntityKey::Int(id)).await
    }

    async fn delete_by_guid(&self, id: Uuid) -> AppResult<bool> {
        self.delete_key(EntityKey::Guid(id)).await
    }

    async fn delete_entity(&self, entity: &T) -> AppResult<bool> {
        self.delete_key(entity.key()).await
    }

    async fn delete_key(&self, key: EntityKey) -> AppResult<bool> {
        let removed = self.delete_where(key_condition::<T>(key)?.into()).await?;
        Ok(removed > 0)
    }

    /// Remove every live row matching `predicate` under the entity's
    /// delete policy. Returns the number of rows removed.
    async fn delete_where(&self, predicate: Predicate) -> AppResult<u64> {
        let session = self.session();
        let conn = session.connection().await?;

        let rows = match T::soft_delete_column() {
            Some(column) => {
                let stmt = T::Table::update_many()
                    .col_expr(column, Expr::value(Utc::now()))
                    .filter(predicate)
                    .filter(column.is_null());
                session.guarded(stmt.exec(&*conn)).await?.rows_affected
            }
            None => {
                let stmt = T::Table::delete_many().filter(predicate);
                session.guarded(stmt.exec(&*conn)).await?.rows_affected
            }
        };

        session.record(rows);
        tracing::debug!(entity = T::NAME, rows, "Rows deleted");
        Ok(rows)
    }

    /// Physically remove a row, soft-deleted or not.
    async fn hard_delete(&self, key: EntityKey) -> AppResult<bool> {
        let session = self.session();
        let conn = session.connection().await?;
        let stmt = T::Table::delete_many().filter(key_condition::<T>(key)?);
        let rows = session.guarded(stmt.exec(&*conn)).await?.rows_affected;
        session.record(rows);
        Ok(rows > 0)
    }

    /// Undo a soft delete.
    async fn restore(&self, key: EntityKey) -> AppResult<T> {
        let column = T::soft_delete_column()
            .ok_or_else(|| AppError::validation(format!("{} cannot be restored", T::NAME)))?;

        let session = self.session();
        let conn = session.connection().await?;
        let stmt = T::Table::update_many()
            .col_expr(column, Expr::value(Option::<DateTime<Utc>>::None))
            .filter(key_condition::<T>(key)?)
            .filter(column.is_not_null());
        let rows = session.guarded(stmt.exec(&*conn)).await?.rows_affected;
        if rows == 0 {
            return Err(AppError::not_found(T::NAME));
        }
        session.record(rows);

        let model = fetch_live::<T>(session, &conn, key).await?;
        Ok(T::from_model(model))
    }
}

/// Full CRUD repository - Combines all operations
pub trait CrudRepository<T: DataEntity, V: WriteModel<T>>:
    ReadRepository<T> + WriteRepository<T, V> + DeleteRepository<T>
{
}

// Auto-implement CrudRepository for types implementing all traits
impl<R, T, V> CrudRepository<T, V> for R
where
    R: ReadRepository<T> + WriteRepository<T, V> + DeleteRepository<T>,
    T: DataEntity,
    V: WriteModel<T>,
{
}

/// Generic repository for any entity.
pub struct Store<T, V = NoViewModel> {
    session: Arc<Session>,
    _marker: PhantomData<fn() -> (T, V)>,
}

impl<T, V> Clone for Store<T, V> {
    fn clone(&self) -> Self {
        Self {
            session: self.session.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: DataEntity, V: WriteModel<T>> SessionBound for Store<T, V> {
    fn bind(session: Arc<Session>) -> Self {
        Self {
            session,
            _marker: PhantomData,
        }
    }

    fn session(&self) -> &Session {
        &self.session
    }
}

impl<T: DataEntity, V: WriteModel<T>> ReadRepository<T> for Store<T, V> {}

impl<T: DataEntity, V: WriteModel<T>> WriteRepository<T, V> for Store<T, V> {}

impl<T: DataEntity, V: WriteModel<T>> DeleteRepository<T> for Store<T, V> {}
