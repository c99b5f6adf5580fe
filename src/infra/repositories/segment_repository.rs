//! Segment repository: the generic contract plus user membership.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ColumnTrait, Condition, DatabaseTransaction, EntityTrait, QueryFilter, Set,
};
use uuid::Uuid;

use super::base::{
    fetch_where, scoped, CrudRepository, DeleteRepository, ReadRepository, SessionBound,
    WriteRepository,
};
use super::entities::{segment, user, user_segment};
use super::query::{EntityKey, Includes, Predicate};
use crate::domain::{normalize_code, Segment, SegmentInput, User};
use crate::errors::AppResult;
use crate::infra::session::Session;

/// Segment repository trait.
///
/// Membership changes are idempotent: assigning a member twice or removing
/// a non-member is a no-op. Both return `false` only when the segment
/// itself does not exist.
#[async_trait]
pub trait SegmentRepository: CrudRepository<Segment, SegmentInput> {
    /// Every live segment of one organization, in key order
    async fn list_by_organization(&self, organization_id: i32) -> AppResult<Vec<Segment>>;

    /// Whether a live segment other than `exclude_id` already uses `code`
    async fn code_exists(&self, code: &str, exclude_id: Option<i32>) -> AppResult<bool>;

    /// One segment with its members loaded
    async fn get_with_users(&self, id: i32) -> AppResult<Segment>;

    /// Add users to the segment. Unknown or deleted user ids are skipped.
    async fn assign_users(&self, segment_id: i32, user_ids: &[Uuid]) -> AppResult<bool>;

    async fn remove_users(&self, segment_id: i32, user_ids: &[Uuid]) -> AppResult<bool>;

    /// Ids of the segment's current members, live users only
    async fn member_ids(&self, segment_id: i32) -> AppResult<Vec<Uuid>>;
}

/// Concrete implementation of SegmentRepository
pub struct SegmentStore {
    session: Arc<Session>,
}

impl SessionBound for SegmentStore {
    fn bind(session: Arc<Session>) -> Self {
        Self { session }
    }

    fn session(&self) -> &Session {
        &self.session
    }
}

impl ReadRepository<Segment> for SegmentStore {}

impl WriteRepository<Segment, SegmentInput> for SegmentStore {}

impl DeleteRepository<Segment> for SegmentStore {}

async fn segment_is_live(id: i32, conn: &DatabaseTransaction) -> AppResult<bool> {
    let found = scoped::<Segment>()
        .filter(segment::Column::Id.eq(id))
        .one(conn)
        .await?;
    Ok(found.is_some())
}

fn distinct(ids: &[Uuid]) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

#[async_trait]
impl SegmentRepository for SegmentStore {
    async fn list_by_organization(&self, organization_id: i32) -> AppResult<Vec<Segment>> {
        self.list_where(
            segment::Column::OrganizationId.eq(organization_id).into(),
            &Includes::none(),
        )
        .await
    }

    async fn code_exists(&self, code: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let mut predicate = Predicate::from(
            Expr::expr(Func::upper(Expr::col(segment::Column::Code))).eq(normalize_code(code)),
        );
        if let Some(id) = exclude_id {
            predicate = predicate.and(segment::Column::Id.ne(id));
        }
        self.exists(predicate).await
    }

    async fn get_with_users(&self, id: i32) -> AppResult<Segment> {
        self.find_by_key(EntityKey::from(id), &Includes::from(["users"]))
            .await
    }

    async fn assign_users(&self, segment_id: i32, user_ids: &[Uuid]) -> AppResult<bool> {
        let session = self.session();
        let conn = session.connection().await?;
        if !session.guarded(segment_is_live(segment_id, &conn)).await? {
            return Ok(false);
        }

        let requested = distinct(user_ids);
        if requested.is_empty() {
            return Ok(true);
        }

        let live: HashSet<Uuid> = session
            .guarded(fetch_where::<User>(
                Condition::all().add(user::Column::Id.is_in(requested.clone())),
                &conn,
            ))
            .await?
            .into_iter()
            .map(|u| u.id)
            .collect();

        let current: HashSet<Uuid> = session
            .guarded(user_segment::links(
                Condition::all()
                    .add(user_segment::Column::SegmentId.eq(segment_id))
                    .add(user_segment::Column::UserId.is_in(requested.clone())),
                &conn,
            ))
            .await?
            .into_iter()
            .map(|(_, user_id)| user_id)
            .collect();

        let now = Utc::now();
        let mut rows = Vec::new();
        for id in requested {
            if !live.contains(&id) {
                tracing::debug!(segment_id, user_id = %id, "Skipping unknown user");
                continue;
            }
            if current.contains(&id) {
                continue;
            }
            rows.push(user_segment::ActiveModel {
                segment_id: Set(segment_id),
                user_id: Set(id),
                created_at: Set(now),
            });
        }

        if rows.is_empty() {
            return Ok(true);
        }

        let added = rows.len() as u64;
        session
            .guarded(user_segment::Entity::insert_many(rows).exec_without_returning(&*conn))
            .await?;
        session.record(added);
        tracing::debug!(segment_id, added, "Users assigned");
        Ok(true)
    }

    async fn remove_users(&self, segment_id: i32, user_ids: &[Uuid]) -> AppResult<bool> {
        let session = self.session();
        let conn = session.connection().await?;
        if !session.guarded(segment_is_live(segment_id, &conn)).await? {
            return Ok(false);
        }

        let requested = distinct(user_ids);
        if requested.is_empty() {
            return Ok(true);
        }

        let removed = session
            .guarded(
                user_segment::Entity::delete_many()
                    .filter(user_segment::Column::SegmentId.eq(segment_id))
                    .filter(user_segment::Column::UserId.is_in(requested))
                    .exec(&*conn),
            )
            .await?
            .rows_affected;
        session.record(removed);
        tracing::debug!(segment_id, removed, "Users removed");
        Ok(true)
    }

    async fn member_ids(&self, segment_id: i32) -> AppResult<Vec<Uuid>> {
        let segment = self.get_with_users(segment_id).await?;
        Ok(segment
            .users
            .unwrap_or_default()
            .into_iter()
            .map(|u| u.id)
            .collect())
    }
}
