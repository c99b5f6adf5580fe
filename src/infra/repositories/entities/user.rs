//! User table.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::entity::prelude::*;
use sea_orm::{Condition, DatabaseTransaction, Set};

use super::{role, segment, user_segment};
use crate::domain::{Role, Segment, User, UserInput};
use crate::errors::{AppError, AppResult};
use crate::infra::repositories::base::{fetch_where, DataEntity, WriteModel};
use crate::infra::repositories::query::EntityKey;
use crate::infra::repositories::relations::{attach_linked, attach_one};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub organization_id: Option<i32>,
    pub role_id: Option<i32>,
    #[sea_orm(unique)]
    pub email: String,
    pub name: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub deleted_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::role::Entity",
        from = "Column::RoleId",
        to = "super::role::Column::Id"
    )]
    Role,
    #[sea_orm(
        belongs_to = "super::organization::Entity",
        from = "Column::OrganizationId",
        to = "super::organization::Column::Id"
    )]
    Organization,
}

impl ActiveModelBehavior for ActiveModel {}

#[async_trait]
impl DataEntity for User {
    type Table = Entity;
    type Model = Model;
    type ActiveModel = ActiveModel;

    const NAME: &'static str = "User";
    const RELATIONS: &'static [&'static str] = &["role", "segments"];

    fn from_model(model: Model) -> Self {
        User {
            id: model.id,
            organization_id: model.organization_id,
            role_id: model.role_id,
            email: model.email,
            name: model.name,
            created_at: model.created_at,
            updated_at: model.updated_at,
            deleted_at: model.deleted_at,
            role: None,
            segments: None,
        }
    }

    // The id is generated client-side, so inserts send it too.
    fn into_active_model(self) -> ActiveModel {
        ActiveModel {
            id: Set(self.id),
            organization_id: Set(self.organization_id),
            role_id: Set(self.role_id),
            email: Set(self.email),
            name: Set(self.name),
            created_at: Set(self.created_at),
            updated_at: Set(self.updated_at),
            deleted_at: Set(self.deleted_at),
        }
    }

    fn key(&self) -> EntityKey {
        self.id.into()
    }

    fn soft_delete_column() -> Option<Column> {
        Some(Column::DeletedAt)
    }

    async fn load_relation(
        items: &mut [Self],
        relation: &str,
        conn: &DatabaseTransaction,
    ) -> AppResult<()> {
        match relation {
            "role" => {
                let ids: Vec<i32> = items.iter().filter_map(|u| u.role_id).collect();
                let roles =
                    fetch_where::<Role>(Condition::all().add(role::Column::Id.is_in(ids)), conn)
                        .await?;
                attach_one(items, roles, |u| u.role_id, |r| r.id, |u, r| u.role = r);
            }
            "segments" => {
                let ids: Vec<Uuid> = items.iter().map(|u| u.id).collect();
                let links: Vec<(Uuid, i32)> =
                    user_segment::links(user_segment::Column::UserId.is_in(ids), conn)
                        .await?
                        .into_iter()
                        .map(|(segment_id, user_id)| (user_id, segment_id))
                        .collect();
                let segment_ids: Vec<i32> = links.iter().map(|(_, s)| *s).collect();
                let segments = fetch_where::<Segment>(
                    Condition::all().add(segment::Column::Id.is_in(segment_ids)),
                    conn,
                )
                .await?;
                attach_linked(items, links, segments, |u| u.id, |s| s.id, |u, s| {
                    u.segments = Some(s)
                });
            }
            other => return Err(AppError::invalid_include(Self::NAME, other)),
        }
        Ok(())
    }
}

impl WriteModel<User> for UserInput {
    fn target(&self) -> Option<EntityKey> {
        self.id.map(EntityKey::from)
    }

    fn into_new(self) -> ActiveModel {
        let now = Utc::now();
        ActiveModel {
            id: Set(self.id.unwrap_or_else(Uuid::new_v4)),
            organization_id: Set(self.organization_id),
            role_id: Set(self.role_id),
            email: Set(self.email.trim().to_lowercase()),
            name: Set(self.name),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        }
    }

    fn apply(self, row: &mut ActiveModel) {
        row.organization_id = Set(self.organization_id);
        row.role_id = Set(self.role_id);
        row.email = Set(self.email.trim().to_lowercase());
        row.name = Set(self.name);
        row.updated_at = Set(Utc::now());
    }
}
