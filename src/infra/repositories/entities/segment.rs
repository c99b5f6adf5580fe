//! Segment table.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::NotSet, Condition, DatabaseTransaction, Set};

use super::{organization, user, user_segment};
use crate::domain::{normalize_code, Organization, Segment, SegmentInput, User};
use crate::errors::{AppError, AppResult};
use crate::infra::repositories::base::{fetch_where, DataEntity, WriteModel};
use crate::infra::repositories::query::EntityKey;
use crate::infra::repositories::relations::{attach_linked, attach_one};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "segments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub organization_id: i32,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub deleted_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::organization::Entity",
        from = "Column::OrganizationId",
        to = "super::organization::Column::Id"
    )]
    Organization,
}

impl ActiveModelBehavior for ActiveModel {}

#[async_trait]
impl DataEntity for Segment {
    type Table = Entity;
    type Model = Model;
    type ActiveModel = ActiveModel;

    const NAME: &'static str = "Segment";
    const RELATIONS: &'static [&'static str] = &["organization", "users"];

    fn from_model(model: Model) -> Self {
        Segment {
            id: model.id,
            organization_id: model.organization_id,
            code: model.code,
            name: model.name,
            description: model.description,
            created_at: model.created_at,
            updated_at: model.updated_at,
            deleted_at: model.deleted_at,
            organization: None,
            users: None,
        }
    }

    fn into_active_model(self) -> ActiveModel {
        ActiveModel {
            id: Set(self.id),
            organization_id: Set(self.organization_id),
            code: Set(self.code),
            name: Set(self.name),
            description: Set(self.description),
            created_at: Set(self.created_at),
            updated_at: Set(self.updated_at),
            deleted_at: Set(self.deleted_at),
        }
    }

    fn into_new_active_model(self) -> ActiveModel {
        ActiveModel {
            id: NotSet,
            ..self.into_active_model()
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
            "organization" => {
                let ids: Vec<i32> = items.iter().map(|s| s.organization_id).collect();
                let organizations = fetch_where::<Organization>(
                    Condition::all().add(organization::Column::Id.is_in(ids)),
                    conn,
                )
                .await?;
                attach_one(
                    items,
                    organizations,
                    |s| Some(s.organization_id),
                    |o| o.id,
                    |s, o| s.organization = o,
                );
            }
            "users" => {
                let ids: Vec<i32> = items.iter().map(|s| s.id).collect();
                let links =
                    user_segment::links(user_segment::Column::SegmentId.is_in(ids), conn).await?;
                let user_ids: Vec<Uuid> = links.iter().map(|(_, u)| *u).collect();
                let users =
                    fetch_where::<User>(Condition::all().add(user::Column::Id.is_in(user_ids)), conn)
                        .await?;
                attach_linked(items, links, users, |s| s.id, |u| u.id, |s, u| {
                    s.users = Some(u)
                });
            }
            other => return Err(AppError::invalid_include(Self::NAME, other)),
        }
        Ok(())
    }
}

impl WriteModel<Segment> for SegmentInput {
    fn target(&self) -> Option<EntityKey> {
        self.id.map(EntityKey::from)
    }

    fn into_new(self) -> ActiveModel {
        let now = Utc::now();
        ActiveModel {
            id: NotSet,
            organization_id: Set(self.organization_id),
            code: Set(normalize_code(&self.code)),
            name: Set(self.name),
            description: Set(self.description),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        }
    }

    fn apply(self, row: &mut ActiveModel) {
        row.organization_id = Set(self.organization_id);
        row.code = Set(normalize_code(&self.code));
        row.name = Set(self.name);
        row.description = Set(self.description);
        row.updated_at = Set(Utc::now());
    }
}
