//! Organization table.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::NotSet, Condition, DatabaseTransaction, Set};

use super::{department, segment};
use crate::domain::{normalize_code, Department, Organization, OrganizationInput, Segment};
use crate::errors::{AppError, AppResult};
use crate::infra::repositories::base::{fetch_where, DataEntity, WriteModel};
use crate::infra::repositories::query::EntityKey;
use crate::infra::repositories::relations::attach_many;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "organizations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(unique)]
    pub code: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub deleted_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[async_trait]
impl DataEntity for Organization {
    type Table = Entity;
    type Model = Model;
    type ActiveModel = ActiveModel;

    const NAME: &'static str = "Organization";
    const RELATIONS: &'static [&'static str] = &["segments", "departments"];

    fn from_model(model: Model) -> Self {
        Organization {
            id: model.id,
            name: model.name,
            code: model.code,
            created_at: model.created_at,
            updated_at: model.updated_at,
            deleted_at: model.deleted_at,
            segments: None,
            departments: None,
        }
    }

    fn into_active_model(self) -> ActiveModel {
        ActiveModel {
            id: Set(self.id),
            name: Set(self.name),
            code: Set(self.code),
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
        let ids: Vec<i32> = items.iter().map(|o| o.id).collect();
        match relation {
            "segments" => {
                let filter = Condition::all().add(segment::Column::OrganizationId.is_in(ids));
                let segments = fetch_where::<Segment>(filter, conn).await?;
                attach_many(items, segments, |o| o.id, |s| s.organization_id, |o, s| {
                    o.segments = Some(s)
                });
            }
            "departments" => {
                let filter = Condition::all().add(department::Column::OrganizationId.is_in(ids));
                let departments = fetch_where::<Department>(filter, conn).await?;
                attach_many(items, departments, |o| o.id, |d| d.organization_id, |o, d| {
                    o.departments = Some(d)
                });
            }
            other => return Err(AppError::invalid_include(Self::NAME, other)),
        }
        Ok(())
    }
}

impl WriteModel<Organization> for OrganizationInput {
    fn target(&self) -> Option<EntityKey> {
        self.id.map(EntityKey::from)
    }

    fn into_new(self) -> ActiveModel {
        let now = Utc::now();
        ActiveModel {
            id: NotSet,
            name: Set(self.name),
            code: Set(normalize_code(&self.code)),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        }
    }

    fn apply(self, row: &mut ActiveModel) {
        row.name = Set(self.name);
        row.code = Set(normalize_code(&self.code));
        row.updated_at = Set(Utc::now());
    }
}
