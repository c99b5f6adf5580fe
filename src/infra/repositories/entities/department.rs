//! Department table.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::NotSet, Condition, DatabaseTransaction, Set};

use super::organization;
use crate::domain::{normalize_code, Department, DepartmentInput, Organization};
use crate::errors::{AppError, AppResult};
use crate::infra::repositories::base::{fetch_where, DataEntity, WriteModel};
use crate::infra::repositories::query::EntityKey;
use crate::infra::repositories::relations::attach_one;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "departments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub organization_id: i32,
    pub name: String,
    pub code: String,
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
impl DataEntity for Department {
    type Table = Entity;
    type Model = Model;
    type ActiveModel = ActiveModel;

    const NAME: &'static str = "Department";
    const RELATIONS: &'static [&'static str] = &["organization"];

    fn from_model(model: Model) -> Self {
        Department {
            id: model.id,
            organization_id: model.organization_id,
            name: model.name,
            code: model.code,
            created_at: model.created_at,
            updated_at: model.updated_at,
            deleted_at: model.deleted_at,
            organization: None,
        }
    }

    fn into_active_model(self) -> ActiveModel {
        ActiveModel {
            id: Set(self.id),
            organization_id: Set(self.organization_id),
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
        if relation != "organization" {
            return Err(AppError::invalid_include(Self::NAME, relation));
        }
        let ids: Vec<i32> = items.iter().map(|d| d.organization_id).collect();
        let organizations = fetch_where::<Organization>(
            Condition::all().add(organization::Column::Id.is_in(ids)),
            conn,
        )
        .await?;
        attach_one(
            items,
            organizations,
            |d| Some(d.organization_id),
            |o| o.id,
            |d, o| d.organization = o,
        );
        Ok(())
    }
}

impl WriteModel<Department> for DepartmentInput {
    fn target(&self) -> Option<EntityKey> {
        self.id.map(EntityKey::from)
    }

    fn into_new(self) -> ActiveModel {
        let now = Utc::now();
        ActiveModel {
            id: NotSet,
            organization_id: Set(self.organization_id),
            name: Set(self.name),
            code: Set(normalize_code(&self.code)),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        }
    }

    fn apply(self, row: &mut ActiveModel) {
        row.organization_id = Set(self.organization_id);
        row.name = Set(self.name);
        row.code = Set(normalize_code(&self.code));
        row.updated_at = Set(Utc::now());
    }
}
