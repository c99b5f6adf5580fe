//! Role table.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::NotSet, Condition, DatabaseTransaction, Set};

use super::permission;
use crate::domain::{Permission, Role, RoleInput};
use crate::errors::{AppError, AppResult};
use crate::infra::repositories::base::{fetch_where, DataEntity, WriteModel};
use crate::infra::repositories::query::EntityKey;
use crate::infra::repositories::relations::attach_many;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "roles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub deleted_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[async_trait]
impl DataEntity for Role {
    type Table = Entity;
    type Model = Model;
    type ActiveModel = ActiveModel;

    const NAME: &'static str = "Role";
    const RELATIONS: &'static [&'static str] = &["permissions"];

    fn from_model(model: Model) -> Self {
        Role {
            id: model.id,
            name: model.name,
            description: model.description,
            created_at: model.created_at,
            updated_at: model.updated_at,
            deleted_at: model.deleted_at,
            permissions: None,
        }
    }

    fn into_active_model(self) -> ActiveModel {
        ActiveModel {
            id: Set(self.id),
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
        if relation != "permissions" {
            return Err(AppError::invalid_include(Self::NAME, relation));
        }
        let ids: Vec<i32> = items.iter().map(|r| r.id).collect();
        let filter = Condition::all().add(permission::Column::RoleId.is_in(ids));
        let permissions = fetch_where::<Permission>(filter, conn).await?;
        attach_many(items, permissions, |r| r.id, |p| p.role_id, |r, p| {
            r.permissions = Some(p)
        });
        Ok(())
    }
}

impl WriteModel<Role> for RoleInput {
    fn target(&self) -> Option<EntityKey> {
        self.id.map(EntityKey::from)
    }

    fn into_new(self) -> ActiveModel {
        let now = Utc::now();
        ActiveModel {
            id: NotSet,
            name: Set(self.name),
            description: Set(self.description),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        }
    }

    fn apply(self, row: &mut ActiveModel) {
        row.name = Set(self.name);
        row.description = Set(self.description);
        row.updated_at = Set(Utc::now());
    }
}
