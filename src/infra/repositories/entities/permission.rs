//! Permission table. Rows are deleted physically.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::NotSet, Condition, DatabaseTransaction, Set};

use super::role;
use crate::domain::{Permission, PermissionInput, Role};
use crate::errors::{AppError, AppResult};
use crate::infra::repositories::base::{fetch_where, DataEntity, WriteModel};
use crate::infra::repositories::query::EntityKey;
use crate::infra::repositories::relations::attach_one;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "permissions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub role_id: i32,
    pub code: String,
    pub description: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::role::Entity",
        from = "Column::RoleId",
        to = "super::role::Column::Id"
    )]
    Role,
}

impl ActiveModelBehavior for ActiveModel {}

#[async_trait]
impl DataEntity for Permission {
    type Table = Entity;
    type Model = Model;
    type ActiveModel = ActiveModel;

    const NAME: &'static str = "Permission";
    const RELATIONS: &'static [&'static str] = &["role"];

    fn from_model(model: Model) -> Self {
        Permission {
            id: model.id,
            role_id: model.role_id,
            code: model.code,
            description: model.description,
            created_at: model.created_at,
            updated_at: model.updated_at,
            role: None,
        }
    }

    fn into_active_model(self) -> ActiveModel {
        ActiveModel {
            id: Set(self.id),
            role_id: Set(self.role_id),
            code: Set(self.code),
            description: Set(self.description),
            created_at: Set(self.created_at),
            updated_at: Set(self.updated_at),
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

    async fn load_relation(
        items: &mut [Self],
        relation: &str,
        conn: &DatabaseTransaction,
    ) -> AppResult<()> {
        if relation != "role" {
            return Err(AppError::invalid_include(Self::NAME, relation));
        }
        let ids: Vec<i32> = items.iter().map(|p| p.role_id).collect();
        let roles = fetch_where::<Role>(Condition::all().add(role::Column::Id.is_in(ids)), conn).await?;
        attach_one(items, roles, |p| Some(p.role_id), |r| r.id, |p, r| p.role = r);
        Ok(())
    }
}

impl WriteModel<Permission> for PermissionInput {
    fn target(&self) -> Option<EntityKey> {
        self.id.map(EntityKey::from)
    }

    fn into_new(self) -> ActiveModel {
        let now = Utc::now();
        ActiveModel {
            id: NotSet,
            role_id: Set(self.role_id),
            code: Set(self.code),
            description: Set(self.description),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }

    fn apply(self, row: &mut ActiveModel) {
        row.role_id = Set(self.role_id);
        row.code = Set(self.code);
        row.description = Set(self.description);
        row.updated_at = Set(Utc::now());
    }
}
