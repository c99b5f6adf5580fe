//! Course table.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::NotSet, Condition, DatabaseTransaction, Set};

use super::{department, organization};
use crate::domain::{normalize_code, Course, CourseInput, Department, Organization};
use crate::errors::{AppError, AppResult};
use crate::infra::repositories::base::{fetch_where, DataEntity, WriteModel};
use crate::infra::repositories::query::EntityKey;
use crate::infra::repositories::relations::attach_one;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "courses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub organization_id: i32,
    pub department_id: Option<i32>,
    pub title: String,
    pub code: String,
    pub capacity: Option<i32>,
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
    #[sea_orm(
        belongs_to = "super::department::Entity",
        from = "Column::DepartmentId",
        to = "super::department::Column::Id"
    )]
    Department,
}

impl ActiveModelBehavior for ActiveModel {}

#[async_trait]
impl DataEntity for Course {
    type Table = Entity;
    type Model = Model;
    type ActiveModel = ActiveModel;

    const NAME: &'static str = "Course";
    const RELATIONS: &'static [&'static str] = &["organization", "department"];

    fn from_model(model: Model) -> Self {
        Course {
            id: model.id,
            organization_id: model.organization_id,
            department_id: model.department_id,
            title: model.title,
            code: model.code,
            capacity: model.capacity,
            created_at: model.created_at,
            updated_at: model.updated_at,
            deleted_at: model.deleted_at,
            organization: None,
            department: None,
        }
    }

    fn into_active_model(self) -> ActiveModel {
        ActiveModel {
            id: Set(self.id),
            organization_id: Set(self.organization_id),
            department_id: Set(self.department_id),
            title: Set(self.title),
            code: Set(self.code),
            capacity: Set(self.capacity),
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
                let ids: Vec<i32> = items.iter().map(|c| c.organization_id).collect();
                let organizations = fetch_where::<Organization>(
                    Condition::all().add(organization::Column::Id.is_in(ids)),
                    conn,
                )
                .await?;
                attach_one(
                    items,
                    organizations,
                    |c| Some(c.organization_id),
                    |o| o.id,
                    |c, o| c.organization = o,
                );
            }
            "department" => {
                let ids: Vec<i32> = items.iter().filter_map(|c| c.department_id).collect();
                let departments = fetch_where::<Department>(
                    Condition::all().add(department::Column::Id.is_in(ids)),
                    conn,
                )
                .await?;
                attach_one(
                    items,
                    departments,
                    |c| c.department_id,
                    |d| d.id,
                    |c, d| c.department = d,
                );
            }
            other => return Err(AppError::invalid_include(Self::NAME, other)),
        }
        Ok(())
    }
}

impl WriteModel<Course> for CourseInput {
    fn target(&self) -> Option<EntityKey> {
        self.id.map(EntityKey::from)
    }

    fn into_new(self) -> ActiveModel {
        let now = Utc::now();
        ActiveModel {
            id: NotSet,
            organization_id: Set(self.organization_id),
            department_id: Set(self.department_id),
            title: Set(self.title),
            code: Set(normalize_code(&self.code)),
            capacity: Set(self.capacity),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        }
    }

    fn apply(self, row: &mut ActiveModel) {
        row.organization_id = Set(self.organization_id);
        row.department_id = Set(self.department_id);
        row.title = Set(self.title);
        row.code = Set(normalize_code(&self.code));
        row.capacity = Set(self.capacity);
        row.updated_at = Set(Utc::now());
    }
}
