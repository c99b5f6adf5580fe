//! Event table.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::NotSet, Condition, DatabaseTransaction, Set};

use super::course;
use crate::domain::{Course, Event, EventInput};
use crate::errors::{AppError, AppResult};
use crate::infra::repositories::base::{fetch_where, DataEntity, WriteModel};
use crate::infra::repositories::query::EntityKey;
use crate::infra::repositories::relations::attach_one;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "events")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub organization_id: i32,
    pub course_id: Option<i32>,
    pub title: String,
    pub location: Option<String>,
    pub starts_at: DateTimeUtc,
    pub ends_at: Option<DateTimeUtc>,
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
        belongs_to = "super::course::Entity",
        from = "Column::CourseId",
        to = "super::course::Column::Id"
    )]
    Course,
}

impl ActiveModelBehavior for ActiveModel {}

#[async_trait]
impl DataEntity for Event {
    type Table = Entity;
    type Model = Model;
    type ActiveModel = ActiveModel;

    const NAME: &'static str = "Event";
    const RELATIONS: &'static [&'static str] = &["course"];

    fn from_model(model: Model) -> Self {
        Event {
            id: model.id,
            organization_id: model.organization_id,
            course_id: model.course_id,
            title: model.title,
            location: model.location,
            starts_at: model.starts_at,
            ends_at: model.ends_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
            deleted_at: model.deleted_at,
            course: None,
        }
    }

    fn into_active_model(self) -> ActiveModel {
        ActiveModel {
            id: Set(self.id),
            organization_id: Set(self.organization_id),
            course_id: Set(self.course_id),
            title: Set(self.title),
            location: Set(self.location),
            starts_at: Set(self.starts_at),
            ends_at: Set(self.ends_at),
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
        if relation != "course" {
            return Err(AppError::invalid_include(Self::NAME, relation));
        }
        let ids: Vec<i32> = items.iter().filter_map(|e| e.course_id).collect();
        let courses =
            fetch_where::<Course>(Condition::all().add(course::Column::Id.is_in(ids)), conn)
                .await?;
        attach_one(items, courses, |e| e.course_id, |c| c.id, |e, c| e.course = c);
        Ok(())
    }
}

impl WriteModel<Event> for EventInput {
    fn target(&self) -> Option<EntityKey> {
        self.id.map(EntityKey::from)
    }

    fn into_new(self) -> ActiveModel {
        let now = Utc::now();
        ActiveModel {
            id: NotSet,
            organization_id: Set(self.organization_id),
            course_id: Set(self.course_id),
            title: Set(self.title),
            location: Set(self.location),
            starts_at: Set(self.starts_at),
            ends_at: Set(self.ends_at),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        }
    }

    fn apply(self, row: &mut ActiveModel) {
        row.organization_id = Set(self.organization_id);
        row.course_id = Set(self.course_id);
        row.title = Set(self.title);
        row.location = Set(self.location);
        row.starts_at = Set(self.starts_at);
        row.ends_at = Set(self.ends_at);
        row.updated_at = Set(Utc::now());
    }
}
