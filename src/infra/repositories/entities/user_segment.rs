//! Segment membership join table. Rows are deleted physically.

use sea_orm::entity::prelude::*;
use sea_orm::sea_query::IntoCondition;
use sea_orm::{DatabaseTransaction, QuerySelect};

use crate::errors::AppResult;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "user_segments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub segment_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: Uuid,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::segment::Entity",
        from = "Column::SegmentId",
        to = "super::segment::Column::Id",
        on_delete = "Cascade"
    )]
    Segment,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl ActiveModelBehavior for ActiveModel {}

/// `(segment_id, user_id)` pairs of the membership rows matching `condition`.
pub(crate) async fn links(
    condition: impl IntoCondition,
    conn: &DatabaseTransaction,
) -> AppResult<Vec<(i32, Uuid)>> {
    let links = Entity::find()
        .select_only()
        .column(Column::SegmentId)
        .column(Column::UserId)
        .filter(condition)
        .into_tuple()
        .all(conn)
        .await?;
    Ok(links)
}
