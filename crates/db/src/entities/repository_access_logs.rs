//! `SeaORM` Entity for repository_access_logs table.
//!
//! One row per (repository, session) possession. At most one row per
//! repository may have a null `released_at`; a partial unique index
//! enforces this at the database level.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "repository_access_logs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub repository_id: Uuid,
    pub session_id: Uuid,
    pub possessed_at: DateTimeWithTimeZone,
    pub released_at: Option<DateTimeWithTimeZone>,
    pub open_started_at: Option<DateTimeWithTimeZone>,
    pub open_started_by: Option<Uuid>,
    pub open_confirmed_at: Option<DateTimeWithTimeZone>,
    pub open_confirmed_by: Option<Uuid>,
    pub close_started_at: Option<DateTimeWithTimeZone>,
    pub close_started_by: Option<Uuid>,
    pub close_confirmed_at: Option<DateTimeWithTimeZone>,
    pub close_confirmed_by: Option<Uuid>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::repositories::Entity",
        from = "Column::RepositoryId",
        to = "super::repositories::Column::Id"
    )]
    Repositories,
    #[sea_orm(
        belongs_to = "super::cx_sessions::Entity",
        from = "Column::SessionId",
        to = "super::cx_sessions::Column::Id"
    )]
    CxSessions,
}

impl Related<super::repositories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Repositories.def()
    }
}

impl Related<super::cx_sessions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CxSessions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
