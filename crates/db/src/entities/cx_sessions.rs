//! `SeaORM` Entity for cx_sessions table.
//!
//! Status values mirror `cambio_core::session::SessionStatus` and only
//! change through state-machine transitions. Sessions are never deleted.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "cx_sessions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub organization_id: Uuid,
    /// The user who created the session.
    pub user_id: Uuid,
    pub status: String,
    pub open_started_at: Option<DateTimeWithTimeZone>,
    pub open_started_by: Option<Uuid>,
    pub open_confirmed_at: Option<DateTimeWithTimeZone>,
    pub open_confirmed_by: Option<Uuid>,
    pub close_started_at: Option<DateTimeWithTimeZone>,
    pub close_started_by: Option<Uuid>,
    pub close_confirmed_at: Option<DateTimeWithTimeZone>,
    pub close_confirmed_by: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::organizations::Entity",
        from = "Column::OrganizationId",
        to = "super::organizations::Column::Id"
    )]
    Organizations,
    #[sea_orm(has_many = "super::float_stacks::Entity")]
    FloatStacks,
    #[sea_orm(has_many = "super::session_members::Entity")]
    SessionMembers,
}

impl Related<super::organizations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organizations.def()
    }
}

impl Related<super::float_stacks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FloatStacks.def()
    }
}

impl Related<super::session_members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SessionMembers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
