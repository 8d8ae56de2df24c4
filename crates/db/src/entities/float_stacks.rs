//! `SeaORM` Entity for float_stacks table.
//!
//! Stacks are never deleted; `previous_session_float_stack_id` chains
//! each stack to its predecessor in the prior session.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "float_stacks")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub session_id: Uuid,
    pub repository_id: Uuid,
    pub denomination_id: Uuid,
    pub ticker: String,
    pub denominated_value: Decimal,
    pub open_count: Decimal,
    pub close_count: Decimal,
    pub midday_count: Decimal,
    pub last_session_count: Decimal,
    pub spent_during_session: Decimal,
    pub transferred_during_session: Decimal,
    pub open_spot: Option<Decimal>,
    pub close_spot: Option<Decimal>,
    pub open_confirmed_at: Option<DateTimeWithTimeZone>,
    pub open_confirmed_by: Option<Uuid>,
    pub close_confirmed_at: Option<DateTimeWithTimeZone>,
    pub close_confirmed_by: Option<Uuid>,
    pub previous_session_float_stack_id: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::cx_sessions::Entity",
        from = "Column::SessionId",
        to = "super::cx_sessions::Column::Id"
    )]
    CxSessions,
    #[sea_orm(
        belongs_to = "super::repositories::Entity",
        from = "Column::RepositoryId",
        to = "super::repositories::Column::Id"
    )]
    Repositories,
    #[sea_orm(
        belongs_to = "super::denominations::Entity",
        from = "Column::DenominationId",
        to = "super::denominations::Column::Id"
    )]
    Denominations,
    #[sea_orm(has_many = "super::breakdowns::Entity")]
    Breakdowns,
}

impl Related<super::cx_sessions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CxSessions.def()
    }
}

impl Related<super::repositories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Repositories.def()
    }
}

impl Related<super::denominations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Denominations.def()
    }
}

impl Related<super::breakdowns::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Breakdowns.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
