//! `SeaORM` Entity for float_transfers table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "float_transfers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub session_id: Uuid,
    pub outbound_repository_id: Uuid,
    pub inbound_repository_id: Uuid,
    pub outbound_ticker: String,
    pub inbound_ticker: String,
    pub outbound_sum: Decimal,
    pub inbound_sum: Decimal,
    pub status: String,
    pub created_by: Uuid,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::cx_sessions::Entity",
        from = "Column::SessionId",
        to = "super::cx_sessions::Column::Id"
    )]
    CxSessions,
}

impl Related<super::cx_sessions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CxSessions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
