//! `SeaORM` Entity for denominations table - read-only reference data.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "denominations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Ticker of the currency this denomination belongs to.
    pub ticker: String,
    /// Face value of one unit.
    pub value: Decimal,
    /// Whether the organization accepts this denomination.
    pub accepted: bool,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::float_stacks::Entity")]
    FloatStacks,
}

impl Related<super::float_stacks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FloatStacks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
