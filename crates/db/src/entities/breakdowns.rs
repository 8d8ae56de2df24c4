//! `SeaORM` Entity for breakdowns table.
//!
//! `breakable_kind` + `breakable_id` reference the owning order,
//! transfer, or swap; `status` and `direction` mirror the core enums.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "breakdowns")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub breakable_kind: String,
    pub breakable_id: Uuid,
    pub float_stack_id: Uuid,
    pub denomination_id: Uuid,
    pub count: Decimal,
    pub direction: String,
    pub denominated_value: Decimal,
    pub status: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::float_stacks::Entity",
        from = "Column::FloatStackId",
        to = "super::float_stacks::Column::Id"
    )]
    FloatStacks,
    #[sea_orm(
        belongs_to = "super::denominations::Entity",
        from = "Column::DenominationId",
        to = "super::denominations::Column::Id"
    )]
    Denominations,
}

impl Related<super::float_stacks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FloatStacks.def()
    }
}

impl Related<super::denominations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Denominations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
