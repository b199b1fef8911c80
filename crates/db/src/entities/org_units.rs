//! `SeaORM` Entity for the org_units reference table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Organizational unit (zone, department, section). Read-only during
/// all core flows.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "org_units")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub code: String,
    pub name: String,
    pub parent_id: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::budget_rows::Entity")]
    BudgetRows,
}

impl Related<super::budget_rows::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BudgetRows.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
