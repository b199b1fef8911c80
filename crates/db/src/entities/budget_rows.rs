//! `SeaORM` Entity for the budget_rows table — the ledger store.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One budget line: the single source of truth for fund availability
/// per budget coding. `remaining = approved - blocked - spent` is always
/// derived, never stored.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "budget_rows")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub activity_id: Uuid,
    /// NULL means the row is globally visible across org units.
    pub org_unit_id: Option<Uuid>,
    #[sea_orm(unique)]
    pub budget_coding: String,
    pub approved_amount: Decimal,
    pub blocked_amount: Decimal,
    pub spent_amount: Decimal,
    pub fiscal_year: i16,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::activities::Entity",
        from = "Column::ActivityId",
        to = "super::activities::Column::Id"
    )]
    Activities,
    #[sea_orm(
        belongs_to = "super::org_units::Entity",
        from = "Column::OrgUnitId",
        to = "super::org_units::Column::Id"
    )]
    OrgUnits,
    #[sea_orm(has_many = "super::budget_transactions::Entity")]
    BudgetTransactions,
}

impl Related<super::activities::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Activities.def()
    }
}

impl Related<super::org_units::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrgUnits.def()
    }
}

impl Related<super::budget_transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BudgetTransactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
