//! `SeaORM` Entity for the contracts table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A contract holds its full amount blocked against one budget row from
/// draft time; `paid_amount` accumulates as statements are paid.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "contracts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub contract_number: String,
    pub title: String,
    /// Lifecycle status (`fisca_core::contract::ContractStatus`).
    pub status: String,
    pub total_amount: Decimal,
    pub paid_amount: Decimal,
    pub budget_row_id: Uuid,
    pub contractor_code: String,
    pub version: i32,
    pub created_by: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::budget_rows::Entity",
        from = "Column::BudgetRowId",
        to = "super::budget_rows::Column::Id"
    )]
    BudgetRows,
    #[sea_orm(has_many = "super::progress_statements::Entity")]
    ProgressStatements,
}

impl Related<super::budget_rows::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BudgetRows.def()
    }
}

impl Related<super::progress_statements::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProgressStatements.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
