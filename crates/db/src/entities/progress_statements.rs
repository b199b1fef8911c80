//! `SeaORM` Entity for the progress_statements table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A slice of a contract's value claimed as work progresses.
/// `net_amount = gross_amount - deductions`; `cumulative_amount` is the
/// running net total across the contract's statements and can never
/// exceed the contract total.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "progress_statements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub contract_id: Uuid,
    pub sequence_no: i32,
    pub gross_amount: Decimal,
    pub deductions: Decimal,
    pub net_amount: Decimal,
    pub cumulative_amount: Decimal,
    /// Lifecycle status (`fisca_core::statement::StatementStatus`).
    pub status: String,
    pub created_by: Uuid,
    pub paid_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::contracts::Entity",
        from = "Column::ContractId",
        to = "super::contracts::Column::Id"
    )]
    Contracts,
}

impl Related<super::contracts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contracts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
