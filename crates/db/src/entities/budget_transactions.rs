//! `SeaORM` Entity for the budget_transactions audit table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Append-only forensic record of one ledger mutation. Never updated,
/// never deleted, never read back into business logic.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "budget_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub budget_row_id: Uuid,
    /// BLOCK | RELEASE | CONFIRM.
    pub operation: String,
    pub amount: Decimal,
    pub user_id: Uuid,
    pub reference_doc: String,
    pub pre_blocked: Decimal,
    pub pre_spent: Decimal,
    pub post_blocked: Decimal,
    pub post_spent: Decimal,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::budget_rows::Entity",
        from = "Column::BudgetRowId",
        to = "super::budget_rows::Column::Id"
    )]
    BudgetRows,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    Users,
}

impl Related<super::budget_rows::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BudgetRows.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
