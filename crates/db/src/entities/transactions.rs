//! `SeaORM` Entity for the transactions table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A user-facing financial action climbing the approval ladder.
///
/// `version` is the optimistic lock counter checked by the posting
/// protocol; approval and rejection bump it too, so a stale client is
/// detected no matter which actor moved first. Rows are never hard
/// deleted.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// 11-part composite business key; treasury export keys off it.
    #[sea_orm(unique)]
    pub unique_code: String,
    pub title: String,
    /// Workflow status (`fisca_core::workflow::TransactionStatus`).
    pub status: String,
    pub amount: Decimal,
    pub budget_row_id: Uuid,
    pub beneficiary_code: Option<String>,
    pub version: i32,
    /// Accounting status, orthogonal to workflow status. NULL until a
    /// snapshot exists.
    pub accounting_status: Option<String>,
    pub posting_ref: Option<String>,
    pub posting_notes: Option<String>,
    pub posted_at: Option<DateTimeWithTimeZone>,
    pub posted_by: Option<Uuid>,
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
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::CreatedBy",
        to = "super::users::Column::Id"
    )]
    Users,
    #[sea_orm(has_many = "super::workflow_logs::Entity")]
    WorkflowLogs,
}

impl Related<super::budget_rows::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BudgetRows.def()
    }
}

impl Related<super::workflow_logs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WorkflowLogs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
