//! `SeaORM` Entity for the workflow_logs table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Append-only record of one approval-ladder action. Write-only audit
/// trail; never read back into business logic.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "workflow_logs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub previous_status: String,
    pub new_status: String,
    /// approve | reject | return_to_user.
    pub action: String,
    pub admin_level: i16,
    pub actor_id: Uuid,
    pub comment: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::transactions::Entity",
        from = "Column::TransactionId",
        to = "super::transactions::Column::Id"
    )]
    Transactions,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
