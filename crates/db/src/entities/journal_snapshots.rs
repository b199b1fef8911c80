//! `SeaORM` Entity for the journal_snapshots table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Frozen journal header for one approved transaction. Created once,
/// immutable thereafter; `content_hash` makes line tampering detectable.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "journal_snapshots")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub transaction_id: Uuid,
    pub total_debit: Decimal,
    pub total_credit: Decimal,
    pub is_balanced: bool,
    /// VALID | WARNING | BLOCKED.
    pub validation_status: String,
    /// SHA-256 over the canonical line serialization, hex-encoded.
    pub content_hash: String,
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
    #[sea_orm(has_many = "super::journal_lines::Entity")]
    JournalLines,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl Related<super::journal_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JournalLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
