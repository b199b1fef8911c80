//! `SeaORM` Entity for the journal_lines table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One frozen debit or credit line of a journal snapshot.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "journal_lines")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub snapshot_id: Uuid,
    pub line_no: i16,
    pub account_code: String,
    pub account_name: String,
    /// DEBIT | CREDIT.
    pub side: String,
    pub amount: Decimal,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::journal_snapshots::Entity",
        from = "Column::SnapshotId",
        to = "super::journal_snapshots::Column::Id"
    )]
    JournalSnapshots,
}

impl Related<super::journal_snapshots::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JournalSnapshots.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
