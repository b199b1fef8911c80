//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - Repository abstractions for data access
//! - Database migrations
//!
//! Locking discipline lives here: every budget mutation takes a
//! pessimistic row lock (`SELECT ... FOR UPDATE`) on its `budget_rows`
//! row; the accounting posting path instead uses optimistic version
//! checking. State-machine decisions and ledger arithmetic are delegated
//! to `fisca-core`.

pub mod entities;
pub mod migration;
pub mod repositories;

pub use repositories::{
    AccountingRepository, BudgetRepository, ContractRepository, SessionRepository,
    StatementRepository, TransactionRepository, UserRepository, WorkflowRepository,
};

use sea_orm::{Database, DatabaseConnection, DbErr};

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}
