//! Repository abstractions for data access.
//!
//! Each repository owns the persistence and locking discipline for one
//! aggregate and delegates every state-machine decision and every piece
//! of ledger arithmetic to `fisca-core`.

pub mod accounting;
pub mod budget;
pub mod contract;
pub mod session;
pub mod statement;
pub mod transaction;
pub mod user;
pub mod workflow;

pub use accounting::AccountingRepository;
pub use budget::BudgetRepository;
pub use contract::ContractRepository;
pub use session::SessionRepository;
pub use statement::StatementRepository;
pub use transaction::TransactionRepository;
pub use user::UserRepository;
pub use workflow::WorkflowRepository;
