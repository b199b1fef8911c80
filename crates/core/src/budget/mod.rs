//! Budget ledger arithmetic.
//!
//! A `BudgetRow` is the single source of truth for fund availability per
//! budget coding. This module holds the pure arithmetic for the three
//! ledger mutations (block, release, confirm); `fisca-db` applies the
//! results under a row-level write lock.

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::LedgerError;
pub use service::LedgerService;
pub use types::{LedgerBalances, LedgerOperation};
