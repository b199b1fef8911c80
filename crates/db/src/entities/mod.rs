//! `SeaORM` entity definitions.
//!
//! Status columns are stored as plain text and converted at the
//! repository boundary through the `fisca-core` enums' `as_str`/`parse`
//! pairs; amounts are `NUMERIC` columns mapped to `rust_decimal`.

pub mod accounting_audit_logs;
pub mod activities;
pub mod budget_rows;
pub mod budget_transactions;
pub mod contracts;
pub mod journal_lines;
pub mod journal_snapshots;
pub mod org_units;
pub mod progress_statements;
pub mod sessions;
pub mod transactions;
pub mod users;
pub mod workflow_logs;
