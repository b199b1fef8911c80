//! Core business logic for Fisca.
//!
//! This crate contains pure business logic with ZERO web or database
//! dependencies. All domain types, state machines, and ledger arithmetic
//! live here; persistence and locking discipline live in `fisca-db`.
//!
//! # Modules
//!
//! - `budget` - Budget ledger arithmetic (block / release / confirm)
//! - `workflow` - 4-level transaction approval state machine
//! - `contract` - Contract lifecycle
//! - `statement` - Progress statements and the over-payment ceiling
//! - `accounting` - Journal snapshots and posting rules
//! - `directory` - Contractor/credit directory seam

pub mod accounting;
pub mod budget;
pub mod contract;
pub mod directory;
pub mod statement;
pub mod workflow;
