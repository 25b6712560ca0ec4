//! Core business logic for Arus.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Repositories load state, call into these modules, and persist the results.
//!
//! # Modules
//!
//! - `sequence` - Transcode numbering templates and counter rules
//! - `currency` - Exchange rate resolution and conversion
//! - `ledger` - Journal validation, lifecycle and invoice settlement
//! - `period` - Accounting period posting gate

pub mod currency;
pub mod ledger;
pub mod period;
pub mod sequence;
