//! Accounting period gate.
//!
//! Resolves which accounting period a date falls into and whether postings
//! are allowed there.

pub mod error;
pub mod gate;
pub mod types;

#[cfg(test)]
mod gate_props;

pub use error::PeriodError;
pub use gate::PeriodGate;
pub use types::{AccountingPeriod, PeriodStatus};
