//! Journal ledger.
//!
//! - Journal and line types, balance tolerance
//! - Input validation
//! - Currency resolution and balance checks (`LedgerService`)
//! - Draft/Posted state machine
//! - Invoice settlement on post and unpost

pub mod error;
pub mod lifecycle;
pub mod service;
pub mod settlement;
pub mod types;
pub mod validation;

#[cfg(test)]
mod service_props;
#[cfg(test)]
mod validation_props;

pub use error::LedgerError;
pub use lifecycle::{JournalAction, next_status, transition};
pub use service::LedgerService;
pub use settlement::{InvoiceBalance, SettlementDelta, SettlementDirection, SettlementService};
pub use types::{
    AUTO_DOC_NUMBER, BALANCE_TOLERANCE, DocNumberRequest, GiroInfo, JournalHeaderInput,
    JournalInput, JournalLineInput, JournalStatus, JournalTotals, JournalView, RefType,
    ResolvedLine, SourceType,
};
pub use validation::{fits_scale, validate_header, validate_lines, validate_precision};
