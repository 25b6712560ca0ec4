//! Ledger error types for validation, state and settlement errors.

use arus_shared::AppError;
use arus_shared::types::{AccountId, InvoiceId, JournalId};
use rust_decimal::Decimal;
use thiserror::Error;

use super::lifecycle::JournalAction;
use super::types::{JournalStatus, RefType};
use crate::currency::RateError;
use crate::period::PeriodError;
use crate::sequence::SequenceError;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Journal must have at least 2 lines.
    #[error("Journal must have at least 2 lines, got {0}")]
    InsufficientLines(usize),

    /// A line violates the amount or reference rules.
    #[error("Line {line_no}: {reason}")]
    InvalidLine {
        /// 1-based line number.
        line_no: usize,
        /// What is wrong.
        reason: String,
    },

    /// An amount has more decimals than its currency allows.
    #[error("Line {line_no}: {amount} has more than {decimal_places} decimal places for {currency}")]
    ExcessPrecision {
        /// 1-based line number.
        line_no: usize,
        /// Offending amount as entered.
        amount: Decimal,
        /// Line currency.
        currency: String,
        /// Decimal places the currency allows.
        decimal_places: u32,
    },

    /// Journal debits and credits differ by more than the tolerance.
    #[error("Journal is not balanced. Debit: {debit}, Credit: {credit}, Difference: {difference}")]
    Unbalanced {
        /// Total debit in base currency.
        debit: Decimal,
        /// Total credit in base currency.
        credit: Decimal,
        /// Debit minus credit.
        difference: Decimal,
    },

    /// Every line is zero.
    #[error("Journal has no non-zero line to post")]
    NothingToPost,

    /// Malformed header field.
    #[error("{0}")]
    Validation(String),

    // ========== Reference Errors ==========
    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// Journal not found.
    #[error("Journal not found: {0}")]
    JournalNotFound(JournalId),

    /// Invoice not found.
    #[error("Invoice not found: {0}")]
    InvoiceNotFound(InvoiceId),

    // ========== State Errors ==========
    /// Operation not permitted in the journal's status.
    #[error("Cannot {action} journal {id} in status {status}")]
    InvalidState {
        /// Journal ID.
        id: JournalId,
        /// Current status.
        status: JournalStatus,
        /// Attempted action.
        action: JournalAction,
    },

    /// Document number already used.
    #[error("Document number '{0}' already exists")]
    DuplicateDocNumber(String),

    // ========== Settlement Errors ==========
    /// Line `ref_type` does not match the invoice kind.
    #[error("Invoice {invoice_id} is {actual}, line references it as {expected}")]
    RefTypeMismatch {
        /// Invoice ID.
        invoice_id: InvoiceId,
        /// Kind given on the line.
        expected: RefType,
        /// Kind stored on the invoice.
        actual: RefType,
    },

    /// Settlement exceeds the invoice's outstanding balance.
    #[error("Settlement of {amount} exceeds outstanding balance {outstanding} of invoice {invoice_id}")]
    Overpayment {
        /// Invoice ID.
        invoice_id: InvoiceId,
        /// Outstanding balance before posting.
        outstanding: Decimal,
        /// Requested settlement.
        amount: Decimal,
    },

    /// Reversal would push the outstanding balance above the invoice total.
    #[error("Reversing {amount} on invoice {invoice_id} exceeds its total {total}")]
    OverRestore {
        /// Invoice ID.
        invoice_id: InvoiceId,
        /// Invoice total.
        total: Decimal,
        /// Requested reversal.
        amount: Decimal,
    },

    // ========== Collaborator Errors ==========
    /// Accounting period rejected the posting date.
    #[error(transparent)]
    Period(#[from] PeriodError),

    /// Rate resolution failed for a foreign-currency line.
    #[error(transparent)]
    Rate(#[from] RateError),

    /// Document number allocation failed.
    #[error(transparent)]
    Sequence(#[from] SequenceError),

    // ========== Concurrency / Storage Errors ==========
    /// Concurrent modification detected.
    #[error("Concurrent modification detected, please retry")]
    ConcurrentModification,

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InsufficientLines(_) => "INSUFFICIENT_LINES",
            Self::InvalidLine { .. } => "INVALID_LINE",
            Self::ExcessPrecision { .. } => "EXCESS_PRECISION",
            Self::Unbalanced { .. } => "UNBALANCED",
            Self::NothingToPost => "NOTHING_TO_POST",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::JournalNotFound(_) => "JOURNAL_NOT_FOUND",
            Self::InvoiceNotFound(_) => "INVOICE_NOT_FOUND",
            Self::InvalidState { .. } => "INVALID_STATE",
            Self::DuplicateDocNumber(_) => "DUPLICATE_DOC_NUMBER",
            Self::RefTypeMismatch { .. } => "REF_TYPE_MISMATCH",
            Self::Overpayment { .. } => "OVERPAYMENT",
            Self::OverRestore { .. } => "OVER_RESTORE",
            Self::Period(e) => e.error_code(),
            Self::Rate(e) => e.error_code(),
            Self::Sequence(e) => e.error_code(),
            Self::ConcurrentModification => "CONCURRENT_MODIFICATION",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - validation errors
            Self::InsufficientLines(_)
            | Self::InvalidLine { .. }
            | Self::ExcessPrecision { .. }
            | Self::NothingToPost
            | Self::Validation(_)
            | Self::RefTypeMismatch { .. }
            | Self::Overpayment { .. } => 400,

            // 404 Not Found
            Self::AccountNotFound(_) | Self::JournalNotFound(_) | Self::InvoiceNotFound(_) => 404,

            // 409 Conflict
            Self::InvalidState { .. }
            | Self::DuplicateDocNumber(_)
            | Self::OverRestore { .. }
            | Self::ConcurrentModification => 409,

            // 422 Unprocessable Entity
            Self::Unbalanced { .. } => 422,

            Self::Period(e) => e.http_status_code(),
            Self::Rate(e) => e.http_status_code(),
            Self::Sequence(e) => e.http_status_code(),

            Self::Database(_) => 503,
        }
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ConcurrentModification | Self::Database(_) => true,
            Self::Period(e) => e.is_retryable(),
            Self::Rate(e) => e.is_retryable(),
            Self::Sequence(e) => e.is_retryable(),
            _ => false,
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Period(e) => e.into(),
            LedgerError::Rate(e) => e.into(),
            LedgerError::Sequence(e) => e.into(),
            other => {
                let message = other.to_string();
                match other {
                    LedgerError::Unbalanced { .. } => Self::Unbalanced(message),
                    LedgerError::AccountNotFound(_)
                    | LedgerError::JournalNotFound(_)
                    | LedgerError::InvoiceNotFound(_) => Self::NotFound(message),
                    LedgerError::InvalidState { .. } => Self::InvalidState(message),
                    LedgerError::DuplicateDocNumber(_)
                    | LedgerError::OverRestore { .. }
                    | LedgerError::ConcurrentModification => Self::Conflict(message),
                    LedgerError::Database(_) => Self::Storage(message),
                    _ => Self::Validation(message),
                }
            }
        }
    }
}
