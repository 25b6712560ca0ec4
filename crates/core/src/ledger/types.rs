//! Journal domain types.
//!
//! A journal is a header plus ordered debit/credit lines. Line amounts may be
//! entered in a foreign currency; the ledger stores both the original amounts
//! and the base-currency amounts used for the balance check.

use arus_shared::types::{AccountId, InvoiceId, JournalId, PartnerId, RateTypeId};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Maximum allowed `|debit - credit|` for a balanced journal (0.01).
pub const BALANCE_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Document number placeholder asking the ledger to allocate one.
pub const AUTO_DOC_NUMBER: &str = "AUTO";

/// Maximum length of a manually supplied document number.
pub const MAX_DOC_NUMBER_LEN: usize = 50;

/// Journal lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JournalStatus {
    /// Editable, deletable, no financial effect.
    Draft,
    /// Financial effect applied; only `Unpost` is allowed.
    Posted,
}

impl JournalStatus {
    /// Returns true if the journal can be edited or deleted.
    #[must_use]
    pub const fn is_editable(self) -> bool {
        matches!(self, Self::Draft)
    }
}

impl std::fmt::Display for JournalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Draft => write!(f, "Draft"),
            Self::Posted => write!(f, "Posted"),
        }
    }
}

/// Who created the journal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SourceType {
    /// Entered by a user.
    #[default]
    Manual,
    /// Generated from a source document (see `ref_id`).
    System,
}

/// Kind of invoice a settlement line refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RefType {
    /// Accounts payable.
    Ap,
    /// Accounts receivable.
    Ar,
}

impl RefType {
    /// Storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ap => "AP",
            Self::Ar => "AR",
        }
    }
}

impl std::fmt::Display for RefType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Requested document number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocNumberRequest {
    /// Allocate from the transcode's sequence.
    Auto,
    /// Caller-supplied override.
    Manual(String),
}

impl DocNumberRequest {
    /// Interprets the raw `doc_number` field.
    #[must_use]
    pub fn from_input(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case(AUTO_DOC_NUMBER) {
            Self::Auto
        } else {
            Self::Manual(trimmed.to_string())
        }
    }
}

/// Giro/cheque metadata carried on cash and bank journals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiroInfo {
    /// Whether the journal is paid by giro/cheque.
    #[serde(default)]
    pub is_giro: bool,
    /// Giro/cheque number.
    #[serde(default)]
    pub giro_number: Option<String>,
    /// Due date.
    #[serde(default)]
    pub giro_due_date: Option<NaiveDate>,
    /// Issuing bank.
    #[serde(default)]
    pub giro_bank_name: Option<String>,
}

/// Journal header as submitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalHeaderInput {
    /// `"AUTO"` or a manual number.
    pub doc_number: String,
    /// Business date; decides the accounting period.
    pub doc_date: NaiveDate,
    /// Free text.
    #[serde(default)]
    pub description: Option<String>,
    /// Transcode the journal belongs to.
    pub transcode_code: String,
    /// Manual or system generated.
    #[serde(default)]
    pub source_type: SourceType,
    /// Source document for system journals.
    #[serde(default)]
    pub ref_id: Option<i64>,
    /// Giro metadata.
    #[serde(default, flatten)]
    pub giro: GiroInfo,
}

/// Journal line as submitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalLineInput {
    /// Account.
    pub coa_id: AccountId,
    /// Line text.
    #[serde(default)]
    pub description: Option<String>,
    /// Debit in the line currency.
    #[serde(default)]
    pub debit: Decimal,
    /// Credit in the line currency.
    #[serde(default)]
    pub credit: Decimal,
    /// Settled invoice.
    #[serde(default)]
    pub ref_id: Option<InvoiceId>,
    /// Settled invoice kind.
    #[serde(default)]
    pub ref_type: Option<RefType>,
    /// Business partner.
    #[serde(default)]
    pub partner_id: Option<PartnerId>,
    /// Line currency; base currency when absent.
    #[serde(default)]
    pub currency_code: Option<String>,
    /// Rate type used to resolve the line currency.
    #[serde(default)]
    pub rate_type_id: Option<RateTypeId>,
    /// Explicit rate to base; skips resolution.
    #[serde(default)]
    pub exchange_rate: Option<Decimal>,
}

/// Full create/update payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalInput {
    /// Header.
    #[serde(flatten)]
    pub header: JournalHeaderInput,
    /// Lines in display order.
    pub lines: Vec<JournalLineInput>,
}

/// A line after currency resolution, ready to persist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedLine {
    /// 1-based position.
    pub line_no: i32,
    /// Account.
    pub coa_id: AccountId,
    /// Line text.
    pub description: Option<String>,
    /// Debit in base currency.
    pub debit: Decimal,
    /// Credit in base currency.
    pub credit: Decimal,
    /// Line currency code.
    pub currency_code: String,
    /// Rate applied to reach base currency.
    pub exchange_rate: Decimal,
    /// Debit as entered.
    pub fc_debit: Decimal,
    /// Credit as entered.
    pub fc_credit: Decimal,
    /// Rate type used, if resolved.
    pub rate_type_id: Option<RateTypeId>,
    /// Settled invoice.
    pub ref_id: Option<InvoiceId>,
    /// Settled invoice kind.
    pub ref_type: Option<RefType>,
    /// Business partner.
    pub partner_id: Option<PartnerId>,
}

impl ResolvedLine {
    /// Base-currency amount of the line (whichever side is non-zero).
    #[must_use]
    pub fn amount(&self) -> Decimal {
        self.debit.max(self.credit)
    }

    /// Returns true if both sides are zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.debit.is_zero() && self.credit.is_zero()
    }
}

/// Debit/credit totals in base currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct JournalTotals {
    /// Sum of debits.
    pub total_debit: Decimal,
    /// Sum of credits.
    pub total_credit: Decimal,
    /// `total_debit - total_credit`.
    pub difference: Decimal,
    /// Whether `|difference| <= 0.01`.
    pub is_balanced: bool,
}

impl JournalTotals {
    /// Creates totals from debit and credit sums.
    #[must_use]
    pub fn new(total_debit: Decimal, total_credit: Decimal) -> Self {
        let difference = total_debit - total_credit;
        Self {
            total_debit,
            total_credit,
            difference,
            is_balanced: difference.abs() <= BALANCE_TOLERANCE,
        }
    }
}

/// A stored journal with its lines.
#[derive(Debug, Clone, Serialize)]
pub struct JournalView {
    /// Journal ID.
    pub id: JournalId,
    /// Document number.
    pub doc_number: String,
    /// Business date.
    pub doc_date: NaiveDate,
    /// Free text.
    pub description: Option<String>,
    /// Transcode code.
    pub transcode_code: String,
    /// Manual or system.
    pub source_type: SourceType,
    /// Source document.
    pub ref_id: Option<i64>,
    /// Lifecycle status.
    pub status: JournalStatus,
    /// Giro metadata.
    #[serde(flatten)]
    pub giro: GiroInfo,
    /// Lines in order.
    pub lines: Vec<ResolvedLine>,
    /// Totals in base currency.
    pub totals: JournalTotals,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_tolerance_constant() {
        assert_eq!(BALANCE_TOLERANCE, dec!(0.01));
    }

    #[test]
    fn test_totals_within_tolerance() {
        let totals = JournalTotals::new(dec!(100000.00), dec!(99999.99));
        assert!(totals.is_balanced);
        assert_eq!(totals.difference, dec!(0.01));

        let totals = JournalTotals::new(dec!(100000.00), dec!(99999.98));
        assert!(!totals.is_balanced);
    }

    #[test]
    fn test_doc_number_request() {
        assert_eq!(DocNumberRequest::from_input("AUTO"), DocNumberRequest::Auto);
        assert_eq!(DocNumberRequest::from_input(" auto "), DocNumberRequest::Auto);
        assert_eq!(
            DocNumberRequest::from_input("JV/MANUAL/1"),
            DocNumberRequest::Manual("JV/MANUAL/1".to_string())
        );
    }

    #[test]
    fn test_enum_wire_format() {
        assert_eq!(serde_json::to_string(&RefType::Ap).unwrap(), "\"AP\"");
        assert_eq!(serde_json::to_string(&SourceType::System).unwrap(), "\"SYSTEM\"");
        assert_eq!(serde_json::to_string(&JournalStatus::Posted).unwrap(), "\"Posted\"");
    }

    #[test]
    fn test_line_input_defaults() {
        let line: JournalLineInput =
            serde_json::from_str(r#"{"coa_id": 101, "debit": "100000"}"#).unwrap();
        assert_eq!(line.coa_id, AccountId::new(101));
        assert_eq!(line.debit, dec!(100000));
        assert_eq!(line.credit, Decimal::ZERO);
        assert!(line.ref_id.is_none());
        assert!(line.currency_code.is_none());
    }
}
