//! Transcode and allocation types.

use arus_shared::types::TranscodeId;
use serde::{Deserialize, Serialize};

/// Document category a transcode belongs to (`nomortranscode`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranscodeCategory {
    /// 9 - journal voucher.
    JournalVoucher,
    /// 10 - cash receipt.
    CashIn,
    /// 11 - cash disbursement.
    CashOut,
    /// 12 - bank receipt.
    BankIn,
    /// 13 - bank disbursement.
    BankOut,
    /// Any other document family (purchasing, sales, inventory).
    Other(i32),
}

impl TranscodeCategory {
    /// Maps the stored category number.
    #[must_use]
    pub const fn from_number(number: i32) -> Self {
        match number {
            9 => Self::JournalVoucher,
            10 => Self::CashIn,
            11 => Self::CashOut,
            12 => Self::BankIn,
            13 => Self::BankOut,
            other => Self::Other(other),
        }
    }

    /// Returns the stored category number.
    #[must_use]
    pub const fn number(self) -> i32 {
        match self {
            Self::JournalVoucher => 9,
            Self::CashIn => 10,
            Self::CashOut => 11,
            Self::BankIn => 12,
            Self::BankOut => 13,
            Self::Other(n) => n,
        }
    }

    /// Returns true for cash and bank documents, which usually carry giro data.
    #[must_use]
    pub const fn is_treasury(self) -> bool {
        matches!(self, Self::CashIn | Self::CashOut | Self::BankIn | Self::BankOut)
    }
}

/// Snapshot of a transcode's numbering state, read under a row lock.
#[derive(Debug, Clone)]
pub struct TranscodeState {
    /// Transcode ID.
    pub id: TranscodeId,
    /// Unique code, e.g. "JV".
    pub code: String,
    /// Prefix substituted for `{PREFIX}`.
    pub prefix: String,
    /// Format template.
    pub format: String,
    /// Last allocated counter value.
    pub last_number: i64,
    /// Whether numbers may be allocated.
    pub is_active: bool,
}

/// Result of one allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Allocation {
    /// Transcode the number belongs to.
    pub transcode_id: TranscodeId,
    /// New counter value to persist as `last_number`.
    pub value: i64,
    /// Formatted document number.
    pub doc_number: String,
}

/// Definition used when creating a transcode.
#[derive(Debug, Clone, Deserialize)]
pub struct TranscodeDefinition {
    /// Unique code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Prefix substituted for `{PREFIX}`.
    pub prefix: String,
    /// Format template.
    pub format: String,
    /// Category number.
    pub nomortranscode: i32,
    /// Starting counter (the first allocation returns `last_number + 1`).
    #[serde(default)]
    pub last_number: i64,
}
