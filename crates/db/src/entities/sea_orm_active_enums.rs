//! `SeaORM` active enums mirroring the Postgres enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "journal_status")]
pub enum JournalStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "posted")]
    Posted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "journal_source")]
pub enum JournalSource {
    #[sea_orm(string_value = "MANUAL")]
    Manual,
    #[sea_orm(string_value = "SYSTEM")]
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(
    rs_type = "String",
    db_type = "Enum",
    enum_name = "accounting_period_status"
)]
pub enum AccountingPeriodStatus {
    #[sea_orm(string_value = "open")]
    Open,
    #[sea_orm(string_value = "closed")]
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "exchange_rate_status")]
pub enum ExchangeRateStatus {
    #[sea_orm(string_value = "A")]
    A,
    #[sea_orm(string_value = "C")]
    C,
    #[sea_orm(string_value = "I")]
    I,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "invoice_kind")]
pub enum InvoiceKind {
    #[sea_orm(string_value = "AP")]
    Ap,
    #[sea_orm(string_value = "AR")]
    Ar,
}

// ============================================================
// Conversions to the core domain enums
// ============================================================

impl From<JournalStatus> for arus_core::ledger::JournalStatus {
    fn from(status: JournalStatus) -> Self {
        match status {
            JournalStatus::Draft => Self::Draft,
            JournalStatus::Posted => Self::Posted,
        }
    }
}

impl From<arus_core::ledger::JournalStatus> for JournalStatus {
    fn from(status: arus_core::ledger::JournalStatus) -> Self {
        match status {
            arus_core::ledger::JournalStatus::Draft => Self::Draft,
            arus_core::ledger::JournalStatus::Posted => Self::Posted,
        }
    }
}

impl From<JournalSource> for arus_core::ledger::SourceType {
    fn from(source: JournalSource) -> Self {
        match source {
            JournalSource::Manual => Self::Manual,
            JournalSource::System => Self::System,
        }
    }
}

impl From<arus_core::ledger::SourceType> for JournalSource {
    fn from(source: arus_core::ledger::SourceType) -> Self {
        match source {
            arus_core::ledger::SourceType::Manual => Self::Manual,
            arus_core::ledger::SourceType::System => Self::System,
        }
    }
}

impl From<AccountingPeriodStatus> for arus_core::period::PeriodStatus {
    fn from(status: AccountingPeriodStatus) -> Self {
        match status {
            AccountingPeriodStatus::Open => Self::Open,
            AccountingPeriodStatus::Closed => Self::Closed,
        }
    }
}

impl From<arus_core::period::PeriodStatus> for AccountingPeriodStatus {
    fn from(status: arus_core::period::PeriodStatus) -> Self {
        match status {
            arus_core::period::PeriodStatus::Open => Self::Open,
            arus_core::period::PeriodStatus::Closed => Self::Closed,
        }
    }
}

impl From<ExchangeRateStatus> for arus_core::currency::RateStatus {
    fn from(status: ExchangeRateStatus) -> Self {
        match status {
            ExchangeRateStatus::A => Self::Active,
            ExchangeRateStatus::C => Self::Closed,
            ExchangeRateStatus::I => Self::Inactive,
        }
    }
}

impl From<InvoiceKind> for arus_core::ledger::RefType {
    fn from(kind: InvoiceKind) -> Self {
        match kind {
            InvoiceKind::Ap => Self::Ap,
            InvoiceKind::Ar => Self::Ar,
        }
    }
}

impl From<arus_core::ledger::RefType> for InvoiceKind {
    fn from(kind: arus_core::ledger::RefType) -> Self {
        match kind {
            arus_core::ledger::RefType::Ap => Self::Ap,
            arus_core::ledger::RefType::Ar => Self::Ar,
        }
    }
}

impl From<arus_core::currency::RateStatus> for ExchangeRateStatus {
    fn from(status: arus_core::currency::RateStatus) -> Self {
        match status {
            arus_core::currency::RateStatus::Active => Self::A,
            arus_core::currency::RateStatus::Closed => Self::C,
            arus_core::currency::RateStatus::Inactive => Self::I,
        }
    }
}
