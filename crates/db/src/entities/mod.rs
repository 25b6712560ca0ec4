//! `SeaORM` entities, one module per table.

pub mod accounting_periods;
pub mod accounts;
pub mod currencies;
pub mod currency_rates;
pub mod exchange_rate_lines;
pub mod exchange_rates;
pub mod invoices;
pub mod journal_lines;
pub mod journals;
pub mod rate_types;
pub mod sea_orm_active_enums;
pub mod transcodes;
