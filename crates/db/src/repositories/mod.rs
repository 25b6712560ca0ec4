//! Repository abstractions for data access.
//!
//! Repositories run the engine operations against PostgreSQL, hiding the
//! `SeaORM` details from the rest of the application. Business rules live in
//! `arus-core`; repositories load what those rules need, lock the rows they
//! change, and persist the outcome in one transaction.

mod db_error;

pub mod journal;
pub mod period;
pub mod rate;
pub mod sequence;

pub use journal::{JournalFilter, JournalRepository, JournalSummary};
pub use period::{CreatePeriodInput, PeriodRepository};
pub use rate::{
    CreateCurrencyRateInput, CreateExchangeRateInput, CreateRateLineInput, ExchangeRateWithLines,
    RateRepository,
};
pub use sequence::{SequenceRepository, SequenceSettings};
