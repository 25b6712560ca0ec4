//! Accounting period repository.

use arus_core::period::{AccountingPeriod, PeriodError, PeriodGate, PeriodStatus};
use arus_shared::types::PeriodId;
use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use tracing::info;

use super::db_error::is_exclusion_violation;
use crate::entities::accounting_periods;

fn db_err(err: DbErr) -> PeriodError {
    PeriodError::Database(err.to_string())
}

/// Converts a stored row into the core period.
#[must_use]
pub fn to_period(model: &accounting_periods::Model) -> AccountingPeriod {
    AccountingPeriod {
        id: PeriodId::new(model.id),
        name: model.name.clone(),
        start_date: model.start_date,
        end_date: model.end_date,
        status: model.status.into(),
    }
}

/// Input for creating an accounting period.
#[derive(Debug, Clone)]
pub struct CreatePeriodInput {
    /// Display name.
    pub name: String,
    /// First day.
    pub start_date: NaiveDate,
    /// Last day.
    pub end_date: NaiveDate,
    /// Initial status.
    pub status: PeriodStatus,
}

/// Accounting period repository.
#[derive(Debug, Clone)]
pub struct PeriodRepository {
    db: DatabaseConnection,
}

impl PeriodRepository {
    /// Creates a new period repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists all periods by start date.
    ///
    /// # Errors
    ///
    /// Returns `Database` on failure.
    pub async fn list(&self) -> Result<Vec<AccountingPeriod>, PeriodError> {
        let rows = accounting_periods::Entity::find()
            .order_by_asc(accounting_periods::Column::StartDate)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(rows.iter().map(to_period).collect())
    }

    /// Creates a period that does not overlap any existing one.
    ///
    /// # Errors
    ///
    /// Returns `MissingName`, `InvalidDateRange`, `OverlapsExisting` or
    /// `Database`.
    pub async fn create(&self, input: CreatePeriodInput) -> Result<AccountingPeriod, PeriodError> {
        let existing = Self::covering(&self.db, input.start_date, input.end_date).await?;
        PeriodGate::validate_new_period(&input.name, input.start_date, input.end_date, &existing)?;

        let now = Utc::now();
        let model = accounting_periods::ActiveModel {
            name: Set(input.name.trim().to_string()),
            start_date: Set(input.start_date),
            end_date: Set(input.end_date),
            status: Set(input.status.into()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        };

        // The exclusion constraint catches a concurrent insert of an overlapping range
        let inserted = model.insert(&self.db).await.map_err(|e| {
            if is_exclusion_violation(&e) {
                PeriodError::OverlapsExisting {
                    start_date: input.start_date,
                    end_date: input.end_date,
                    existing: "concurrently created period".to_string(),
                }
            } else {
                db_err(e)
            }
        })?;

        info!(
            period_id = inserted.id,
            name = %inserted.name,
            start_date = %inserted.start_date,
            end_date = %inserted.end_date,
            "Created accounting period"
        );
        Ok(to_period(&inserted))
    }

    /// Opens or closes a period.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `Database`.
    pub async fn set_status(
        &self,
        id: PeriodId,
        status: PeriodStatus,
    ) -> Result<AccountingPeriod, PeriodError> {
        let row = accounting_periods::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(PeriodError::NotFound(id))?;

        let mut active: accounting_periods::ActiveModel = row.into();
        active.status = Set(status.into());
        active.updated_at = Set(Utc::now().into());
        let updated = active.update(&self.db).await.map_err(db_err)?;

        info!(period_id = updated.id, status = status.as_str(), "Period status changed");
        Ok(to_period(&updated))
    }

    /// Returns the period containing `date`, if any.
    ///
    /// # Errors
    ///
    /// Returns `Overlapping` or `Database`.
    pub async fn resolve(&self, date: NaiveDate) -> Result<Option<AccountingPeriod>, PeriodError> {
        let periods = Self::covering(&self.db, date, date).await?;
        Ok(PeriodGate::resolve(&periods, date)?.cloned())
    }

    /// Checks that `date` is inside an open period.
    ///
    /// The covering rows are read `FOR SHARE`, so a period cannot be closed
    /// while a transaction that passed the check is still running.
    ///
    /// # Errors
    ///
    /// Returns `NoPeriod`, `Closed`, `Overlapping` or `Database`.
    pub async fn check_posting_in<C: ConnectionTrait>(
        conn: &C,
        date: NaiveDate,
    ) -> Result<AccountingPeriod, PeriodError> {
        let rows = accounting_periods::Entity::find()
            .filter(accounting_periods::Column::StartDate.lte(date))
            .filter(accounting_periods::Column::EndDate.gte(date))
            .lock_shared()
            .all(conn)
            .await
            .map_err(db_err)?;
        let periods: Vec<AccountingPeriod> = rows.iter().map(to_period).collect();
        PeriodGate::check_posting(&periods, date).cloned()
    }

    /// Checks `date` outside of any caller transaction.
    ///
    /// # Errors
    ///
    /// Same as [`PeriodRepository::check_posting_in`].
    pub async fn check_posting(&self, date: NaiveDate) -> Result<AccountingPeriod, PeriodError> {
        Self::check_posting_in(&self.db, date).await
    }

    /// Loads periods intersecting `[start, end]`.
    async fn covering<C: ConnectionTrait>(
        conn: &C,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<AccountingPeriod>, PeriodError> {
        let rows = accounting_periods::Entity::find()
            .filter(accounting_periods::Column::StartDate.lte(end))
            .filter(accounting_periods::Column::EndDate.gte(start))
            .all(conn)
            .await
            .map_err(db_err)?;
        Ok(rows.iter().map(to_period).collect())
    }
}
