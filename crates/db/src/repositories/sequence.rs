//! Sequence repository: transcode maintenance and document number allocation.
//!
//! Allocation locks the transcode row (`SELECT ... FOR UPDATE`) with a bounded
//! `lock_timeout`, increments `last_number` and commits before the formatted
//! number is returned. Different transcodes lock different rows and never wait
//! on each other.

use std::time::Duration;

use arus_core::sequence::{
    Allocation, SequenceError, SequenceService, TranscodeDefinition, TranscodeState,
};
use arus_shared::config::SequenceConfig;
use arus_shared::types::TranscodeId;
use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::{debug, info, warn};

use super::db_error::{is_contention, is_unique_violation};
use crate::entities::transcodes;

/// Retry and lock settings for allocation.
#[derive(Debug, Clone, Copy)]
pub struct SequenceSettings {
    /// Attempts before giving up with `Contention`.
    pub max_retries: u32,
    /// `lock_timeout` applied to the row lock, in milliseconds.
    pub lock_timeout_ms: u64,
    /// Backoff unit between attempts, in milliseconds.
    pub retry_backoff_ms: u64,
}

impl Default for SequenceSettings {
    fn default() -> Self {
        SequenceConfig::default().into()
    }
}

impl From<SequenceConfig> for SequenceSettings {
    fn from(config: SequenceConfig) -> Self {
        Self {
            max_retries: config.max_retries.max(1),
            lock_timeout_ms: config.lock_timeout_ms,
            retry_backoff_ms: config.retry_backoff_ms,
        }
    }
}

/// Converts a stored row into the core numbering state.
#[must_use]
pub fn to_state(model: &transcodes::Model) -> TranscodeState {
    TranscodeState {
        id: TranscodeId::new(model.id),
        code: model.code.clone(),
        prefix: model.prefix.clone(),
        format: model.format.clone(),
        last_number: model.last_number,
        is_active: model.is_active,
    }
}

fn map_db_err(code: &str, err: DbErr) -> SequenceError {
    if is_contention(&err) {
        SequenceError::Contention {
            code: code.to_string(),
            attempts: 1,
        }
    } else {
        SequenceError::Database(err.to_string())
    }
}

/// Sequence repository for transcode operations.
#[derive(Debug, Clone)]
pub struct SequenceRepository {
    db: DatabaseConnection,
    settings: SequenceSettings,
}

impl SequenceRepository {
    /// Creates a new sequence repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, settings: SequenceSettings) -> Self {
        Self { db, settings }
    }

    /// Allocates the next document number for a transcode.
    ///
    /// Lock contention is retried with a linear backoff up to
    /// `max_retries` attempts.
    ///
    /// # Errors
    ///
    /// Returns `TranscodeNotFound`/`TranscodeInactive`, `Contention` once the
    /// retry budget is spent, or `Database`.
    pub async fn allocate_next(
        &self,
        code: &str,
        today: NaiveDate,
    ) -> Result<Allocation, SequenceError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.try_allocate(code, today).await {
                Ok(allocation) => {
                    info!(
                        transcode = %code,
                        value = allocation.value,
                        doc_number = %allocation.doc_number,
                        attempt,
                        "Allocated document number"
                    );
                    return Ok(allocation);
                }
                Err(SequenceError::Contention { .. }) if attempt < self.settings.max_retries => {
                    warn!(transcode = %code, attempt, "Transcode row busy, retrying allocation");
                    let backoff = self.settings.retry_backoff_ms * u64::from(attempt);
                    tokio::time::sleep(Duration::from_millis(backoff)).await;
                }
                Err(SequenceError::Contention { .. }) => {
                    warn!(transcode = %code, attempts = attempt, "Allocation gave up after contention");
                    return Err(SequenceError::Contention {
                        code: code.to_string(),
                        attempts: attempt,
                    });
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn try_allocate(&self, code: &str, today: NaiveDate) -> Result<Allocation, SequenceError> {
        let txn = self.db.begin().await.map_err(|e| map_db_err(code, e))?;
        txn.execute_unprepared(&format!(
            "SET LOCAL lock_timeout = '{}ms'",
            self.settings.lock_timeout_ms
        ))
        .await
        .map_err(|e| map_db_err(code, e))?;
        let allocation = Self::allocate_in(&txn, code, today).await?;
        txn.commit().await.map_err(|e| map_db_err(code, e))?;
        Ok(allocation)
    }

    /// Allocates inside a caller-owned transaction.
    ///
    /// The row lock is held until the caller commits or rolls back, so the
    /// journal repository can allocate and insert the journal atomically. The
    /// caller's transaction sets the `lock_timeout`.
    ///
    /// # Errors
    ///
    /// Same as [`SequenceRepository::allocate_next`], without retrying.
    pub async fn allocate_in<C: ConnectionTrait>(
        conn: &C,
        code: &str,
        today: NaiveDate,
    ) -> Result<Allocation, SequenceError> {
        let row = transcodes::Entity::find()
            .filter(transcodes::Column::Code.eq(code))
            .lock_exclusive()
            .one(conn)
            .await
            .map_err(|e| map_db_err(code, e))?
            .ok_or_else(|| SequenceError::TranscodeNotFound(code.to_string()))?;

        let allocation = SequenceService::allocate(&to_state(&row), today)?;

        let mut active: transcodes::ActiveModel = row.into();
        active.last_number = Set(allocation.value);
        active.updated_at = Set(Utc::now().into());
        active.update(conn).await.map_err(|e| map_db_err(code, e))?;

        debug!(transcode = %code, value = allocation.value, "Counter incremented");
        Ok(allocation)
    }

    /// Formats the next number without reserving it.
    ///
    /// # Errors
    ///
    /// Returns `TranscodeNotFound`, `TranscodeInactive` or `Database`.
    pub async fn preview(&self, code: &str, today: NaiveDate) -> Result<String, SequenceError> {
        let state = self.find_state(code).await?;
        SequenceService::preview(&state, today)
    }

    /// Loads a transcode by code.
    ///
    /// # Errors
    ///
    /// Returns `TranscodeNotFound` or `Database`.
    pub async fn find_state(&self, code: &str) -> Result<TranscodeState, SequenceError> {
        self.find_by_code(code).await.map(|m| to_state(&m))
    }

    /// Loads a transcode row by code.
    ///
    /// # Errors
    ///
    /// Returns `TranscodeNotFound` or `Database`.
    pub async fn find_by_code(&self, code: &str) -> Result<transcodes::Model, SequenceError> {
        transcodes::Entity::find()
            .filter(transcodes::Column::Code.eq(code))
            .one(&self.db)
            .await
            .map_err(|e| map_db_err(code, e))?
            .ok_or_else(|| SequenceError::TranscodeNotFound(code.to_string()))
    }

    /// Lists transcodes, optionally restricted to one category number.
    ///
    /// # Errors
    ///
    /// Returns `Database` on failure.
    pub async fn list(
        &self,
        nomortranscode: Option<i32>,
    ) -> Result<Vec<transcodes::Model>, SequenceError> {
        let mut query = transcodes::Entity::find().order_by_asc(transcodes::Column::Code);
        if let Some(category) = nomortranscode {
            query = query.filter(transcodes::Column::Nomortranscode.eq(category));
        }
        query
            .all(&self.db)
            .await
            .map_err(|e| SequenceError::Database(e.to_string()))
    }

    /// Creates a transcode after validating its template.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDefinition`, `InvalidTemplate`, `DuplicateCode` or
    /// `Database`.
    pub async fn create(
        &self,
        def: TranscodeDefinition,
    ) -> Result<transcodes::Model, SequenceError> {
        SequenceService::validate_definition(&def)?;

        let code = def.code.trim().to_string();
        let model = transcodes::ActiveModel {
            code: Set(code.clone()),
            name: Set(def.name),
            prefix: Set(def.prefix),
            format: Set(def.format),
            nomortranscode: Set(def.nomortranscode),
            last_number: Set(def.last_number),
            is_active: Set(true),
            ..Default::default()
        };

        let inserted = model.insert(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                SequenceError::DuplicateCode(code.clone())
            } else {
                SequenceError::Database(e.to_string())
            }
        })?;

        info!(transcode = %inserted.code, id = inserted.id, "Created transcode");
        Ok(inserted)
    }
}
