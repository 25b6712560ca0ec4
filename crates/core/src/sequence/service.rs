//! Sequence service for document number allocation.
//!
//! The database layer reads a [`TranscodeState`] under a row lock, calls
//! [`SequenceService::allocate`], and persists [`Allocation::value`] before the
//! lock is released. Nothing here touches storage.

use chrono::NaiveDate;

use super::error::SequenceError;
use super::template::FormatTemplate;
use super::types::{Allocation, TranscodeDefinition, TranscodeState};

/// Stateless service for document numbering rules.
pub struct SequenceService;

impl SequenceService {
    /// Computes the counter value following `last_number`.
    ///
    /// # Errors
    ///
    /// Returns `CounterOverflow` if the counter is negative or exhausted.
    pub fn next_value(code: &str, last_number: i64) -> Result<i64, SequenceError> {
        if last_number < 0 {
            return Err(SequenceError::CounterOverflow(code.to_string()));
        }
        last_number
            .checked_add(1)
            .ok_or_else(|| SequenceError::CounterOverflow(code.to_string()))
    }

    /// Allocates the next number for a locked transcode.
    ///
    /// `today` is the business date of the allocation, not the document date.
    ///
    /// # Errors
    ///
    /// Returns `TranscodeInactive`, `InvalidTemplate` or `CounterOverflow`.
    pub fn allocate(state: &TranscodeState, today: NaiveDate) -> Result<Allocation, SequenceError> {
        if !state.is_active {
            return Err(SequenceError::TranscodeInactive(state.code.clone()));
        }
        let template = FormatTemplate::parse(&state.format)?;
        let value = Self::next_value(&state.code, state.last_number)?;

        Ok(Allocation {
            transcode_id: state.id,
            value,
            doc_number: template.render(&state.prefix, today, value),
        })
    }

    /// Formats the number the next allocation would produce, without reserving it.
    ///
    /// # Errors
    ///
    /// Same as [`SequenceService::allocate`].
    pub fn preview(state: &TranscodeState, today: NaiveDate) -> Result<String, SequenceError> {
        Self::allocate(state, today).map(|a| a.doc_number)
    }

    /// Validates a new transcode definition.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDefinition` or `InvalidTemplate`.
    pub fn validate_definition(def: &TranscodeDefinition) -> Result<(), SequenceError> {
        if def.code.trim().is_empty() {
            return Err(SequenceError::InvalidDefinition(
                "code must not be empty".to_string(),
            ));
        }
        if def.code.len() > 20 {
            return Err(SequenceError::InvalidDefinition(format!(
                "code '{}' is longer than 20 characters",
                def.code
            )));
        }
        if def.name.trim().is_empty() {
            return Err(SequenceError::InvalidDefinition(
                "name must not be empty".to_string(),
            ));
        }
        if def.last_number < 0 {
            return Err(SequenceError::InvalidDefinition(
                "last_number must not be negative".to_string(),
            ));
        }
        FormatTemplate::parse(&def.format)?;
        Ok(())
    }
}
