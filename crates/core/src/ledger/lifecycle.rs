//! Journal state machine.
//!
//! ```text
//!   create ──► Draft ──post──► Posted
//!               ▲ │              │
//!        update─┘ │delete        │unpost
//!                 ▼              │
//!              (removed)  Draft ◄┘
//! ```

use std::fmt;

use arus_shared::types::JournalId;
use serde::Serialize;

use super::error::LedgerError;
use super::types::JournalStatus;

/// Actions that change a stored journal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JournalAction {
    /// Replace header and lines.
    Update,
    /// Draft → Posted.
    Post,
    /// Posted → Draft.
    Unpost,
    /// Remove the journal.
    Delete,
}

impl fmt::Display for JournalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Update => "update",
            Self::Post => "post",
            Self::Unpost => "unpost",
            Self::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// Returns the status after `action`, or `None` if the action is not allowed.
///
/// `Delete` keeps `Draft` as the last status seen before removal.
#[must_use]
pub const fn next_status(status: JournalStatus, action: JournalAction) -> Option<JournalStatus> {
    match (status, action) {
        (JournalStatus::Draft, JournalAction::Update | JournalAction::Delete) => {
            Some(JournalStatus::Draft)
        }
        (JournalStatus::Draft, JournalAction::Post) => Some(JournalStatus::Posted),
        (JournalStatus::Posted, JournalAction::Unpost) => Some(JournalStatus::Draft),
        _ => None,
    }
}

/// Checks a transition for a specific journal.
///
/// # Errors
///
/// Returns `InvalidState` if the action is not allowed from `status`.
pub fn transition(
    id: JournalId,
    status: JournalStatus,
    action: JournalAction,
) -> Result<JournalStatus, LedgerError> {
    next_status(status, action).ok_or(LedgerError::InvalidState { id, status, action })
}
