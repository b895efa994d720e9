use chrono::{DateTime, Utc};
use thiserror::Error;

/// A candidate instant failed its window check. Callers drop the
/// candidate and move on; this never surfaces as a top-level failure.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum WindowError {
    #[error("instant {candidate} is outside [{lower}, {upper}]")]
    OutOfWindow {
        candidate: DateTime<Utc>,
        lower: DateTime<Utc>,
        upper: DateTime<Utc>,
    },
    /// The upper bound is already in the past; no instant can be added.
    #[error("window collapsed, upper bound {upper} is already past")]
    WindowCollapsed { upper: DateTime<Utc> },
}

/// Malformed recurring-interval input. Handled by resetting the input
/// field to a safe default and aborting the add, never by raising.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum InvalidStep {
    #[error("series count must be a whole number between 1 and 1000")]
    CountOutOfRange,
    #[error("series step must be at least one second")]
    SubSecond,
}

#[derive(Debug, Error)]
pub enum ScheduleError {
    /// A persistence or dispatch call failed. Not retried here; the
    /// in-memory schedule stays consistent and the caller may retry.
    #[error("collaborator call failed")]
    Collaborator(#[from] anyhow::Error),
}
