use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

pub type EventId = u64;
pub type TaskId = u64;

/// The entity reminders hang off. Owned by the caller; the engine only
/// reads its date and derives reminder collections for it.
#[derive(Debug, Clone)]
pub struct Event {
    pub id: EventId,
    pub name: String,
    pub date: DateTime<Utc>,
}

/// Signed distance in seconds between an event's date and a reminder
/// instant. Negative means before the event. This is the persisted form;
/// it is not re-validated when the event date moves, the controller
/// re-derives instead.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReminderOffset(f64);

impl ReminderOffset {
    pub fn from_seconds(seconds: f64) -> Self {
        Self(seconds)
    }

    /// Offset of `instant` relative to `event_date`, at millisecond
    /// precision.
    pub fn between(instant: DateTime<Utc>, event_date: DateTime<Utc>) -> Self {
        Self((instant - event_date).num_milliseconds() as f64 / 1000.0)
    }

    pub fn seconds(self) -> f64 {
        self.0
    }

    /// Maps the offset back to an absolute instant against `event_date`.
    /// Exact round trip for instants with millisecond precision.
    pub fn resolve(self, event_date: DateTime<Utc>) -> DateTime<Utc> {
        event_date + TimeDelta::milliseconds((self.0 * 1000.0).round() as i64)
    }
}

/// Persisted reminder offsets for one event. The multi-entry list is
/// canonical; `legacy_offset` is a deprecated singular field some old
/// records carry, consulted only when the list is empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredReminders {
    #[serde(default)]
    pub all_offsets: Vec<ReminderOffset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legacy_offset: Option<ReminderOffset>,
}

impl StoredReminders {
    /// The one canonical writer. Mirrors the first offset into the
    /// legacy field so old readers keep working; nothing else writes it.
    pub fn from_offsets(offsets: Vec<ReminderOffset>) -> Self {
        Self {
            legacy_offset: offsets.first().copied(),
            all_offsets: offsets,
        }
    }

    pub fn offsets(&self) -> Vec<ReminderOffset> {
        if self.all_offsets.is_empty() {
            self.legacy_offset.into_iter().collect()
        } else {
            self.all_offsets.clone()
        }
    }
}
