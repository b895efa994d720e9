use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::event::{Event, EventId, TaskId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationPayload {
    pub title: String,
    pub body: String,
}

impl NotificationPayload {
    pub fn for_event(event: &Event) -> Self {
        Self {
            title: event.name.clone(),
            body: String::new(),
        }
    }
}

/// External notification-delivery collaborator. Implementations must
/// treat `schedule` under a live identifier as a replace; callers here
/// still cancel before rescheduling, so either behaviour works. Calls
/// are fire-and-forget from the engine's perspective: no retries, at
/// most one delivery attempt per identifier.
#[async_trait]
pub trait NotificationDispatchGateway: Send + Sync {
    async fn schedule(
        &self,
        identifier: &str,
        fire_at: DateTime<Utc>,
        payload: NotificationPayload,
    ) -> anyhow::Result<()>;

    async fn cancel(&self, identifier: &str) -> anyhow::Result<()>;

    /// Cancels every request whose identifier starts with `prefix`.
    async fn cancel_all(&self, prefix: &str) -> anyhow::Result<()>;
}

/// Identifier scope for one event; `cancel_all` on this hits both the
/// series entries and the per-task reminders of that event and nothing
/// else.
pub fn event_prefix(base: &str, event_id: EventId) -> String {
    format!("{base}:{event_id}")
}

pub fn series_identifier(base: &str, event_id: EventId, index: usize) -> String {
    format!("{}:{index}", event_prefix(base, event_id))
}

pub fn task_identifier(base: &str, event_id: EventId, task_id: TaskId) -> String {
    format!("{}:task:{task_id}", event_prefix(base, event_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_stay_under_the_event_prefix() {
        let prefix = event_prefix("tickler", 42);

        assert_eq!(series_identifier("tickler", 42, 3), "tickler:42:3");
        assert_eq!(task_identifier("tickler", 42, 9), "tickler:42:task:9");
        assert!(series_identifier("tickler", 42, 3).starts_with(&prefix));
        assert!(task_identifier("tickler", 42, 9).starts_with(&prefix));
    }
}
