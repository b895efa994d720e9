use async_trait::async_trait;

use crate::event::{EventId, StoredReminders};

/// External persistence collaborator. The engine never stores anything
/// itself; it hands offsets out and reads them back through this seam.
#[async_trait]
pub trait OffsetStore: Send + Sync {
    async fn load_offsets(&self, event_id: EventId) -> anyhow::Result<StoredReminders>;
    async fn save_offsets(
        &self,
        event_id: EventId,
        reminders: &StoredReminders,
    ) -> anyhow::Result<()>;
}
