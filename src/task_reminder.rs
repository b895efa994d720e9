use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::event::TaskId;
use crate::window;

/// At most one committed reminder instant per task, edited through a
/// draft that only takes effect on commit. Independent of the event-level
/// series; only the event window bounds it.
#[derive(Debug, Default)]
pub struct TaskReminderStore {
    committed: HashMap<TaskId, DateTime<Utc>>,
    drafts: HashMap<TaskId, DateTime<Utc>>,
}

impl TaskReminderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, task_id: TaskId) -> Option<DateTime<Utc>> {
        self.committed.get(&task_id).copied()
    }

    pub fn draft(&self, task_id: TaskId) -> Option<DateTime<Utc>> {
        self.drafts.get(&task_id).copied()
    }

    pub fn set_draft(&mut self, task_id: TaskId, instant: DateTime<Utc>) {
        self.drafts.insert(task_id, instant);
    }

    /// Moves the draft into the committed slot, replacing any prior
    /// value for the task. The draft must clamp into `[now, event_date]`;
    /// a rejected draft is discarded and the committed value stays.
    pub fn commit_draft(
        &mut self,
        task_id: TaskId,
        now: DateTime<Utc>,
        event_date: DateTime<Utc>,
    ) -> Option<DateTime<Utc>> {
        let draft = self.drafts.remove(&task_id)?;
        match window::safe_range(now, event_date).clamp(draft) {
            Ok(instant) => {
                self.committed.insert(task_id, instant);
                Some(instant)
            }
            Err(err) => {
                log::debug!("dropping task {task_id} reminder draft: {err}");
                None
            }
        }
    }

    /// Removes the committed reminder and any pending draft. Returns the
    /// committed instant so the caller can cancel its dispatch request.
    pub fn clear(&mut self, task_id: TaskId) -> Option<DateTime<Utc>> {
        self.drafts.remove(&task_id);
        self.committed.remove(&task_id)
    }

    /// Lowers every committed reminder that now overshoots the event.
    pub fn clamp_to_event_date(&mut self, event_date: DateTime<Utc>) {
        for (task_id, instant) in self.committed.iter_mut() {
            if *instant > event_date {
                log::info!("clamping task {task_id} reminder {instant} down to {event_date}");
                *instant = event_date;
            }
        }
    }

    /// True when a pending draft would actually change the committed
    /// value (beyond the dedup tolerance), or commits one where none is.
    pub fn is_dirty(&self, task_id: TaskId) -> bool {
        match (self.drafts.get(&task_id), self.committed.get(&task_id)) {
            (Some(draft), Some(committed)) => !window::within_tolerance(*draft, *committed),
            (Some(_), None) => true,
            (None, _) => false,
        }
    }

    pub fn committed_entries(&self) -> impl Iterator<Item = (TaskId, DateTime<Utc>)> + '_ {
        self.committed.iter().map(|(id, instant)| (*id, *instant))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, h, m, 0).unwrap()
    }

    #[test]
    fn commit_moves_the_draft_into_the_committed_slot() {
        let mut store = TaskReminderStore::new();
        store.set_draft(7, at(12, 0));

        let committed = store.commit_draft(7, at(10, 0), at(20, 0));

        assert_eq!(committed, Some(at(12, 0)));
        assert_eq!(store.get(7), Some(at(12, 0)));
        assert_eq!(store.draft(7), None);
    }

    #[test]
    fn committing_out_of_window_draft_keeps_the_prior_value() {
        let mut store = TaskReminderStore::new();
        store.set_draft(7, at(12, 0));
        store.commit_draft(7, at(10, 0), at(20, 0));

        store.set_draft(7, at(21, 0));
        let committed = store.commit_draft(7, at(10, 0), at(20, 0));

        assert_eq!(committed, None);
        assert_eq!(store.get(7), Some(at(12, 0)));
    }

    #[test]
    fn clear_drops_both_draft_and_committed() {
        let mut store = TaskReminderStore::new();
        store.set_draft(7, at(12, 0));
        store.commit_draft(7, at(10, 0), at(20, 0));
        store.set_draft(7, at(13, 0));

        let removed = store.clear(7);

        assert_eq!(removed, Some(at(12, 0)));
        assert_eq!(store.get(7), None);
        assert!(!store.is_dirty(7));
    }

    #[test]
    fn clamp_lowers_reminders_past_the_new_event_date() {
        let mut store = TaskReminderStore::new();
        store.set_draft(1, at(15, 0));
        store.commit_draft(1, at(10, 0), at(20, 0));
        store.set_draft(2, at(11, 0));
        store.commit_draft(2, at(10, 0), at(20, 0));

        store.clamp_to_event_date(at(14, 0));

        assert_eq!(store.get(1), Some(at(14, 0)));
        assert_eq!(store.get(2), Some(at(11, 0)));
    }

    #[test]
    fn dirty_tracks_the_tolerance_and_missing_committed_value() {
        let mut store = TaskReminderStore::new();
        store.set_draft(7, at(12, 0));
        assert!(store.is_dirty(7));

        store.commit_draft(7, at(10, 0), at(20, 0));
        assert!(!store.is_dirty(7));

        store.set_draft(7, at(12, 0) + TimeDelta::milliseconds(300));
        assert!(!store.is_dirty(7));

        store.set_draft(7, at(12, 0) + TimeDelta::milliseconds(700));
        assert!(store.is_dirty(7));
    }
}
