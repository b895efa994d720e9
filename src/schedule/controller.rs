use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::clock::Clock;
use crate::dispatch::{self, NotificationDispatchGateway, NotificationPayload};
use crate::error::{ScheduleError, WindowError};
use crate::event::{Event, ReminderOffset, StoredReminders, TaskId};
use crate::normalize::normalize;
use crate::series::{self, SeriesStep, StepUnit};
use crate::storage::OffsetStore;
use crate::task_reminder::TaskReminderStore;
use crate::window;

/// Hard cap on what gets persisted and handed to dispatch, tighter than
/// the 100-entry preview cap.
pub const SCHEDULE_CAP: usize = 64;

/// What an `add_series` call did. Invalid input never errors out: the
/// offending field resets to a safe default and nothing else changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesOutcome {
    Added(usize),
    ResetInvalidCount,
    ResetSubSecondStep,
}

/// Result of pruning a stored offset list against the current clock.
#[derive(Debug, Clone, PartialEq)]
pub struct PruneOutcome {
    pub kept: Vec<ReminderOffset>,
    /// First [`SCHEDULE_CAP`] of `kept`, what should actually be
    /// rescheduled.
    pub schedule: Vec<ReminderOffset>,
    /// True when pruning dropped something, meaning the caller should
    /// re-persist `kept` and reschedule `schedule`.
    pub needs_repersist: bool,
}

/// Stateful owner of one event's reminder configuration for the length
/// of an edit session. One instance per session, single writer; every
/// field change goes through an explicit `on_*` handler that re-derives
/// a consistent candidate set.
pub struct ReminderScheduleController {
    clock: Arc<dyn Clock>,
    event_date: DateTime<Utc>,
    recurring_enabled: bool,
    recurring_start: DateTime<Utc>,
    recurring_end: DateTime<Utc>,
    candidate_instants: Vec<DateTime<Utc>>,
    custom_instant_draft: Option<DateTime<Utc>>,
    every_count: String,
    every_unit: StepUnit,
    tasks: TaskReminderStore,
}

impl ReminderScheduleController {
    pub fn new(event_date: DateTime<Utc>, clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            event_date,
            recurring_enabled: false,
            recurring_start: event_date,
            recurring_end: event_date,
            candidate_instants: Vec::new(),
            custom_instant_draft: None,
            every_count: "1".to_owned(),
            every_unit: StepUnit::Minute,
            tasks: TaskReminderStore::new(),
        }
    }

    pub fn event_date(&self) -> DateTime<Utc> {
        self.event_date
    }

    pub fn is_recurring_enabled(&self) -> bool {
        self.recurring_enabled
    }

    pub fn recurring_start(&self) -> DateTime<Utc> {
        self.recurring_start
    }

    pub fn recurring_end(&self) -> DateTime<Utc> {
        self.recurring_end
    }

    pub fn candidate_instants(&self) -> &[DateTime<Utc>] {
        &self.candidate_instants
    }

    pub fn every_count(&self) -> &str {
        &self.every_count
    }

    pub fn every_unit(&self) -> StepUnit {
        self.every_unit
    }

    pub fn custom_instant_draft(&self) -> Option<DateTime<Utc>> {
        self.custom_instant_draft
    }

    /// True once the event date is behind the clock; no reminder can be
    /// added any more and the UI should say so.
    pub fn window_collapsed(&self) -> bool {
        window::safe_range(self.clock.now(), self.event_date).is_collapsed()
    }

    pub fn set_every_count(&mut self, raw: impl Into<String>) {
        self.every_count = raw.into();
    }

    pub fn set_every_unit(&mut self, unit: StepUnit) {
        self.every_unit = unit;
    }

    pub fn set_custom_draft(&mut self, instant: DateTime<Utc>) {
        self.custom_instant_draft = Some(instant);
    }

    pub fn enable_recurring(&mut self) {
        self.recurring_enabled = true;
        if self.candidate_instants.is_empty() {
            let range = window::safe_range(self.clock.now(), self.event_date);
            if let Ok(seed) = range.clamp(self.recurring_start) {
                self.candidate_instants.push(seed);
            }
        }
    }

    /// Clears the whole candidate set. Single-reminder behaviour is not
    /// restored here; `commit_for_save` reconstructs it at save time.
    pub fn disable_recurring(&mut self) {
        self.recurring_enabled = false;
        self.candidate_instants.clear();
    }

    /// Generates a recurring series from the current count/unit fields
    /// and folds it into the candidate set. Bad input resets the field
    /// and leaves the candidates untouched.
    pub fn add_series(&mut self) -> SeriesOutcome {
        let count = match self.every_count.trim().parse::<u32>() {
            Ok(count) if (1..=series::MAX_COUNT).contains(&count) => count,
            _ => {
                log::warn!(
                    "rejecting series count {:?}, resetting to 1",
                    self.every_count
                );
                self.every_count = "1".to_owned();
                return SeriesOutcome::ResetInvalidCount;
            }
        };

        let step = match SeriesStep::new(count, self.every_unit) {
            Ok(step) => step,
            Err(err) => {
                log::warn!("rejecting series step: {err}");
                self.every_count = "1".to_owned();
                self.every_unit = StepUnit::Minute;
                return SeriesOutcome::ResetSubSecondStep;
            }
        };

        let now = self.clock.now();
        let upper = self.event_date.min(self.recurring_end);
        let before = self.candidate_instants.len();
        series::generate_into(
            &mut self.candidate_instants,
            self.recurring_start,
            step,
            upper,
            now,
        );
        let added = self.candidate_instants.len() - before;
        log::debug!("series generation appended {added} candidates");
        self.renormalize(now);
        SeriesOutcome::Added(added)
    }

    /// Adds an ad-hoc instant, clamped against the event window (not the
    /// recurring upper bound). A valid custom instant also flips the
    /// schedule into recurring mode, seeding the start clamp first when
    /// the set was empty.
    pub fn add_custom_instant(&mut self, instant: DateTime<Utc>) -> Result<(), WindowError> {
        let now = self.clock.now();
        let range = window::safe_range(now, self.event_date);
        let instant = range.clamp(instant)?;

        if !self.recurring_enabled {
            self.recurring_enabled = true;
        }
        if self.candidate_instants.is_empty() {
            if let Ok(seed) = range.clamp(self.recurring_start) {
                self.candidate_instants.push(seed);
            }
        }
        self.candidate_instants.push(instant);
        self.renormalize(now);
        Ok(())
    }

    /// Commits the pending custom draft, if any.
    pub fn commit_custom_draft(&mut self) -> Result<(), WindowError> {
        match self.custom_instant_draft.take() {
            Some(draft) => self.add_custom_instant(draft),
            None => Ok(()),
        }
    }

    /// Drops every candidate within the dedup tolerance of `instant`.
    pub fn remove_instant(&mut self, instant: DateTime<Utc>) {
        self.candidate_instants
            .retain(|candidate| !window::within_tolerance(*candidate, instant));
    }

    pub fn on_event_date_changed(&mut self, new_date: DateTime<Utc>) {
        if self.recurring_end > new_date {
            self.recurring_end = new_date;
        }
        if self.recurring_start > new_date {
            self.recurring_start = new_date;
        }
        self.tasks.clamp_to_event_date(new_date);
        self.event_date = new_date;
        self.renormalize(self.clock.now());
    }

    pub fn on_recurring_start_changed(&mut self, new_start: DateTime<Utc>) {
        self.recurring_start = new_start;
        if self.recurring_end < new_start {
            self.recurring_end = new_start;
        }
        self.renormalize(self.clock.now());
    }

    pub fn on_recurring_end_changed(&mut self, new_end: DateTime<Utc>) {
        self.recurring_end = new_end;
        let now = self.clock.now();
        self.renormalize(now);

        let range = window::safe_range(now, self.event_date.min(self.recurring_end));
        if let Some(draft) = self.custom_instant_draft {
            if draft > range.upper() {
                self.custom_instant_draft = Some(range.clamp_down(draft));
            }
        }
    }

    /// Resolves the schedule to persist: the normalized candidate set
    /// when recurring is on, otherwise (or when empty) a single clamp of
    /// the recurring start. Converted to event-relative offsets, sorted
    /// ascending, capped at [`SCHEDULE_CAP`]. An empty result means
    /// "no reminders".
    pub fn commit_for_save(&mut self) -> Vec<ReminderOffset> {
        let now = self.clock.now();
        let range = window::safe_range(now, self.event_date);

        let instants: Vec<DateTime<Utc>> = if self.recurring_enabled {
            self.renormalize(now);
            if self.candidate_instants.is_empty() {
                range.clamp(self.recurring_start).into_iter().collect()
            } else {
                self.candidate_instants.clone()
            }
        } else {
            range.clamp(self.recurring_start).into_iter().collect()
        };

        let mut offsets: Vec<ReminderOffset> = instants
            .iter()
            .map(|instant| ReminderOffset::between(*instant, self.event_date))
            .collect();
        offsets.sort_by(|a, b| a.seconds().total_cmp(&b.seconds()));
        offsets.truncate(SCHEDULE_CAP);
        offsets
    }

    /// Filters a stored offset list down to entries still in the future
    /// of the clock. When anything got dropped the caller must
    /// re-persist `kept` and reschedule `schedule`.
    pub fn prune_on_load(
        &self,
        stored: &StoredReminders,
        event_date: DateTime<Utc>,
    ) -> PruneOutcome {
        let now = self.clock.now();
        let loaded = stored.offsets();
        let mut kept: Vec<ReminderOffset> = loaded
            .iter()
            .copied()
            .filter(|offset| offset.resolve(event_date) >= now)
            .collect();
        kept.sort_by(|a, b| a.seconds().total_cmp(&b.seconds()));

        let needs_repersist = kept != loaded;
        if needs_repersist {
            log::info!(
                "pruned {} past-due of {} stored reminders",
                loaded.len() - kept.len(),
                loaded.len()
            );
        }

        let schedule = kept.iter().take(SCHEDULE_CAP).copied().collect();
        PruneOutcome {
            kept,
            schedule,
            needs_repersist,
        }
    }

    /// Save path: persist the committed offsets, then cancel everything
    /// under the event's identifier prefix and reschedule the new set
    /// plus the committed per-task reminders. A collaborator failure
    /// propagates once and leaves the in-memory schedule untouched.
    pub async fn commit_and_publish(
        &mut self,
        event: &Event,
        store: &dyn OffsetStore,
        gateway: &dyn NotificationDispatchGateway,
        identifier_prefix: &str,
    ) -> Result<Vec<ReminderOffset>, ScheduleError> {
        let offsets = self.commit_for_save();
        let stored = StoredReminders::from_offsets(offsets.clone());
        store.save_offsets(event.id, &stored).await?;

        gateway
            .cancel_all(&dispatch::event_prefix(identifier_prefix, event.id))
            .await?;
        for (index, offset) in offsets.iter().enumerate() {
            gateway
                .schedule(
                    &dispatch::series_identifier(identifier_prefix, event.id, index),
                    offset.resolve(self.event_date),
                    NotificationPayload::for_event(event),
                )
                .await?;
        }
        for (task_id, instant) in self.tasks.committed_entries() {
            gateway
                .schedule(
                    &dispatch::task_identifier(identifier_prefix, event.id, task_id),
                    instant,
                    NotificationPayload::for_event(event),
                )
                .await?;
        }

        log::info!(
            "published {} reminders for event {}",
            offsets.len(),
            event.id
        );
        Ok(offsets)
    }

    /// Reload path: fetch stored offsets and prune them against the
    /// clock. The caller inspects `needs_repersist` on the outcome.
    pub async fn reload(
        &self,
        event: &Event,
        store: &dyn OffsetStore,
    ) -> Result<PruneOutcome, ScheduleError> {
        let stored = store.load_offsets(event.id).await?;
        Ok(self.prune_on_load(&stored, event.date))
    }

    pub fn set_task_draft(&mut self, task_id: TaskId, instant: DateTime<Utc>) {
        self.tasks.set_draft(task_id, instant);
    }

    pub fn commit_task_draft(&mut self, task_id: TaskId) -> Option<DateTime<Utc>> {
        let now = self.clock.now();
        self.tasks.commit_draft(task_id, now, self.event_date)
    }

    pub fn task_reminder(&self, task_id: TaskId) -> Option<DateTime<Utc>> {
        self.tasks.get(task_id)
    }

    pub fn task_is_dirty(&self, task_id: TaskId) -> bool {
        self.tasks.is_dirty(task_id)
    }

    /// Clears a task's reminder (removal or task completion) and cancels
    /// its dispatch request if one was committed.
    pub async fn clear_task(
        &mut self,
        task_id: TaskId,
        event: &Event,
        gateway: &dyn NotificationDispatchGateway,
        identifier_prefix: &str,
    ) -> Result<(), ScheduleError> {
        if self.tasks.clear(task_id).is_some() {
            gateway
                .cancel(&dispatch::task_identifier(
                    identifier_prefix,
                    event.id,
                    task_id,
                ))
                .await?;
        }
        Ok(())
    }

    fn renormalize(&mut self, now: DateTime<Utc>) {
        self.candidate_instants = normalize(
            std::mem::take(&mut self.candidate_instants),
            now,
            self.event_date,
        );
    }
}
