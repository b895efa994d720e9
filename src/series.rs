use chrono::{DateTime, TimeDelta, Utc};

use crate::error::InvalidStep;
use crate::window;

/// Hard stop on generation loop passes, independent of the window size.
pub const ITERATION_CAP: usize = 500;

/// Most entries a candidate set may hold before normalization caps it.
pub const PREVIEW_CAP: usize = 100;

pub const MAX_COUNT: u32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepUnit {
    Second,
    Minute,
    Hour,
}

impl StepUnit {
    pub fn seconds(self) -> i64 {
        match self {
            StepUnit::Second => 1,
            StepUnit::Minute => 60,
            StepUnit::Hour => 3600,
        }
    }
}

/// A validated recurring interval: `count × unit`, never below one second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesStep(TimeDelta);

impl SeriesStep {
    pub fn new(count: u32, unit: StepUnit) -> Result<Self, InvalidStep> {
        if count < 1 || count > MAX_COUNT {
            return Err(InvalidStep::CountOutOfRange);
        }
        let delta = TimeDelta::seconds(count as i64 * unit.seconds());
        if delta < TimeDelta::seconds(1) {
            return Err(InvalidStep::SubSecond);
        }
        Ok(Self(delta))
    }

    pub fn delta(self) -> TimeDelta {
        self.0
    }
}

/// Appends occurrences of `step` starting at `start` to `acc`, stopping
/// at whichever bound is hit first: the wall-clock `upper` bound, the
/// iteration cap, or the accumulated-entry cap (pre-existing entries in
/// `acc` count against it).
///
/// The result is raw: unsorted relative to prior contents and possibly
/// carrying stale out-of-window entries from earlier state. Callers
/// normalize downstream.
pub fn generate_into(
    acc: &mut Vec<DateTime<Utc>>,
    start: DateTime<Utc>,
    step: SeriesStep,
    upper: DateTime<Utc>,
    now: DateTime<Utc>,
) {
    if upper < now {
        return;
    }

    let step_delta = step.delta();
    let step_ms = step_delta.num_milliseconds();
    let mut cursor = start;
    if cursor < now {
        // Jump over every already-past occurrence in one step instead of
        // looping the cursor forward through them.
        let missed = ((now - cursor).num_milliseconds() + step_ms - 1) / step_ms;
        cursor += TimeDelta::milliseconds(missed * step_ms);
    }

    let mut iterations = 0;
    while cursor <= upper && iterations < ITERATION_CAP && acc.len() < PREVIEW_CAP {
        if window::clamp(cursor, now, upper).is_ok() {
            acc.push(cursor);
        }
        cursor += step_delta;
        iterations += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day1(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, h, m, 0).unwrap()
    }

    #[test]
    fn six_hour_step_fills_the_day_before_the_event() {
        let now = day1(0, 0);
        let event_date = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let step = SeriesStep::new(6, StepUnit::Hour).unwrap();
        let mut acc = Vec::new();

        generate_into(&mut acc, day1(1, 0), step, event_date, now);

        assert_eq!(
            acc,
            vec![day1(1, 0), day1(7, 0), day1(13, 0), day1(19, 0)]
        );
    }

    #[test]
    fn past_start_fast_forwards_to_the_first_future_occurrence() {
        let now = day1(12, 0);
        let step = SeriesStep::new(1, StepUnit::Hour).unwrap();
        let mut acc = Vec::new();

        generate_into(&mut acc, day1(0, 0), step, day1(15, 0), now);

        assert_eq!(
            acc,
            vec![day1(12, 0), day1(13, 0), day1(14, 0), day1(15, 0)]
        );
    }

    #[test]
    fn one_second_step_over_ten_years_terminates_under_the_caps() {
        let now = day1(0, 0);
        let upper = Utc.with_ymd_and_hms(2034, 1, 1, 0, 0, 0).unwrap();
        let step = SeriesStep::new(1, StepUnit::Second).unwrap();
        let mut acc = Vec::new();

        generate_into(&mut acc, now, step, upper, now);

        assert_eq!(acc.len(), PREVIEW_CAP);
    }

    #[test]
    fn upper_bound_before_now_produces_nothing() {
        let now = day1(12, 0);
        let step = SeriesStep::new(1, StepUnit::Minute).unwrap();
        let mut acc = Vec::new();

        generate_into(&mut acc, day1(0, 0), step, day1(11, 0), now);

        assert!(acc.is_empty());
    }

    #[test]
    fn existing_entries_count_against_the_accumulator_cap() {
        let now = day1(0, 0);
        let upper = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let step = SeriesStep::new(1, StepUnit::Second).unwrap();
        let mut acc = vec![day1(23, 0); 90];

        generate_into(&mut acc, now, step, upper, now);

        assert_eq!(acc.len(), PREVIEW_CAP);
    }

    #[test]
    fn count_outside_one_to_a_thousand_is_rejected() {
        assert_eq!(
            SeriesStep::new(0, StepUnit::Hour),
            Err(crate::error::InvalidStep::CountOutOfRange)
        );
        assert_eq!(
            SeriesStep::new(1001, StepUnit::Second),
            Err(crate::error::InvalidStep::CountOutOfRange)
        );
        assert!(SeriesStep::new(1000, StepUnit::Second).is_ok());
    }

    #[test]
    fn large_step_emits_only_the_start() {
        let now = day1(0, 0);
        let step = SeriesStep::new(1000, StepUnit::Hour).unwrap();
        let mut acc = Vec::new();

        generate_into(&mut acc, day1(1, 0), step, day1(23, 0), now);

        assert_eq!(acc, vec![day1(1, 0)]);
    }
}
