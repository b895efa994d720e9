use chrono::{DateTime, TimeDelta, Utc};

use crate::error::WindowError;

/// Instants closer than this are considered the same reminder.
pub const DEDUP_TOLERANCE_MS: i64 = 500;

pub fn dedup_tolerance() -> TimeDelta {
    TimeDelta::milliseconds(DEDUP_TOLERANCE_MS)
}

pub fn within_tolerance(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    (a - b).abs() < dedup_tolerance()
}

/// Accepts `candidate` only if it already lies inside `[lower, upper]`.
pub fn clamp(
    candidate: DateTime<Utc>,
    lower: DateTime<Utc>,
    upper: DateTime<Utc>,
) -> Result<DateTime<Utc>, WindowError> {
    if candidate < lower || candidate > upper {
        return Err(WindowError::OutOfWindow {
            candidate,
            lower,
            upper,
        });
    }
    Ok(candidate)
}

/// The live window reminders may land in. Degenerates to `[now, now]`
/// once the upper bound is behind the clock, at which point no further
/// additions are possible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafeRange {
    lower: DateTime<Utc>,
    upper: DateTime<Utc>,
    collapsed: bool,
}

impl SafeRange {
    pub fn lower(&self) -> DateTime<Utc> {
        self.lower
    }

    pub fn upper(&self) -> DateTime<Utc> {
        self.upper
    }

    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    pub fn clamp(&self, candidate: DateTime<Utc>) -> Result<DateTime<Utc>, WindowError> {
        if self.collapsed {
            return Err(WindowError::WindowCollapsed { upper: self.upper });
        }
        clamp(candidate, self.lower, self.upper)
    }

    /// Lowers `candidate` onto the upper bound if it overshoots.
    pub fn clamp_down(&self, candidate: DateTime<Utc>) -> DateTime<Utc> {
        candidate.min(self.upper)
    }
}

pub fn safe_range(now: DateTime<Utc>, upper: DateTime<Utc>) -> SafeRange {
    if upper >= now {
        SafeRange {
            lower: now,
            upper,
            collapsed: false,
        }
    } else {
        SafeRange {
            lower: now,
            upper: now,
            collapsed: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, h, m, 0).unwrap()
    }

    #[test]
    fn clamp_accepts_instants_inside_the_window() {
        assert_eq!(clamp(at(12, 0), at(10, 0), at(14, 0)), Ok(at(12, 0)));
        assert_eq!(clamp(at(10, 0), at(10, 0), at(14, 0)), Ok(at(10, 0)));
        assert_eq!(clamp(at(14, 0), at(10, 0), at(14, 0)), Ok(at(14, 0)));
    }

    #[test]
    fn clamp_rejects_instants_outside_the_window() {
        assert!(matches!(
            clamp(at(9, 59), at(10, 0), at(14, 0)),
            Err(WindowError::OutOfWindow { .. })
        ));
        assert!(matches!(
            clamp(at(14, 1), at(10, 0), at(14, 0)),
            Err(WindowError::OutOfWindow { .. })
        ));
    }

    #[test]
    fn safe_range_collapses_when_upper_bound_is_past() {
        let range = safe_range(at(12, 0), at(11, 0));

        assert!(range.is_collapsed());
        assert_eq!(range.lower(), at(12, 0));
        assert_eq!(range.upper(), at(12, 0));
        assert!(matches!(
            range.clamp(at(12, 0)),
            Err(WindowError::WindowCollapsed { .. })
        ));
    }

    #[test]
    fn tolerance_is_half_a_second_exclusive() {
        let base = at(12, 0);
        assert!(within_tolerance(base, base + TimeDelta::milliseconds(300)));
        assert!(!within_tolerance(base, base + TimeDelta::milliseconds(500)));
        assert!(!within_tolerance(base, base + TimeDelta::milliseconds(600)));
    }
}
