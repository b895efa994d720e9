use chrono::{DateTime, Utc};

use crate::series::PREVIEW_CAP;
use crate::window;

/// Canonicalizes a raw instant collection: keep entries inside
/// `[now, event_date]`, sort ascending, collapse neighbours closer than
/// the dedup tolerance, cap at [`PREVIEW_CAP`].
///
/// Idempotent for a fixed `now` and `event_date`. Re-normalizing after
/// the clock has advanced may drop entries that became past-due, which
/// is the point: nothing is ever scheduled in the past.
pub fn normalize(
    mut instants: Vec<DateTime<Utc>>,
    now: DateTime<Utc>,
    event_date: DateTime<Utc>,
) -> Vec<DateTime<Utc>> {
    instants.retain(|instant| *instant >= now && *instant <= event_date);
    instants.sort_unstable();
    instants.dedup_by(|a, b| window::within_tolerance(*a, *b));
    instants.truncate(PREVIEW_CAP);
    instants
}
