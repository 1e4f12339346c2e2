//! Wall-clock helpers.

use chrono::{DateTime, Utc};

/// Current UTC time.
#[must_use]
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Current time, clamped so it never precedes `previous`.
#[must_use]
pub fn monotonic_after(previous: DateTime<Utc>) -> DateTime<Utc> {
    now().max(previous)
}
