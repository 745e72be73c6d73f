use chrono::{DateTime, Utc};

use crate::features::activity::models::{WarningType, MILLIS_PER_DAY};

/// What a sweep should do with one watched channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InactivityDecision {
    Archive,
    /// Nearest due threshold and whole days left, rounded up
    Warn(WarningType, i64),
    Quiet,
}

/// Decide between archiving, warning at the nearest due threshold, or nothing.
///
/// A `last_activity` in the future (a postponed channel) only adds to the
/// remaining time. It still warns once that falls within a threshold.
pub fn evaluate_inactivity(
    last_activity: DateTime<Utc>,
    inactivity_days: i32,
    now: DateTime<Utc>,
) -> InactivityDecision {
    let elapsed = (now - last_activity).num_milliseconds() as f64 / MILLIS_PER_DAY;
    let threshold = f64::from(inactivity_days);

    if elapsed >= threshold {
        return InactivityDecision::Archive;
    }

    let remaining = threshold - elapsed;
    WarningType::NEAREST_FIRST
        .iter()
        .find(|w| remaining <= w.threshold_days())
        .map(|w| InactivityDecision::Warn(*w, remaining.ceil() as i64))
        .unwrap_or(InactivityDecision::Quiet)
}
