//! Local civil date range <-> UTC query window.
//!
//! Report ranges are picked as calendar dates in the configured reference
//! timezone. The store is queried in UTC, and observed instants are shown
//! back in local time.
//!
//! # DST handling
//! A window boundary that falls in a DST gap (nonexistent) or fold
//! (ambiguous) is rejected with [`ReportError::AmbiguousLocalTime`] instead of
//! being resolved to a guessed offset.
//!
//! Every hour figure of a report is elapsed time. A spring-forward day
//! evaluates 23 hours and a fall-back day 25, so fully sampled data always
//! reads as the whole window.

use chrono::{
    DateTime, Duration, FixedOffset, LocalResult, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc,
};
use chrono_tz::Tz;

use crate::error::ReportError;
use crate::models::DateRange;

// ---

/// Resolved query window for one report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryWindow {
    // ---
    /// Local midnight of `start_date`, in UTC.
    pub start_utc: DateTime<Utc>,
    /// Local 23:59:59 of `end_date`, in UTC. Inclusive query bound.
    pub end_utc: DateTime<Utc>,
    /// First instant after `end_date`. Exclusive window end.
    pub end_exclusive_utc: DateTime<Utc>,
}

impl QueryWindow {
    // ---
    /// Elapsed hours covered by the window.
    pub fn total_hours_evaluated(&self) -> f64 {
        hours_between(self.start_utc, self.end_exclusive_utc)
    }
}

/// Converts between local civil time in a fixed timezone and UTC.
#[derive(Debug, Clone, Copy)]
pub struct TimeWindowResolver {
    timezone: Tz,
}

impl TimeWindowResolver {
    // ---
    pub fn new(timezone: Tz) -> Self {
        Self { timezone }
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Resolve `range` into the UTC window used to query the store.
    ///
    /// `range` must already be ordered; see [`crate::report::validate`].
    pub fn resolve(&self, range: &DateRange) -> Result<QueryWindow, ReportError> {
        // ---
        let start_utc = self.to_utc(range.start_date.and_time(NaiveTime::default()))?;
        let end_utc = self.to_utc(range.end_date.and_time(last_second_of_day()))?;

        Ok(QueryWindow {
            start_utc,
            end_utc,
            end_exclusive_utc: end_utc + Duration::seconds(1),
        })
    }

    /// Observed instant as shown to the user.
    pub fn to_local(&self, instant: DateTime<Utc>) -> DateTime<FixedOffset> {
        // ---
        let local = instant.with_timezone(&self.timezone);
        let offset = local.offset().fix();
        local.with_timezone(&offset)
    }

    fn to_utc(&self, local: NaiveDateTime) -> Result<DateTime<Utc>, ReportError> {
        // ---
        match self.timezone.from_local_datetime(&local) {
            LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
            LocalResult::Ambiguous(..) | LocalResult::None => {
                Err(ReportError::AmbiguousLocalTime {
                    local,
                    timezone: self.timezone.name().to_string(),
                })
            }
        }
    }
}

/// Hours between two instants, as a real number.
pub fn hours_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    (end - start).num_milliseconds() as f64 / 3_600_000.0
}

fn last_second_of_day() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 59).unwrap_or_default()
}
