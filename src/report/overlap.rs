//! Union timeline of both channels: overlap, gaps and missing data.
//!
//! Per-channel classification attributes each interval to the sample that
//! ends it. The combined timeline keeps that attribution: a row at instant
//! `t` takes, for each channel, the first sample at or after `t`, provided
//! `t` lies inside that channel's covered span. Rows outside the span carry
//! `None` for the channel, so overlap time never exceeds either channel's own
//! out-of-range time.

use chrono::{DateTime, Utc};

use crate::models::{CombinedRow, IntervalSample, ToleranceSpec};

use super::channels::minutes_between;
use super::classify::Excursions;
use super::window::{hours_between, QueryWindow};

// ---

/// Large gaps found on the combined timeline.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GapReport {
    // ---
    pub count: usize,
    pub minutes: f64,
}

/// Outer-join both channels on timestamp.
pub fn combine(
    temperature: &[IntervalSample],
    temperature_spec: &ToleranceSpec,
    humidity: &[IntervalSample],
    humidity_spec: &ToleranceSpec,
) -> Vec<CombinedRow> {
    // ---
    let mut timestamps: Vec<DateTime<Utc>> = temperature
        .iter()
        .chain(humidity.iter())
        .map(|s| s.timestamp)
        .collect();
    timestamps.sort();
    timestamps.dedup();

    let mut temp_cursor = Cursor::new(temperature);
    let mut humid_cursor = Cursor::new(humidity);
    let mut previous: Option<DateTime<Utc>> = None;

    timestamps
        .into_iter()
        .map(|timestamp| {
            let temp = temp_cursor.covering(timestamp);
            let humid = humid_cursor.covering(timestamp);
            let duration_minutes = previous.map_or(0.0, |prev| minutes_between(prev, timestamp));
            previous = Some(timestamp);

            CombinedRow {
                timestamp,
                temp_value: temp.map(|s| s.value),
                temp_in_range: temp.map(|s| temperature_spec.contains(s.value)),
                humid_value: humid.map(|s| s.value),
                humid_in_range: humid.map(|s| humidity_spec.contains(s.value)),
                duration_minutes,
            }
        })
        .collect()
}

/// Walks one channel's samples in step with ascending combined timestamps.
struct Cursor<'a> {
    samples: &'a [IntervalSample],
    next: usize,
}

impl<'a> Cursor<'a> {
    // ---
    fn new(samples: &'a [IntervalSample]) -> Self {
        Self { samples, next: 0 }
    }

    /// Sample whose attributed interval contains `timestamp`, if any.
    fn covering(&mut self, timestamp: DateTime<Utc>) -> Option<&'a IntervalSample> {
        // ---
        while self.next < self.samples.len() && self.samples[self.next].timestamp < timestamp {
            self.next += 1;
        }
        if self.next == 0 || self.next >= self.samples.len() {
            // before or at the first sample, or past the last one
            return None;
        }
        Some(&self.samples[self.next])
    }
}

/// Hours during which both channels are out of range at once.
pub fn overlap_hours(rows: &[CombinedRow]) -> f64 {
    // ---
    let minutes: f64 = rows
        .iter()
        .filter(|row| row.temp_in_range == Some(false) && row.humid_in_range == Some(false))
        .map(|row| row.duration_minutes)
        .sum();
    minutes / 60.0
}

/// Combined intervals strictly longer than `threshold_minutes`.
pub fn find_gaps(rows: &[CombinedRow], threshold_minutes: f64) -> GapReport {
    // ---
    rows.iter()
        .filter(|row| row.duration_minutes > threshold_minutes)
        .fold(GapReport::default(), |acc, row| GapReport {
            count: acc.count + 1,
            minutes: acc.minutes + row.duration_minutes,
        })
}

/// Missing-data hours: both window edges plus every large gap.
///
/// `observed` is the first and last reading instant. With no readings the
/// whole window is missing. A channel with a single sample only affects this
/// through the window edges.
pub fn no_data_hours(
    window: &QueryWindow,
    observed: Option<(DateTime<Utc>, DateTime<Utc>)>,
    gaps: &GapReport,
) -> f64 {
    // ---
    match observed {
        None => window.total_hours_evaluated(),
        Some((first, last)) => {
            let leading = hours_between(window.start_utc, first).max(0.0);
            let trailing = hours_between(last, window.end_exclusive_utc).max(0.0);
            leading + trailing + gaps.minutes / 60.0
        }
    }
}

/// Out-of-spec hours, counting simultaneous excursions once and missing
/// data as out.
pub fn total_hours_out(
    temperature: &Excursions,
    humidity: &Excursions,
    hours_overlap: f64,
    hours_no_data: f64,
) -> f64 {
    temperature.hours_out() + humidity.hours_out() - hours_overlap + hours_no_data
}

pub fn percent_out(total_hours_out: f64, total_hours_evaluated: f64) -> f64 {
    // ---
    if total_hours_evaluated <= 0.0 {
        return 0.0;
    }
    total_hours_out / total_hours_evaluated * 100.0
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::models::ChannelType;
    use crate::report::channels::attribute_durations;
    use crate::report::classify::classify;
    use crate::models::DateRange;
    use crate::report::window::TimeWindowResolver;
    use chrono::{NaiveDate, TimeZone};

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2017, 3, 26, hour, minute, 0).unwrap()
    }

    fn series(channel: ChannelType, points: &[(u32, u32, f64)]) -> Vec<IntervalSample> {
        // ---
        let points = points.iter().map(|&(h, m, v)| (at(h, m), v)).collect();
        attribute_durations(channel, points).samples
    }

    fn temp_spec() -> ToleranceSpec {
        ToleranceSpec::new(73.0, 6.0)
    }

    fn rh_spec() -> ToleranceSpec {
        ToleranceSpec::new(50.0, 20.0)
    }

    fn window() -> QueryWindow {
        // ---
        let day = NaiveDate::from_ymd_opt(2017, 3, 26).unwrap();
        TimeWindowResolver::new(chrono_tz::UTC)
            .resolve(&DateRange {
                start_date: day,
                end_date: day,
            })
            .unwrap()
    }

    #[test]
    fn test_combined_durations_use_union_timeline() {
        // ---
        let temp = series(ChannelType::Temperature, &[(0, 0, 70.0), (0, 15, 70.0), (0, 30, 70.0)]);
        let rh = series(ChannelType::Humidity, &[(0, 0, 50.0), (0, 10, 50.0), (0, 30, 50.0)]);

        let rows = combine(&temp, &temp_spec(), &rh, &rh_spec());
        let stamps: Vec<_> = rows.iter().map(|r| r.timestamp).collect();
        let durations: Vec<f64> = rows.iter().map(|r| r.duration_minutes).collect();

        assert_eq!(stamps, vec![at(0, 0), at(0, 10), at(0, 15), at(0, 30)]);
        assert_eq!(durations, vec![0.0, 10.0, 5.0, 15.0]);
    }

    #[test]
    fn test_rows_carry_covering_sample() {
        // ---
        let temp = series(ChannelType::Temperature, &[(0, 0, 70.0), (0, 30, 90.0)]);
        let rh = series(ChannelType::Humidity, &[(0, 0, 50.0), (0, 10, 50.0), (0, 30, 50.0)]);

        let rows = combine(&temp, &temp_spec(), &rh, &rh_spec());

        // First instant of each channel covers nothing
        assert_eq!(rows[0].temp_in_range, None);
        assert_eq!(rows[0].humid_in_range, None);

        // 00:10 lies inside the temperature interval ended by the 90°F sample
        assert_eq!(rows[1].temp_value, Some(90.0));
        assert_eq!(rows[1].temp_in_range, Some(false));
        assert_eq!(rows[1].humid_in_range, Some(true));
    }

    #[test]
    fn test_rows_outside_channel_span_have_no_flags() {
        // ---
        let temp = series(ChannelType::Temperature, &[(0, 0, 90.0), (0, 15, 90.0)]);
        let rh = series(ChannelType::Humidity, &[(0, 0, 95.0), (0, 45, 95.0)]);

        let rows = combine(&temp, &temp_spec(), &rh, &rh_spec());
        let last = rows.last().unwrap();
        assert_eq!(last.timestamp, at(0, 45));
        assert_eq!(last.temp_in_range, None);
        assert_eq!(last.humid_in_range, Some(false));

        // Temperature is out 15 minutes, humidity 45; they overlap 15
        assert_eq!(overlap_hours(&rows), 0.25);
    }

    #[test]
    fn test_overlap_is_bounded_by_each_channel() {
        // ---
        let temp = series(
            ChannelType::Temperature,
            &[(0, 0, 90.0), (1, 0, 60.0), (1, 20, 90.0), (2, 0, 73.0)],
        );
        let rh = series(
            ChannelType::Humidity,
            &[(0, 0, 95.0), (0, 30, 95.0), (1, 0, 95.0), (1, 30, 10.0), (2, 0, 95.0)],
        );

        let rows = combine(&temp, &temp_spec(), &rh, &rh_spec());
        let overlap = overlap_hours(&rows);
        let temp_out = classify(&temp, &temp_spec()).hours_out();
        let rh_out = classify(&rh, &rh_spec()).hours_out();

        assert!(overlap > 0.0);
        assert!(overlap <= temp_out.min(rh_out) + 1e-9);
    }

    #[test]
    fn test_earlier_out_of_range_sample_does_not_carry_forward() {
        // ---
        // The 90°F sample opens the channel and covers no time; the interval
        // up to 00:30 belongs to the in-range 73°F sample.
        let temp = series(ChannelType::Temperature, &[(0, 0, 90.0), (0, 30, 73.0)]);
        let rh = series(ChannelType::Humidity, &[(0, 0, 95.0), (0, 10, 95.0), (0, 30, 95.0)]);

        let rows = combine(&temp, &temp_spec(), &rh, &rh_spec());
        assert_eq!(rows[1].timestamp, at(0, 10));
        assert_eq!(rows[1].temp_in_range, Some(true));
        assert_eq!(rows[1].humid_in_range, Some(false));

        let temp_out = classify(&temp, &temp_spec()).hours_out();
        assert_eq!(temp_out, 0.0);
        assert_eq!(overlap_hours(&rows), 0.0);
    }

    #[test]
    fn test_single_sample_channel_only_moves_edges() {
        // ---
        let temp = series(ChannelType::Temperature, &[(6, 0, 99.0)]);
        let rows = combine(&temp, &temp_spec(), &[], &rh_spec());

        assert_eq!(classify(&temp, &temp_spec()), Excursions::default());
        let gaps = find_gaps(&rows, 15.0);
        assert_eq!(gaps.count, 0);

        // 6h leading + 18h trailing
        let no_data = no_data_hours(&window(), Some((at(6, 0), at(6, 0))), &gaps);
        assert_eq!(no_data, 24.0);
    }

    #[test]
    fn test_in_range_flags_ignore_other_channel() {
        // ---
        let temp = series(ChannelType::Temperature, &[(0, 0, 70.0), (0, 15, 70.0)]);
        let calm = series(ChannelType::Humidity, &[(0, 0, 50.0), (0, 15, 50.0)]);
        let wild = series(ChannelType::Humidity, &[(0, 0, 99.0), (0, 15, 1.0)]);

        let a = combine(&temp, &temp_spec(), &calm, &rh_spec());
        let b = combine(&temp, &temp_spec(), &wild, &rh_spec());
        let flags = |rows: &[CombinedRow]| rows.iter().map(|r| r.temp_in_range).collect::<Vec<_>>();
        assert_eq!(flags(&a), flags(&b));
    }

    #[test]
    fn test_gap_over_threshold_is_counted() {
        // ---
        let temp = series(
            ChannelType::Temperature,
            &[(0, 0, 70.0), (0, 15, 70.0), (0, 35, 70.0), (0, 50, 70.0)],
        );
        let rows = combine(&temp, &temp_spec(), &[], &rh_spec());

        let gaps = find_gaps(&rows, 15.0);
        assert_eq!(gaps, GapReport { count: 1, minutes: 20.0 });
    }

    #[test]
    fn test_interval_equal_to_threshold_is_not_a_gap() {
        // ---
        let temp = series(ChannelType::Temperature, &[(0, 0, 70.0), (0, 15, 70.0)]);
        let rows = combine(&temp, &temp_spec(), &[], &rh_spec());
        assert_eq!(find_gaps(&rows, 15.0).count, 0);
    }

    #[test]
    fn test_no_data_includes_edges_and_gaps() {
        // ---
        let window = window();
        let first = at(1, 0);
        let last = at(22, 30);
        let gaps = GapReport { count: 2, minutes: 90.0 };

        // 1h leading + 1.5h trailing + 1.5h of gaps
        assert_eq!(no_data_hours(&window, Some((first, last)), &gaps), 4.0);
    }

    #[test]
    fn test_no_data_without_readings_is_whole_window() {
        // ---
        assert_eq!(no_data_hours(&window(), None, &GapReport::default()), 24.0);
    }

    #[test]
    fn test_total_and_percent_out() {
        // ---
        let temp = Excursions { hours_high: 3.0, hours_low: 1.0 };
        let rh = Excursions { hours_high: 2.0, hours_low: 0.0 };

        let total = total_hours_out(&temp, &rh, 1.5, 2.5);
        assert_eq!(total, 7.0);
        assert_eq!(percent_out(total, 28.0), 25.0);
        assert_eq!(percent_out(0.0, 0.0), 0.0);
    }
}
