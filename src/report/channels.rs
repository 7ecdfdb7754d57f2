//! Channel splitting and per-sample duration attribution.
//!
//! Sampling is irregular, so each sample "covers" the time since the previous
//! sample of the same channel. The first sample of a channel covers nothing;
//! the window edges are accounted for as boundary gaps instead.

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::models::{ChannelType, IntervalSample, Reading};

// ---

/// Duration-attributed samples of one channel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelSeries {
    // ---
    pub samples: Vec<IntervalSample>,
    /// Samples dropped because an earlier one had the same timestamp.
    pub duplicates: usize,
}

/// Both channels of a location, ready for classification.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SplitReadings {
    // ---
    pub temperature: ChannelSeries,
    pub humidity: ChannelSeries,
}

impl SplitReadings {
    // ---
    pub fn duplicates(&self) -> usize {
        self.temperature.duplicates + self.humidity.duplicates
    }
}

/// Partition `readings` by channel and attribute durations within each.
pub fn split_channels(readings: &[Reading]) -> SplitReadings {
    // ---
    let points = |channel: ChannelType| -> Vec<(DateTime<Utc>, f64)> {
        readings
            .iter()
            .filter(|r| r.channel == channel)
            .map(|r| (r.timestamp, r.value))
            .collect()
    };

    SplitReadings {
        temperature: attribute_durations(ChannelType::Temperature, points(ChannelType::Temperature)),
        humidity: attribute_durations(ChannelType::Humidity, points(ChannelType::Humidity)),
    }
}

/// Sort one channel's points and compute each sample's duration.
///
/// Duplicate timestamps are merged: the first point (in input order) wins
/// and the rest are counted in [`ChannelSeries::duplicates`].
pub fn attribute_durations(
    channel: ChannelType,
    mut points: Vec<(DateTime<Utc>, f64)>,
) -> ChannelSeries {
    // ---
    points.sort_by_key(|(ts, _)| *ts);

    let mut series = ChannelSeries::default();
    let mut previous: Option<DateTime<Utc>> = None;

    for (timestamp, value) in points {
        let duration_minutes = match previous {
            Some(prev) if prev == timestamp => {
                series.duplicates += 1;
                continue;
            }
            Some(prev) => minutes_between(prev, timestamp),
            None => 0.0,
        };

        series.samples.push(IntervalSample {
            timestamp,
            value,
            duration_minutes,
        });
        previous = Some(timestamp);
    }

    if series.duplicates > 0 {
        warn!(
            "Merged {} duplicate {:?} samples sharing a timestamp",
            series.duplicates, channel
        );
    }

    series
}

/// Elapsed minutes from `start` to `end`, as a real number.
pub fn minutes_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    (end - start).num_milliseconds() as f64 / 60_000.0
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2017, 3, 26, hour, minute, 0).unwrap()
    }

    fn reading(timestamp: DateTime<Utc>, channel: ChannelType, value: f64) -> Reading {
        Reading {
            location_id: Uuid::nil(),
            timestamp,
            channel,
            value,
        }
    }

    #[test]
    fn test_durations_follow_irregular_sampling() {
        // ---
        let series = attribute_durations(
            ChannelType::Temperature,
            vec![(at(0, 0), 70.0), (at(0, 15), 71.0), (at(0, 20), 72.0), (at(1, 0), 73.0)],
        );

        let durations: Vec<f64> = series.samples.iter().map(|s| s.duration_minutes).collect();
        assert_eq!(durations, vec![0.0, 15.0, 5.0, 40.0]);
        assert_eq!(series.duplicates, 0);
    }

    #[test]
    fn test_unsorted_points_are_sorted_first() {
        // ---
        let series = attribute_durations(
            ChannelType::Humidity,
            vec![(at(0, 30), 40.0), (at(0, 0), 41.0), (at(0, 10), 42.0)],
        );

        let values: Vec<f64> = series.samples.iter().map(|s| s.value).collect();
        assert_eq!(values, vec![41.0, 42.0, 40.0]);
        assert_eq!(series.samples[2].duration_minutes, 20.0);
    }

    #[test]
    fn test_duplicate_timestamps_are_merged() {
        // ---
        let series = attribute_durations(
            ChannelType::Temperature,
            vec![(at(0, 0), 70.0), (at(0, 15), 71.0), (at(0, 15), 99.0), (at(0, 30), 72.0)],
        );

        assert_eq!(series.samples.len(), 3);
        assert_eq!(series.samples[1].value, 71.0);
        assert_eq!(series.samples[2].duration_minutes, 15.0);
        assert_eq!(series.duplicates, 1);
    }

    #[test]
    fn test_split_keeps_channels_independent() {
        // ---
        let readings = vec![
            reading(at(0, 0), ChannelType::Temperature, 70.0),
            reading(at(0, 5), ChannelType::Humidity, 50.0),
            reading(at(0, 15), ChannelType::Temperature, 71.0),
            reading(at(0, 35), ChannelType::Humidity, 51.0),
        ];

        let split = split_channels(&readings);
        assert_eq!(split.temperature.samples.len(), 2);
        assert_eq!(split.humidity.samples.len(), 2);
        assert_eq!(split.temperature.samples[1].duration_minutes, 15.0);
        assert_eq!(split.humidity.samples[1].duration_minutes, 30.0);
        assert_eq!(split.temperature.samples[0].timestamp, at(0, 0));
        assert_eq!(split.humidity.samples[1].timestamp, at(0, 35));
    }

    #[test]
    fn test_single_sample_has_zero_duration() {
        // ---
        let split = split_channels(&[reading(at(12, 0), ChannelType::Temperature, 90.0)]);
        assert_eq!(split.temperature.samples[0].duration_minutes, 0.0);
        assert!(split.humidity.samples.is_empty());
    }

    #[test]
    fn test_minutes_between_keeps_fractions() {
        // ---
        let start = at(0, 0);
        let end = start + chrono::Duration::seconds(90);
        assert_eq!(minutes_between(start, end), 1.5);
    }
}
