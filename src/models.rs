//! Data models for the compliance report pipeline.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---

/// Opaque identifier of a monitored location.
pub type LocationId = Uuid;

/// Sensor variable stream of a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelType {
    // ---
    Temperature,
    Humidity,
}

impl ChannelType {
    // ---
    /// Decode the `reading_type` column of the `readings` table.
    pub fn from_code(code: i16) -> Option<Self> {
        // ---
        match code {
            1 => Some(ChannelType::Temperature),
            2 => Some(ChannelType::Humidity),
            _ => None,
        }
    }
}

/// Unit a reading was recorded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadingUnit {
    // ---
    Celsius,
    Fahrenheit,
    RelativeHumidity,
}

impl ReadingUnit {
    // ---
    /// Decode the `unit` column of the `readings` table.
    pub fn from_code(code: &str) -> Option<Self> {
        // ---
        match code.trim() {
            "C" => Some(ReadingUnit::Celsius),
            "F" => Some(ReadingUnit::Fahrenheit),
            "%RH" => Some(ReadingUnit::RelativeHumidity),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        // ---
        match self {
            ReadingUnit::Celsius => "C",
            ReadingUnit::Fahrenheit => "F",
            ReadingUnit::RelativeHumidity => "%RH",
        }
    }

    /// Whether values in this unit can belong to `channel`.
    pub fn fits(self, channel: ChannelType) -> bool {
        // ---
        match self {
            ReadingUnit::Celsius | ReadingUnit::Fahrenheit => channel == ChannelType::Temperature,
            ReadingUnit::RelativeHumidity => channel == ChannelType::Humidity,
        }
    }
}

/// Reading as returned by the storage collaborator, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredReading {
    // ---
    pub location_id: LocationId,
    pub timestamp: DateTime<Utc>,
    pub channel: ChannelType,
    pub value: f64,
    pub unit: ReadingUnit,
}

/// Normalized reading: temperatures in °F, humidity in %RH.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    // ---
    pub location_id: LocationId,
    pub timestamp: DateTime<Utc>,
    pub channel: ChannelType,
    pub value: f64,
}

/// Acceptable band `[setpoint - tolerance, setpoint + tolerance]`, inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToleranceSpec {
    // ---
    pub setpoint: f64,
    pub tolerance: f64,
}

impl ToleranceSpec {
    // ---
    pub fn new(setpoint: f64, tolerance: f64) -> Self {
        Self { setpoint, tolerance }
    }

    pub fn upper(&self) -> f64 {
        self.setpoint + self.tolerance
    }

    pub fn lower(&self) -> f64 {
        self.setpoint - self.tolerance
    }

    pub fn is_high(&self, value: f64) -> bool {
        value > self.upper()
    }

    pub fn is_low(&self, value: f64) -> bool {
        value < self.lower()
    }

    pub fn contains(&self, value: f64) -> bool {
        !self.is_high(value) && !self.is_low(value)
    }
}

/// Local civil date range, both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    // ---
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Everything the engine needs to produce one report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRequest {
    // ---
    pub location_id: LocationId,
    pub temperature: ToleranceSpec,
    pub humidity: ToleranceSpec,
    pub range: DateRange,
}

/// A location as listed for report selection.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Location {
    // ---
    pub location_id: LocationId,
    pub name: String,
}

/// One sample of a channel with the time attributed to it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntervalSample {
    // ---
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    /// Elapsed minutes since the previous sample of the same channel.
    pub duration_minutes: f64,
}

/// One instant of the union timeline of both channels.
///
/// Channel fields are `None` where the instant is not covered by any
/// attributed interval of that channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CombinedRow {
    // ---
    pub timestamp: DateTime<Utc>,
    pub temp_value: Option<f64>,
    pub temp_in_range: Option<bool>,
    pub humid_value: Option<f64>,
    pub humid_in_range: Option<bool>,
    /// Elapsed minutes since the previous combined timestamp.
    pub duration_minutes: f64,
}

/// A metric that may not be implemented yet.
///
/// Lets consumers tell "computed as zero" apart from "not computed".
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Metric<T> {
    // ---
    Computed(T),
    NotComputed,
}

/// Compliance report for one location and date range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplianceSummary {
    // ---
    pub location: String,
    pub specification: String,
    pub timezone: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub first_point_recorded: Option<DateTime<FixedOffset>>,
    pub last_point_recorded: Option<DateTime<FixedOffset>>,
    pub total_hours_evaluated: f64,
    pub total_hours_recorded: f64,
    pub total_hours_out: f64,
    pub percent_out: f64,
    pub hours_temp_high: f64,
    pub hours_temp_low: f64,
    pub hours_rh_high: f64,
    pub hours_rh_low: f64,
    pub hours_overlap: f64,
    pub hours_no_data: f64,
    /// Number of combined intervals longer than `gap_threshold_minutes`.
    pub large_gap_count: usize,
    pub gap_threshold_minutes: u32,
    pub hrs_down_for_maint: Metric<f64>,
    pub dupe_records: Metric<usize>,
}

/// Convert a temperature in °C to °F.
pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 1.8 + 32.0
}
