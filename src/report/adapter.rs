//! Reading store adapter: the engine's only read from storage.
//!
//! Fetches one snapshot of raw readings, drops rows that cannot belong to the
//! report, and normalizes temperatures to °F.

use tracing::{debug, warn};

use crate::error::ReportError;
use crate::models::{
    celsius_to_fahrenheit, LocationId, Reading, ReadingUnit, StoredReading,
};
use crate::store::ReadingStore;

use super::window::QueryWindow;

// ---

/// Fetch, validate and normalize the readings of one location and window.
///
/// An empty result is valid and returned as an empty vector.
pub async fn fetch_readings<S>(
    store: &S,
    location_id: LocationId,
    window: &QueryWindow,
) -> Result<Vec<Reading>, ReportError>
where
    S: ReadingStore + ?Sized,
{
    // ---
    let raw = store
        .fetch(location_id, window.start_utc, window.end_utc)
        .await?;

    debug!("Store returned {} raw readings", raw.len());
    Ok(normalize(location_id, window, raw))
}

/// Validate and convert raw readings, ordered by timestamp.
///
/// Storage order is preserved among equal timestamps.
pub fn normalize(
    location_id: LocationId,
    window: &QueryWindow,
    raw: Vec<StoredReading>,
) -> Vec<Reading> {
    // ---
    let total = raw.len();
    let mut readings: Vec<Reading> = raw
        .into_iter()
        .filter(|r| accept(location_id, window, r))
        .map(to_reading)
        .collect();

    let dropped = total - readings.len();
    if dropped > 0 {
        warn!("Dropped {} of {} readings that failed validation", dropped, total);
    }

    readings.sort_by_key(|r| r.timestamp);
    readings
}

fn accept(location_id: LocationId, window: &QueryWindow, reading: &StoredReading) -> bool {
    // ---
    if reading.location_id != location_id {
        warn!(
            "Reading at {} belongs to location {}, not {}",
            reading.timestamp, reading.location_id, location_id
        );
        return false;
    }
    if reading.timestamp < window.start_utc || reading.timestamp > window.end_utc {
        warn!(
            "Reading at {} is outside the window {} - {}",
            reading.timestamp, window.start_utc, window.end_utc
        );
        return false;
    }
    if !reading.value.is_finite() {
        warn!("Reading at {} has non-finite value {}", reading.timestamp, reading.value);
        return false;
    }
    if !reading.unit.fits(reading.channel) {
        warn!(
            "Reading at {} has unit {} on the {:?} channel",
            reading.timestamp,
            reading.unit.code(),
            reading.channel
        );
        return false;
    }
    true
}

fn to_reading(raw: StoredReading) -> Reading {
    // ---
    let value = match raw.unit {
        ReadingUnit::Celsius => celsius_to_fahrenheit(raw.value),
        ReadingUnit::Fahrenheit | ReadingUnit::RelativeHumidity => raw.value,
    };

    Reading {
        location_id: raw.location_id,
        timestamp: raw.timestamp,
        channel: raw.channel,
        value,
    }
}
