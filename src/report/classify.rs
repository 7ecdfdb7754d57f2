//! Threshold classification of one channel against its tolerance band.

use crate::models::{IntervalSample, ToleranceSpec};

// ---

/// Out-of-range time of one channel, in hours.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Excursions {
    // ---
    pub hours_high: f64,
    pub hours_low: f64,
}

impl Excursions {
    // ---
    pub fn hours_out(&self) -> f64 {
        self.hours_high + self.hours_low
    }
}

/// Sum the durations of samples above and below the band.
///
/// Values exactly on a band edge are in range.
pub fn classify(samples: &[IntervalSample], spec: &ToleranceSpec) -> Excursions {
    // ---
    let mut minutes_high = 0.0;
    let mut minutes_low = 0.0;
    for sample in samples {
        if spec.is_high(sample.value) {
            minutes_high += sample.duration_minutes;
        } else if spec.is_low(sample.value) {
            minutes_low += sample.duration_minutes;
        }
    }

    Excursions {
        hours_high: minutes_high / 60.0,
        hours_low: minutes_low / 60.0,
    }
}
