//! Compliance report engine.
//!
//! Gateway for the analysis pipeline (EMBP): callers only see
//! [`ReportEngine`]. Data flows strictly downstream:
//!
//! `window` → `adapter` → `channels` → {`classify`, `overlap`} → `summary`
//!
//! Each stage takes its input by reference and returns new values; nothing is
//! mutated in place and nothing is shared between concurrent reports.

use chrono_tz::Tz;
use tracing::{debug, info, instrument};

use crate::error::ReportError;
use crate::models::{ComplianceSummary, Reading, ReportRequest, ToleranceSpec};
use crate::store::ReadingStore;

mod adapter;
mod channels;
mod classify;
mod overlap;
mod summary;
mod window;

pub use window::TimeWindowResolver;

use summary::ReportMetrics;
use window::QueryWindow;

// ---

/// Produces compliance summaries from one reading store.
#[derive(Debug, Clone)]
pub struct ReportEngine<S> {
    // ---
    store: S,
    resolver: TimeWindowResolver,
    gap_threshold_minutes: u32,
}

impl<S: ReadingStore> ReportEngine<S> {
    // ---
    pub fn new(store: S, timezone: Tz, gap_threshold_minutes: u32) -> Self {
        Self {
            store,
            resolver: TimeWindowResolver::new(timezone),
            gap_threshold_minutes,
        }
    }

    /// Build the compliance summary for `request`.
    ///
    /// The request is validated before any storage access. Readings are
    /// fetched exactly once; an empty result yields a 100% no-data report.
    #[instrument(skip(self, request), fields(location = %request.location_id))]
    pub async fn generate(&self, request: &ReportRequest) -> Result<ComplianceSummary, ReportError> {
        // ---
        validate(request)?;
        let window = self.resolver.resolve(&request.range)?;
        debug!("Query window {} - {}", window.start_utc, window.end_utc);

        let location = self.store.location_name(request.location_id).await?;
        let readings = adapter::fetch_readings(&self.store, request.location_id, &window).await?;

        let summary = self.analyze(location, request, &window, &readings);
        info!(
            "Report for '{}' {} to {}: {} readings, {:.2}h out of {:.0}h ({:.1}%)",
            summary.location,
            summary.start_date,
            summary.end_date,
            readings.len(),
            summary.total_hours_out,
            summary.total_hours_evaluated,
            summary.percent_out
        );
        Ok(summary)
    }

    fn analyze(
        &self,
        location: String,
        request: &ReportRequest,
        window: &QueryWindow,
        readings: &[Reading],
    ) -> ComplianceSummary {
        // ---
        let split = channels::split_channels(readings);
        let temperature = classify::classify(&split.temperature.samples, &request.temperature);
        let humidity = classify::classify(&split.humidity.samples, &request.humidity);

        let rows = overlap::combine(
            &split.temperature.samples,
            &request.temperature,
            &split.humidity.samples,
            &request.humidity,
        );
        let hours_overlap = overlap::overlap_hours(&rows);
        let gaps = overlap::find_gaps(&rows, f64::from(self.gap_threshold_minutes));
        debug!(
            "{} combined rows, {} large gaps totalling {:.1} min",
            rows.len(),
            gaps.count,
            gaps.minutes
        );

        let first_point = readings.iter().map(|r| r.timestamp).min();
        let last_point = readings.iter().map(|r| r.timestamp).max();
        let observed = first_point.zip(last_point);
        let total_hours_recorded =
            observed.map_or(0.0, |(first, last)| window::hours_between(first, last));

        let total_hours_evaluated = window.total_hours_evaluated();
        let hours_no_data = overlap::no_data_hours(window, observed, &gaps);
        let total_hours_out =
            overlap::total_hours_out(&temperature, &humidity, hours_overlap, hours_no_data);

        let metrics = ReportMetrics {
            first_point,
            last_point,
            total_hours_evaluated,
            total_hours_recorded,
            total_hours_out,
            percent_out: overlap::percent_out(total_hours_out, total_hours_evaluated),
            temperature,
            humidity,
            hours_overlap,
            hours_no_data,
            gaps,
            gap_threshold_minutes: self.gap_threshold_minutes,
            duplicates: split.duplicates(),
        };

        summary::assemble(location, request, &self.resolver, metrics)
    }
}

/// Reject requests that cannot describe a valid report.
pub fn validate(request: &ReportRequest) -> Result<(), ReportError> {
    // ---
    if request.range.end_date < request.range.start_date {
        return Err(ReportError::InvalidRange(format!(
            "end date {} is before start date {}",
            request.range.end_date, request.range.start_date
        )));
    }
    validate_tolerance("temperature", &request.temperature)?;
    validate_tolerance("humidity", &request.humidity)
}

fn validate_tolerance(channel: &str, spec: &ToleranceSpec) -> Result<(), ReportError> {
    // ---
    if !spec.setpoint.is_finite() {
        return Err(ReportError::InvalidRange(format!(
            "{channel} setpoint must be a finite number"
        )));
    }
    if !spec.tolerance.is_finite() || spec.tolerance <= 0.0 {
        return Err(ReportError::InvalidRange(format!(
            "{channel} tolerance must be positive, got {}",
            spec.tolerance
        )));
    }
    Ok(())
}
