//! Summary aggregation: metrics in, one `ComplianceSummary` out.

use chrono::{DateTime, Utc};

use crate::models::{ComplianceSummary, Metric, ReportRequest, ToleranceSpec};

use super::classify::Excursions;
use super::overlap::GapReport;
use super::window::TimeWindowResolver;

// ---

/// Everything the upstream stages computed for one report.
#[derive(Debug, Clone)]
pub struct ReportMetrics {
    // ---
    pub first_point: Option<DateTime<Utc>>,
    pub last_point: Option<DateTime<Utc>>,
    pub total_hours_evaluated: f64,
    pub total_hours_recorded: f64,
    pub total_hours_out: f64,
    pub percent_out: f64,
    pub temperature: Excursions,
    pub humidity: Excursions,
    pub hours_overlap: f64,
    pub hours_no_data: f64,
    pub gaps: GapReport,
    pub gap_threshold_minutes: u32,
    pub duplicates: usize,
}

/// Human-readable specification line, e.g. `Temp 73 ± 6° F RH 50 ± 20%`.
pub fn specification(temperature: &ToleranceSpec, humidity: &ToleranceSpec) -> String {
    // ---
    format!(
        "Temp {} ± {}° F RH {} ± {}%",
        temperature.setpoint, temperature.tolerance, humidity.setpoint, humidity.tolerance
    )
}

/// Assemble the report record for `request`.
pub fn assemble(
    location: String,
    request: &ReportRequest,
    resolver: &TimeWindowResolver,
    metrics: ReportMetrics,
) -> ComplianceSummary {
    // ---
    ComplianceSummary {
        location,
        specification: specification(&request.temperature, &request.humidity),
        timezone: resolver.timezone().name().to_string(),
        start_date: request.range.start_date,
        end_date: request.range.end_date,
        first_point_recorded: metrics.first_point.map(|t| resolver.to_local(t)),
        last_point_recorded: metrics.last_point.map(|t| resolver.to_local(t)),
        total_hours_evaluated: metrics.total_hours_evaluated,
        total_hours_recorded: metrics.total_hours_recorded,
        total_hours_out: metrics.total_hours_out,
        percent_out: metrics.percent_out,
        hours_temp_high: metrics.temperature.hours_high,
        hours_temp_low: metrics.temperature.hours_low,
        hours_rh_high: metrics.humidity.hours_high,
        hours_rh_low: metrics.humidity.hours_low,
        hours_overlap: metrics.hours_overlap,
        hours_no_data: metrics.hours_no_data,
        large_gap_count: metrics.gaps.count,
        gap_threshold_minutes: metrics.gap_threshold_minutes,
        hrs_down_for_maint: Metric::NotComputed,
        dupe_records: Metric::Computed(metrics.duplicates),
    }
}
