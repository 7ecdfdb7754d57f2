//! `GET /report` – compliance summary for one location and date range.
//!
//! Thin adapter over [`ReportEngine`]: parses the query string, builds an
//! engine over the PostgreSQL store and returns the summary as JSON.

use axum::{extract::Query, extract::State, routing::get, Json, Router};
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::PgPool;
use tracing::info;

use crate::report::ReportEngine;
use crate::store::PgReadingStore;
use crate::{
    ComplianceSummary, Config, DateRange, LocationId, ReportError, ReportRequest, ToleranceSpec,
};

// ---

pub fn router() -> Router<(PgPool, Config)> {
    // ---
    Router::new().route("/report", get(handler))
}

async fn handler(
    Query(params): Query<ReportQuery>,
    State((pool, config)): State<(PgPool, Config)>,
) -> Result<Json<ComplianceSummary>, ReportError> {
    // ---
    info!("GET /report - {:?}", params);

    let engine = ReportEngine::new(
        PgReadingStore::new(pool),
        config.timezone,
        config.gap_threshold_minutes,
    );
    let summary = engine.generate(&params.to_request()).await?;

    Ok(Json(summary))
}

/// Query parameters of a report request.
///
/// Setpoints and tolerances default to the standard lab specification
/// (73 ± 6 °F, 50 ± 20 %RH) when omitted.
#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    location_id: LocationId,
    /// ISO 8601 local date, e.g. `2017-03-26`
    start_date: NaiveDate,
    end_date: NaiveDate,
    #[serde(default = "default_temperature")]
    temperature: f64,
    #[serde(default = "default_temp_tol")]
    temp_tol: f64,
    #[serde(default = "default_humidity")]
    humidity: f64,
    #[serde(default = "default_humid_tol")]
    humid_tol: f64,
}

impl ReportQuery {
    // ---
    fn to_request(&self) -> ReportRequest {
        // ---
        ReportRequest {
            location_id: self.location_id,
            temperature: ToleranceSpec::new(self.temperature, self.temp_tol),
            humidity: ToleranceSpec::new(self.humidity, self.humid_tol),
            range: DateRange {
                start_date: self.start_date,
                end_date: self.end_date,
            },
        }
    }
}

fn default_temperature() -> f64 {
    73.0
}

fn default_temp_tol() -> f64 {
    6.0
}

fn default_humidity() -> f64 {
    50.0
}

fn default_humid_tol() -> f64 {
    20.0
}
