//! `GET /locations` – monitored locations a report can be requested for.

use axum::{extract::State, routing::get, Json, Router};
use sqlx::PgPool;
use tracing::debug;

use crate::store::PgReadingStore;
use crate::{Config, Location, ReportError};

// ---

pub fn router() -> Router<(PgPool, Config)> {
    // ---
    Router::new().route("/locations", get(handler))
}

async fn handler(
    State((pool, _config)): State<(PgPool, Config)>,
) -> Result<Json<Vec<Location>>, ReportError> {
    // ---
    let locations = PgReadingStore::new(pool).list_locations().await?;
    debug!("GET /locations - {} locations", locations.len());
    Ok(Json(locations))
}
