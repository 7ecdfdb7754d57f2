use axum::Router;
use sqlx::PgPool;

use crate::Config;

mod health;
mod locations;
mod report;

// ---

pub fn router(pool: PgPool, config: Config) -> Router {
    // ---
    Router::new()
        .merge(report::router())
        .merge(locations::router())
        .merge(health::router())
        .with_state((pool, config))
}
