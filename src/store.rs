//! Storage collaborator for the report engine.
//!
//! The engine only sees the [`ReadingStore`] trait; [`PgReadingStore`] is the
//! PostgreSQL implementation used by the HTTP service.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, warn};

use crate::error::ReportError;
use crate::models::{ChannelType, Location, LocationId, ReadingUnit, StoredReading};

// ---

/// Read-only access to locations and their raw readings.
#[async_trait]
pub trait ReadingStore: Send + Sync {
    // ---
    /// Display name of a location, or `UnknownLocation`.
    async fn location_name(&self, location_id: LocationId) -> Result<String, ReportError>;

    /// Readings of one location with `start <= timestamp <= end`.
    async fn fetch(
        &self,
        location_id: LocationId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<StoredReading>, ReportError>;
}

#[async_trait]
impl<T: ReadingStore + ?Sized> ReadingStore for &T {
    // ---
    async fn location_name(&self, location_id: LocationId) -> Result<String, ReportError> {
        (**self).location_name(location_id).await
    }

    async fn fetch(
        &self,
        location_id: LocationId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<StoredReading>, ReportError> {
        (**self).fetch(location_id, start, end).await
    }
}

/// [`ReadingStore`] backed by the `locations` and `readings` tables.
#[derive(Debug, Clone)]
pub struct PgReadingStore {
    pool: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct ReadingRow {
    // ---
    time_stamp: DateTime<Utc>,
    reading_type: i16,
    reading: f64,
    unit: String,
}

impl PgReadingStore {
    // ---
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Active, non-deleted locations ordered by name.
    pub async fn list_locations(&self) -> Result<Vec<Location>, ReportError> {
        // ---
        let locations = sqlx::query_as::<_, Location>(
            r#"
            SELECT location_guid AS location_id, location_name AS name
            FROM locations
            WHERE COALESCE(active, TRUE) AND NOT COALESCE(deleted, FALSE)
            ORDER BY location_name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(locations)
    }
}

#[async_trait]
impl ReadingStore for PgReadingStore {
    // ---
    async fn location_name(&self, location_id: LocationId) -> Result<String, ReportError> {
        // ---
        let name: Option<String> = sqlx::query_scalar(
            r#"
            SELECT location_name FROM locations
            WHERE location_guid = $1 AND NOT COALESCE(deleted, FALSE)
            "#,
        )
        .bind(location_id)
        .fetch_optional(&self.pool)
        .await?;

        name.ok_or(ReportError::UnknownLocation(location_id))
    }

    async fn fetch(
        &self,
        location_id: LocationId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<StoredReading>, ReportError> {
        // ---
        let rows = sqlx::query_as::<_, ReadingRow>(
            r#"
            SELECT time_stamp, reading_type, reading, unit
            FROM readings
            WHERE location_guid = $1
              AND time_stamp BETWEEN $2 AND $3
            ORDER BY time_stamp, reading_guid
            "#,
        )
        .bind(location_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        debug!("Fetched {} rows for location {}", rows.len(), location_id);

        let readings = rows
            .into_iter()
            .filter_map(|row| {
                let channel = ChannelType::from_code(row.reading_type);
                let unit = ReadingUnit::from_code(&row.unit);
                match (channel, unit) {
                    (Some(channel), Some(unit)) => Some(StoredReading {
                        location_id,
                        timestamp: row.time_stamp,
                        channel,
                        value: row.reading,
                        unit,
                    }),
                    _ => {
                        warn!(
                            "Skipping reading at {} with unknown type {} or unit '{}'",
                            row.time_stamp, row.reading_type, row.unit
                        );
                        None
                    }
                }
            })
            .collect();

        Ok(readings)
    }
}

/// In-memory [`ReadingStore`] for tests.
#[cfg(test)]
pub mod memory {
    // ---
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[derive(Debug, Default)]
    pub struct MemoryStore {
        names: HashMap<LocationId, String>,
        readings: Vec<StoredReading>,
        fetches: AtomicUsize,
    }

    impl MemoryStore {
        // ---
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_location(mut self, location_id: LocationId, name: &str) -> Self {
            self.names.insert(location_id, name.to_string());
            self
        }

        pub fn with_readings(mut self, readings: impl IntoIterator<Item = StoredReading>) -> Self {
            self.readings.extend(readings);
            self
        }

        /// Number of `fetch` calls served so far.
        pub fn fetch_count(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ReadingStore for MemoryStore {
        // ---
        async fn location_name(&self, location_id: LocationId) -> Result<String, ReportError> {
            self.names
                .get(&location_id)
                .cloned()
                .ok_or(ReportError::UnknownLocation(location_id))
        }

        async fn fetch(
            &self,
            location_id: LocationId,
            start: DateTime<Utc>,
            end: DateTime<Utc>,
        ) -> Result<Vec<StoredReading>, ReportError> {
            // ---
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .readings
                .iter()
                .filter(|r| r.location_id == location_id)
                .filter(|r| r.timestamp >= start && r.timestamp <= end)
                .cloned()
                .collect())
        }
    }
}
