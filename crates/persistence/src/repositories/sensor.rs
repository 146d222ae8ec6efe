//! Sensor repository for database operations.

use chrono::{DateTime, Utc};
use domain::models::sensor::DEFAULT_SENSOR_STATUS;
use domain::models::{Sensor, SensorChange, SensorCreate, SensorUpdate};
use domain::services::{SensorStore, StoreError};
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::error;

use crate::entities::sensor::SENSOR_COLUMNS;
use crate::entities::SensorEntity;
use crate::metrics::QueryTimer;

/// Repository for sensor-related database operations.
#[derive(Clone)]
pub struct SensorRepository {
    pool: PgPool,
}

impl SensorRepository {
    /// Creates a new SensorRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Find all sensors ordered by id.
    pub async fn find_all(&self) -> Result<Vec<SensorEntity>, sqlx::Error> {
        let sql = select_all_sql();
        let timer = QueryTimer::new("list_sensors");
        let result = sqlx::query_as::<_, SensorEntity>(&sql)
            .fetch_all(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Find a sensor by id.
    pub async fn find_by_id(&self, id: i32) -> Result<Option<SensorEntity>, sqlx::Error> {
        let sql = select_by_id_sql();
        let timer = QueryTimer::new("get_sensor_by_id");
        let result = sqlx::query_as::<_, SensorEntity>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Insert a new sensor with status 'inactive' and no value.
    pub async fn insert(
        &self,
        name: &str,
        sensor_type: &str,
        location: &str,
        unit: &str,
    ) -> Result<SensorEntity, sqlx::Error> {
        let sql = insert_sql();
        let timer = QueryTimer::new("create_sensor");
        let result = sqlx::query_as::<_, SensorEntity>(&sql)
            .bind(name)
            .bind(sensor_type)
            .bind(location)
            .bind(unit)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Apply a partial update. Returns `None` when no row matched.
    pub async fn apply_update(
        &self,
        id: i32,
        update: &SensorUpdate,
    ) -> Result<Option<SensorEntity>, sqlx::Error> {
        let mut builder = build_update_query(id, update, Utc::now());

        let timer = QueryTimer::new("update_sensor");
        let result = builder
            .build_query_as::<SensorEntity>()
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Set value and status. Returns the number of rows affected.
    pub async fn set_value(
        &self,
        id: i32,
        value: Option<f64>,
        status: &str,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("update_sensor_value");
        let result = sqlx::query(
            r#"
            UPDATE sensors
            SET value = $1, status = $2, last_updated = $3
            WHERE id = $4
            "#,
        )
        .bind(value)
        .bind(status)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await;
        timer.record();
        Ok(result?.rows_affected())
    }

    /// Delete a sensor. Returns the number of rows affected.
    pub async fn remove(&self, id: i32) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_sensor");
        let result = sqlx::query("DELETE FROM sensors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result?.rows_affected())
    }
}

fn select_all_sql() -> String {
    format!("SELECT {} FROM sensors ORDER BY id", SENSOR_COLUMNS)
}

fn select_by_id_sql() -> String {
    format!("SELECT {} FROM sensors WHERE id = $1", SENSOR_COLUMNS)
}

fn insert_sql() -> String {
    format!(
        "INSERT INTO sensors (name, type, location, unit, status, last_updated, created_at) \
         VALUES ($1, $2, $3, $4, '{}', $5, $5) RETURNING {}",
        DEFAULT_SENSOR_STATUS, SENSOR_COLUMNS
    )
}

/// Build the partial update statement for a sensor.
///
/// `last_updated` is always assigned; every other column appears only when
/// the update carries a change for it.
pub fn build_update_query<'a>(
    id: i32,
    update: &'a SensorUpdate,
    now: DateTime<Utc>,
) -> QueryBuilder<'a, Postgres> {
    let mut builder = QueryBuilder::new("UPDATE sensors SET last_updated = ");
    builder.push_bind(now);

    for change in update.changes() {
        builder.push(", ").push(change.column()).push(" = ");
        match change {
            SensorChange::Value(value) => {
                builder.push_bind(value);
            }
            SensorChange::Name(text)
            | SensorChange::Type(text)
            | SensorChange::Location(text)
            | SensorChange::Unit(text)
            | SensorChange::Status(text) => {
                builder.push_bind(text);
            }
        }
    }

    builder.push(" WHERE id = ").push_bind(id);
    builder.push(" RETURNING ").push(SENSOR_COLUMNS);
    builder
}

fn query_failed(operation: &str, err: sqlx::Error) -> StoreError {
    error!(operation, error = %err, "Sensor query failed");
    StoreError::Database(format!("Failed to {}: {}", operation, err))
}

fn found(rows_affected: u64) -> Result<(), StoreError> {
    if rows_affected == 0 {
        Err(StoreError::NotFound)
    } else {
        Ok(())
    }
}

#[async_trait::async_trait]
impl SensorStore for SensorRepository {
    async fn ping(&self) -> Result<(), StoreError> {
        crate::db::check_connection(&self.pool)
            .await
            .map_err(|e| query_failed("reach database", e))
    }

    async fn list(&self) -> Result<Vec<Sensor>, StoreError> {
        self.find_all()
            .await
            .map_err(|e| query_failed("get sensors", e))?
            .into_iter()
            .map(Sensor::try_from)
            .collect()
    }

    async fn get_by_id(&self, id: i32) -> Result<Sensor, StoreError> {
        self.find_by_id(id)
            .await
            .map_err(|e| query_failed("get sensor", e))?
            .ok_or(StoreError::NotFound)?
            .try_into()
    }

    async fn create(&self, sensor: &SensorCreate) -> Result<Sensor, StoreError> {
        self.insert(
            &sensor.name,
            &sensor.sensor_type,
            &sensor.location,
            &sensor.unit,
        )
        .await
        .map_err(|e| query_failed("create sensor", e))?
        .try_into()
    }

    async fn update(&self, id: i32, update: &SensorUpdate) -> Result<Sensor, StoreError> {
        self.apply_update(id, update)
            .await
            .map_err(|e| query_failed("update sensor", e))?
            .ok_or(StoreError::NotFound)?
            .try_into()
    }

    async fn update_value(
        &self,
        id: i32,
        value: Option<f64>,
        status: &str,
    ) -> Result<(), StoreError> {
        let rows = self
            .set_value(id, value, status)
            .await
            .map_err(|e| query_failed("update sensor value", e))?;
        found(rows)
    }

    async fn delete(&self, id: i32) -> Result<(), StoreError> {
        let rows = self
            .remove(id)
            .await
            .map_err(|e| query_failed("delete sensor", e))?;
        found(rows)
    }
}
