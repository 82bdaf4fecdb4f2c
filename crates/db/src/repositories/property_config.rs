//! `travelclick_property_config` repository.

use sqlx::Error as SqlxError;
use travelclick_domain::PropertyConfig;
use uuid::Uuid;

use crate::models::property_config::PropertyConfigRow;
use crate::DbPool;

#[derive(Clone)]
pub struct PropertyConfigRepository {
    pool: DbPool,
}

impl PropertyConfigRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, property_id: Uuid) -> Result<Option<PropertyConfig>, SqlxError> {
        let row = sqlx::query_as::<_, PropertyConfigRow>(
            "SELECT * FROM travelclick_property_config WHERE property_id = $1",
        )
        .bind(property_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(PropertyConfigRow::into_domain))
    }

    /// Resolve the active property matching `identifier` against hotel
    /// code, external property id, or property code.
    /// Fetches all active rows and matches in Rust rather than a three-way
    /// `OR` in SQL, since the set of active properties is small and this
    /// keeps the matching rule in one place shared with
    /// [`PropertyConfigRow::matches_identifier`].
    pub async fn find_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<PropertyConfig>, SqlxError> {
        let rows = sqlx::query_as::<_, PropertyConfigRow>(
            "SELECT * FROM travelclick_property_config WHERE is_active = true",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .find(|row| row.matches_identifier(identifier))
            .map(PropertyConfigRow::into_domain))
    }

    pub async fn list_active(&self) -> Result<Vec<PropertyConfig>, SqlxError> {
        let rows = sqlx::query_as::<_, PropertyConfigRow>(
            "SELECT * FROM travelclick_property_config WHERE is_active = true ORDER BY hotel_code",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(PropertyConfigRow::into_domain).collect())
    }

    pub async fn mark_health_check(&self, property_id: Uuid, healthy: bool) -> Result<(), SqlxError> {
        sqlx::query(
            "UPDATE travelclick_property_config SET healthy = $2, last_health_check = now(), updated_at = now() WHERE property_id = $1",
        )
        .bind(property_id)
        .bind(healthy)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
