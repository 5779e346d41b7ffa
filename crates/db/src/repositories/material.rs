use sqlx::{sqlite::SqliteRow, Row};

use sitestock_core::domain::material::{Material, MaterialId};
use sitestock_core::errors::StockError;

use super::{MaterialRepository, RepositoryError};
use crate::DbPool;

pub struct SqlMaterialRepository {
    pool: DbPool,
}

impl SqlMaterialRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl MaterialRepository for SqlMaterialRepository {
    async fn list(&self) -> Result<Vec<Material>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, name, unit, quantity
             FROM material
             ORDER BY name ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(material_from_row).collect()
    }

    async fn get(&self, id: MaterialId) -> Result<Option<Material>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, name, unit, quantity
             FROM material
             WHERE id = ?1",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.map(material_from_row).transpose()
    }

    async fn apply_delta(&self, id: MaterialId, delta: i64) -> Result<i64, StockError> {
        // Single conditional update: the bound check and the write are one
        // statement, so concurrent deltas against the same row serialize
        // at the storage engine instead of racing in application code.
        let updated: Option<i64> = sqlx::query_scalar(
            "UPDATE material
             SET quantity = quantity + ?2
             WHERE id = ?1 AND quantity + ?2 >= 0
             RETURNING quantity",
        )
        .bind(id.0)
        .bind(delta)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::Database)?;

        if let Some(new_quantity) = updated {
            return Ok(new_quantity);
        }

        // Nothing written. The follow-up read only decides which rejection
        // to report; the invariant never depended on it.
        let available: Option<i64> = sqlx::query_scalar(
            "SELECT quantity FROM material WHERE id = ?1",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::Database)?;

        match available {
            Some(available) => Err(StockError::Insufficient { available, requested: delta.abs() }),
            None => Err(StockError::NotFound(id)),
        }
    }
}

fn material_from_row(row: SqliteRow) -> Result<Material, RepositoryError> {
    Ok(Material {
        id: MaterialId(row.try_get("id").map_err(RepositoryError::Database)?),
        name: row.try_get("name").map_err(RepositoryError::Database)?,
        unit: row.try_get("unit").map_err(RepositoryError::Database)?,
        quantity: row.try_get("quantity").map_err(RepositoryError::Database)?,
    })
}
