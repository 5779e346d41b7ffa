use async_trait::async_trait;
use thiserror::Error;

use sitestock_core::domain::material::{Material, MaterialId};
use sitestock_core::domain::stakeholder::Address;
use sitestock_core::errors::StockError;

pub mod material;
pub mod memory;
pub mod stakeholder;

pub use material::SqlMaterialRepository;
pub use memory::{InMemoryMaterialRepository, InMemoryStakeholderRepository};
pub use stakeholder::SqlStakeholderRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

impl From<RepositoryError> for StockError {
    fn from(error: RepositoryError) -> Self {
        StockError::Storage(error.to_string())
    }
}

#[async_trait]
pub trait MaterialRepository: Send + Sync {
    /// Materials ordered by name ascending with id as the tie-break, so
    /// menu numbering is identical between the select-material step and
    /// the later commit step of the same dialog.
    async fn list(&self) -> Result<Vec<Material>, RepositoryError>;

    async fn get(&self, id: MaterialId) -> Result<Option<Material>, RepositoryError>;

    /// Applies a signed quantity change as one indivisible operation: the
    /// current-quantity read, the `quantity + delta >= 0` bound check and
    /// the write happen atomically, so two concurrent usage commits can
    /// never both validate against the same stale quantity. Returns the
    /// post-delta quantity.
    async fn apply_delta(&self, id: MaterialId, delta: i64) -> Result<i64, StockError>;
}

#[async_trait]
pub trait StakeholderRepository: Send + Sync {
    async fn list_addresses(&self) -> Result<Vec<Address>, RepositoryError>;
}
