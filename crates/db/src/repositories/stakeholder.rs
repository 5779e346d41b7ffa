use sitestock_core::domain::stakeholder::Address;

use super::{RepositoryError, StakeholderRepository};
use crate::DbPool;

pub struct SqlStakeholderRepository {
    pool: DbPool,
}

impl SqlStakeholderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl StakeholderRepository for SqlStakeholderRepository {
    async fn list_addresses(&self) -> Result<Vec<Address>, RepositoryError> {
        let addresses = sqlx::query_scalar::<_, String>(
            "SELECT phone FROM stakeholder ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(addresses.into_iter().map(Address).collect())
    }
}
