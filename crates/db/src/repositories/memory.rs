//! In-memory repository doubles for engine and transport tests. They honor
//! the same atomicity contract as the SQL implementations: the bound check
//! and the write happen under one lock acquisition.

use tokio::sync::RwLock;

use sitestock_core::domain::material::{Material, MaterialId};
use sitestock_core::domain::stakeholder::Address;
use sitestock_core::errors::StockError;

use super::{MaterialRepository, RepositoryError, StakeholderRepository};

#[derive(Default)]
pub struct InMemoryMaterialRepository {
    materials: RwLock<Vec<Material>>,
}

impl InMemoryMaterialRepository {
    pub fn with_materials(materials: Vec<Material>) -> Self {
        Self { materials: RwLock::new(materials) }
    }
}

#[async_trait::async_trait]
impl MaterialRepository for InMemoryMaterialRepository {
    async fn list(&self) -> Result<Vec<Material>, RepositoryError> {
        let materials = self.materials.read().await;
        let mut snapshot = materials.clone();
        snapshot.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(snapshot)
    }

    async fn get(&self, id: MaterialId) -> Result<Option<Material>, RepositoryError> {
        let materials = self.materials.read().await;
        Ok(materials.iter().find(|material| material.id == id).cloned())
    }

    async fn apply_delta(&self, id: MaterialId, delta: i64) -> Result<i64, StockError> {
        let mut materials = self.materials.write().await;
        let Some(material) = materials.iter_mut().find(|material| material.id == id) else {
            return Err(StockError::NotFound(id));
        };

        let next = material.quantity + delta;
        if next < 0 {
            return Err(StockError::Insufficient {
                available: material.quantity,
                requested: delta.abs(),
            });
        }

        material.quantity = next;
        Ok(next)
    }
}

#[derive(Default)]
pub struct InMemoryStakeholderRepository {
    addresses: RwLock<Vec<Address>>,
}

impl InMemoryStakeholderRepository {
    pub fn with_addresses(addresses: Vec<Address>) -> Self {
        Self { addresses: RwLock::new(addresses) }
    }
}

#[async_trait::async_trait]
impl StakeholderRepository for InMemoryStakeholderRepository {
    async fn list_addresses(&self) -> Result<Vec<Address>, RepositoryError> {
        let addresses = self.addresses.read().await;
        Ok(addresses.clone())
    }
}

#[cfg(test)]
mod tests {
    use sitestock_core::domain::material::{Material, MaterialId};
    use sitestock_core::errors::StockError;

    use crate::repositories::{InMemoryMaterialRepository, MaterialRepository};

    fn cement(quantity: i64) -> Material {
        Material {
            id: MaterialId(1),
            name: "Cement".to_string(),
            unit: "bags".to_string(),
            quantity,
        }
    }

    #[tokio::test]
    async fn listing_sorts_by_name_then_id() {
        let repo = InMemoryMaterialRepository::with_materials(vec![
            Material { id: MaterialId(3), name: "Sand".into(), unit: "tonnes".into(), quantity: 1 },
            Material { id: MaterialId(2), name: "Cement".into(), unit: "bags".into(), quantity: 1 },
            Material { id: MaterialId(1), name: "Cement".into(), unit: "bags".into(), quantity: 1 },
        ]);

        let names: Vec<(i64, String)> = repo
            .list()
            .await
            .expect("list")
            .into_iter()
            .map(|material| (material.id.0, material.name))
            .collect();

        assert_eq!(
            names,
            vec![(1, "Cement".to_string()), (2, "Cement".to_string()), (3, "Sand".to_string())]
        );
    }

    #[tokio::test]
    async fn delta_rejection_leaves_the_quantity_untouched() {
        let repo = InMemoryMaterialRepository::with_materials(vec![cement(5)]);

        let error = repo.apply_delta(MaterialId(1), -10).await.expect_err("must reject");
        assert_eq!(error, StockError::Insufficient { available: 5, requested: 10 });

        let remaining = repo.get(MaterialId(1)).await.expect("get").expect("present").quantity;
        assert_eq!(remaining, 5);
    }

    #[tokio::test]
    async fn unknown_material_is_not_found() {
        let repo = InMemoryMaterialRepository::default();
        let error = repo.apply_delta(MaterialId(9), 1).await.expect_err("must reject");
        assert_eq!(error, StockError::NotFound(MaterialId(9)));
    }
}
