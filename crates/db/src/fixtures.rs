//! Deterministic demo dataset for local runs and the operator `seed`
//! command. Inserts are idempotent; quantities are only written on first
//! creation so reseeding never clobbers live stock counts.

use crate::connection::DbPool;
use crate::repositories::RepositoryError;

const SEED_MATERIALS: &[(&str, &str, i64)] = &[
    ("Cement", "bags", 40),
    ("Gravel", "tonnes", 15),
    ("Sand", "tonnes", 25),
    ("Steel Rods", "metres", 120),
];

const SEED_STAKEHOLDERS: &[(&str, &str)] = &[("Site Manager", "+255700000001")];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeedResult {
    pub materials_seeded: usize,
    pub stakeholders_seeded: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerificationResult {
    pub all_present: bool,
    pub checks: Vec<(&'static str, bool)>,
}

pub struct SeedDataset;

impl SeedDataset {
    pub async fn load(pool: &DbPool) -> Result<SeedResult, RepositoryError> {
        for (name, unit, quantity) in SEED_MATERIALS {
            sqlx::query(
                "INSERT INTO material (name, unit, quantity) VALUES (?1, ?2, ?3)
                 ON CONFLICT(name) DO NOTHING",
            )
            .bind(name)
            .bind(unit)
            .bind(quantity)
            .execute(pool)
            .await?;
        }

        for (name, phone) in SEED_STAKEHOLDERS {
            sqlx::query(
                "INSERT INTO stakeholder (name, phone) VALUES (?1, ?2)
                 ON CONFLICT(phone) DO NOTHING",
            )
            .bind(name)
            .bind(phone)
            .execute(pool)
            .await?;
        }

        Ok(SeedResult {
            materials_seeded: SEED_MATERIALS.len(),
            stakeholders_seeded: SEED_STAKEHOLDERS.len(),
        })
    }

    pub async fn verify(pool: &DbPool) -> Result<VerificationResult, RepositoryError> {
        let material_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM material").fetch_one(pool).await?;
        let stakeholder_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM stakeholder").fetch_one(pool).await?;
        let negative_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM material WHERE quantity < 0")
                .fetch_one(pool)
                .await?;

        let checks = vec![
            ("materials-present", material_count >= SEED_MATERIALS.len() as i64),
            ("stakeholders-present", stakeholder_count >= SEED_STAKEHOLDERS.len() as i64),
            ("quantities-non-negative", negative_count == 0),
        ];
        let all_present = checks.iter().all(|(_, passed)| *passed);

        Ok(VerificationResult { all_present, checks })
    }
}
