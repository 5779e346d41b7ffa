use sqlx::migrate::{MigrateError, Migrator};

use crate::DbPool;

pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

pub async fn run_pending(pool: &DbPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await
}

#[cfg(test)]
mod tests {
    use sqlx::Row;

    use super::run_pending;
    use crate::connect_with_settings;

    const MANAGED_SCHEMA_OBJECTS: &[&str] = &["material", "stakeholder", "idx_material_name"];

    #[tokio::test]
    async fn migrations_create_the_baseline_schema() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("run migrations");

        for name in ["material", "stakeholder"] {
            let count = sqlx::query(
                "SELECT COUNT(*) AS count FROM sqlite_master WHERE type = 'table' AND name = ?1",
            )
            .bind(name)
            .fetch_one(&pool)
            .await
            .expect("schema lookup")
            .get::<i64, _>("count");
            assert_eq!(count, 1, "expected table `{name}` after migration");
        }

        pool.close().await;
    }

    #[tokio::test]
    async fn rerunning_migrations_is_a_no_op() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("first run");
        run_pending(&pool).await.expect("second run must not fail");

        let signature = managed_schema_signature(&pool).await;
        assert_eq!(signature.len(), MANAGED_SCHEMA_OBJECTS.len());

        pool.close().await;
    }

    #[tokio::test]
    async fn quantity_floor_is_enforced_by_the_schema() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("run migrations");

        let result = sqlx::query(
            "INSERT INTO material (name, unit, quantity) VALUES ('Nails', 'boxes', -1)",
        )
        .execute(&pool)
        .await;

        assert!(result.is_err(), "negative quantities must be rejected by the CHECK");
        pool.close().await;
    }

    async fn managed_schema_signature(pool: &sqlx::SqlitePool) -> Vec<(String, String)> {
        let mut signature: Vec<(String, String)> = sqlx::query(
            "SELECT type, name FROM sqlite_master WHERE type IN ('table', 'index')",
        )
        .fetch_all(pool)
        .await
        .expect("load schema objects")
        .into_iter()
        .filter_map(|row| {
            let name = row.get::<String, _>("name");
            MANAGED_SCHEMA_OBJECTS
                .contains(&name.as_str())
                .then(|| (row.get::<String, _>("type"), name))
        })
        .collect();
        signature.sort();
        signature
    }
}
