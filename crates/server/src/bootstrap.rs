use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use sitestock_core::config::{AppConfig, ConfigError, LoadOptions};
use sitestock_db::repositories::{SqlMaterialRepository, SqlStakeholderRepository};
use sitestock_db::{connect_with_settings, migrations, DbPool};
use sitestock_oracle::llm::{DisabledLlmClient, HttpLlmClient, LlmClient};
use sitestock_oracle::relay::AnswerRelay;
use sitestock_sms::dispatcher::NotificationDispatcher;
use sitestock_sms::gateway::{DisabledGateway, HttpSmsGateway, SmsGateway};

use crate::dialog::DialogService;
use crate::inbox::InboxService;
use crate::routes::AppState;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub state: AppState,
    pub gateway_enabled: bool,
    pub oracle_enabled: bool,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("outbound http client construction failed: {0}")]
    HttpClient(String),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let db_pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        "database migrations applied"
    );

    let materials = Arc::new(SqlMaterialRepository::new(db_pool.clone()));
    let stakeholders = Arc::new(SqlStakeholderRepository::new(db_pool.clone()));

    let gateway_enabled = config.gateway.is_configured();
    let gateway: Arc<dyn SmsGateway> = if gateway_enabled {
        Arc::new(
            HttpSmsGateway::from_config(&config.gateway)
                .map_err(|error| BootstrapError::HttpClient(error.to_string()))?,
        )
    } else {
        warn!(
            event_name = "system.bootstrap.gateway_disabled",
            correlation_id = "bootstrap",
            "carrier gateway credentials absent; notification delivery disabled"
        );
        Arc::new(DisabledGateway)
    };
    let dispatcher = NotificationDispatcher::new(gateway);

    let oracle_enabled = config.oracle.is_configured();
    let llm: Arc<dyn LlmClient> = match config.oracle.api_key.clone().filter(|_| oracle_enabled) {
        Some(api_key) => Arc::new(
            HttpLlmClient::from_config(&config.oracle, api_key)
                .map_err(|error| BootstrapError::HttpClient(error.to_string()))?,
        ),
        None => {
            warn!(
                event_name = "system.bootstrap.oracle_disabled",
                correlation_id = "bootstrap",
                "oracle api key absent; free-text answers will use the fallback"
            );
            Arc::new(DisabledLlmClient)
        }
    };
    let relay = AnswerRelay::new(llm);

    let state = AppState {
        dialog: Arc::new(DialogService::new(
            materials.clone(),
            stakeholders,
            dispatcher.clone(),
        )),
        inbox: Arc::new(InboxService::new(materials, relay, dispatcher)),
    };

    Ok(Application { config, db_pool, state, gateway_enabled, oracle_enabled })
}

#[cfg(test)]
mod tests {
    use sitestock_core::config::{ConfigOverrides, LoadOptions};

    use crate::bootstrap::bootstrap;

    fn options(database_url: &str) -> LoadOptions {
        LoadOptions {
            overrides: ConfigOverrides {
                database_url: Some(database_url.to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        }
    }

    #[tokio::test]
    async fn bootstrap_applies_migrations_and_wires_the_data_path() {
        let app = bootstrap(options("sqlite::memory:?cache=shared"))
            .await
            .expect("bootstrap should succeed against an in-memory database");

        let (table_count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master \
             WHERE type = 'table' AND name IN ('material', 'stakeholder')",
        )
        .fetch_one(&app.db_pool)
        .await
        .expect("expected baseline tables after bootstrap");
        assert_eq!(table_count, 2, "bootstrap should expose the inventory schema");

        assert!(!app.gateway_enabled, "no credentials were provided");
        assert!(!app.oracle_enabled, "no oracle key was provided");

        app.db_pool.close().await;
    }

    #[tokio::test]
    async fn bootstrap_rejects_partial_gateway_credentials() {
        let result = bootstrap(LoadOptions {
            overrides: ConfigOverrides {
                database_url: Some("sqlite::memory:".to_string()),
                gateway_username: Some("sandbox".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })
        .await;

        let message = result.err().expect("partial credentials must fail").to_string();
        assert!(message.contains("gateway"));
    }
}
