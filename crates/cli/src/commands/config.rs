use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::ExposeSecret;
use sitestock_core::config::{AppConfig, LoadOptions};
use toml::Value;

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key: &str, env_var: &str| {
        field_source(key, env_var, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let gateway_api_key = if config.gateway.api_key.expose_secret().is_empty() {
        "<unset>".to_string()
    } else {
        "<redacted>".to_string()
    };
    let oracle_api_key =
        (if config.oracle.is_configured() { "<redacted>" } else { "<unset>" }).to_string();

    let entries: Vec<(&str, String, String)> = vec![
        ("database.url", config.database.url.clone(), source("database.url", "SITESTOCK_DATABASE_URL")),
        (
            "database.max_connections",
            config.database.max_connections.to_string(),
            source("database.max_connections", "SITESTOCK_DATABASE_MAX_CONNECTIONS"),
        ),
        (
            "database.timeout_secs",
            config.database.timeout_secs.to_string(),
            source("database.timeout_secs", "SITESTOCK_DATABASE_TIMEOUT_SECS"),
        ),
        (
            "gateway.username",
            display_or_unset(&config.gateway.username),
            source("gateway.username", "SITESTOCK_GATEWAY_USERNAME"),
        ),
        ("gateway.api_key", gateway_api_key, source("gateway.api_key", "SITESTOCK_GATEWAY_API_KEY")),
        (
            "gateway.sender_id",
            display_or_unset(&config.gateway.sender_id),
            source("gateway.sender_id", "SITESTOCK_GATEWAY_SENDER_ID"),
        ),
        ("gateway.endpoint", config.gateway.endpoint.clone(), source("gateway.endpoint", "SITESTOCK_GATEWAY_ENDPOINT")),
        ("oracle.api_key", oracle_api_key, source("oracle.api_key", "SITESTOCK_ORACLE_API_KEY")),
        ("oracle.base_url", config.oracle.base_url.clone(), source("oracle.base_url", "SITESTOCK_ORACLE_BASE_URL")),
        ("oracle.model", config.oracle.model.clone(), source("oracle.model", "SITESTOCK_ORACLE_MODEL")),
        (
            "server.bind_address",
            config.server.bind_address.clone(),
            source("server.bind_address", "SITESTOCK_SERVER_BIND_ADDRESS"),
        ),
        ("server.port", config.server.port.to_string(), source("server.port", "SITESTOCK_SERVER_PORT")),
        (
            "server.health_check_port",
            config.server.health_check_port.to_string(),
            source("server.health_check_port", "SITESTOCK_SERVER_HEALTH_CHECK_PORT"),
        ),
        ("logging.level", config.logging.level.clone(), source("logging.level", "SITESTOCK_LOGGING_LEVEL")),
        (
            "logging.format",
            format!("{:?}", config.logging.format).to_lowercase(),
            source("logging.format", "SITESTOCK_LOGGING_FORMAT"),
        ),
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for (key, value, source) in entries {
        lines.push(format!("  {key} = {value}  [{source}]"));
    }
    lines.join("\n")
}

fn display_or_unset(value: &str) -> String {
    if value.is_empty() { "<unset>".to_string() } else { value.to_string() }
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from("sitestock.toml"), PathBuf::from("config/sitestock.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key: &str,
    env_var: &str,
    file_doc: Option<&Value>,
    file_path: Option<&Path>,
) -> String {
    if env::var(env_var).map(|value| !value.trim().is_empty()).unwrap_or(false) {
        return format!("env:{env_var}");
    }

    if let (Some(doc), Some(path)) = (file_doc, file_path) {
        if file_doc_has_key(doc, key) {
            return format!("file:{}", path.display());
        }
    }

    "default".to_string()
}

fn file_doc_has_key(doc: &Value, dotted_key: &str) -> bool {
    let mut cursor = doc;
    for part in dotted_key.split('.') {
        match cursor.get(part) {
            Some(next) => cursor = next,
            None => return false,
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use toml::Value;

    use super::file_doc_has_key;

    #[test]
    fn dotted_key_lookup_descends_tables() {
        let doc: Value = "[server]\nport = 9100".parse().expect("parse toml");
        assert!(file_doc_has_key(&doc, "server.port"));
        assert!(!file_doc_has_key(&doc, "server.bind_address"));
        assert!(!file_doc_has_key(&doc, "database.url"));
    }
}
