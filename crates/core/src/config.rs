use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub gateway: GatewayConfig,
    pub oracle: OracleConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
}

/// Carrier gateway credentials. All three identity fields empty means the
/// gateway is deliberately disabled: the server still runs, deliveries are
/// reported as skipped. Partial credentials are a validation error.
#[derive(Clone, Debug)]
pub struct GatewayConfig {
    pub username: String,
    pub api_key: SecretString,
    pub sender_id: String,
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl GatewayConfig {
    pub fn is_configured(&self) -> bool {
        !self.username.is_empty()
            && !self.api_key.expose_secret().is_empty()
            && !self.sender_id.is_empty()
    }
}

/// Free-text answer oracle. A missing API key disables the client; the
/// answer relay falls back to its fixed reply.
#[derive(Clone, Debug)]
pub struct OracleConfig {
    pub api_key: Option<SecretString>,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl OracleConfig {
    pub fn is_configured(&self) -> bool {
        self.api_key.as_ref().is_some_and(|key| !key.expose_secret().is_empty())
    }
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub health_check_port: u16,
    pub graceful_shutdown_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub database_url: Option<String>,
    pub log_level: Option<String>,
    pub gateway_username: Option<String>,
    pub gateway_api_key: Option<String>,
    pub gateway_sender_id: Option<String>,
    pub oracle_api_key: Option<String>,
    pub oracle_base_url: Option<String>,
    pub oracle_model: Option<String>,
    pub server_port: Option<u16>,
    pub health_check_port: Option<u16>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite://sitestock.db".to_string(),
                max_connections: 5,
                timeout_secs: 30,
            },
            gateway: GatewayConfig {
                username: String::new(),
                api_key: String::new().into(),
                sender_id: String::new(),
                endpoint: "https://api.africastalking.com/version1/messaging".to_string(),
                timeout_secs: 15,
            },
            oracle: OracleConfig {
                api_key: None,
                base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
                model: "gemini-1.5-flash".to_string(),
                timeout_secs: 30,
            },
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 5000,
                health_check_port: 8080,
                graceful_shutdown_secs: 15,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    /// Load order: built-in defaults, then the TOML file (with `${ENV}`
    /// interpolation), then `SITESTOCK_*` environment overrides, then
    /// programmatic overrides, then validation.
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("sitestock.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(database) = patch.database {
            if let Some(url) = database.url {
                self.database.url = url;
            }
            if let Some(max_connections) = database.max_connections {
                self.database.max_connections = max_connections;
            }
            if let Some(timeout_secs) = database.timeout_secs {
                self.database.timeout_secs = timeout_secs;
            }
        }

        if let Some(gateway) = patch.gateway {
            if let Some(username) = gateway.username {
                self.gateway.username = username;
            }
            if let Some(api_key) = gateway.api_key {
                self.gateway.api_key = secret_value(api_key);
            }
            if let Some(sender_id) = gateway.sender_id {
                self.gateway.sender_id = sender_id;
            }
            if let Some(endpoint) = gateway.endpoint {
                self.gateway.endpoint = endpoint;
            }
            if let Some(timeout_secs) = gateway.timeout_secs {
                self.gateway.timeout_secs = timeout_secs;
            }
        }

        if let Some(oracle) = patch.oracle {
            if let Some(api_key) = oracle.api_key {
                self.oracle.api_key = Some(secret_value(api_key));
            }
            if let Some(base_url) = oracle.base_url {
                self.oracle.base_url = base_url;
            }
            if let Some(model) = oracle.model {
                self.oracle.model = model;
            }
            if let Some(timeout_secs) = oracle.timeout_secs {
                self.oracle.timeout_secs = timeout_secs;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(health_check_port) = server.health_check_port {
                self.server.health_check_port = health_check_port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("SITESTOCK_DATABASE_URL") {
            self.database.url = value;
        }
        if let Some(value) = read_env("SITESTOCK_DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections =
                parse_u32("SITESTOCK_DATABASE_MAX_CONNECTIONS", &value)?;
        }
        if let Some(value) = read_env("SITESTOCK_DATABASE_TIMEOUT_SECS") {
            self.database.timeout_secs = parse_u64("SITESTOCK_DATABASE_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("SITESTOCK_GATEWAY_USERNAME") {
            self.gateway.username = value;
        }
        if let Some(value) = read_env("SITESTOCK_GATEWAY_API_KEY") {
            self.gateway.api_key = secret_value(value);
        }
        if let Some(value) = read_env("SITESTOCK_GATEWAY_SENDER_ID") {
            self.gateway.sender_id = value;
        }
        if let Some(value) = read_env("SITESTOCK_GATEWAY_ENDPOINT") {
            self.gateway.endpoint = value;
        }
        if let Some(value) = read_env("SITESTOCK_GATEWAY_TIMEOUT_SECS") {
            self.gateway.timeout_secs = parse_u64("SITESTOCK_GATEWAY_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("SITESTOCK_ORACLE_API_KEY") {
            self.oracle.api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("SITESTOCK_ORACLE_BASE_URL") {
            self.oracle.base_url = value;
        }
        if let Some(value) = read_env("SITESTOCK_ORACLE_MODEL") {
            self.oracle.model = value;
        }
        if let Some(value) = read_env("SITESTOCK_ORACLE_TIMEOUT_SECS") {
            self.oracle.timeout_secs = parse_u64("SITESTOCK_ORACLE_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("SITESTOCK_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("SITESTOCK_SERVER_PORT") {
            self.server.port = parse_u16("SITESTOCK_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("SITESTOCK_SERVER_HEALTH_CHECK_PORT") {
            self.server.health_check_port =
                parse_u16("SITESTOCK_SERVER_HEALTH_CHECK_PORT", &value)?;
        }
        if let Some(value) = read_env("SITESTOCK_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_u64("SITESTOCK_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }

        let log_level =
            read_env("SITESTOCK_LOGGING_LEVEL").or_else(|| read_env("SITESTOCK_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("SITESTOCK_LOGGING_FORMAT").or_else(|| read_env("SITESTOCK_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(database_url) = overrides.database_url {
            self.database.url = database_url;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(username) = overrides.gateway_username {
            self.gateway.username = username;
        }
        if let Some(api_key) = overrides.gateway_api_key {
            self.gateway.api_key = secret_value(api_key);
        }
        if let Some(sender_id) = overrides.gateway_sender_id {
            self.gateway.sender_id = sender_id;
        }
        if let Some(api_key) = overrides.oracle_api_key {
            self.oracle.api_key = Some(secret_value(api_key));
        }
        if let Some(base_url) = overrides.oracle_base_url {
            self.oracle.base_url = base_url;
        }
        if let Some(model) = overrides.oracle_model {
            self.oracle.model = model;
        }
        if let Some(port) = overrides.server_port {
            self.server.port = port;
        }
        if let Some(port) = overrides.health_check_port {
            self.server.health_check_port = port;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_database(&self.database)?;
        validate_gateway(&self.gateway)?;
        validate_oracle(&self.oracle)?;
        validate_server(&self.server)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigPatch {
    database: Option<DatabasePatch>,
    gateway: Option<GatewayPatch>,
    oracle: Option<OraclePatch>,
    server: Option<ServerPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct DatabasePatch {
    url: Option<String>,
    max_connections: Option<u32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct GatewayPatch {
    username: Option<String>,
    api_key: Option<String>,
    sender_id: Option<String>,
    endpoint: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct OraclePatch {
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    health_check_port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("sitestock.toml"), PathBuf::from("config/sitestock.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_database(database: &DatabaseConfig) -> Result<(), ConfigError> {
    let url = database.url.trim();
    let sqlite_url =
        url.starts_with("sqlite://") || url.starts_with("sqlite::") || url == ":memory:";
    if !sqlite_url {
        return Err(ConfigError::Validation(
            "database.url must be a sqlite URL (`sqlite://...`, `sqlite::...`, or `:memory:`)"
                .to_string(),
        ));
    }

    if database.max_connections == 0 {
        return Err(ConfigError::Validation(
            "database.max_connections must be greater than zero".to_string(),
        ));
    }

    if database.timeout_secs == 0 || database.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "database.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_gateway(gateway: &GatewayConfig) -> Result<(), ConfigError> {
    let identity = [
        ("gateway.username", !gateway.username.is_empty()),
        ("gateway.api_key", !gateway.api_key.expose_secret().is_empty()),
        ("gateway.sender_id", !gateway.sender_id.is_empty()),
    ];

    // All-empty means the gateway is deliberately off; partial credentials
    // are almost certainly a typo'd deployment.
    let set = identity.iter().filter(|(_, present)| *present).count();
    if set != 0 && set != identity.len() {
        let missing: Vec<&str> = identity
            .iter()
            .filter_map(|(key, present)| (!present).then_some(*key))
            .collect();
        return Err(ConfigError::Validation(format!(
            "incomplete gateway credentials: {} missing (set all of username/api_key/sender_id, or none to disable delivery)",
            missing.join(", ")
        )));
    }

    if gateway.endpoint.trim().is_empty() {
        return Err(ConfigError::Validation("gateway.endpoint must not be empty".to_string()));
    }

    if gateway.timeout_secs == 0 || gateway.timeout_secs > 120 {
        return Err(ConfigError::Validation(
            "gateway.timeout_secs must be in range 1..=120".to_string(),
        ));
    }

    Ok(())
}

fn validate_oracle(oracle: &OracleConfig) -> Result<(), ConfigError> {
    if oracle.base_url.trim().is_empty() {
        return Err(ConfigError::Validation("oracle.base_url must not be empty".to_string()));
    }

    if oracle.model.trim().is_empty() {
        return Err(ConfigError::Validation("oracle.model must not be empty".to_string()));
    }

    if oracle.timeout_secs == 0 || oracle.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "oracle.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.bind_address.trim().is_empty() {
        return Err(ConfigError::Validation("server.bind_address must not be empty".to_string()));
    }

    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    if server.health_check_port == 0 {
        return Err(ConfigError::Validation(
            "server.health_check_port must be greater than zero".to_string(),
        ));
    }

    if server.port == server.health_check_port {
        return Err(ConfigError::Validation(
            "server.port and server.health_check_port must differ".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    const LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
    let level = logging.level.trim().to_ascii_lowercase();
    if !LEVELS.contains(&level.as_str()) {
        return Err(ConfigError::Validation(format!(
            "logging.level `{}` is not one of trace|debug|info|warn|error",
            logging.level
        )));
    }
    Ok(())
}

fn read_env(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        _ => None,
    }
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidEnvOverride { key: key.to_string(), value: value.to_string() })
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidEnvOverride { key: key.to_string(), value: value.to_string() })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidEnvOverride { key: key.to_string(), value: value.to_string() })
}
