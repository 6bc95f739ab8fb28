use crate::ml::MLConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming an override config file
pub const CONFIG_PATH_ENV: &str = "AGRISENSE_CONFIG";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Data file locations
    #[serde(default)]
    pub data: DataConfig,

    /// Credential store and sessions
    #[serde(default)]
    pub auth: AuthConfig,

    /// Model training parameters
    #[serde(default)]
    pub ml: MLConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path = std::env::var(CONFIG_PATH_ENV)
            .unwrap_or_else(|_| "config/agrisense.toml".to_string());
        Self::load_from(&config_path)
    }

    /// Load with an explicit override file (optional on disk)
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            // Start with default values
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            // Override with config file if it exists
            .add_source(config::File::with_name(config_path).required(false))
            // Override with environment variables (prefix: AGRISENSE_)
            .add_source(
                config::Environment::with_prefix("AGRISENSE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Socket address string for the HTTP server
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Historical sensor CSV
    #[serde(default = "default_history_path")]
    pub history_path: PathBuf,

    /// Trained model artifact
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,

    /// Where the training pipeline writes predictions
    #[serde(default = "default_predictions_path")]
    pub predictions_path: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            history_path: default_history_path(),
            model_path: default_model_path(),
            predictions_path: default_predictions_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Sled database holding user credentials
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Session lifetime (minutes)
    #[serde(default = "default_session_ttl")]
    pub session_ttl_minutes: i64,

    /// SHA-256 rounds for new password hashes
    #[serde(default = "default_hash_iterations")]
    pub hash_iterations: u32,

    /// User created on first start when the store is empty
    #[serde(default)]
    pub bootstrap_admin: Option<String>,

    /// Environment variable holding the bootstrap user's password
    #[serde(default = "default_bootstrap_password_env")]
    pub bootstrap_password_env: String,
}

impl AuthConfig {
    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.session_ttl_minutes)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            session_ttl_minutes: default_session_ttl(),
            hash_iterations: default_hash_iterations(),
            bootstrap_admin: None,
            bootstrap_password_env: default_bootstrap_password_env(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub json_logs: bool,

    /// Enable Prometheus metrics
    #[serde(default = "default_true")]
    pub prometheus_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logs: false,
            prometheus_enabled: true,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_history_path() -> PathBuf {
    PathBuf::from("data/agriculture_data.csv")
}

fn default_model_path() -> PathBuf {
    PathBuf::from("models/agrisense_model.bin")
}

fn default_predictions_path() -> PathBuf {
    PathBuf::from("data/predictions_with_recommendations.csv")
}

fn default_db_path() -> PathBuf {
    PathBuf::from("data/users.db")
}

fn default_session_ttl() -> i64 {
    480
}

fn default_hash_iterations() -> u32 {
    crate::auth::DEFAULT_ITERATIONS
}

fn default_bootstrap_password_env() -> String {
    "AGRISENSE_ADMIN_PASSWORD".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::ModelType;

    #[test]
    fn test_embedded_defaults() {
        let config = Config::load_from("does/not/exist.toml").unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.ml.algorithm, ModelType::RandomForest);
        assert_eq!(config.ml.n_trees, 100);
        assert_eq!(config.ml.seed, 42);
        assert_eq!(config.auth.session_ttl_minutes, 480);
        assert!(config.auth.bootstrap_admin.is_none());
        assert!(config.observability.prometheus_enabled);
    }

    #[test]
    fn test_file_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("override.toml");
        std::fs::write(
            &path,
            "[server]\nport = 9999\n\n[ml]\nalgorithm = \"decision_tree\"\n\n[auth]\nbootstrap_admin = \"admin\"\n",
        )
        .unwrap();

        let config = Config::load_from(path.to_str().unwrap()).unwrap();
        assert_eq!(config.server.port, 9999);
        assert_eq!(config.ml.algorithm, ModelType::DecisionTree);
        assert_eq!(config.auth.bootstrap_admin.as_deref(), Some("admin"));
        assert_eq!(config.bind_address(), "0.0.0.0:9999");
    }
}
