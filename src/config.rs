use serde::Deserialize;
use std::path::PathBuf;

/// Application configuration.
///
/// Load precedence: environment variables > config file > defaults.
///
/// Environment variables:
/// - `DEVCONNECT_PORT`: port to listen on (default: 5000)
/// - `DEVCONNECT_DATABASE_PATH`: path to the SQLite database
/// - `DEVCONNECT_GITHUB_TOKEN`: optional token for the repository proxy
/// - `DEVCONNECT_CONFIG`: path to the YAML config file
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Port the API server listens on.
    pub port: u16,
    /// Path to the SQLite database.
    pub database_path: PathBuf,
    /// Optional token sent to the external repository-hosting API.
    pub github_token: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            port: 5000,
            database_path: data_dir.join("devconnect").join("devconnect.db"),
            github_token: None,
        }
    }
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults.
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            config = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;
        }

        if let Ok(port) = std::env::var("DEVCONNECT_PORT") {
            if let Ok(port) = port.parse() {
                config.port = port;
            }
        }
        if let Ok(db_path) = std::env::var("DEVCONNECT_DATABASE_PATH") {
            config.database_path = PathBuf::from(db_path);
        }
        if let Ok(token) = std::env::var("DEVCONNECT_GITHUB_TOKEN") {
            config.github_token = Some(token);
        }

        Ok(config)
    }

    /// Default config file path: `<config dir>/devconnect/config.yaml`.
    pub fn default_config_path() -> PathBuf {
        std::env::var("DEVCONNECT_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::config_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join("devconnect")
                    .join("config.yaml")
            })
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
