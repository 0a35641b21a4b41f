//! Configuration loading for the task service.
//!
//! Values come from an optional YAML file with per-field defaults; the
//! CLI applies its overrides after loading.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Default bind port, matching the service this one replaces.
pub const DEFAULT_PORT: u16 = 5000;

/// Name of the project-local config file.
const PROJECT_CONFIG_FILE: &str = "task-api.yaml";

/// Environment variable naming an explicit config path.
const CONFIG_PATH_ENV: &str = "TASK_API_CONFIG";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Store settings.
    #[serde(default)]
    pub database: DatabaseConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind (default: 127.0.0.1).
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind (default: 5000).
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

/// Store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file (default: tasks.db).
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit path must exist and parse. Without one, the discovery
    /// chain is tried in order: `$TASK_API_CONFIG`, `./task-api.yaml`,
    /// `~/.task-api/config.yaml`; the first file that exists is used, and
    /// built-in defaults apply when none does.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        for path in Self::discover_paths() {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Candidate config locations, highest priority first. A set
    /// `$TASK_API_CONFIG` naming a missing file is reported and skipped.
    fn discover_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Ok(env_path) = std::env::var(CONFIG_PATH_ENV) {
            let path = PathBuf::from(env_path);
            if !path.exists() {
                warn!(
                    "Config file named by {} does not exist, skipping: {}",
                    CONFIG_PATH_ENV,
                    path.display()
                );
            }
            paths.push(path);
        }

        paths.push(PathBuf::from(PROJECT_CONFIG_FILE));

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".task-api").join("config.yaml"));
        }

        paths
    }

    /// Parse configuration from a YAML file. An empty file means defaults.
    fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        Ok(config)
    }

    /// The address string the listener should bind.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_db_path() -> PathBuf {
    PathBuf::from("tasks.db")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.database.path, PathBuf::from("tasks.db"));
    }

    #[test]
    fn test_partial_yaml_fills_remaining_defaults() {
        let config: Config = serde_yaml::from_str("server:\n  port: 9000\n").unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.database.path, PathBuf::from("tasks.db"));
    }

    #[test]
    fn test_bind_addr_joins_host_and_port() {
        let mut config = Config::default();
        config.server.host = "0.0.0.0".to_string();
        config.server.port = 8080;
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_explicit_file_is_loaded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "database:\n  path: /tmp/other.db").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.database.path, PathBuf::from("/tmp/other.db"));
        assert_eq!(config.server.port, DEFAULT_PORT);
    }

    #[test]
    fn test_empty_explicit_file_uses_defaults() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.server.port, DEFAULT_PORT);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let result = Config::load(Some(Path::new("/nonexistent/task-api.yaml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_env_config_pointing_nowhere_falls_through() {
        // SAFETY: no other test reads or writes this variable, and the
        // discovery under test runs on this same thread.
        unsafe { std::env::set_var(CONFIG_PATH_ENV, "/nonexistent/task-api.yaml") };

        let result = Config::load(None);

        // SAFETY: as above.
        unsafe { std::env::remove_var(CONFIG_PATH_ENV) };

        let config = result.unwrap();
        assert_eq!(config.server.port, DEFAULT_PORT);
    }

    #[test]
    fn test_garbage_yaml_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "server: [not, a, mapping]").unwrap();

        assert!(Config::load(Some(file.path())).is_err());
    }
}
