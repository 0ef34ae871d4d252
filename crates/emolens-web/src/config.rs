//! Application configuration

use crate::cli::{Cli, Commands};
use emolens_classifiers::ModelSettings;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Address the web server binds to
    #[serde(default = "default_listen_address")]
    pub listen_address: String,

    /// Port the web server binds to
    #[serde(default = "default_port")]
    pub port: u16,

    /// SQLite file for the visit and prediction logs
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Frozen model and its label table
    #[serde(default)]
    pub model: ModelSettings,

    /// Reject empty or whitespace-only submissions before classification
    #[serde(default = "default_true")]
    pub reject_blank_input: bool,
}

impl AppConfig {
    /// Load configuration from file and CLI overrides
    pub fn load(config_path: &Path, cli: &Cli) -> anyhow::Result<Self> {
        // Try to load from file, or use defaults
        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            Self::from_yaml(&content)?
        } else {
            Self::default()
        };

        config.apply_overrides(cli);
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Apply command-line flags on top of file values
    pub fn apply_overrides(&mut self, cli: &Cli) {
        if let Some(database) = &cli.database {
            self.database_path = database.clone();
        }
        if let Some(model) = &cli.model {
            self.model.path = Some(model.clone());
        }
        if let Some(table) = &cli.label_table {
            self.model.label_table = table.clone();
        }
        if cli.allow_blank {
            self.reject_blank_input = false;
        }

        if let Commands::Serve { address, port } = &cli.command {
            if let Some(address) = address {
                self.listen_address = address.clone();
            }
            if let Some(port) = port {
                self.port = *port;
            }
        }
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.listen_address, self.port).parse()?)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listen_address: default_listen_address(),
            port: default_port(),
            database_path: default_database_path(),
            model: ModelSettings::default(),
            reject_blank_input: true,
        }
    }
}

fn default_listen_address() -> String {
    "127.0.0.1".to_string()
}

/// Port the UI listens on when neither the file nor the CLI names one
pub const DEFAULT_PORT: u16 = 8501;

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_database_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("emolens").join("emolens.db"))
        .unwrap_or_else(|| PathBuf::from("./emolens.db"))
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use emolens_classifiers::DeviceType;

    #[test]
    fn test_defaults_from_empty_yaml() {
        let config = AppConfig::from_yaml("{}").unwrap();
        assert_eq!(config.listen_address, "127.0.0.1");
        assert_eq!(config.port, 8501);
        assert!(config.reject_blank_input);
        assert!(config.model.path.is_none());
        assert_eq!(config.model.label_table, "v1");
        assert!(config.database_path.ends_with("emolens.db"));
    }

    #[test]
    fn test_yaml_fields() {
        let config = AppConfig::from_yaml(
            r#"
listen_address: 0.0.0.0
port: 8080
database_path: /var/lib/emolens/logs.db
reject_blank_input: false
model:
  path: ./models/emotion_lr.json
  label_table: v1
"#,
        )
        .unwrap();

        assert_eq!(config.socket_addr().unwrap().to_string(), "0.0.0.0:8080");
        assert_eq!(config.database_path, PathBuf::from("/var/lib/emolens/logs.db"));
        assert_eq!(
            config.model.path,
            Some(PathBuf::from("./models/emotion_lr.json"))
        );
        assert!(!config.reject_blank_input);
    }

    #[test]
    fn test_gpu_device_values() {
        let config = AppConfig::from_yaml("model:\n  device: cuda\n").unwrap();
        assert_eq!(config.model.device, DeviceType::Cuda(0));

        let config = AppConfig::from_yaml("model:\n  device:\n    cuda: 1\n").unwrap();
        assert_eq!(config.model.device, DeviceType::Cuda(1));

        let config = AppConfig::from_yaml("model:\n  device: metal\n").unwrap();
        assert_eq!(config.model.device, DeviceType::Metal(0));

        assert!(AppConfig::from_yaml("model:\n  device: quantum\n").is_err());
    }

    #[test]
    fn test_cli_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("emolens.yaml");
        std::fs::write(&path, "port: 9100\nlisten_address: 0.0.0.0\n").unwrap();

        let cli = Cli::try_parse_from([
            "emolens",
            "serve",
            "--port",
            "9200",
            "--allow-blank",
            "--database",
            "logs.db",
        ])
        .unwrap();
        let config = AppConfig::load(&path, &cli).unwrap();

        assert_eq!(config.port, 9200);
        assert_eq!(config.listen_address, "0.0.0.0");
        assert_eq!(config.database_path, PathBuf::from("logs.db"));
        assert!(!config.reject_blank_input);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let cli = Cli::try_parse_from(["emolens", "classify", "hello"]).unwrap();
        let config = AppConfig::load(Path::new("/nonexistent/emolens.yaml"), &cli).unwrap();
        assert_eq!(config.port, 8501);
    }
}
