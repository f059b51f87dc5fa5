use std::path::PathBuf;

use anyhow::{Context, Result};
use tokio::fs;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

pub fn init_logging(level: &str, debug: bool) -> Result<()> {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        level.parse().context("Invalid log level")?
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.to_string())),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    Ok(())
}

pub struct LoadedConfig {
    pub config: Config,
    pub path: PathBuf,
}

pub async fn load_config(config_path: Option<&PathBuf>) -> Result<LoadedConfig> {
    let config_path = match config_path {
        Some(path) => path.clone(),
        None => default_config_path()?,
    };

    if !config_path.exists() {
        warn!(
            "Config file not found, using defaults: {}",
            config_path.display()
        );
        return Ok(LoadedConfig {
            config: Config::default(),
            path: config_path,
        });
    }

    let content = fs::read_to_string(&config_path)
        .await
        .with_context(|| format!("Failed to read config file {}", config_path.display()))?;
    let config: Config = if content.trim().is_empty() {
        Config::default()
    } else {
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", config_path.display()))?
    };

    info!("Loaded configuration from: {}", config_path.display());
    Ok(LoadedConfig {
        config,
        path: config_path,
    })
}

// Priority: ./config/config.yaml > <config dir>/tabtrail/config.yaml
fn default_config_path() -> Result<PathBuf> {
    let local_config = PathBuf::from("config/config.yaml");
    if local_config.exists() {
        return Ok(local_config);
    }
    let mut path = dirs::config_dir().context("Failed to get config directory")?;
    path.push("tabtrail");
    path.push("config.yaml");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn loads_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "collector:\n  port: 3999\n  strict: true\nrelay:\n  max_attempts: 3\n  dead_letter_capacity: 16"
        )
        .unwrap();

        let path = file.path().to_path_buf();
        let loaded = load_config(Some(&path)).await.unwrap();
        assert_eq!(loaded.path, path);
        assert_eq!(loaded.config.collector.port, 3999);
        assert!(loaded.config.collector.strict);
        assert_eq!(loaded.config.relay.max_attempts, 3);
        assert_eq!(loaded.config.relay.dead_letter_capacity, 16);
    }

    #[tokio::test]
    async fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.yaml");
        let loaded = load_config(Some(&path)).await.unwrap();
        assert_eq!(loaded.config, Config::default());
    }

    #[tokio::test]
    async fn invalid_yaml_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "collector: [not, a, map]").unwrap();
        let path = file.path().to_path_buf();
        assert!(load_config(Some(&path)).await.is_err());
    }
}
