use serde::{Deserialize, Serialize};
use anyhow::{Context, Result};
use std::path::Path;
use std::str::FromStr;
use tokio::fs;
use tokio::time::Duration;
use crate::prober::ProbeConfig;

const DEFAULT_CONFIG_FILE: &str = "probe.json";

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub ports: Vec<u16>,
    /// 0 means the built-in default
    #[serde(default)]
    pub timeout_ms: u64,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
    #[serde(default)]
    pub print_metrics: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ports: Vec::new(),
            timeout_ms: 0,
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            print_metrics: false,
        }
    }
}

impl AppConfig {
    /// Loads from `$PROBE_CONFIG`, else `probe.json` if present, else defaults.
    pub async fn load() -> Result<Self> {
        match std::env::var("PROBE_CONFIG") {
            Ok(path) => Self::load_file_config(&path).await,
            Err(_) if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::load_file_config(DEFAULT_CONFIG_FILE).await
            }
            Err(_) => Ok(Self::default()),
        }
    }

    pub async fn load_file_config(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("reading probe config {}", path.display()))?;
        let config: AppConfig = serde_json::from_str(&content)
            .with_context(|| format!("parsing probe config {}", path.display()))?;
        config.tracing_level()?;
        Ok(config)
    }

    /// Accepts any name `tracing::Level` parses, plus `warning`.
    pub fn tracing_level(&self) -> Result<tracing::Level> {
        let name = match self.log_level.trim() {
            alias if alias.eq_ignore_ascii_case("warning") => "warn",
            name => name,
        };
        tracing::Level::from_str(name)
            .with_context(|| format!("unknown log level `{}`", self.log_level))
    }

    pub fn probe_config(&self) -> ProbeConfig {
        ProbeConfig::new(self.ports.clone(), Duration::from_millis(self.timeout_ms))
    }
}
