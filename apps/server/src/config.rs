//! Server configuration.
//!
//! Read from a TOML file (`$LINETRACE_CONFIG`, default `./linetrace.toml`)
//! when present, then overridden by environment variables:
//! `PORT`, `HOST`, `ENVIRONMENT`, `EXPORT_DIR`.

use std::path::PathBuf;

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};

use linetrace_api_server::{ApiSettings, ServerConfig};
use linetrace_command_log::LimitPolicy;
use linetrace_protocol::constants::{
    COMMAND_CAPACITY, DEFAULT_HISTORY_COUNT, DEFAULT_LOG_LIMIT, DEVICE_PLACEHOLDER,
    IDLE_PLACEHOLDER, MAX_LOG_LIMIT, TELEMETRY_CAPACITY,
};

const CONFIG_ENV: &str = "LINETRACE_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "linetrace.toml";

/// Deployment mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("production") {
            Environment::Production
        } else {
            Environment::Development
        }
    }

    /// Log filter used when `RUST_LOG` is not set.
    pub fn default_log_filter(self) -> &'static str {
        match self {
            Environment::Production => "info",
            Environment::Development => "info,linetrace=debug",
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Name of this instance (hostname by default).
    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub environment: Environment,

    #[serde(default = "default_command_capacity")]
    pub command_capacity: usize,

    #[serde(default = "default_telemetry_capacity")]
    pub telemetry_capacity: usize,

    #[serde(default = "default_log_limit")]
    pub default_log_limit: usize,

    #[serde(default = "default_max_log_limit")]
    pub max_log_limit: usize,

    #[serde(default = "default_history_count")]
    pub default_history_count: usize,

    /// Shown on the dashboard before any command arrives.
    #[serde(default = "default_idle_placeholder")]
    pub idle_placeholder: String,

    /// Sent to the vehicle before any command arrives.
    #[serde(default = "default_device_placeholder")]
    pub device_placeholder: String,

    /// Where telemetry exports are written.
    #[serde(default = "default_export_dir")]
    pub export_dir: PathBuf,
}

fn default_name() -> String {
    hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "linetrace".into())
}

fn default_host() -> String {
    "0.0.0.0".into()
}

fn default_port() -> u16 {
    8000
}

fn default_command_capacity() -> usize {
    COMMAND_CAPACITY
}

fn default_telemetry_capacity() -> usize {
    TELEMETRY_CAPACITY
}

fn default_log_limit() -> usize {
    DEFAULT_LOG_LIMIT
}

fn default_max_log_limit() -> usize {
    MAX_LOG_LIMIT
}

fn default_history_count() -> usize {
    DEFAULT_HISTORY_COUNT
}

fn default_idle_placeholder() -> String {
    IDLE_PLACEHOLDER.into()
}

fn default_device_placeholder() -> String {
    DEVICE_PLACEHOLDER.into()
}

fn default_export_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: default_name(),
            host: default_host(),
            port: default_port(),
            environment: Environment::default(),
            command_capacity: default_command_capacity(),
            telemetry_capacity: default_telemetry_capacity(),
            default_log_limit: default_log_limit(),
            max_log_limit: default_max_log_limit(),
            default_history_count: default_history_count(),
            idle_placeholder: default_idle_placeholder(),
            device_placeholder: default_device_placeholder(),
            export_dir: default_export_dir(),
        }
    }
}

impl Config {
    /// Load from the config file (if any) and the process environment.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(std::env::var_os(CONFIG_ENV).map(PathBuf::from), |key| {
            std::env::var(key).ok()
        })
    }

    /// Load from `path` (default `./linetrace.toml`), apply overrides from
    /// `lookup`, then validate. A missing file yields the defaults.
    pub fn load_from<F>(path: Option<PathBuf>, lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        let mut config = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            Self::from_toml(&content).with_context(|| format!("parsing {}", path.display()))?
        } else {
            Config::default()
        };

        config.apply_env(lookup)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply environment overrides through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT") {
            self.port = port
                .trim()
                .parse()
                .with_context(|| format!("invalid PORT: {port}"))?;
        }
        if let Some(host) = lookup("HOST") {
            self.host = host;
        }
        if let Some(env) = lookup("ENVIRONMENT") {
            self.environment = Environment::parse(&env);
        }
        if let Some(dir) = lookup("EXPORT_DIR") {
            self.export_dir = PathBuf::from(dir);
        }
        Ok(())
    }

    /// Reject values the stores cannot work with.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.command_capacity == 0 || self.telemetry_capacity == 0 {
            bail!("store capacities must be greater than zero");
        }
        if self.default_log_limit == 0 || self.max_log_limit == 0 {
            bail!("log limits must be greater than zero");
        }
        if self.default_log_limit > self.max_log_limit {
            bail!(
                "default_log_limit ({}) exceeds max_log_limit ({})",
                self.default_log_limit,
                self.max_log_limit
            );
        }
        Ok(())
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            host: self.host.clone(),
            port: self.port,
        }
    }

    pub fn limit_policy(&self) -> LimitPolicy {
        LimitPolicy {
            default: self.default_log_limit,
            max: self.max_log_limit,
        }
    }

    pub fn api_settings(&self) -> ApiSettings {
        ApiSettings {
            instance_name: self.name.clone(),
            idle_placeholder: self.idle_placeholder.clone(),
            device_placeholder: self.device_placeholder.clone(),
            default_history_count: self.default_history_count,
            export_dir: self.export_dir.clone(),
        }
    }
}
