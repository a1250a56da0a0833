use crate::cli::Cli;
use crate::error::{BoardError, BoardResult};
use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::Level;

const TRACE_LEVELS: [&'static str; 5] = ["TRACE", "DEBUG", "INFO", "WARN", "ERROR"];
const LOCAL_SETTINGS_YAML_FILE: &str = ".env.local.yaml";

// All settings may be configured via environment variables. Example:
// RAINBET_API_KEY="xxx" would set rainbet_api_key to the xxx value.
// Command line flags take precedence over both the yaml file and the environment.
#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    #[serde(default = "default_trace_level")]
    trace_level: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub rainbet_api_key: String,
    #[serde(default = "default_rainbet_base_url")]
    pub rainbet_base_url: String,
    #[serde(default = "default_rainbet_api_timeout_sec")]
    pub rainbet_api_timeout_sec: u64,
    #[serde(default = "default_refresh_interval_sec")]
    pub refresh_interval_sec: u64,
    #[serde(default = "default_leaderboard_size")]
    pub leaderboard_size: usize,
    // Keep-alive pings are disabled when no url is given
    pub self_ping_url: Option<String>,
    #[serde(default = "default_self_ping_interval_sec")]
    pub self_ping_interval_sec: u64,
}

impl Settings {
    pub fn load(cli: Cli) -> BoardResult<Self> {
        let mut figment = Figment::new();
        if Path::new(LOCAL_SETTINGS_YAML_FILE).exists() {
            println!(
                "\n######################################\n\
                   ##   Found '.env.local.yaml' file,  ##\n\
                   ##   loading local configuration.   ##\n\
                   ######################################\n\
                "
            );
            figment = figment.merge(Yaml::file(LOCAL_SETTINGS_YAML_FILE));
        }
        let figment = figment.merge(Env::raw()).merge(Serialized::defaults(cli));

        Settings::from_figment(figment)
    }

    pub fn from_figment(figment: Figment) -> BoardResult<Self> {
        let settings: Settings = figment.extract()?;
        if settings.rainbet_api_key.trim().is_empty() {
            return Err(BoardError::Config(
                "rainbet_api_key must not be empty".to_string(),
            ));
        }
        if settings.leaderboard_size == 0 {
            return Err(BoardError::Config(
                "leaderboard_size must be at least 1".to_string(),
            ));
        }
        if settings.refresh_interval_sec == 0 {
            return Err(BoardError::Config(
                "refresh_interval_sec must be at least 1".to_string(),
            ));
        }
        Ok(settings)
    }

    pub fn get_trace_level(&self) -> Level {
        get_trace_level(&self.trace_level)
    }

    pub fn rainbet_api_timeout(&self) -> Duration {
        Duration::from_secs(self.rainbet_api_timeout_sec)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_sec)
    }

    pub fn self_ping_interval(&self) -> Duration {
        Duration::from_secs(self.self_ping_interval_sec)
    }
}

fn get_trace_level(level_str: &str) -> Level {
    match level_str.to_uppercase().as_str() {
        level if level == TRACE_LEVELS[0] => Level::TRACE,
        level if level == TRACE_LEVELS[1] => Level::DEBUG,
        level if level == TRACE_LEVELS[2] => Level::INFO,
        level if level == TRACE_LEVELS[3] => Level::WARN,
        level if level == TRACE_LEVELS[4] => Level::ERROR,
        // Default trace level
        _ => Level::INFO,
    }
}

fn default_trace_level() -> String {
    "INFO".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_rainbet_base_url() -> String {
    "https://services.rainbet.com".to_string()
}

fn default_rainbet_api_timeout_sec() -> u64 {
    10
}

fn default_refresh_interval_sec() -> u64 {
    300
}

fn default_leaderboard_size() -> usize {
    10
}

fn default_self_ping_interval_sec() -> u64 {
    270
}
