//! CLI argument definitions for the Ilmquest server.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;

/// Ilmquest - question answering service with suggested follow-ups.
#[derive(Parser, Debug)]
#[command(name = "ilmquest", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Address to bind the API server to.
    #[arg(long = "host")]
    pub host: Option<String>,

    /// API server port.
    #[arg(short = 'p', long = "port")]
    pub port: Option<u16>,

    /// Log level or filter directive (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Model identifier sent to the generation service.
    #[arg(short = 'm', long = "model")]
    pub model: Option<String>,

    /// Write the default configuration to the config path and exit.
    #[arg(long = "init-config")]
    pub init_config: bool,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > ILMQUEST_CONFIG env var > ~/.ilmquest/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("ILMQUEST_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the API server port.
    ///
    /// Priority: --port flag > ILMQUEST_PORT env var > config file value.
    pub fn resolve_port(&self, config_port: u16) -> u16 {
        if let Some(p) = self.port {
            return p;
        }
        if let Ok(val) = std::env::var("ILMQUEST_PORT") {
            if let Ok(p) = val.parse::<u16>() {
                return p;
            }
        }
        config_port
    }

    /// Resolve the tracing filter.
    ///
    /// Priority: --log-level flag > RUST_LOG env var > config file value.
    pub fn resolve_log_filter(&self, config_level: &str) -> String {
        if let Some(ref level) = self.log_level {
            return level.clone();
        }
        if let Ok(filter) = std::env::var("RUST_LOG") {
            if !filter.trim().is_empty() {
                return filter;
            }
        }
        config_level.to_string()
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".ilmquest").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".ilmquest").join("config.toml");
    }
    PathBuf::from("config.toml")
}
