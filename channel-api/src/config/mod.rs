// Service configuration, read once at startup from the environment.

use anyhow::{Context, Result};
use channel_providers::EvolutionConfig;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use crate::logging::LogFormat;

pub const DEFAULT_PORT: u16 = 3001;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub settle_interval: Duration,
    /// `None` means any origin.
    pub cors_origins: Option<Vec<String>>,
    pub log_format: LogFormat,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub evolution: EvolutionConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let server = ServerConfig::from_lookup(&get)?;
        let evolution = EvolutionConfig::from_lookup(&get)
            .context("Evolution API configuration is incomplete")?;
        Ok(Self { server, evolution })
    }
}

impl ServerConfig {
    pub fn from_lookup<F>(get: &F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| get(key).map(|s| s.trim().to_string()).filter(|s| !s.is_empty());

        let host: IpAddr = match var("API_HOST") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("API_HOST is not an IP address: {:?}", raw))?,
            None => IpAddr::from([0, 0, 0, 0]),
        };
        let port: u16 = match var("API_PORT") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("API_PORT is not a port number: {:?}", raw))?,
            None => DEFAULT_PORT,
        };
        let settle_ms: u64 = match var("RESET_SETTLE_MS") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("RESET_SETTLE_MS is not a number: {:?}", raw))?,
            None => 1000,
        };
        let cors_origins = var("CORS_ALLOWED_ORIGINS").map(|raw| {
            raw.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
        });
        let log_format = match var("LOG_FORMAT") {
            Some(raw) => raw.parse()?,
            None => LogFormat::default(),
        };

        Ok(Self {
            bind_addr: SocketAddr::new(host, port),
            settle_interval: Duration::from_millis(settle_ms),
            cors_origins,
            log_format,
        })
    }
}
