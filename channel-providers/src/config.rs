use anyhow::{bail, Context, Result};
use std::time::Duration;

pub const DEFAULT_INTEGRATION: &str = "WHATSAPP-BAILEYS";

/// Connection settings for the Evolution channel-management API.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvolutionConfig {
    pub base_url: String,
    pub api_key: String,
    /// Engine identifier sent with every create request.
    pub integration: String,
    pub create_timeout: Duration,
    pub connect_timeout: Duration,
    pub delete_timeout: Duration,
    /// TCP connect timeout shared by all requests.
    pub tcp_connect_timeout: Duration,
}

impl EvolutionConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim().trim_end_matches('/').to_string(),
            api_key: api_key.into().trim().to_string(),
            integration: DEFAULT_INTEGRATION.to_string(),
            create_timeout: Duration::from_secs(20),
            connect_timeout: Duration::from_secs(20),
            delete_timeout: Duration::from_secs(5),
            tcp_connect_timeout: Duration::from_secs(5),
        }
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, reading variables through `get`.
    pub fn from_lookup<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = required(&get, "EVOLUTION_URL")?;
        let api_key = required(&get, "EVOLUTION_API_KEY")?;
        let mut config = Self::new(base_url, api_key);

        if let Some(integration) = optional(&get, "EVOLUTION_INTEGRATION") {
            config.integration = integration;
        }
        if let Some(secs) = seconds(&get, "EVOLUTION_CREATE_TIMEOUT_SECS")? {
            config.create_timeout = secs;
        }
        if let Some(secs) = seconds(&get, "EVOLUTION_CONNECT_TIMEOUT_SECS")? {
            config.connect_timeout = secs;
        }
        if let Some(secs) = seconds(&get, "EVOLUTION_DELETE_TIMEOUT_SECS")? {
            config.delete_timeout = secs;
        }
        Ok(config)
    }
}

fn optional<F>(get: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    get(key)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn required<F>(get: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    match optional(get, key) {
        Some(value) => Ok(value),
        None => bail!("{} must be set", key),
    }
}

fn seconds<F>(get: &F, key: &str) -> Result<Option<Duration>>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = optional(get, key) else {
        return Ok(None);
    };
    let secs: u64 = raw
        .parse()
        .with_context(|| format!("{} must be a whole number of seconds, got {:?}", key, raw))?;
    if secs == 0 {
        bail!("{} must be greater than zero", key);
    }
    Ok(Some(Duration::from_secs(secs)))
}
