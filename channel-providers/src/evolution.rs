use crate::{ApiError, ChannelApi, ConnectState, CreatedInstance, EvolutionConfig};
use anyhow::{Context, Result};
use async_trait::async_trait;
use channel_common::InstanceName;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder};
use serde_json::{json, Value};
use std::time::Duration;

/// HTTP client for the Evolution channel-management API.
pub struct EvolutionProvider {
    client: Client,
    config: EvolutionConfig,
}

impl EvolutionProvider {
    pub fn new(config: EvolutionConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(&config.api_key).context("EVOLUTION_API_KEY is not a valid header value")?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        // Per-request timeouts are set on each call; this only bounds the TCP handshake.
        let client = Client::builder()
            .connect_timeout(config.tcp_connect_timeout)
            .default_headers(headers)
            .build()
            .context("Failed to build Evolution HTTP client")?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    fn instance_url(&self, action: &str, name: &InstanceName) -> String {
        self.url(&format!(
            "/instance/{}/{}",
            action,
            urlencoding::encode(name.as_str())
        ))
    }

    /// Send the request and return the body of a 2xx response.
    async fn send(&self, request: RequestBuilder, timeout: Duration) -> Result<String, ApiError> {
        let resp = request
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest(e, timeout))?;
        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| ApiError::from_reqwest(e, timeout))?;
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: text,
            });
        }
        Ok(text)
    }
}

fn parse_json(text: &str) -> Result<Value, ApiError> {
    serde_json::from_str(text).map_err(|e| ApiError::Decode(e.to_string()))
}

#[async_trait]
impl ChannelApi for EvolutionProvider {
    async fn create_instance(&self, name: &InstanceName) -> Result<CreatedInstance, ApiError> {
        let url = self.url("/instance/create");
        let body = json!({
            "instanceName": name.as_str(),
            "qrcode": true,
            "integration": self.config.integration,
        });
        tracing::debug!("🔵 [Evolution API] POST {} instance={}", url, name);

        let text = self
            .send(self.client.post(&url).json(&body), self.config.create_timeout)
            .await
            .inspect_err(|e| tracing::debug!("❌ [Evolution API] POST {} failed: {}", url, e))?;
        let reply = CreatedInstance::from_response(&parse_json(&text)?);
        tracing::debug!(
            "✅ [Evolution API] POST {} succeeded (artifact={})",
            url,
            reply.artifact.is_some()
        );
        Ok(reply)
    }

    async fn connect_instance(&self, name: &InstanceName) -> Result<ConnectState, ApiError> {
        let url = self.instance_url("connect", name);
        tracing::debug!("🔵 [Evolution API] GET {}", url);

        let text = self
            .send(self.client.get(&url), self.config.connect_timeout)
            .await
            .inspect_err(|e| tracing::debug!("❌ [Evolution API] GET {} failed: {}", url, e))?;
        let state = ConnectState::from_response(&parse_json(&text)?);
        tracing::debug!("✅ [Evolution API] GET {} -> {:?}", url, state);
        Ok(state)
    }

    async fn delete_instance(&self, name: &InstanceName) -> Result<(), ApiError> {
        let url = self.instance_url("delete", name);
        tracing::debug!("🔵 [Evolution API] DELETE {}", url);

        self.send(self.client.delete(&url), self.config.delete_timeout)
            .await
            .inspect_err(|e| tracing::debug!("❌ [Evolution API] DELETE {} failed: {}", url, e))?;
        Ok(())
    }
}
