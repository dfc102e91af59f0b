//! Shared HTTP client construction and JSON request helper.

use std::time::{Duration, Instant};

use metrics::{counter, histogram};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{UpstreamError, UpstreamResult};

/// Settings shared by all outbound HTTP calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpClientConfig {
    /// Whole-request timeout
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    /// Sent on every request; Nominatim rejects anonymous clients.
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            connect_timeout_secs: 5,
            user_agent: concat!("aq-map/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Build the shared client.
pub fn build_client(config: &HttpClientConfig) -> UpstreamResult<Client> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .user_agent(config.user_agent.clone())
        .pool_max_idle_per_host(4)
        .build()
        .map_err(|e| UpstreamError::Request {
            service: "http-client",
            message: format!("Failed to create HTTP client: {}", e),
        })
}

/// Send a request and decode a JSON body; non-2xx is an error.
pub async fn send_json<T: DeserializeOwned>(
    service: &'static str,
    request: RequestBuilder,
) -> UpstreamResult<T> {
    let started = Instant::now();

    let result = request.send().await;
    histogram!("upstream_request_duration_ms", "service" => service)
        .record(started.elapsed().as_secs_f64() * 1000.0);
    let response = result.map_err(|e| UpstreamError::from_reqwest(service, e))?;

    let status = response.status();
    if !status.is_success() {
        counter!("upstream_errors_total", "service" => service).increment(1);
        return Err(UpstreamError::Status {
            service,
            status: status.as_u16(),
        });
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| UpstreamError::from_reqwest(service, e))?;
    let value = serde_json::from_slice(&body).map_err(|e| UpstreamError::Decode {
        service,
        message: e.to_string(),
    })?;

    debug!(
        service,
        bytes = body.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Upstream response"
    );
    Ok(value)
}
