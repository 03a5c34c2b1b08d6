use std::time::Duration;
use tracing::{debug, warn};
use ureq::Agent;

use super::{ApiFailure, AuthContext, BillingApi, Endpoint};
use crate::billing::{GenerationRequest, GenerationResult};

/// Blocking JSON client for the TirtaSaaS billing endpoints
pub struct HttpBillingApi {
    agent: Agent,
    base_url: String,
    auth: AuthContext,
}

impl HttpBillingApi {
    /// Build a client; `timeout` of `None` waits indefinitely.
    pub fn new(base_url: &str, auth: AuthContext, timeout: Option<Duration>) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(timeout)
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
        }
    }

    pub fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    fn post(
        &self,
        endpoint: Endpoint,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, ApiFailure> {
        let url = self.url(endpoint);
        let body = serde_json::to_string(request)
            .map_err(|e| ApiFailure::network(endpoint, e.to_string()))?;

        debug!(
            %url,
            usage_month = %request.usage_month,
            customers = request.customer_ids.len(),
            authenticated = self.auth.is_authenticated(),
            "sending generation request"
        );

        let mut call = self
            .agent
            .post(url.as_str())
            .header("Content-Type", "application/json");
        if let Some(bearer) = self.auth.bearer() {
            call = call.header("Authorization", bearer);
        }

        let mut response = call.send(body.as_str()).map_err(|e| {
            warn!(%url, error = %e, "generation request failed");
            ApiFailure::network(endpoint, e.to_string())
        })?;

        let status = response.status();
        let text = response.body_mut().read_to_string();

        if !status.is_success() {
            let detail = text
                .ok()
                .and_then(|t| decode_error_detail(&t))
                .unwrap_or_else(|| endpoint.fallback_detail().to_string());
            warn!(%url, status = status.as_u16(), %detail, "backend rejected generation request");
            return Err(ApiFailure::server(endpoint, status.as_u16(), detail));
        }

        let text = text.map_err(|e| {
            warn!(%url, error = %e, "could not read generation response");
            ApiFailure::network(endpoint, e.to_string())
        })?;

        serde_json::from_str(&text).map_err(|e| {
            warn!(%url, error = %e, "malformed generation response");
            ApiFailure::network(endpoint, e.to_string())
        })
    }
}

impl BillingApi for HttpBillingApi {
    fn preview_generation(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, ApiFailure> {
        self.post(Endpoint::PreviewGeneration, request)
    }

    fn bulk_generate(&self, request: &GenerationRequest) -> Result<GenerationResult, ApiFailure> {
        self.post(Endpoint::BulkGenerate, request)
    }
}

/// Pull a human-readable message out of an error body.
/// Tries `message` then `error`; returns `None` when neither is a
/// non-empty string or the body is not JSON.
pub fn decode_error_detail(body: &str) -> Option<String> {
    let json: serde_json::Value = serde_json::from_str(body).ok()?;
    ["message", "error"].iter().find_map(|key| {
        json.get(key)
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}
