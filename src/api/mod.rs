mod http;

pub use http::{decode_error_detail, HttpBillingApi};

use std::fmt;
use thiserror::Error;

use crate::billing::{GenerationRequest, GenerationResult};

/// The two backend operations of the bulk generation workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    PreviewGeneration,
    BulkGenerate,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::PreviewGeneration => "/api/invoices/preview-generation",
            Endpoint::BulkGenerate => "/api/invoices/bulk-generate",
        }
    }

    /// Detail used when a server error body carries no message
    pub fn fallback_detail(&self) -> &'static str {
        match self {
            Endpoint::PreviewGeneration => "Failed to preview invoices",
            Endpoint::BulkGenerate => "Failed to generate invoices",
        }
    }

    /// Alert shown when the request never produced a usable response
    pub fn network_alert(&self) -> &'static str {
        match self {
            Endpoint::PreviewGeneration => "Failed to preview invoices. Please try again.",
            Endpoint::BulkGenerate => "Failed to generate invoices. Please try again.",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Connection, IO, or an unreadable success body
    NetworkFailure,
    /// Non-2xx response from the backend
    ServerError,
}

/// A normalized failure from one of the billing endpoints
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{endpoint}: {detail}")]
pub struct ApiFailure {
    pub endpoint: Endpoint,
    pub kind: FailureKind,
    pub detail: String,
    pub status: Option<u16>,
}

impl ApiFailure {
    pub fn network(endpoint: Endpoint, detail: impl Into<String>) -> Self {
        Self {
            endpoint,
            kind: FailureKind::NetworkFailure,
            detail: detail.into(),
            status: None,
        }
    }

    pub fn server(endpoint: Endpoint, status: u16, detail: impl Into<String>) -> Self {
        Self {
            endpoint,
            kind: FailureKind::ServerError,
            detail: detail.into(),
            status: Some(status),
        }
    }

    /// The text shown to the operator for this failure
    pub fn alert(&self) -> String {
        match self.kind {
            FailureKind::ServerError => format!("Error: {}", self.detail),
            FailureKind::NetworkFailure => self.endpoint.network_alert().to_string(),
        }
    }
}

/// Per-process authentication passed explicitly to the HTTP client
#[derive(Debug, Clone, Default)]
pub struct AuthContext {
    token: Option<String>,
}

impl AuthContext {
    pub fn new(token: Option<String>) -> Self {
        let token = token.filter(|t| !t.trim().is_empty());
        Self { token }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Value for the `Authorization` header, if a token is present
    pub fn bearer(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Bearer {t}"))
    }
}

/// Backend operations used by the generation workflow
pub trait BillingApi {
    fn preview_generation(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, ApiFailure>;

    fn bulk_generate(&self, request: &GenerationRequest) -> Result<GenerationResult, ApiFailure>;
}
