pub mod api;
pub mod billing;
pub mod config;
pub mod error;
pub mod render;
pub mod workflow;

pub use api::{ApiFailure, AuthContext, BillingApi, Endpoint, FailureKind, HttpBillingApi};
pub use billing::{GenerationRequest, GenerationResult, PreviewInvoice, UsageMonth};
pub use config::Config;
pub use error::{BillingError, Result};
pub use workflow::{GenerationWorkflow, Phase};
