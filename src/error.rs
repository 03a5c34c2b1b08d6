use std::path::PathBuf;
use thiserror::Error;

use crate::api::ApiFailure;

#[derive(Error, Debug)]
pub enum BillingError {
    #[error("Config directory not found at {0}. Run 'tirta init' to create it.")]
    ConfigNotFound(PathBuf),

    #[error("Config file not found: {0}")]
    ConfigFileNotFound(PathBuf),

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config directory already exists at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No API URL configured. Set api.base_url in config.toml or pass --api-url.")]
    MissingApiUrl,

    #[error("Invalid month '{0}'. Expected format YYYY-MM (e.g., '2024-11')")]
    InvalidMonth(String),

    #[error("Month {month} is in the future (latest allowed is {current})")]
    MonthInFuture { month: String, current: String },

    #[error(transparent)]
    Api(#[from] ApiFailure),

    #[error("Cannot {action} while {phase}")]
    InvalidTransition {
        action: &'static str,
        phase: &'static str,
    },

    #[error("Nothing to generate: the preview has no invoices to create")]
    NothingToGenerate,

    #[error("Confirmation requires an interactive terminal. Pass --yes to skip the prompt.")]
    NotInteractive,

    #[error("Failed to encode result as JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl BillingError {
    /// Operator-facing text for this error, as shown by the binary on stderr.
    pub fn alert(&self) -> String {
        match self {
            BillingError::Api(failure) => failure.alert(),
            other => format!("Error: {other}"),
        }
    }
}

pub type Result<T> = std::result::Result<T, BillingError>;
