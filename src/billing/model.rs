use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::month::UsageMonth;

/// Body sent to the preview and bulk-generate endpoints
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationRequest {
    pub usage_month: UsageMonth,
    /// Empty means every eligible customer
    pub customer_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<bool>,
}

impl GenerationRequest {
    /// Dry-run request for the preview endpoint
    pub fn dry_run(usage_month: UsageMonth, customer_ids: Vec<String>) -> Self {
        Self {
            usage_month,
            customer_ids,
            preview: None,
        }
    }

    /// Persisting request for the bulk-generate endpoint
    pub fn commit(usage_month: UsageMonth, customer_ids: Vec<String>) -> Self {
        Self {
            usage_month,
            customer_ids,
            preview: Some(false),
        }
    }

    pub fn is_dry_run(&self) -> bool {
        self.preview != Some(false)
    }
}

/// One prospective (or created) invoice row in a generation batch
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PreviewInvoice {
    pub invoice_number: String,
    pub customer_name: String,
    pub customer_code: String,
    pub usage_m3: f64,
    pub water_charge: f64,
    pub abonemen: f64,
    pub penalty_amount: f64,
    pub total_amount: f64,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub usage_month: Option<String>,
    #[serde(default)]
    pub price_per_m3: f64,
    #[serde(default)]
    pub sub_total: f64,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Aggregate outcome of a dry run or a committing run
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GenerationResult {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
    pub success: u32,
    pub skipped: u32,
    pub failed: u32,
    pub total_amount: f64,
    #[serde(default)]
    pub invoices: Vec<PreviewInvoice>,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub preview_only: bool,
}

/// Totals derived from the rows of a result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewSummary {
    pub total_customers: usize,
    pub total_usage_m3: f64,
    pub total_amount: f64,
    pub total_penalty: f64,
    pub period_month: UsageMonth,
}

impl GenerationResult {
    pub fn summary(&self, period_month: UsageMonth) -> PreviewSummary {
        PreviewSummary {
            total_customers: self.invoices.len(),
            total_usage_m3: self.invoices.iter().map(|i| i.usage_m3).sum(),
            total_amount: self.total_amount,
            total_penalty: self.invoices.iter().map(|i| i.penalty_amount).sum(),
            period_month,
        }
    }
}
