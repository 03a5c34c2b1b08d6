//! Client-side state machine for bulk invoice generation.
//!
//! The workflow owns the transient operator state: the selected month, the
//! last dry-run result and the final result of a committed run. Network I/O
//! is split into `begin_*`/`finish_*` pairs so the busy phases are
//! observable; `run_preview` and `confirm_and_commit` drive a [`BillingApi`]
//! through both halves.

use chrono::NaiveDate;
use std::mem;
use tracing::{info, warn};

use crate::api::{ApiFailure, BillingApi};
use crate::billing::{GenerationRequest, GenerationResult, UsageMonth};
use crate::error::{BillingError, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Idle,
    Previewing,
    PreviewReady { preview: GenerationResult },
    AwaitingConfirmation { preview: GenerationResult },
    Committing { preview: GenerationResult },
    Committed { result: GenerationResult },
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Previewing => "previewing",
            Phase::PreviewReady { .. } => "reviewing a preview",
            Phase::AwaitingConfirmation { .. } => "awaiting confirmation",
            Phase::Committing { .. } => "committing",
            Phase::Committed { .. } => "showing a committed result",
        }
    }
}

#[derive(Debug)]
pub struct GenerationWorkflow {
    month: UsageMonth,
    customer_ids: Vec<String>,
    phase: Phase,
}

impl GenerationWorkflow {
    /// Start idle with the previous calendar month selected
    pub fn new(today: NaiveDate) -> Self {
        Self::for_month(UsageMonth::previous(today))
    }

    pub fn for_month(month: UsageMonth) -> Self {
        Self {
            month,
            customer_ids: Vec::new(),
            phase: Phase::Idle,
        }
    }

    pub fn month(&self) -> UsageMonth {
        self.month
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// A request is in flight
    pub fn is_busy(&self) -> bool {
        matches!(self.phase, Phase::Previewing | Phase::Committing { .. })
    }

    pub fn preview(&self) -> Option<&GenerationResult> {
        match &self.phase {
            Phase::PreviewReady { preview }
            | Phase::AwaitingConfirmation { preview }
            | Phase::Committing { preview } => Some(preview),
            _ => None,
        }
    }

    pub fn final_result(&self) -> Option<&GenerationResult> {
        match &self.phase {
            Phase::Committed { result } => Some(result),
            _ => None,
        }
    }

    pub fn preview_enabled(&self) -> bool {
        matches!(self.phase, Phase::Idle)
    }

    /// Generate is offered only for a reviewed preview with something to create
    pub fn generate_enabled(&self) -> bool {
        match &self.phase {
            Phase::PreviewReady { preview } => preview.success > 0,
            _ => false,
        }
    }

    pub fn select_month(&mut self, month: UsageMonth, today: NaiveDate) -> Result<()> {
        self.require_idle("change the month")?;
        month.ensure_selectable(today)?;
        self.month = month;
        Ok(())
    }

    /// Restrict generation to specific customers; empty means all eligible
    pub fn select_customers(&mut self, customer_ids: Vec<String>) -> Result<()> {
        self.require_idle("change the customer selection")?;
        self.customer_ids = customer_ids;
        Ok(())
    }

    pub fn begin_preview(&mut self) -> Result<GenerationRequest> {
        self.require_idle("preview")?;
        self.phase = Phase::Previewing;
        Ok(GenerationRequest::dry_run(
            self.month,
            self.customer_ids.clone(),
        ))
    }

    /// Settle an in-flight preview. On failure the workflow returns to idle
    /// with the selected month untouched.
    pub fn finish_preview(
        &mut self,
        outcome: std::result::Result<GenerationResult, ApiFailure>,
    ) -> Result<()> {
        if !matches!(self.phase, Phase::Previewing) {
            return Err(self.invalid("finish a preview"));
        }

        match outcome {
            Ok(preview) => {
                info!(
                    month = %self.month,
                    success = preview.success,
                    skipped = preview.skipped,
                    failed = preview.failed,
                    "preview ready"
                );
                self.phase = Phase::PreviewReady { preview };
                Ok(())
            }
            Err(failure) => {
                warn!(month = %self.month, error = %failure, "error previewing");
                self.phase = Phase::Idle;
                Err(failure.into())
            }
        }
    }

    pub fn run_preview(&mut self, api: &impl BillingApi) -> Result<&GenerationResult> {
        let request = self.begin_preview()?;
        let outcome = api.preview_generation(&request);
        self.finish_preview(outcome)?;
        self.preview().ok_or_else(|| self.invalid("read the preview"))
    }

    /// Discard the preview and go back to month selection
    pub fn cancel(&mut self) -> Result<()> {
        match &self.phase {
            Phase::PreviewReady { .. } => {
                self.phase = Phase::Idle;
                Ok(())
            }
            _ => Err(self.invalid("cancel")),
        }
    }

    /// Open the confirmation gate and return the question to put to the
    /// operator. No request is issued until [`confirm`](Self::confirm).
    pub fn request_generate(&mut self) -> Result<String> {
        let preview = match mem::replace(&mut self.phase, Phase::Idle) {
            Phase::PreviewReady { preview } => preview,
            other => {
                self.phase = other;
                return Err(self.invalid("generate"));
            }
        };

        if preview.success == 0 {
            self.phase = Phase::PreviewReady { preview };
            return Err(BillingError::NothingToGenerate);
        }

        let prompt = format!(
            "Are you sure you want to generate {} invoices for {}?",
            preview.success, self.month
        );
        self.phase = Phase::AwaitingConfirmation { preview };
        Ok(prompt)
    }

    /// Reopen the confirmation gate after a failed commit. The question names
    /// the failure along with the invoice count and month still pending.
    pub fn request_retry(&mut self, failure: &BillingError) -> Result<String> {
        self.request_generate()?;
        let success = self.preview().map_or(0, |p| p.success);
        Ok(format!(
            "{} Retry generating {} invoices for {}?",
            failure.alert(),
            success,
            self.month
        ))
    }

    pub fn decline(&mut self) -> Result<()> {
        match mem::replace(&mut self.phase, Phase::Idle) {
            Phase::AwaitingConfirmation { preview } => {
                self.phase = Phase::PreviewReady { preview };
                Ok(())
            }
            other => {
                self.phase = other;
                Err(self.invalid("decline"))
            }
        }
    }

    pub fn confirm(&mut self) -> Result<GenerationRequest> {
        match mem::replace(&mut self.phase, Phase::Idle) {
            Phase::AwaitingConfirmation { preview } => {
                self.phase = Phase::Committing { preview };
                Ok(GenerationRequest::commit(
                    self.month,
                    self.customer_ids.clone(),
                ))
            }
            other => {
                self.phase = other;
                Err(self.invalid("confirm"))
            }
        }
    }

    /// Settle an in-flight commit and return the completion notice. On
    /// failure the preview is kept so Generate can be retried directly.
    pub fn finish_commit(
        &mut self,
        outcome: std::result::Result<GenerationResult, ApiFailure>,
    ) -> Result<String> {
        let preview = match mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Committing { preview } => preview,
            other => {
                self.phase = other;
                return Err(self.invalid("finish a commit"));
            }
        };

        match outcome {
            Ok(result) => {
                info!(
                    month = %self.month,
                    success = result.success,
                    skipped = result.skipped,
                    failed = result.failed,
                    "invoices generated"
                );
                if !result.errors.is_empty() {
                    warn!(count = result.errors.len(), "generation reported per-customer errors");
                }
                let notice = format!("Success! Generated {} invoices.", result.success);
                self.phase = Phase::Committed { result };
                Ok(notice)
            }
            Err(failure) => {
                warn!(month = %self.month, error = %failure, "error generating");
                self.phase = Phase::PreviewReady { preview };
                Err(failure.into())
            }
        }
    }

    pub fn confirm_and_commit(&mut self, api: &impl BillingApi) -> Result<String> {
        let request = self.confirm()?;
        let outcome = api.bulk_generate(&request);
        self.finish_commit(outcome)
    }

    /// Clear the committed result and select the default month again
    pub fn reset(&mut self, today: NaiveDate) -> Result<()> {
        match &self.phase {
            Phase::Committed { .. } => {
                self.phase = Phase::Idle;
                self.month = UsageMonth::previous(today);
                Ok(())
            }
            _ => Err(self.invalid("reset")),
        }
    }

    fn require_idle(&self, action: &'static str) -> Result<()> {
        if matches!(self.phase, Phase::Idle) {
            Ok(())
        } else {
            Err(self.invalid(action))
        }
    }

    fn invalid(&self, action: &'static str) -> BillingError {
        BillingError::InvalidTransition {
            action,
            phase: self.phase.name(),
        }
    }
}
