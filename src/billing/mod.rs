mod model;
mod money;
mod month;

pub use model::{GenerationRequest, GenerationResult, PreviewInvoice, PreviewSummary};
pub use money::format_rupiah;
pub use month::UsageMonth;
