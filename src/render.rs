use tabled::{settings::Style, Table, Tabled};

use crate::billing::{format_rupiah, GenerationResult, PreviewInvoice, UsageMonth};

/// Rows shown in the preview table before the remainder line
pub const MAX_PREVIEW_ROWS: usize = 50;
/// Error strings shown before the remainder line
pub const MAX_ERRORS_SHOWN: usize = 10;

/// The visible head of a list plus how many entries were cut
#[derive(Debug, PartialEq)]
pub struct Truncated<'a, T> {
    pub shown: &'a [T],
    pub hidden: usize,
}

pub fn truncate<T>(items: &[T], limit: usize) -> Truncated<'_, T> {
    let cut = items.len().min(limit);
    Truncated {
        shown: &items[..cut],
        hidden: items.len() - cut,
    }
}

#[derive(Tabled)]
struct PreviewCounters {
    #[tabled(rename = "WILL GENERATE")]
    success: u32,
    #[tabled(rename = "WILL SKIP")]
    skipped: u32,
    #[tabled(rename = "FAILED")]
    failed: u32,
    #[tabled(rename = "TOTAL AMOUNT")]
    total_amount: String,
}

#[derive(Tabled)]
struct ResultCounters {
    #[tabled(rename = "GENERATED")]
    success: u32,
    #[tabled(rename = "SKIPPED")]
    skipped: u32,
    #[tabled(rename = "FAILED")]
    failed: u32,
}

#[derive(Tabled)]
struct InvoiceRow {
    #[tabled(rename = "INVOICE #")]
    number: String,
    #[tabled(rename = "CUSTOMER")]
    customer: String,
    #[tabled(rename = "CODE")]
    code: String,
    #[tabled(rename = "USAGE (M³)")]
    usage: String,
    #[tabled(rename = "WATER CHARGE")]
    water_charge: String,
    #[tabled(rename = "ABONEMEN")]
    abonemen: String,
    #[tabled(rename = "PENALTY")]
    penalty: String,
    #[tabled(rename = "TOTAL")]
    total: String,
}

impl From<&PreviewInvoice> for InvoiceRow {
    fn from(inv: &PreviewInvoice) -> Self {
        Self {
            number: inv.invoice_number.clone(),
            customer: inv.customer_name.clone(),
            code: inv.customer_code.clone(),
            usage: format!("{:.2}", inv.usage_m3),
            water_charge: format_rupiah(inv.water_charge),
            abonemen: format_rupiah(inv.abonemen),
            penalty: if inv.penalty_amount > 0.0 {
                format_rupiah(inv.penalty_amount)
            } else {
                "-".to_string()
            },
            total: format_rupiah(inv.total_amount),
        }
    }
}

/// Render a dry-run result for review before committing
pub fn preview_panel(month: UsageMonth, preview: &GenerationResult) -> String {
    let mut out = format!("Preview Results - {month}\n");

    let counters = PreviewCounters {
        success: preview.success,
        skipped: preview.skipped,
        failed: preview.failed,
        total_amount: format_rupiah(preview.total_amount),
    };
    out.push_str(&Table::new([counters]).with(Style::rounded()).to_string());
    out.push_str("\n\n");

    out.push_str(&format!(
        "Invoice Preview ({} items)\n",
        preview.invoices.len()
    ));
    let rows = truncate(&preview.invoices, MAX_PREVIEW_ROWS);
    if rows.shown.is_empty() {
        out.push_str("No invoices in this preview.\n");
    } else {
        let table_rows: Vec<InvoiceRow> = rows.shown.iter().map(InvoiceRow::from).collect();
        out.push_str(&Table::new(table_rows).with(Style::rounded()).to_string());
        out.push('\n');
        if rows.hidden > 0 {
            out.push_str(&format!("... and {} more invoices\n", rows.hidden));
        }
    }

    let summary = preview.summary(month);
    out.push_str(&format!(
        "Total usage: {:.2} m³, total penalty: {}\n",
        summary.total_usage_m3,
        format_rupiah(summary.total_penalty)
    ));

    out.push_str(&error_list(&preview.errors));
    out
}

/// Render the outcome of a committed generation
pub fn result_panel(result: &GenerationResult) -> String {
    let mut out = String::from("Invoices Generated Successfully!\n");
    if !result.message.is_empty() {
        out.push_str(&result.message);
        out.push('\n');
    }

    let counters = ResultCounters {
        success: result.success,
        skipped: result.skipped,
        failed: result.failed,
    };
    out.push_str(&Table::new([counters]).with(Style::rounded()).to_string());
    out.push('\n');

    out.push_str(&error_list(&result.errors));
    out
}

fn error_list(errors: &[String]) -> String {
    if errors.is_empty() {
        return String::new();
    }

    let mut out = format!("\nErrors ({})\n", errors.len());
    let shown = truncate(errors, MAX_ERRORS_SHOWN);
    for err in shown.shown {
        out.push_str(&format!("  • {err}\n"));
    }
    if shown.hidden > 0 {
        out.push_str(&format!("  ... and {} more errors\n", shown.hidden));
    }
    out
}
