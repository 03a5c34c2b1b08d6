/// Format an amount as whole Indonesian Rupiah, e.g. `Rp 450.000`
pub fn format_rupiah(value: f64) -> String {
    let rounded = value.round() as i64;
    let grouped = format_grouped_int(rounded.unsigned_abs());
    if rounded < 0 {
        format!("-Rp {grouped}")
    } else {
        format!("Rp {grouped}")
    }
}

/// Group digits in threes with the Indonesian `.` separator
fn format_grouped_int(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }

    out.chars().rev().collect()
}
