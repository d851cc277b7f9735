//! en-US display strings for the text renderer.

/// Whole-dollar currency with thousands separators: `$1,234,567`.
pub fn format_currency(value: f64) -> String {
    if !value.is_finite() {
        return "—".to_string();
    }
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0.0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

/// Decimal rate as a percentage with one decimal: `0.07` → `7.0%`.
pub fn format_percent(rate: f64) -> String {
    format!("{:.1}%", rate * 100.0)
}

pub fn format_years(years: f64) -> String {
    if years.is_finite() {
        format!("{years:.1} years")
    } else {
        "Never".to_string()
    }
}

pub fn format_months(months: u32) -> String {
    format!("{months} months ({:.1} years)", f64::from(months) / 12.0)
}
