//! Display formatting for metric values.

/// Placeholder shown for missing values.
pub const MISSING: &str = "—";

/// Integer with comma thousands separators, e.g. `2,184,000`.
pub fn thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if value < 0 {
        out.insert(0, '-');
    }
    out
}

pub fn thousands_or_missing(value: Option<i64>) -> String {
    value.map(thousands).unwrap_or_else(|| MISSING.to_string())
}

/// Percent delta label: `-0.73%`, `0.0%`, `12.5%`.
pub fn percent_delta(value: Option<f64>) -> String {
    match value {
        Some(v) if v.fract() == 0.0 => format!("{:.1}%", v),
        Some(v) => format!("{}%", v),
        None => MISSING.to_string(),
    }
}

/// Table cell: whole numbers without decimals, blank when missing.
pub fn table_cell(value: Option<f64>) -> String {
    match value {
        Some(v) if v.fract() == 0.0 && v.abs() < 1e15 => thousands(v as i64),
        Some(v) => format!("{:.2}", v),
        None => String::new(),
    }
}
