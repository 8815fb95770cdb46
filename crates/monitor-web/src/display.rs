//! Formatting helpers for operator-facing values.

use chrono::{DateTime, FixedOffset, Utc};

/// Placeholder for unavailable metrics.
pub const DASH: &str = "—";

/// Local `dd/mm/yyyy HH.MM` rendering of an instant.
pub fn format_timestamp(at: DateTime<Utc>, offset: FixedOffset) -> String {
    at.with_timezone(&offset).format("%d/%m/%Y %H.%M").to_string()
}

/// Render a latency figure; unavailable or non-positive values are a dash.
pub fn format_seconds(value: Option<f64>) -> String {
    match value {
        Some(seconds) if seconds > 0.0 && seconds < 1.0 => "< 1 s".to_string(),
        Some(seconds) if seconds >= 1.0 => format!("{} s", seconds.round()),
        _ => DASH.to_string(),
    }
}

/// Group digits with `.` the way the operators' locale does.
pub fn format_count(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    if value < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}
