//! Display helpers shared by reports and the CLI.

use chrono::{DateTime, Utc};

const SIZE_UNITS: [&str; 5] = ["B", "kB", "MB", "GB", "TB"];

/// Human-readable size in binary units with at most two decimals.
///
/// Zero and absent sizes render as `N/A`, the same as the metadata service's
/// "unknown".
pub fn format_size(size: Option<u64>) -> String {
    let Some(bytes) = size.filter(|b| *b > 0) else {
        return "N/A".to_string();
    };

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rendered = format!("{value:.2}");
    let rendered = rendered.trim_end_matches('0').trim_end_matches('.');
    format!("{rendered} {}", SIZE_UNITS[unit])
}

/// `D-Mon-YYYY HH:MM` in UTC, or `N/A`
pub fn format_date(date: Option<&DateTime<Utc>>) -> String {
    match date {
        Some(date) => date.format("%-d-%b-%Y %H:%M").to_string(),
        None => "N/A".to_string(),
    }
}
