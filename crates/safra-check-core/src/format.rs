//! Human-readable byte sizes and record counts.
//!
//! Both functions are total: every input renders to something.

use crate::config::Locale;
use crate::messages;

const SIZE_UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

/// Render a byte count with a binary (base-1024) prefix and one decimal.
///
/// Picks the largest unit whose mantissa is at least 1, capped at GB.
///
/// ```
/// use safra_check_core::format::format_file_size;
///
/// assert_eq!(format_file_size(0), "0 B");
/// assert_eq!(format_file_size(1536), "1.5 KB");
/// assert_eq!(format_file_size(1_048_576), "1.0 MB");
/// ```
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }

    #[allow(clippy::cast_precision_loss)]
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    format!("{value:.1} {}", SIZE_UNITS[unit])
}

/// Render a record count with digit grouping and a singular/plural unit.
///
/// ```
/// use safra_check_core::config::Locale;
/// use safra_check_core::format::format_record_count;
///
/// assert_eq!(format_record_count(1, Locale::En), "1 record");
/// assert_eq!(format_record_count(2847, Locale::PtBr), "2.847 registros");
/// ```
pub fn format_record_count(count: u64, locale: Locale) -> String {
    format!(
        "{} {}",
        group_digits(count, locale.group_separator()),
        messages::record_unit(locale, count)
    )
}

/// Insert `separator` between every group of three digits.
fn group_digits(value: u64, separator: char) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(ch);
    }
    out
}
