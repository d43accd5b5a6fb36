//! Display formatting helpers.

use chrono::{DateTime, NaiveDateTime};

/// Format a backend timestamp for display.
///
/// The backend emits ISO timestamps with or without an offset; anything that
/// cannot be parsed is shown as-is rather than dropped.
pub fn format_datetime(raw: &str) -> String {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed.format("%d.%m.%Y %H:%M").to_string();
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return parsed.format("%d.%m.%Y %H:%M").to_string();
    }
    raw.to_string()
}

/// Format a debt amount in tenge with thousands grouping.
pub fn format_amount(amount: f64) -> String {
    let whole = amount.round() as i64;
    let digits = whole.abs().to_string();

    let mut grouped = String::new();
    for (index, digit) in digits.chars().enumerate() {
        let remaining = digits.len() - index;
        if index > 0 && remaining % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(digit);
    }

    if whole < 0 {
        format!("-{} ₸", grouped)
    } else {
        format!("{} ₸", grouped)
    }
}

/// Truncate text to `max` characters, appending an ellipsis when shortened.
pub fn snippet(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut shortened: String = text.chars().take(max).collect();
    shortened.push('…');
    shortened
}

/// File name for an export download, embedding the active filters and the
/// current timestamp.
pub fn export_filename(
    status: Option<&str>,
    category: Option<&str>,
    timestamp: NaiveDateTime,
) -> String {
    let mut name = String::from("report");
    if let Some(status) = status {
        name.push('_');
        name.push_str(status);
    }
    if let Some(category) = category {
        name.push('_');
        name.push_str(category);
    }
    format!("{}_{}.xlsx", name, timestamp.format("%Y%m%d_%H%M"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 8, 7)
            .unwrap()
            .and_hms_opt(14, 5, 0)
            .unwrap()
    }

    #[test]
    fn datetime_accepts_naive_and_offset_forms() {
        assert_eq!(format_datetime("2025-08-07T14:05:00"), "07.08.2025 14:05");
        assert_eq!(
            format_datetime("2025-08-07T14:05:00.123456"),
            "07.08.2025 14:05"
        );
        assert_eq!(
            format_datetime("2025-08-07T14:05:00+05:00"),
            "07.08.2025 14:05"
        );
        assert_eq!(format_datetime("yesterday"), "yesterday");
    }

    #[test]
    fn amounts_are_grouped_by_thousands() {
        assert_eq!(format_amount(125000.0), "125 000 ₸");
        assert_eq!(format_amount(1234567.4), "1 234 567 ₸");
        assert_eq!(format_amount(900.0), "900 ₸");
        assert_eq!(format_amount(-45000.0), "-45 000 ₸");
    }

    #[test]
    fn snippets_respect_character_boundaries() {
        assert_eq!(snippet("короткий текст", 50), "короткий текст");
        assert_eq!(snippet("обещаю оплатить в пятницу", 14), "обещаю оплатит…");
    }

    #[test]
    fn export_filename_embeds_active_filters() {
        assert_eq!(
            export_filename(None, None, ts()),
            "report_20250807_1405.xlsx"
        );
        assert_eq!(
            export_filename(Some("completed"), None, ts()),
            "report_completed_20250807_1405.xlsx"
        );
        assert_eq!(
            export_filename(Some("pending"), Some("promise"), ts()),
            "report_pending_promise_20250807_1405.xlsx"
        );
    }
}
