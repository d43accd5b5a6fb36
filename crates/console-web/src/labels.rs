//! Status and category label/color tables.
//!
//! Lookups are keyed by the raw wire string so a value this build does not
//! know renders with the neutral fallback style instead of failing.

use collect_api::{Category, ClientStatus};

/// Neutral badge color for unrecognized keys.
pub const FALLBACK_COLOR: &str = "#6B7280";

/// Display label and color pair for a badge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    pub label: String,
    pub color: &'static str,
}

/// Human-readable label for a client status key.
pub fn status_label(key: &str) -> &str {
    match key {
        "pending" => "Ожидает",
        "processing" => "Обрабатывается",
        "completed" => "Завершено",
        "failed" => "Ошибка",
        other => other,
    }
}

/// Badge color for a client status key.
pub fn status_color(key: &str) -> &'static str {
    match key {
        "pending" => "#F59E0B",
        "processing" => "#06B6D4",
        "completed" => "#10B981",
        "failed" => "#EF4444",
        _ => FALLBACK_COLOR,
    }
}

/// Human-readable label for a call category key.
pub fn category_label(key: &str) -> &str {
    match key {
        "ignore" => "Игнорирует",
        "promise" => "Обещал оплатить",
        "help" => "Требуется помощь",
        "wrong_number" => "Неверный номер",
        "third_party" => "Третье лицо",
        "hangup" => "Сброс",
        "unknown" => "Неизвестно",
        other => other,
    }
}

/// Badge color for a call category key.
pub fn category_color(key: &str) -> &'static str {
    match key {
        "ignore" => "#9CA3AF",
        "promise" => "#10B981",
        "help" => "#F59E0B",
        "wrong_number" => "#EF4444",
        "third_party" => "#6366F1",
        "hangup" => "#EF4444",
        "unknown" => FALLBACK_COLOR,
        _ => FALLBACK_COLOR,
    }
}

/// Badge for a typed client status.
pub fn status_badge(status: ClientStatus) -> Badge {
    let key = status.as_str();
    Badge {
        label: status_label(key).to_string(),
        color: status_color(key),
    }
}

/// Badge for a raw category key.
pub fn category_badge(key: &str) -> Badge {
    Badge {
        label: category_label(key).to_string(),
        color: category_color(key),
    }
}

/// Badge for a typed category.
pub fn typed_category_badge(category: Category) -> Badge {
    category_badge(category.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_keys_map_through_the_tables() {
        assert_eq!(status_label("pending"), "Ожидает");
        assert_eq!(status_color("completed"), "#10B981");
        assert_eq!(category_label("promise"), "Обещал оплатить");
        assert_eq!(category_color("third_party"), "#6366F1");
    }

    #[test]
    fn unrecognized_keys_fall_back_to_neutral_style() {
        assert_eq!(category_color("escalated_to_court"), FALLBACK_COLOR);
        assert_eq!(category_label("escalated_to_court"), "escalated_to_court");
        assert_eq!(status_color("archived"), FALLBACK_COLOR);
        assert_eq!(status_label("archived"), "archived");
    }

    #[test]
    fn every_declared_value_has_a_label() {
        for status in ClientStatus::ALL {
            assert_ne!(status_label(status.as_str()), status.as_str());
        }
        for category in Category::ALL {
            assert_ne!(category_label(category.as_str()), category.as_str());
            assert_ne!(category_color(category.as_str()), "");
        }
    }
}
