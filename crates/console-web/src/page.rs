//! Shared page chrome: navigation state, flash notices, pagination.

use axum::response::Redirect;
use serde::Deserialize;
use settings::Settings;

/// Kind of a flash notice, mapped to a style in the templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
    Warning,
}

impl NoticeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoticeKind::Success => "success",
            NoticeKind::Error => "error",
            NoticeKind::Warning => "warning",
        }
    }

    fn parse(raw: &str) -> Self {
        match raw {
            "error" => NoticeKind::Error,
            "warning" => NoticeKind::Warning,
            _ => NoticeKind::Success,
        }
    }
}

/// One-shot notice carried across a redirect.
#[derive(Debug, Clone)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Warning,
            text: text.into(),
        }
    }
}

/// Notice query parameters appended by post-redirect-get handlers.
#[derive(Debug, Default, Deserialize)]
pub struct NoticeParams {
    pub notice: Option<String>,
    pub kind: Option<String>,
}

impl NoticeParams {
    pub fn into_notice(self) -> Option<Notice> {
        let text = self.notice?;
        let kind = self
            .kind
            .as_deref()
            .map(NoticeKind::parse)
            .unwrap_or(NoticeKind::Success);
        Some(Notice { kind, text })
    }
}

/// Redirect to `path` carrying a flash notice.
pub fn redirect_with_notice(path: &str, notice: &Notice) -> Redirect {
    let separator = if path.contains('?') { '&' } else { '?' };
    Redirect::to(&format!(
        "{}{}notice={}&kind={}",
        path,
        separator,
        urlencoding::encode(&notice.text),
        notice.kind.as_str()
    ))
}

/// Chrome state shared by every page template.
#[derive(Debug, Clone)]
pub struct PageMeta {
    /// Key of the active navigation item.
    pub active: &'static str,
    /// Auto-refresh interval in seconds; 0 disables the refresh tag.
    pub refresh_interval: u32,
    pub notice: Option<Notice>,
}

impl PageMeta {
    pub fn new(active: &'static str, settings: &Settings, notice: Option<Notice>) -> Self {
        Self {
            active,
            refresh_interval: settings.auto_refresh_interval,
            notice,
        }
    }
}

/// Pagination control state for a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub total_pages: i64,
    pub has_prev: bool,
    pub has_next: bool,
    pub prev_href: String,
    pub next_href: String,
}

impl Pagination {
    /// Build pagination for `base` preserving the given extra parameters.
    pub fn for_path(
        base: &str,
        extra: &[(&str, String)],
        page: i64,
        total: i64,
        limit: i64,
    ) -> Self {
        let total_pages = if limit > 0 {
            ((total + limit - 1) / limit).max(1)
        } else {
            1
        };
        let href = |target: i64| {
            let mut query = format!("{}?page={}", base, target);
            for (name, value) in extra {
                query.push('&');
                query.push_str(name);
                query.push('=');
                query.push_str(&urlencoding::encode(value));
            }
            query
        };
        Self {
            page,
            total_pages,
            has_prev: page > 1,
            has_next: page < total_pages,
            prev_href: href(page - 1),
            next_href: href(page + 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_disable_navigation() {
        // 47 records at 25 per page give exactly two pages.
        let first = Pagination::for_path("/clients", &[], 1, 47, 25);
        assert_eq!(first.total_pages, 2);
        assert!(!first.has_prev);
        assert!(first.has_next);

        let last = Pagination::for_path("/clients", &[], 2, 47, 25);
        assert!(last.has_prev);
        assert!(!last.has_next);
    }

    #[test]
    fn empty_listing_still_has_one_page() {
        let pagination = Pagination::for_path("/history", &[], 1, 0, 20);
        assert_eq!(pagination.total_pages, 1);
        assert!(!pagination.has_prev);
        assert!(!pagination.has_next);
    }

    #[test]
    fn hrefs_preserve_extra_parameters() {
        let pagination = Pagination::for_path(
            "/clients",
            &[("status", "pending".to_string())],
            2,
            100,
            25,
        );
        assert_eq!(pagination.prev_href, "/clients?page=1&status=pending");
        assert_eq!(pagination.next_href, "/clients?page=3&status=pending");
    }

    #[test]
    fn notice_params_round_trip() {
        let params = NoticeParams {
            notice: Some("Настройки сохранены".to_string()),
            kind: Some("success".to_string()),
        };
        let notice = params.into_notice().unwrap();
        assert_eq!(notice.kind, NoticeKind::Success);

        let absent = NoticeParams::default().into_notice();
        assert!(absent.is_none());
    }
}
