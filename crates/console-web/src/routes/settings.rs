//! Operator settings page.

use askama::Template;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Form;
use serde::Deserialize;
use tracing::info;

use settings::{Language, SettingsError, SettingsPatch};

use crate::error::Result;
use crate::page::{redirect_with_notice, Notice, NoticeParams, PageMeta};
use crate::state::AppState;

/// Settings page template.
#[derive(Template)]
#[template(path = "settings.html")]
pub struct SettingsTemplate {
    pub meta: PageMeta,
    pub form: SettingsFormView,
    pub api_url_error: Option<String>,
    pub interval_error: Option<String>,
}

/// Current form values, re-rendered verbatim on validation failure.
pub struct SettingsFormView {
    pub api_url: String,
    pub language: &'static str,
    pub demo_mode: bool,
    pub auto_refresh_interval: String,
}

/// Raw settings form submission.
#[derive(Debug, Deserialize)]
pub struct SettingsFormBody {
    pub api_url: String,
    pub language: String,
    pub auto_refresh_interval: String,
    /// Checkboxes are only present when checked.
    #[serde(default)]
    pub demo_mode: Option<String>,
}

/// Render the settings page.
pub async fn settings_page(
    State(state): State<AppState>,
    Query(params): Query<NoticeParams>,
) -> SettingsTemplate {
    let current = state.settings.get();
    SettingsTemplate {
        meta: PageMeta::new("settings", &current, params.into_notice()),
        form: SettingsFormView {
            api_url: current.api_url.clone(),
            language: current.language.as_str(),
            demo_mode: current.demo_mode,
            auto_refresh_interval: current.auto_refresh_interval.to_string(),
        },
        api_url_error: None,
        interval_error: None,
    }
}

/// Apply a settings form submission.
///
/// Validation failures re-render the form with the offending values and an
/// inline message; nothing is persisted in that case.
pub async fn update(
    State(state): State<AppState>,
    Form(body): Form<SettingsFormBody>,
) -> Result<Response> {
    let demo_mode = body.demo_mode.is_some();

    let interval = match body.auto_refresh_interval.trim().parse::<u32>() {
        Ok(value) => value,
        Err(_) => {
            return Ok(rerender(
                &state,
                &body,
                demo_mode,
                None,
                Some("Интервал должен быть неотрицательным числом".to_string()),
            ));
        }
    };

    let patch = SettingsPatch {
        api_url: Some(body.api_url.trim().to_string()),
        language: parse_language(&body.language),
        theme: None,
        demo_mode: Some(demo_mode),
        auto_refresh_interval: Some(interval),
    };

    match state.settings.update(patch) {
        Ok(updated) => {
            info!(api_url = %updated.api_url, demo_mode = updated.demo_mode, "Settings updated");
            let notice = Notice::success("Настройки сохранены");
            Ok(redirect_with_notice("/settings", &notice).into_response())
        }
        Err(SettingsError::InvalidApiUrl(_)) => Ok(rerender(
            &state,
            &body,
            demo_mode,
            Some("Некорректный адрес сервера (например, http://localhost:8000)".to_string()),
            None,
        )),
    }
}

/// Restore default settings and erase the stored record.
pub async fn reset(State(state): State<AppState>) -> Response {
    state.settings.reset();
    info!("Settings reset to defaults");
    let notice = Notice::success("Настройки сброшены");
    redirect_with_notice("/settings", &notice).into_response()
}

fn rerender(
    state: &AppState,
    body: &SettingsFormBody,
    demo_mode: bool,
    api_url_error: Option<String>,
    interval_error: Option<String>,
) -> Response {
    let current = state.settings.get();
    SettingsTemplate {
        meta: PageMeta::new("settings", &current, None),
        form: SettingsFormView {
            api_url: body.api_url.clone(),
            language: parse_language(&body.language)
                .unwrap_or(current.language)
                .as_str(),
            demo_mode,
            auto_refresh_interval: body.auto_refresh_interval.clone(),
        },
        api_url_error,
        interval_error,
    }
    .into_response()
}

fn parse_language(raw: &str) -> Option<Language> {
    match raw {
        "ru" => Some(Language::Ru),
        "en" => Some(Language::En),
        "kk" => Some(Language::Kk),
        _ => None,
    }
}
