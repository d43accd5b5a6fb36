//! Dashboard page.

use askama::Template;
use axum::extract::{Query, State};

use collect_api::{ClientQuery, DailyActivity, HistoryQuery};

use crate::error::Result;
use crate::format::{format_amount, format_datetime, snippet};
use crate::labels::{typed_category_badge, Badge};
use crate::page::{NoticeParams, PageMeta};
use crate::state::AppState;

/// Dashboard page template.
#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub meta: PageMeta,
    pub stats: DashboardStats,
    pub recent: Vec<RecentCall>,
    pub activity: Vec<ActivityBar>,
}

/// Headline numbers for the stat tiles.
pub struct DashboardStats {
    pub total_clients: i64,
    pub active_calls: i64,
    pub success_rate: i64,
    pub total_debt: String,
}

/// One row in the recent calls list.
pub struct RecentCall {
    pub fio: String,
    pub phone: String,
    pub badge: Option<Badge>,
    pub transcript: String,
    pub created_at: String,
}

/// One bar of the daily activity chart.
pub struct ActivityBar {
    pub date: String,
    pub count: i64,
    pub percent: i64,
}

/// Render the dashboard page.
pub async fn dashboard_page(
    State(state): State<AppState>,
    Query(params): Query<NoticeParams>,
) -> Result<DashboardTemplate> {
    let analytics = state.queries.statistics(&state.api).await?;
    let clients = state
        .queries
        .clients(
            &state.api,
            &ClientQuery {
                limit: 10,
                ..ClientQuery::default()
            },
        )
        .await?;
    let recent_page = state
        .queries
        .history(&state.api, &HistoryQuery { page: 1, limit: 5 })
        .await?;

    // Approximation from the first clients page; the backend has no
    // debt-total endpoint.
    let total_debt: f64 = clients.items.iter().map(|client| client.amount).sum();

    let stats = DashboardStats {
        total_clients: analytics.summary.total_clients,
        active_calls: analytics.summary.processing,
        success_rate: analytics.summary.success_rate.round() as i64,
        total_debt: format_amount(total_debt),
    };

    let recent = recent_page
        .items
        .iter()
        .map(|item| RecentCall {
            fio: item.client.fio.clone(),
            phone: item.client.phone.clone(),
            badge: item.record.category.map(typed_category_badge),
            transcript: snippet(item.record.transcript.as_deref().unwrap_or("—"), 60),
            created_at: format_datetime(&item.record.created_at),
        })
        .collect();

    Ok(DashboardTemplate {
        meta: PageMeta::new("dashboard", &state.settings.get(), params.into_notice()),
        stats,
        recent,
        activity: activity_bars(&analytics.daily_activity),
    })
}

/// Scale daily counts to percentages of the busiest day.
pub(crate) fn activity_bars(days: &[DailyActivity]) -> Vec<ActivityBar> {
    let max = days.iter().map(|day| day.count).max().unwrap_or(0).max(1);
    days.iter()
        .map(|day| ActivityBar {
            date: day.date.clone(),
            count: day.count,
            percent: day.count * 100 / max,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bars_scale_to_the_busiest_day() {
        let days = vec![
            DailyActivity {
                date: "2025-08-05".to_string(),
                count: 5,
            },
            DailyActivity {
                date: "2025-08-06".to_string(),
                count: 20,
            },
        ];
        let bars = activity_bars(&days);
        assert_eq!(bars[0].percent, 25);
        assert_eq!(bars[1].percent, 100);
    }

    #[test]
    fn empty_activity_produces_no_bars() {
        assert!(activity_bars(&[]).is_empty());
    }
}
