//! Analytics page and statistics JSON endpoint.

use askama::Template;
use axum::extract::{Query, State};
use axum::Json;

use collect_api::AnalyticsData;

use crate::error::Result;
use crate::labels::{category_badge, Badge};
use crate::page::{NoticeParams, PageMeta};
use crate::routes::dashboard::{activity_bars, ActivityBar};
use crate::state::AppState;

/// Analytics page template.
#[derive(Template)]
#[template(path = "analytics.html")]
pub struct AnalyticsTemplate {
    pub meta: PageMeta,
    pub summary: SummaryCards,
    pub categories: Vec<CategoryRow>,
    pub activity: Vec<ActivityBar>,
}

/// Headline counters.
pub struct SummaryCards {
    pub total_clients: i64,
    pub completed: i64,
    pub success_rate: i64,
    pub pending: i64,
}

/// One row of the category distribution.
pub struct CategoryRow {
    pub badge: Badge,
    pub count: i64,
    pub percent: i64,
}

/// Render the analytics page.
pub async fn analytics_page(
    State(state): State<AppState>,
    Query(params): Query<NoticeParams>,
) -> Result<AnalyticsTemplate> {
    let data = state.queries.statistics(&state.api).await?;

    Ok(AnalyticsTemplate {
        meta: PageMeta::new("analytics", &state.settings.get(), params.into_notice()),
        summary: SummaryCards {
            total_clients: data.summary.total_clients,
            completed: data.summary.completed,
            success_rate: data.summary.success_rate.round() as i64,
            pending: data.summary.pending,
        },
        categories: category_rows(&data),
        activity: activity_bars(&data.daily_activity),
    })
}

/// Get aggregate statistics as JSON.
pub async fn statistics_api(State(state): State<AppState>) -> Result<Json<AnalyticsData>> {
    let data = state.queries.statistics(&state.api).await?;
    Ok(Json(data))
}

/// Category distribution sorted by call count, with shares of the total.
fn category_rows(data: &AnalyticsData) -> Vec<CategoryRow> {
    let total: i64 = data.categories.values().sum();
    let mut rows: Vec<CategoryRow> = data
        .categories
        .iter()
        .map(|(key, count)| CategoryRow {
            badge: category_badge(key),
            count: *count,
            percent: if total > 0 { count * 100 / total } else { 0 },
        })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use collect_api::AnalyticsSummary;
    use std::collections::BTreeMap;

    use crate::labels::FALLBACK_COLOR;

    fn data(categories: BTreeMap<String, i64>) -> AnalyticsData {
        AnalyticsData {
            summary: AnalyticsSummary {
                total_clients: 10,
                completed: 4,
                processing: 1,
                failed: 1,
                pending: 4,
                success_rate: 40.0,
            },
            categories,
            daily_activity: vec![],
        }
    }

    #[test]
    fn rows_are_sorted_by_count_with_shares() {
        let mut categories = BTreeMap::new();
        categories.insert("promise".to_string(), 6);
        categories.insert("hangup".to_string(), 2);
        categories.insert("ignore".to_string(), 2);

        let rows = category_rows(&data(categories));
        assert_eq!(rows[0].badge.label, "Обещал оплатить");
        assert_eq!(rows[0].percent, 60);
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn unknown_backend_categories_render_with_fallback_style() {
        let mut categories = BTreeMap::new();
        categories.insert("escalated_to_court".to_string(), 3);

        let rows = category_rows(&data(categories));
        assert_eq!(rows[0].badge.label, "escalated_to_court");
        assert_eq!(rows[0].badge.color, FALLBACK_COLOR);
    }

    #[test]
    fn empty_distribution_yields_no_rows() {
        let rows = category_rows(&data(BTreeMap::new()));
        assert!(rows.is_empty());
    }
}
