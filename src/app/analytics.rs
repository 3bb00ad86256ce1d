use super::Envelope;
use super::present;
use crate::error::ApiError;
use crate::error::ApiResult;
use crate::ports::TimeProvider;
use crate::state;
use crate::types::analytics::AnalyticsRecord;
use crate::types::analytics::AnalyticsSummary;
use crate::types::analytics::Demographics;
use crate::types::analytics::EventKind;
use crate::types::analytics::PerformancePoint;
use crate::types::analytics::top_by_ctr;

use axum::Json;
use axum::extract::Query;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::Deserialize;
use serde::Serialize;

const TOP_NOTIFICATIONS: usize = 5;
const WEEK_POINTS: usize = 7;
const MONTH_POINTS: usize = 30;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AnalyticsQuery {
    user_id: Option<String>,
    notification_id: Option<String>,
    period: Option<String>,
    #[serde(rename = "type")]
    section: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TrackRequest {
    notification_id: Option<String>,
    user_id: Option<String>,
    event: Option<String>,
    user_agent: Option<String>,
    timestamp: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Performance,
    Top,
    Demographics,
    All,
}

impl Section {
    fn from_query(raw: Option<&str>) -> Self {
        match raw {
            Some("performance") => Self::Performance,
            Some("top") => Self::Top,
            Some("demographics") => Self::Demographics,
            _ => Self::All,
        }
    }

    fn includes(self, section: Self) -> bool {
        self == Self::All || self == section
    }
}

fn performance_points(period: Option<&str>) -> usize {
    match period {
        Some("7days") => WEEK_POINTS,
        _ => MONTH_POINTS,
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AnalyticsOverview {
    success: bool,
    summary: AnalyticsSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    performance: Option<Vec<PerformancePoint>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_notifications: Option<Vec<AnalyticsRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    demographics: Option<Demographics>,
}

pub(crate) async fn analytics_overview<T: TimeProvider>(
    State(state): State<state::AppState<T>>,
    Query(query): Query<AnalyticsQuery>,
) -> Json<AnalyticsOverview> {
    let user_id = present(query.user_id);
    let notification_id = present(query.notification_id);
    let records = state
        .store
        .analytics
        .records(user_id.as_deref(), notification_id.as_deref());
    let section = Section::from_query(query.section.as_deref());

    let performance = section.includes(Section::Performance).then(|| {
        state
            .store
            .analytics
            .performance(performance_points(query.period.as_deref()))
    });
    let top_notifications = section
        .includes(Section::Top)
        .then(|| top_by_ctr(&records, TOP_NOTIFICATIONS));
    let demographics = section
        .includes(Section::Demographics)
        .then(Demographics::illustrative);

    Json(AnalyticsOverview {
        success: true,
        summary: AnalyticsSummary::from_records(&records),
        performance,
        top_notifications,
        demographics,
    })
}

pub(crate) async fn analytics_track<T: TimeProvider>(
    State(state): State<state::AppState<T>>,
    payload: Result<Json<TrackRequest>, JsonRejection>,
) -> ApiResult<Json<Envelope<AnalyticsRecord>>> {
    let Json(request) = payload?;
    let (Some(notification_id), Some(user_id), Some(event)) = (
        present(request.notification_id),
        present(request.user_id),
        present(request.event),
    ) else {
        return Err(ApiError::bad_request("Missing required fields"));
    };
    let event = event.parse::<EventKind>()?;
    tracing::debug!(
        user_agent = request.user_agent.as_deref().unwrap_or_default(),
        client_timestamp = request.timestamp.as_deref().unwrap_or_default(),
        "analytics event received"
    );
    let record = state
        .store
        .track_event(&notification_id, &user_id, event, state.time.now());
    Ok(Json(
        Envelope::data(record).with_message("Analytics event tracked successfully"),
    ))
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;

    #[test]
    fn section__should_fall_back_to_all_sections() {
        assert_eq!(Section::from_query(Some("top")), Section::Top);
        assert_eq!(Section::from_query(Some("overview")), Section::All);
        assert_eq!(Section::from_query(None), Section::All);
        assert!(Section::All.includes(Section::Demographics));
        assert!(!Section::Top.includes(Section::Performance));
    }

    #[test]
    fn performance_points__should_use_week_only_for_7days() {
        assert_eq!(performance_points(Some("7days")), 7);
        assert_eq!(performance_points(Some("30days")), 30);
        assert_eq!(performance_points(Some("90days")), 30);
        assert_eq!(performance_points(None), 30);
    }
}
