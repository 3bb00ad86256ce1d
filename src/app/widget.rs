use super::Envelope;
use super::auth::AuthenticatedUser;
use super::present;
use crate::error::ApiError;
use crate::error::ApiResult;
use crate::ports::TimeProvider;
use crate::state;
use crate::types::analytics::EventKind;
use crate::types::notification::Notification;
use crate::types::notification::NotificationStatus;
use crate::types::notification::NotificationType;
use crate::types::widget::WidgetSettings;
use crate::types::widget::WidgetSettingsPatch;

use axum::Json;
use axum::extract::Query;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::HeaderMap;
use axum::http::header::{REFERER, USER_AGENT};
use serde::Deserialize;
use serde::Serialize;
use time::OffsetDateTime;

#[derive(Debug, Deserialize)]
pub(crate) struct WidgetQuery {
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WidgetInteraction {
    token: Option<String>,
    notification_id: Option<String>,
    event: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct WidgetPayload {
    settings: WidgetSettings,
    notifications: Vec<WidgetNotification>,
}

/// The part of a notification a site visitor gets to see.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WidgetNotification {
    id: String,
    title: String,
    message: String,
    #[serde(rename = "type")]
    kind: NotificationType,
    status: NotificationStatus,
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,
}

impl From<Notification> for WidgetNotification {
    fn from(notification: Notification) -> Self {
        Self {
            id: notification.id,
            title: notification.title,
            message: notification.message,
            kind: notification.kind,
            status: notification.status,
            created_at: notification.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WidgetConfig {
    token: String,
    domain: Option<String>,
    settings: WidgetSettings,
    embed_code: String,
}

pub(crate) async fn widget_fetch<T: TimeProvider>(
    State(state): State<state::AppState<T>>,
    headers: HeaderMap,
    Query(query): Query<WidgetQuery>,
) -> ApiResult<Json<Envelope<WidgetPayload>>> {
    let token = present(query.token).ok_or_else(|| ApiError::bad_request("Token is required"))?;
    let widget = state
        .store
        .widgets
        .find_by_token(&token)
        .ok_or_else(|| ApiError::not_found("Invalid token"))?;

    if let Some(referer) = headers.get(REFERER).and_then(|value| value.to_str().ok())
        && !widget.matches_referer(referer)
    {
        tracing::warn!(
            token = %widget.token,
            referer,
            domain = widget.domain.as_deref().unwrap_or_default(),
            "widget loaded from unexpected domain"
        );
    }

    let now = state.time.now();
    let notifications = state.store.notifications.active_for_user(&widget.user_id);
    for notification in &notifications {
        state
            .store
            .track_event(&notification.id, &widget.user_id, EventKind::Impression, now);
    }

    Ok(Json(Envelope::data(WidgetPayload {
        settings: widget.settings,
        notifications: notifications.into_iter().map(Into::into).collect(),
    })))
}

pub(crate) async fn widget_interaction<T: TimeProvider>(
    State(state): State<state::AppState<T>>,
    headers: HeaderMap,
    payload: Result<Json<WidgetInteraction>, JsonRejection>,
) -> ApiResult<Json<Envelope<()>>> {
    let Json(request) = payload?;
    let (Some(token), Some(notification_id), Some(event)) = (
        present(request.token),
        present(request.notification_id),
        present(request.event),
    ) else {
        return Err(ApiError::bad_request(
            "Token, notificationId and event are required",
        ));
    };
    let event = event.parse::<EventKind>()?;
    let widget = state
        .store
        .widgets
        .find_by_token(&token)
        .ok_or_else(|| ApiError::not_found("Invalid token"))?;
    state
        .store
        .notifications
        .find_for_user(&notification_id, &widget.user_id)
        .ok_or_else(|| ApiError::not_found("Notification not found"))?;

    let user_agent = headers
        .get(USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    tracing::debug!(user_agent, "widget interaction");
    state.store.track_event(
        &notification_id,
        &widget.user_id,
        event,
        state.time.now(),
    );
    Ok(Json(Envelope::message("Interaction recorded")))
}

pub(crate) async fn widget_settings<T: TimeProvider>(
    State(state): State<state::AppState<T>>,
    auth: AuthenticatedUser,
) -> ApiResult<Json<Envelope<WidgetConfig>>> {
    let widget = state
        .store
        .widgets
        .find_by_user(&auth.user_id)
        .ok_or_else(|| ApiError::not_found("Widget not found"))?;
    Ok(Json(Envelope::data(WidgetConfig {
        embed_code: state.config.embed_code(&widget.token),
        token: widget.token,
        domain: widget.domain,
        settings: widget.settings,
    })))
}

pub(crate) async fn widget_settings_update<T: TimeProvider>(
    State(state): State<state::AppState<T>>,
    auth: AuthenticatedUser,
    payload: Result<Json<WidgetSettingsPatch>, JsonRejection>,
) -> ApiResult<Json<Envelope<WidgetConfig>>> {
    let Json(patch) = payload?;
    let widget = state
        .store
        .widgets
        .update_for_user(&auth.user_id, patch)
        .ok_or_else(|| ApiError::not_found("Widget not found"))?;
    tracing::info!(user_id = %auth.user_id, "widget settings updated");
    Ok(Json(
        Envelope::data(WidgetConfig {
            embed_code: state.config.embed_code(&widget.token),
            token: widget.token,
            domain: widget.domain,
            settings: widget.settings,
        })
        .with_message("Widget settings updated"),
    ))
}
