use super::Envelope;
use super::present;
use crate::error::ApiError;
use crate::error::ApiResult;
use crate::ports::TimeProvider;
use crate::state;
use crate::store::NotificationQuery;
use crate::types::UnknownValue;
use crate::types::notification::NewNotification;
use crate::types::notification::Notification;
use crate::types::notification::NotificationPatch;

use axum::Json;
use axum::extract::Query;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use serde::Deserialize;
use serde::Serialize;
use time::OffsetDateTime;
use time::PrimitiveDateTime;
use time::format_description::BorrowedFormatItem;
use time::format_description::well_known::Rfc3339;

use std::str::FromStr;

/// Filter value meaning "no filter".
const ALL: &str = "all";

/// `datetime-local` form values, taken as UTC.
const LOCAL_MINUTES: &[BorrowedFormatItem<'static>] =
    time::macros::format_description!("[year]-[month]-[day]T[hour]:[minute]");
const LOCAL_SECONDS: &[BorrowedFormatItem<'static>] =
    time::macros::format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NotificationFilter {
    user_id: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateNotificationRequest {
    title: Option<String>,
    message: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    user_id: Option<String>,
    scheduled_at: Option<String>,
    expires_at: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdateNotificationRequest {
    id: Option<String>,
    title: Option<String>,
    message: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    status: Option<String>,
    scheduled_at: Option<String>,
    expires_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DeleteQuery {
    id: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct NotificationWithCtr {
    #[serde(flatten)]
    notification: Notification,
    ctr: f64,
}

impl From<Notification> for NotificationWithCtr {
    fn from(notification: Notification) -> Self {
        Self {
            ctr: notification.ctr(),
            notification,
        }
    }
}

pub(crate) async fn notification_list<T: TimeProvider>(
    State(state): State<state::AppState<T>>,
    Query(filter): Query<NotificationFilter>,
) -> ApiResult<Json<Envelope<Vec<NotificationWithCtr>>>> {
    let query = NotificationQuery {
        user_id: present(filter.user_id),
        kind: parse_filter(filter.kind)?,
        status: parse_filter(filter.status)?,
    };
    let items: Vec<NotificationWithCtr> = state
        .store
        .notifications
        .list(&query)
        .into_iter()
        .map(Into::into)
        .collect();
    let total = items.len();
    Ok(Json(Envelope::data(items).with_total(total)))
}

pub(crate) async fn notification_create<T: TimeProvider>(
    State(state): State<state::AppState<T>>,
    payload: Result<Json<CreateNotificationRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Envelope<NotificationWithCtr>>)> {
    let Json(request) = payload?;
    let (Some(title), Some(message), Some(kind), Some(user_id)) = (
        present(request.title),
        present(request.message),
        present(request.kind),
        present(request.user_id),
    ) else {
        return Err(ApiError::bad_request("Missing required fields"));
    };
    let new = NewNotification {
        title,
        message,
        kind: kind.parse()?,
        scheduled_at: parse_timestamp("scheduledAt", request.scheduled_at)?,
        expires_at: parse_timestamp("expiresAt", request.expires_at)?,
        user_id,
    };
    let notification = state.store.notifications.insert(new, state.time.now());
    tracing::info!(
        id = %notification.id,
        user_id = %notification.user_id,
        status = ?notification.status,
        "notification created"
    );
    Ok((
        StatusCode::CREATED,
        Json(
            Envelope::data(notification.into())
                .with_message("Notification created successfully"),
        ),
    ))
}

pub(crate) async fn notification_update<T: TimeProvider>(
    State(state): State<state::AppState<T>>,
    payload: Result<Json<UpdateNotificationRequest>, JsonRejection>,
) -> ApiResult<Json<Envelope<NotificationWithCtr>>> {
    let Json(request) = payload?;
    let id = present(request.id).ok_or_else(|| ApiError::not_found("Notification not found"))?;
    let patch = NotificationPatch {
        title: present(request.title),
        message: present(request.message),
        kind: parse_field(request.kind)?,
        status: parse_field(request.status)?,
        scheduled_at: parse_timestamp("scheduledAt", request.scheduled_at)?,
        expires_at: parse_timestamp("expiresAt", request.expires_at)?,
    };
    let notification = state
        .store
        .notifications
        .update(&id, patch)
        .ok_or_else(|| ApiError::not_found("Notification not found"))?;
    tracing::info!(%id, "notification updated");
    Ok(Json(
        Envelope::data(notification.into()).with_message("Notification updated successfully"),
    ))
}

pub(crate) async fn notification_delete<T: TimeProvider>(
    State(state): State<state::AppState<T>>,
    Query(query): Query<DeleteQuery>,
) -> ApiResult<Json<Envelope<()>>> {
    let id =
        present(query.id).ok_or_else(|| ApiError::bad_request("Notification ID is required"))?;
    state
        .store
        .notifications
        .remove(&id)
        .ok_or_else(|| ApiError::not_found("Notification not found"))?;
    tracing::info!(%id, "notification deleted");
    Ok(Json(Envelope::message("Notification deleted successfully")))
}

fn parse_filter<E>(raw: Option<String>) -> ApiResult<Option<E>>
where
    E: FromStr<Err = UnknownValue>,
{
    parse_field(raw.filter(|raw| raw != ALL))
}

fn parse_field<E>(raw: Option<String>) -> ApiResult<Option<E>>
where
    E: FromStr<Err = UnknownValue>,
{
    match present(raw) {
        Some(raw) => Ok(Some(raw.trim().parse()?)),
        None => Ok(None),
    }
}

/// Accepts RFC 3339 or a zone-less `YYYY-MM-DDTHH:MM[:SS]`. Blank means unset.
fn parse_timestamp(field: &str, raw: Option<String>) -> ApiResult<Option<OffsetDateTime>> {
    let Some(raw) = present(raw) else {
        return Ok(None);
    };
    let raw = raw.trim();
    OffsetDateTime::parse(raw, &Rfc3339)
        .or_else(|_| {
            PrimitiveDateTime::parse(raw, LOCAL_SECONDS).map(PrimitiveDateTime::assume_utc)
        })
        .or_else(|_| {
            PrimitiveDateTime::parse(raw, LOCAL_MINUTES).map(PrimitiveDateTime::assume_utc)
        })
        .map(Some)
        .map_err(|_| ApiError::bad_request(format!("Invalid {field} timestamp")))
}
