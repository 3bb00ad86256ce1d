use super::Envelope;
use super::present;
use crate::auth as auth_service;
use crate::error::ApiError;
use crate::error::ApiResult;
use crate::ports::TimeProvider;
use crate::state;
use crate::store::DuplicateEmail;
use crate::types::user::NewUser;
use crate::types::user::Plan;
use crate::types::user::User;
use crate::types::widget::Widget;
use crate::types::widget::WidgetSettings;

use axum::Json;
use axum::extract::FromRequestParts;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::http::request::Parts;
use serde::Deserialize;
use serde::Serialize;

const MIN_PASSWORD_CHARS: usize = 6;
const TOKEN_REQUIRED: &str = "Authorization token required";

/// Owner of a valid bearer session.
#[derive(Debug, Clone)]
pub(crate) struct AuthenticatedUser {
    pub(crate) user_id: String,
}

impl<T: TimeProvider> FromRequestParts<state::AppState<T>> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &state::AppState<T>,
    ) -> Result<Self, Self::Rejection> {
        let token = auth_service::bearer_token(&parts.headers)
            .ok_or_else(|| ApiError::unauthorized(TOKEN_REQUIRED))?;
        match state.sessions.validate(token, state.time.now()) {
            Some(user_id) => Ok(Self { user_id }),
            None => {
                tracing::warn!("rejected unknown or expired session token");
                Err(ApiError::unauthorized("Invalid or expired token"))
            }
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginRequest {
    email: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RegisterRequest {
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
    website: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AuthData {
    user: User,
    token: String,
    expires_in: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    widget_token: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SessionData {
    user: User,
    valid: bool,
}

pub(crate) async fn session<T: TimeProvider>(
    State(state): State<state::AppState<T>>,
    auth: AuthenticatedUser,
) -> ApiResult<Json<Envelope<SessionData>>> {
    let user = state
        .store
        .users
        .get(&auth.user_id)
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(Json(Envelope::data(SessionData { user, valid: true })))
}

pub(crate) async fn login<T: TimeProvider>(
    State(state): State<state::AppState<T>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<Envelope<AuthData>>> {
    let Json(request) = payload?;
    let (Some(email), Some(password)) = (present(request.email), present(request.password))
    else {
        return Err(ApiError::bad_request("Email and password are required"));
    };
    let email = email.trim();

    let Some(user) = state
        .store
        .users
        .find_by_email(email)
        .filter(|user| auth_service::verify_password(&password, &user.password_hash))
    else {
        tracing::info!(email, "login rejected");
        return Err(ApiError::unauthorized("Invalid email or password"));
    };

    let data = open_session(&state, user, None)?;
    Ok(Json(Envelope::data(data)))
}

pub(crate) async fn register<T: TimeProvider>(
    State(state): State<state::AppState<T>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Envelope<AuthData>>)> {
    let Json(request) = payload?;
    let (Some(name), Some(email), Some(password)) = (
        present(request.name),
        present(request.email),
        present(request.password),
    ) else {
        return Err(ApiError::bad_request(
            "Name, email and password are required",
        ));
    };
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(ApiError::bad_request(
            "Password must be at least 6 characters",
        ));
    }
    let email = email.trim();
    if !is_valid_email(email) {
        return Err(ApiError::bad_request("Invalid email format"));
    }

    let password_hash = auth_service::hash_password(&password)
        .map_err(|err| ApiError::internal("Registration failed", err))?;
    let website = present(request.website).map(|website| website.trim().to_string());
    let user = state
        .store
        .users
        .insert(NewUser {
            email: email.to_string(),
            password_hash,
            name: name.trim().to_string(),
            website: website.clone(),
            plan: Plan::Free,
            created_at: state.time.now(),
        })
        .map_err(|DuplicateEmail(email)| {
            tracing::info!(%email, "registration rejected for taken email");
            ApiError::Conflict("Email is already registered".to_string())
        })?;

    let widget_token = auth_service::generate_widget_token();
    state.store.widgets.insert(Widget {
        user_id: user.id.clone(),
        token: widget_token.clone(),
        domain: website,
        settings: WidgetSettings::default(),
    });
    tracing::info!(user_id = %user.id, "registered new account");

    let data = open_session(&state, user, Some(widget_token))?;
    Ok((StatusCode::CREATED, Json(Envelope::data(data))))
}

pub(crate) async fn logout<T: TimeProvider>(
    State(state): State<state::AppState<T>>,
    headers: HeaderMap,
) -> ApiResult<Json<Envelope<()>>> {
    let token = auth_service::bearer_token(&headers)
        .ok_or_else(|| ApiError::unauthorized(TOKEN_REQUIRED))?;
    state.sessions.revoke(token);
    Ok(Json(Envelope::message("Logged out successfully")))
}

fn open_session<T: TimeProvider>(
    state: &state::AppState<T>,
    user: User,
    widget_token: Option<String>,
) -> ApiResult<AuthData> {
    let ttl = state.config.session_ttl;
    let session = state
        .sessions
        .issue(&user.id, state.time.now(), ttl)
        .map_err(|err| ApiError::internal("Failed to start session", err))?;
    tracing::debug!(user_id = %user.id, expires_at = %session.expires_at, "session issued");
    Ok(AuthData {
        user,
        token: session.token,
        expires_in: auth_service::describe_ttl(ttl),
        widget_token,
    })
}

/// `local@domain.tld` with no whitespace and a single `@`.
fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .split_once('.')
        .is_some_and(|(host, _)| !host.is_empty())
        && domain.rsplit_once('.').is_some_and(|(_, tld)| !tld.is_empty())
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;

    #[test]
    fn is_valid_email__should_accept_plain_addresses() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("first.last@mail.example.co.id"));
    }

    #[test]
    fn is_valid_email__should_reject_malformed_addresses() {
        for email in [
            "user",
            "@example.com",
            "user@example",
            "user@.com",
            "user@example.",
            "us er@example.com",
            "a@b@example.com",
        ] {
            assert!(!is_valid_email(email), "{email} should be rejected");
        }
    }
}
