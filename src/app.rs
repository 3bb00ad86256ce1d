use crate::adapters::TokioTimeProvider;
use crate::assets;
use crate::config;
use crate::ports::TimeProvider;
use crate::state;

use axum::Router;
use axum::routing::get;
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

mod analytics;
mod auth;
mod docs;
mod notifications;
mod widget;

pub fn app(config: config::AppConfig) -> Router {
    let state = state::AppState::new(config, TokioTimeProvider)
        .unwrap_or_else(|err| panic!("failed to load seed data: {err}"));
    router(state)
}

pub(crate) fn router<T: TimeProvider>(state: state::AppState<T>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    Router::new()
        .route("/health", get(health))
        .route("/widget.js", get(assets::widget_script::<T>))
        .route("/docs", get(docs::docs_page::<T>))
        .route(
            "/api/widget",
            get(widget::widget_fetch::<T>).post(widget::widget_interaction::<T>),
        )
        .route(
            "/api/widget/settings",
            get(widget::widget_settings::<T>).put(widget::widget_settings_update::<T>),
        )
        .route(
            "/api/notifications",
            get(notifications::notification_list::<T>)
                .post(notifications::notification_create::<T>)
                .put(notifications::notification_update::<T>)
                .delete(notifications::notification_delete::<T>),
        )
        .route(
            "/api/auth",
            get(auth::session::<T>)
                .post(auth::login::<T>)
                .put(auth::register::<T>)
                .delete(auth::logout::<T>),
        )
        .route(
            "/api/analytics",
            get(analytics::analytics_overview::<T>).post(analytics::analytics_track::<T>),
        )
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub(crate) async fn health() -> &'static str {
    "ok"
}

/// `{"success": true, ...}` body shared by the JSON routes.
#[derive(Debug, Serialize)]
pub(crate) struct Envelope<D> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<D>,
    #[serde(skip_serializing_if = "Option::is_none")]
    total: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
}

impl<D> Envelope<D> {
    pub(crate) fn data(data: D) -> Self {
        Self {
            success: true,
            data: Some(data),
            total: None,
            message: None,
        }
    }

    pub(crate) fn with_total(mut self, total: usize) -> Self {
        self.total = Some(total);
        self
    }

    pub(crate) fn with_message(mut self, message: &'static str) -> Self {
        self.message = Some(message);
        self
    }
}

impl Envelope<()> {
    pub(crate) fn message(message: &'static str) -> Self {
        Self {
            success: true,
            data: None,
            total: None,
            message: Some(message),
        }
    }
}

/// Drops missing and blank values.
pub(crate) fn present(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}
