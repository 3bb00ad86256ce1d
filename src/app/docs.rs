use crate::assets::{REFRESH_INTERVAL, SETTINGS_STORAGE_KEY};
use crate::ports::TimeProvider;
use crate::state;
use crate::templates::{DocsTemplate, RouteDoc};

use axum::extract::State;

const DEMO_WIDGET_TOKEN: &str = "fp_demo_12345678";

const ROUTES: [(&str, &str, &str); 16] = [
    ("GET", "/widget.js?token=", "Embeddable widget script"),
    (
        "GET",
        "/api/widget?token=",
        "Widget settings and active notifications",
    ),
    ("POST", "/api/widget", "Report a click or dismissal"),
    (
        "GET",
        "/api/widget/settings",
        "Your widget token, settings and embed code",
    ),
    ("PUT", "/api/widget/settings", "Update widget settings"),
    (
        "GET",
        "/api/notifications",
        "List notifications by userId, type, status",
    ),
    ("POST", "/api/notifications", "Create a notification"),
    ("PUT", "/api/notifications", "Update a notification"),
    ("DELETE", "/api/notifications?id=", "Delete a notification"),
    ("GET", "/api/auth", "Validate a bearer session"),
    ("POST", "/api/auth", "Log in"),
    ("PUT", "/api/auth", "Register an account and widget"),
    ("DELETE", "/api/auth", "Log out"),
    ("GET", "/api/analytics", "Summary, daily performance, top notifications"),
    ("POST", "/api/analytics", "Track an impression, click or dismissal"),
    ("GET", "/health", "Liveness check"),
];

pub(crate) async fn docs_page<T: TimeProvider>(
    State(state): State<state::AppState<T>>,
) -> DocsTemplate {
    DocsTemplate {
        app_name: state.config.app_name.clone(),
        embed_code: state.config.embed_code(DEMO_WIDGET_TOKEN),
        demo_token: DEMO_WIDGET_TOKEN,
        settings_key: SETTINGS_STORAGE_KEY,
        refresh_minutes: REFRESH_INTERVAL.as_secs() / 60,
        routes: ROUTES
            .iter()
            .map(|&(method, path, purpose)| RouteDoc {
                method,
                path,
                purpose,
            })
            .collect(),
    }
}
