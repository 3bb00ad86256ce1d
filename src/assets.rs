use crate::config::AppConfig;
use crate::error::ApiError;
use crate::ports::TimeProvider;
use crate::state::AppState;
use crate::templates::WidgetScriptTemplate;
use crate::types::widget::{WidgetAnimation, WidgetPosition, WidgetTheme};

use askama::Template as _;
use axum::extract::State;
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use serde_json::{Map, Value as JsonValue, json};

use std::time::Duration;

/// Local storage key holding a visitor's position/theme/animation choice.
pub(crate) const SETTINGS_STORAGE_KEY: &str = "flashpop_widget_settings";
pub(crate) const REFRESH_INTERVAL: Duration = Duration::from_secs(5 * 60);

pub(crate) async fn widget_script<T: TimeProvider>(
    State(state): State<AppState<T>>,
) -> Result<Response, ApiError> {
    let script = widget_script_template(&state.config)
        .map_err(|err| ApiError::internal("Failed to build widget script", err))?
        .render()
        .map_err(|err| ApiError::internal("Failed to render widget script", err))?;
    Ok((
        [
            (CONTENT_TYPE, "application/javascript; charset=utf-8"),
            (CACHE_CONTROL, "public, max-age=300"),
        ],
        script,
    )
        .into_response())
}

pub(crate) fn widget_script_template(
    config: &AppConfig,
) -> Result<WidgetScriptTemplate, serde_json::Error> {
    let positions: Map<String, JsonValue> = WidgetPosition::ALL
        .into_iter()
        .map(|position| {
            let offsets: Map<String, JsonValue> = position
                .offsets()
                .into_iter()
                .map(|(edge, value)| (edge.to_string(), json!(value)))
                .collect();
            (position.as_str().to_string(), JsonValue::Object(offsets))
        })
        .collect();
    let themes: Map<String, JsonValue> = WidgetTheme::ALL
        .into_iter()
        .map(|theme| {
            (
                theme.as_str().to_string(),
                json!({ "gradient": theme.gradient(), "primary": theme.primary() }),
            )
        })
        .collect();
    let animations: Map<String, JsonValue> = WidgetAnimation::ALL
        .into_iter()
        .map(|animation| (animation.as_str().to_string(), json!(animation.css_class())))
        .collect();

    Ok(WidgetScriptTemplate {
        api_base: serde_json::to_string(config.public_url())?,
        settings_key: serde_json::to_string(SETTINGS_STORAGE_KEY)?,
        refresh_ms: REFRESH_INTERVAL.as_millis() as u64,
        positions: serde_json::to_string(&positions)?,
        themes: serde_json::to_string(&themes)?,
        animations: serde_json::to_string(&animations)?,
        default_position: serde_json::to_string(WidgetPosition::default().as_str())?,
        default_theme: serde_json::to_string(WidgetTheme::default().as_str())?,
        default_animation: serde_json::to_string(WidgetAnimation::default().as_str())?,
    })
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;

    #[test]
    fn widget_script_template__should_inline_lookup_tables() {
        // Given
        let config = AppConfig {
            public_url: "https://flashpop.id/".to_string(),
            ..Default::default()
        };

        // When
        let script = widget_script_template(&config)
            .expect("build template")
            .render()
            .expect("render script");

        // Then
        assert!(script.contains(r#"var API_BASE = "https://flashpop.id";"#));
        assert!(script.contains(r#"var SETTINGS_KEY = "flashpop_widget_settings";"#));
        assert!(script.contains("var REFRESH_MS = 300000;"));
        assert!(script.contains(
            r#""top-left":{"bottom":"auto","left":"20px","right":"auto","top":"20px"}"#
        ));
        assert!(script.contains(r#""bounce":"bounce-in""#));
        assert!(script.contains(r#"var DEFAULT_THEME = "purple";"#));
    }
}
