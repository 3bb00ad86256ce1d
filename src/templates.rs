use askama::Template;
use askama_web::WebTemplate;

#[derive(Template)]
#[template(path = "widget.js", escape = "none")]
pub(crate) struct WidgetScriptTemplate {
    pub(crate) api_base: String,
    pub(crate) settings_key: String,
    pub(crate) refresh_ms: u64,
    pub(crate) positions: String,
    pub(crate) themes: String,
    pub(crate) animations: String,
    pub(crate) default_position: String,
    pub(crate) default_theme: String,
    pub(crate) default_animation: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "docs.html")]
pub(crate) struct DocsTemplate {
    pub(crate) app_name: String,
    pub(crate) embed_code: String,
    pub(crate) demo_token: &'static str,
    pub(crate) settings_key: &'static str,
    pub(crate) refresh_minutes: u64,
    pub(crate) routes: Vec<RouteDoc>,
}

pub(crate) struct RouteDoc {
    pub(crate) method: &'static str,
    pub(crate) path: &'static str,
    pub(crate) purpose: &'static str,
}
