use std::path::PathBuf;

pub const DEFAULT_PUBLIC_URL: &str = "http://localhost:3000";

/// Where the stores get their initial records from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedSource {
    Demo,
    File(PathBuf),
    Empty,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub app_name: String,
    /// Base URL visitors' browsers use to reach this server.
    pub public_url: String,
    pub session_ttl: time::Duration,
    /// Interval of the notification lifecycle sweep. `None` disables it.
    pub lifecycle_interval: Option<std::time::Duration>,
    pub seed: SeedSource,
}

impl AppConfig {
    pub fn public_url(&self) -> &str {
        self.public_url.trim_end_matches('/')
    }

    pub fn embed_code(&self, widget_token: &str) -> String {
        format!(
            r#"<script src="{}/widget.js?token={widget_token}"></script>"#,
            self.public_url()
        )
    }
}

#[cfg(test)]
impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_name: "FlashPop".to_string(),
            public_url: DEFAULT_PUBLIC_URL.to_string(),
            session_ttl: time::Duration::days(30),
            lifecycle_interval: None,
            seed: SeedSource::Demo,
        }
    }
}
