//! Startup data. The demo seed is compiled in; operators may point the server
//! at their own TOML file instead.

use crate::auth::{self, AuthError};
use crate::config::SeedSource;
use crate::store::Store;
use crate::types::analytics::{AnalyticsRecord, PerformancePoint};
use crate::types::notification::{Notification, NotificationStatus, NotificationType};
use crate::types::user::{Plan, User};
use crate::types::widget::{Widget, WidgetSettings};

use serde::Deserialize;
use thiserror::Error;
use time::format_description::well_known::Iso8601;
use time::{Date, OffsetDateTime};

use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub const DEMO_SEED: &str = include_str!("../seed/demo.toml");

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read seed file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid seed toml: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid seed: {0}")]
    Invalid(String),
    #[error(transparent)]
    Auth(#[from] AuthError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub users: usize,
    pub widgets: usize,
    pub notifications: usize,
    pub analytics: usize,
    pub performance: usize,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SeedFile {
    #[serde(default)]
    users: Vec<SeedUser>,
    #[serde(default)]
    widgets: Vec<SeedWidget>,
    #[serde(default)]
    notifications: Vec<SeedNotification>,
    #[serde(default)]
    analytics: Vec<SeedAnalytics>,
    #[serde(default)]
    performance: Vec<SeedPerformance>,
}

#[derive(Debug, Deserialize)]
struct SeedUser {
    id: String,
    email: String,
    password: String,
    name: String,
    website: Option<String>,
    #[serde(default)]
    plan: Plan,
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,
}

#[derive(Debug, Deserialize)]
struct SeedWidget {
    user_id: String,
    token: String,
    domain: Option<String>,
    #[serde(default)]
    settings: WidgetSettings,
}

#[derive(Debug, Deserialize)]
struct SeedNotification {
    id: String,
    title: String,
    message: String,
    #[serde(rename = "type")]
    kind: NotificationType,
    status: Option<NotificationStatus>,
    #[serde(default)]
    impressions: u64,
    #[serde(default)]
    clicks: u64,
    #[serde(default)]
    dismissals: u64,
    #[serde(with = "time::serde::rfc3339::option", default)]
    scheduled_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option", default)]
    expires_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,
    user_id: String,
}

#[derive(Debug, Deserialize)]
struct SeedAnalytics {
    id: String,
    notification_id: String,
    user_id: String,
    #[serde(with = "time::serde::rfc3339")]
    date: OffsetDateTime,
    #[serde(default)]
    impressions: u64,
    #[serde(default)]
    clicks: u64,
    #[serde(default)]
    dismissals: u64,
}

#[derive(Debug, Deserialize)]
struct SeedPerformance {
    date: String,
    #[serde(default)]
    impressions: u64,
    #[serde(default)]
    clicks: u64,
}

pub fn load(
    source: &SeedSource,
    store: &Store,
    now: OffsetDateTime,
) -> Result<SeedSummary, SeedError> {
    match source {
        SeedSource::Demo => apply(DEMO_SEED, store, now),
        SeedSource::File(path) => load_file(path, store, now),
        SeedSource::Empty => Ok(SeedSummary::default()),
    }
}

pub fn load_file(
    path: &Path,
    store: &Store,
    now: OffsetDateTime,
) -> Result<SeedSummary, SeedError> {
    let contents = std::fs::read_to_string(path).map_err(|source| SeedError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    apply(&contents, store, now)
}

/// Parses and validates the whole seed before touching the store.
pub fn apply(
    contents: &str,
    store: &Store,
    now: OffsetDateTime,
) -> Result<SeedSummary, SeedError> {
    let seed: SeedFile = toml::from_str(contents)?;
    validate(&seed)?;

    let mut users = Vec::with_capacity(seed.users.len());
    for user in seed.users {
        users.push(User {
            id: user.id,
            email: user.email.trim().to_string(),
            password_hash: auth::hash_password(&user.password)?,
            name: user.name,
            website: user.website,
            plan: user.plan,
            created_at: user.created_at,
        });
    }

    let mut performance = Vec::with_capacity(seed.performance.len());
    for point in seed.performance {
        let date = Date::parse(point.date.trim(), &Iso8601::DATE).map_err(|err| {
            SeedError::Invalid(format!("performance date '{}': {err}", point.date))
        })?;
        let mut point = PerformancePoint {
            date: date.to_string(),
            impressions: point.impressions,
            clicks: point.clicks,
            ctr: 0.0,
        };
        point.refresh_ctr();
        performance.push(point);
    }

    let summary = SeedSummary {
        users: users.len(),
        widgets: seed.widgets.len(),
        notifications: seed.notifications.len(),
        analytics: seed.analytics.len(),
        performance: performance.len(),
    };

    for user in users {
        store
            .users
            .restore(user)
            .map_err(|err| SeedError::Invalid(err.to_string()))?;
    }
    for widget in seed.widgets {
        store.widgets.insert(Widget {
            user_id: widget.user_id,
            token: widget.token,
            domain: widget.domain,
            settings: widget.settings,
        });
    }
    for notification in seed.notifications {
        let status = notification
            .status
            .unwrap_or_else(|| NotificationStatus::for_schedule(notification.scheduled_at, now));
        store.notifications.restore(Notification {
            id: notification.id,
            title: notification.title,
            message: notification.message,
            kind: notification.kind,
            status,
            impressions: notification.impressions,
            clicks: notification.clicks,
            dismissals: notification.dismissals,
            scheduled_at: notification.scheduled_at,
            expires_at: notification.expires_at,
            created_at: notification.created_at,
            user_id: notification.user_id,
        });
    }
    for record in seed.analytics {
        let mut record = AnalyticsRecord {
            id: record.id,
            notification_id: record.notification_id,
            user_id: record.user_id,
            date: record.date,
            impressions: record.impressions,
            clicks: record.clicks,
            dismissals: record.dismissals,
            ctr: 0.0,
        };
        record.refresh_ctr();
        store.analytics.restore(record);
    }
    for point in performance {
        store.analytics.push_performance(point);
    }

    Ok(summary)
}

fn validate(seed: &SeedFile) -> Result<(), SeedError> {
    let mut user_ids = HashSet::new();
    let mut emails = HashSet::new();
    for user in &seed.users {
        if user.id.trim().is_empty() || user.email.trim().is_empty() {
            return Err(SeedError::Invalid(
                "user id and email are required".to_string(),
            ));
        }
        if !user_ids.insert(user.id.as_str()) {
            return Err(SeedError::Invalid(format!("duplicate user id '{}'", user.id)));
        }
        if !emails.insert(user.email.trim().to_ascii_lowercase()) {
            return Err(SeedError::Invalid(format!("duplicate email '{}'", user.email)));
        }
    }

    let mut tokens = HashSet::new();
    for widget in &seed.widgets {
        if widget.token.trim().is_empty() {
            return Err(SeedError::Invalid(format!(
                "widget of '{}' has an empty token",
                widget.user_id
            )));
        }
        if !tokens.insert(widget.token.as_str()) {
            return Err(SeedError::Invalid(format!(
                "duplicate widget token '{}'",
                widget.token
            )));
        }
    }

    let mut notification_ids = HashSet::new();
    for notification in &seed.notifications {
        if !notification_ids.insert(notification.id.as_str()) {
            return Err(SeedError::Invalid(format!(
                "duplicate notification id '{}'",
                notification.id
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;
    use crate::auth::verify_password;
    use crate::store::NotificationQuery;

    #[test]
    fn apply__should_load_demo_seed() {
        // Given
        let store = Store::default();

        // When
        let summary = apply(DEMO_SEED, &store, OffsetDateTime::now_utc()).expect("apply seed");

        // Then
        assert_eq!(
            summary,
            SeedSummary {
                users: 1,
                widgets: 1,
                notifications: 3,
                analytics: 2,
                performance: 10,
            }
        );
        let user = store
            .users
            .find_by_email("user@example.com")
            .expect("demo user");
        assert!(verify_password("password123", &user.password_hash));
        let widget = store
            .widgets
            .find_by_token("fp_demo_12345678")
            .expect("demo widget");
        assert_eq!(widget.user_id, user.id);
        let notifications = store.notifications.list(&NotificationQuery::default());
        assert_eq!(notifications.len(), 3);
        assert_eq!(notifications[0].ctr(), 1.9);
        let performance = store.analytics.performance(30);
        assert_eq!(performance[2].ctr, 1.98);
    }

    #[test]
    fn apply__should_derive_missing_status_from_schedule() {
        // Given
        let store = Store::default();
        let contents = r#"
[[notifications]]
id = "7"
title = "Later"
message = "Coming soon"
type = "promotion"
scheduled_at = "2030-01-01T00:00:00Z"
created_at = "2024-01-01T00:00:00Z"
user_id = "user1"
"#;

        // When
        apply(contents, &store, OffsetDateTime::UNIX_EPOCH).expect("apply seed");

        // Then
        let notification = store.notifications.get("7").expect("notification");
        assert_eq!(notification.status, NotificationStatus::Scheduled);
    }

    #[test]
    fn apply__should_reject_duplicate_tokens_without_touching_store() {
        // Given
        let store = Store::default();
        let contents = r#"
[[users]]
id = "user1"
email = "a@example.com"
password = "secret1"
name = "A"
created_at = "2024-01-01T00:00:00Z"

[[widgets]]
user_id = "user1"
token = "fp_same"

[[widgets]]
user_id = "user2"
token = "fp_same"
"#;

        // When
        let result = apply(contents, &store, OffsetDateTime::UNIX_EPOCH);

        // Then
        assert!(matches!(result, Err(SeedError::Invalid(_))));
        assert!(store.users.is_empty());
    }

    #[test]
    fn apply__should_reject_unknown_sections() {
        // Given
        let store = Store::default();

        // When
        let result = apply(
            "[[sessions]]\ntoken = \"x\"\n",
            &store,
            OffsetDateTime::UNIX_EPOCH,
        );

        // Then
        assert!(matches!(result, Err(SeedError::Parse(_))));
    }

    #[test]
    fn load__should_leave_store_empty_for_empty_source() {
        // Given
        let store = Store::default();

        // When
        let summary = load(&SeedSource::Empty, &store, OffsetDateTime::UNIX_EPOCH).expect("load");

        // Then
        assert_eq!(summary, SeedSummary::default());
        assert!(store.notifications.is_empty());
    }
}
