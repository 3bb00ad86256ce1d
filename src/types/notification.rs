use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use std::str::FromStr;

use super::UnknownValue;
use super::analytics::EventKind;
use crate::metrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    Update,
    Announcement,
    Promotion,
}

impl NotificationType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Update => "update",
            Self::Announcement => "announcement",
            Self::Promotion => "promotion",
        }
    }
}

impl FromStr for NotificationType {
    type Err = UnknownValue;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "update" => Ok(Self::Update),
            "announcement" => Ok(Self::Announcement),
            "promotion" => Ok(Self::Promotion),
            other => Err(UnknownValue::new("notification type", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationStatus {
    Active,
    Scheduled,
    Expired,
}

impl NotificationStatus {
    /// Status of a freshly created notification: `scheduled` only when the
    /// schedule lies strictly in the future.
    pub fn for_schedule(scheduled_at: Option<OffsetDateTime>, now: OffsetDateTime) -> Self {
        match scheduled_at {
            Some(at) if at > now => Self::Scheduled,
            _ => Self::Active,
        }
    }
}

impl FromStr for NotificationStatus {
    type Err = UnknownValue;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "active" => Ok(Self::Active),
            "scheduled" => Ok(Self::Scheduled),
            "expired" => Ok(Self::Expired),
            other => Err(UnknownValue::new("notification status", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub status: NotificationStatus,
    pub impressions: u64,
    pub clicks: u64,
    pub dismissals: u64,
    #[serde(with = "time::serde::rfc3339::option", default)]
    pub scheduled_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option", default)]
    pub expires_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub user_id: String,
}

impl Notification {
    pub fn ctr(&self) -> f64 {
        metrics::rounded_ctr(self.clicks, self.impressions, 1)
    }

    pub fn record(&mut self, event: EventKind) {
        match event {
            EventKind::Impression => self.impressions += 1,
            EventKind::Click => self.clicks += 1,
            EventKind::Dismissal => self.dismissals += 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub title: String,
    pub message: String,
    pub kind: NotificationType,
    pub scheduled_at: Option<OffsetDateTime>,
    pub expires_at: Option<OffsetDateTime>,
    pub user_id: String,
}

/// Fields a partial update may replace. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct NotificationPatch {
    pub title: Option<String>,
    pub message: Option<String>,
    pub kind: Option<NotificationType>,
    pub status: Option<NotificationStatus>,
    pub scheduled_at: Option<OffsetDateTime>,
    pub expires_at: Option<OffsetDateTime>,
}

impl NotificationPatch {
    pub(crate) fn apply(self, notification: &mut Notification) {
        if let Some(title) = self.title {
            notification.title = title;
        }
        if let Some(message) = self.message {
            notification.message = message;
        }
        if let Some(kind) = self.kind {
            notification.kind = kind;
        }
        if let Some(status) = self.status {
            notification.status = status;
        }
        if let Some(scheduled_at) = self.scheduled_at {
            notification.scheduled_at = Some(scheduled_at);
        }
        if let Some(expires_at) = self.expires_at {
            notification.expires_at = Some(expires_at);
        }
    }
}
