//! Process-local stores. Every store guards its records with one mutex; all
//! state is discarded when the process exits.

mod analytics;
mod notifications;
mod users;
mod widgets;

pub use analytics::AnalyticsStore;
pub use notifications::{LifecycleReport, NotificationQuery, NotificationStore};
pub use users::{DuplicateEmail, UserStore};
pub use widgets::WidgetStore;

use crate::types::analytics::{AnalyticsRecord, EventKind};

use time::OffsetDateTime;

#[derive(Debug, Default)]
pub struct Store {
    pub users: UserStore,
    pub widgets: WidgetStore,
    pub notifications: NotificationStore,
    pub analytics: AnalyticsStore,
}

impl Store {
    /// Counts one widget event against the analytics record, the notification
    /// itself and today's performance point.
    pub fn track_event(
        &self,
        notification_id: &str,
        user_id: &str,
        event: EventKind,
        now: OffsetDateTime,
    ) -> AnalyticsRecord {
        let record = self
            .analytics
            .record_event(notification_id, user_id, event, now);
        if !self
            .notifications
            .record_event(notification_id, user_id, event)
        {
            tracing::debug!(
                notification_id,
                user_id,
                "tracked event for a notification this user does not own"
            );
        }
        self.analytics.record_daily(now.date(), event);
        tracing::debug!(
            notification_id,
            user_id,
            event = event.as_str(),
            "tracked widget event"
        );
        record
    }
}

/// Next free numeric id, given the ids already in use.
pub(crate) fn next_numeric_id<'a>(ids: impl Iterator<Item = &'a str>) -> u64 {
    ids.filter_map(|id| id.parse::<u64>().ok())
        .max()
        .map_or(1, |max| max + 1)
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;
    use crate::types::analytics::PerformancePoint;
    use crate::types::notification::{NewNotification, NotificationType};

    #[test]
    fn next_numeric_id__should_skip_non_numeric_ids() {
        // When
        let next = next_numeric_id(["1", "7", "fp_x", "3"].into_iter());

        // Then
        assert_eq!(next, 8);
        assert_eq!(next_numeric_id(std::iter::empty()), 1);
    }

    #[test]
    fn track_event__should_update_record_notification_and_today() {
        // Given
        let store = Store::default();
        let now = OffsetDateTime::UNIX_EPOCH;
        let notification = store.notifications.insert(
            NewNotification {
                title: "Release".to_string(),
                message: "v2 is out".to_string(),
                kind: NotificationType::Update,
                scheduled_at: None,
                expires_at: None,
                user_id: "user1".to_string(),
            },
            now,
        );
        store.analytics.push_performance(PerformancePoint {
            date: now.date().to_string(),
            impressions: 0,
            clicks: 0,
            ctr: 0.0,
        });

        // When
        store.track_event(&notification.id, "user1", EventKind::Impression, now);
        let record = store.track_event(&notification.id, "user1", EventKind::Click, now);

        // Then
        assert_eq!(record.impressions, 1);
        assert_eq!(record.clicks, 1);
        assert_eq!(record.ctr, 100.0);
        let stored = store.notifications.get(&notification.id).expect("notification");
        assert_eq!(stored.impressions, 1);
        assert_eq!(stored.clicks, 1);
        let today = store.analytics.performance(30);
        assert_eq!(today[0].impressions, 1);
        assert_eq!(today[0].clicks, 1);
        assert_eq!(today[0].ctr, 100.0);
    }
}
