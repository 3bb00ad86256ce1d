use crate::types::analytics::EventKind;
use crate::types::notification::{
    NewNotification, Notification, NotificationPatch, NotificationStatus, NotificationType,
};

use std::sync::Mutex;
use time::OffsetDateTime;

use super::next_numeric_id;

#[derive(Debug, Default)]
struct Inner {
    items: Vec<Notification>,
    next_id: u64,
}

#[derive(Debug, Default)]
pub struct NotificationStore {
    inner: Mutex<Inner>,
}

/// List filters. `None` matches everything.
#[derive(Debug, Clone, Default)]
pub struct NotificationQuery {
    pub user_id: Option<String>,
    pub kind: Option<NotificationType>,
    pub status: Option<NotificationStatus>,
}

impl NotificationQuery {
    fn matches(&self, notification: &Notification) -> bool {
        self.user_id
            .as_deref()
            .is_none_or(|user_id| notification.user_id == user_id)
            && self.kind.is_none_or(|kind| notification.kind == kind)
            && self
                .status
                .is_none_or(|status| notification.status == status)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LifecycleReport {
    pub activated: usize,
    pub expired: usize,
}

impl LifecycleReport {
    pub fn is_empty(&self) -> bool {
        self.activated == 0 && self.expired == 0
    }
}

impl NotificationStore {
    pub fn list(&self, query: &NotificationQuery) -> Vec<Notification> {
        let inner = self.inner.lock().expect("notifications lock");
        inner
            .items
            .iter()
            .filter(|notification| query.matches(notification))
            .cloned()
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<Notification> {
        let inner = self.inner.lock().expect("notifications lock");
        inner.items.iter().find(|item| item.id == id).cloned()
    }

    pub fn find_for_user(&self, id: &str, user_id: &str) -> Option<Notification> {
        self.get(id).filter(|item| item.user_id == user_id)
    }

    pub fn active_for_user(&self, user_id: &str) -> Vec<Notification> {
        self.list(&NotificationQuery {
            user_id: Some(user_id.to_string()),
            kind: None,
            status: Some(NotificationStatus::Active),
        })
    }

    pub fn insert(&self, new: NewNotification, now: OffsetDateTime) -> Notification {
        let mut inner = self.inner.lock().expect("notifications lock");
        let id = inner.allocate_id();
        let notification = Notification {
            id,
            title: new.title,
            message: new.message,
            kind: new.kind,
            status: NotificationStatus::for_schedule(new.scheduled_at, now),
            impressions: 0,
            clicks: 0,
            dismissals: 0,
            scheduled_at: new.scheduled_at,
            expires_at: new.expires_at,
            created_at: now,
            user_id: new.user_id,
        };
        inner.items.push(notification.clone());
        notification
    }

    /// Stores a notification exactly as given, as the seed does.
    pub(crate) fn restore(&self, notification: Notification) {
        let mut inner = self.inner.lock().expect("notifications lock");
        inner.items.push(notification);
        inner.next_id = next_numeric_id(inner.items.iter().map(|item| item.id.as_str()));
    }

    pub fn update(&self, id: &str, patch: NotificationPatch) -> Option<Notification> {
        let mut inner = self.inner.lock().expect("notifications lock");
        let notification = inner.items.iter_mut().find(|item| item.id == id)?;
        patch.apply(notification);
        Some(notification.clone())
    }

    pub fn remove(&self, id: &str) -> Option<Notification> {
        let mut inner = self.inner.lock().expect("notifications lock");
        let index = inner.items.iter().position(|item| item.id == id)?;
        Some(inner.items.remove(index))
    }

    /// Counts the event on the notification `id` owned by `user_id`. Returns
    /// `false` when that user owns no such notification.
    pub fn record_event(&self, id: &str, user_id: &str, event: EventKind) -> bool {
        let mut inner = self.inner.lock().expect("notifications lock");
        match inner
            .items
            .iter_mut()
            .find(|item| item.id == id && item.user_id == user_id)
        {
            Some(notification) => {
                notification.record(event);
                true
            }
            None => false,
        }
    }

    /// Activates notifications whose schedule has passed and expires those
    /// whose expiry has passed. Expiry wins when both are due.
    pub fn advance_lifecycle(&self, now: OffsetDateTime) -> LifecycleReport {
        let mut inner = self.inner.lock().expect("notifications lock");
        let mut report = LifecycleReport::default();
        for notification in inner.items.iter_mut() {
            if notification.status == NotificationStatus::Expired {
                continue;
            }
            if notification.expires_at.is_some_and(|at| at <= now) {
                notification.status = NotificationStatus::Expired;
                report.expired += 1;
                continue;
            }
            if notification.status == NotificationStatus::Scheduled
                && notification.scheduled_at.is_none_or(|at| at <= now)
            {
                notification.status = NotificationStatus::Active;
                report.activated += 1;
            }
        }
        report
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("notifications lock").items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Inner {
    fn allocate_id(&mut self) -> String {
        if self.next_id == 0 {
            self.next_id = next_numeric_id(self.items.iter().map(|item| item.id.as_str()));
        }
        let id = self.next_id;
        self.next_id += 1;
        id.to_string()
    }
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;
    use time::Duration;

    fn new_notification(user_id: &str, kind: NotificationType) -> NewNotification {
        NewNotification {
            title: "Title".to_string(),
            message: "Message".to_string(),
            kind,
            scheduled_at: None,
            expires_at: None,
            user_id: user_id.to_string(),
        }
    }

    fn now() -> OffsetDateTime {
        OffsetDateTime::UNIX_EPOCH + Duration::days(365)
    }

    #[test]
    fn insert__should_derive_status_from_schedule() {
        // Given
        let store = NotificationStore::default();
        let mut scheduled = new_notification("user1", NotificationType::Promotion);
        scheduled.scheduled_at = Some(now() + Duration::days(1));

        // When
        let active = store.insert(new_notification("user1", NotificationType::Update), now());
        let scheduled = store.insert(scheduled, now());

        // Then
        assert_eq!(active.status, NotificationStatus::Active);
        assert_eq!(scheduled.status, NotificationStatus::Scheduled);
        assert_ne!(active.id, scheduled.id);
    }

    #[test]
    fn insert__should_continue_after_restored_ids() {
        // Given
        let store = NotificationStore::default();
        let mut seeded = store.insert(new_notification("user1", NotificationType::Update), now());
        store.remove(&seeded.id);
        seeded.id = "41".to_string();
        store.restore(seeded);

        // When
        let created = store.insert(new_notification("user1", NotificationType::Update), now());

        // Then
        assert_eq!(created.id, "42");
    }

    #[test]
    fn list__should_exclude_other_statuses_when_filtering_active() {
        // Given
        let store = NotificationStore::default();
        let active = store.insert(new_notification("user1", NotificationType::Update), now());
        let mut scheduled = new_notification("user1", NotificationType::Update);
        scheduled.scheduled_at = Some(now() + Duration::days(1));
        store.insert(scheduled, now());
        let expired = store.insert(new_notification("user1", NotificationType::Update), now());
        store.update(
            &expired.id,
            NotificationPatch {
                status: Some(NotificationStatus::Expired),
                ..Default::default()
            },
        );

        // When
        let listed = store.list(&NotificationQuery {
            status: Some(NotificationStatus::Active),
            ..Default::default()
        });

        // Then
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, active.id);
    }

    #[test]
    fn list__should_combine_user_and_type_filters() {
        // Given
        let store = NotificationStore::default();
        store.insert(new_notification("user1", NotificationType::Update), now());
        store.insert(new_notification("user1", NotificationType::Promotion), now());
        store.insert(new_notification("user2", NotificationType::Promotion), now());

        // When
        let listed = store.list(&NotificationQuery {
            user_id: Some("user1".to_string()),
            kind: Some(NotificationType::Promotion),
            status: None,
        });

        // Then
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].user_id, "user1");
        assert_eq!(listed[0].kind, NotificationType::Promotion);
    }

    #[test]
    fn advance_lifecycle__should_activate_due_and_expire_past() {
        // Given
        let store = NotificationStore::default();
        let mut due = new_notification("user1", NotificationType::Update);
        due.scheduled_at = Some(now() + Duration::hours(1));
        let due = store.insert(due, now());
        let mut later = new_notification("user1", NotificationType::Update);
        later.scheduled_at = Some(now() + Duration::days(3));
        let later = store.insert(later, now());
        let mut ending = new_notification("user1", NotificationType::Update);
        ending.expires_at = Some(now() + Duration::hours(2));
        let ending = store.insert(ending, now());

        // When
        let report = store.advance_lifecycle(now() + Duration::hours(2));

        // Then
        assert_eq!(
            report,
            LifecycleReport {
                activated: 1,
                expired: 1
            }
        );
        let status = |id: &str| store.get(id).expect("notification").status;
        assert_eq!(status(&due.id), NotificationStatus::Active);
        assert_eq!(status(&later.id), NotificationStatus::Scheduled);
        assert_eq!(status(&ending.id), NotificationStatus::Expired);
    }

    #[test]
    fn record_event__should_report_missing_notification() {
        // Given
        let store = NotificationStore::default();

        // Then
        assert!(!store.record_event("404", "user1", EventKind::Click));
    }

    #[test]
    fn record_event__should_ignore_events_from_other_users() {
        // Given
        let store = NotificationStore::default();
        let notification =
            store.insert(new_notification("user1", NotificationType::Promotion), now());

        // When
        let foreign = store.record_event(&notification.id, "user2", EventKind::Click);
        let owned = store.record_event(&notification.id, "user1", EventKind::Click);

        // Then
        assert!(!foreign);
        assert!(owned);
        assert_eq!(store.get(&notification.id).expect("notification").clicks, 1);
    }
}
