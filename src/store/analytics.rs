use crate::types::analytics::{AnalyticsRecord, EventKind, PerformancePoint};

use std::sync::Mutex;
use time::{Date, OffsetDateTime};

use super::next_numeric_id;

#[derive(Debug, Default)]
struct Inner {
    records: Vec<AnalyticsRecord>,
    performance: Vec<PerformancePoint>,
}

#[derive(Debug, Default)]
pub struct AnalyticsStore {
    inner: Mutex<Inner>,
}

impl AnalyticsStore {
    pub fn records(
        &self,
        user_id: Option<&str>,
        notification_id: Option<&str>,
    ) -> Vec<AnalyticsRecord> {
        let inner = self.inner.lock().expect("analytics lock");
        inner
            .records
            .iter()
            .filter(|record| user_id.is_none_or(|user_id| record.user_id == user_id))
            .filter(|record| {
                notification_id.is_none_or(|notification_id| {
                    record.notification_id == notification_id
                })
            })
            .cloned()
            .collect()
    }

    /// Finds or creates the record for this notification and user, then
    /// counts the event on it.
    pub fn record_event(
        &self,
        notification_id: &str,
        user_id: &str,
        event: EventKind,
        now: OffsetDateTime,
    ) -> AnalyticsRecord {
        let mut inner = self.inner.lock().expect("analytics lock");
        let position = inner.records.iter().position(|record| {
            record.notification_id == notification_id && record.user_id == user_id
        });
        let index = match position {
            Some(index) => index,
            None => {
                let id = next_numeric_id(inner.records.iter().map(|record| record.id.as_str()));
                inner.records.push(AnalyticsRecord::new(
                    id.to_string(),
                    notification_id,
                    user_id,
                    now,
                ));
                inner.records.len() - 1
            }
        };
        let record = &mut inner.records[index];
        record.record(event);
        record.clone()
    }

    /// Counts the event on the chart point for `date`, if one exists.
    pub fn record_daily(&self, date: Date, event: EventKind) -> bool {
        let key = date.to_string();
        let mut inner = self.inner.lock().expect("analytics lock");
        match inner.performance.iter_mut().find(|point| point.date == key) {
            Some(point) => {
                point.record(event);
                true
            }
            None => false,
        }
    }

    /// The most recent `days` chart points, oldest first.
    pub fn performance(&self, days: usize) -> Vec<PerformancePoint> {
        let inner = self.inner.lock().expect("analytics lock");
        let skip = inner.performance.len().saturating_sub(days);
        inner.performance[skip..].to_vec()
    }

    pub(crate) fn restore(&self, record: AnalyticsRecord) {
        self.inner.lock().expect("analytics lock").records.push(record);
    }

    pub(crate) fn push_performance(&self, point: PerformancePoint) {
        self.inner
            .lock()
            .expect("analytics lock")
            .performance
            .push(point);
    }
}
