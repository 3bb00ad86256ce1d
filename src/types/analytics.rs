use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use std::collections::BTreeMap;
use std::str::FromStr;

use super::UnknownValue;
use crate::metrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Impression,
    Click,
    Dismissal,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Impression => "impression",
            Self::Click => "click",
            Self::Dismissal => "dismissal",
        }
    }
}

impl FromStr for EventKind {
    type Err = UnknownValue;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "impression" => Ok(Self::Impression),
            "click" => Ok(Self::Click),
            "dismissal" => Ok(Self::Dismissal),
            other => Err(UnknownValue::new("event", other)),
        }
    }
}

/// Running counters for one notification of one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsRecord {
    pub id: String,
    pub notification_id: String,
    pub user_id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    pub impressions: u64,
    pub clicks: u64,
    pub dismissals: u64,
    pub ctr: f64,
}

impl AnalyticsRecord {
    pub fn new(id: String, notification_id: &str, user_id: &str, date: OffsetDateTime) -> Self {
        Self {
            id,
            notification_id: notification_id.to_string(),
            user_id: user_id.to_string(),
            date,
            impressions: 0,
            clicks: 0,
            dismissals: 0,
            ctr: 0.0,
        }
    }

    pub fn record(&mut self, event: EventKind) {
        match event {
            EventKind::Impression => self.impressions += 1,
            EventKind::Click => self.clicks += 1,
            EventKind::Dismissal => self.dismissals += 1,
        }
        self.refresh_ctr();
    }

    pub fn refresh_ctr(&mut self) {
        self.ctr = metrics::rounded_ctr(self.clicks, self.impressions, 1);
    }
}

/// One day of chart data. Dismissals are not charted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformancePoint {
    pub date: String,
    pub impressions: u64,
    pub clicks: u64,
    pub ctr: f64,
}

impl PerformancePoint {
    pub fn record(&mut self, event: EventKind) {
        match event {
            EventKind::Impression => self.impressions += 1,
            EventKind::Click => self.clicks += 1,
            EventKind::Dismissal => return,
        }
        self.refresh_ctr();
    }

    pub fn refresh_ctr(&mut self) {
        self.ctr = metrics::rounded_ctr(self.clicks, self.impressions, 2);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub total_impressions: u64,
    pub total_clicks: u64,
    pub total_dismissals: u64,
    #[serde(rename = "averageCTR")]
    pub average_ctr: f64,
    pub active_notifications: usize,
    pub total_notifications: usize,
}

impl AnalyticsSummary {
    pub fn from_records(records: &[AnalyticsRecord]) -> Self {
        let total_impressions = records.iter().map(|record| record.impressions).sum();
        let total_clicks = records.iter().map(|record| record.clicks).sum();
        let total_dismissals = records.iter().map(|record| record.dismissals).sum();
        Self {
            total_impressions,
            total_clicks,
            total_dismissals,
            average_ctr: metrics::rounded_ctr(total_clicks, total_impressions, 1),
            active_notifications: records
                .iter()
                .filter(|record| record.impressions > 0)
                .count(),
            total_notifications: records.len(),
        }
    }
}

/// Best performing records by click-through rate, highest first.
pub fn top_by_ctr(records: &[AnalyticsRecord], limit: usize) -> Vec<AnalyticsRecord> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| b.ctr.total_cmp(&a.ctr));
    sorted.truncate(limit);
    sorted
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Demographics {
    pub device_breakdown: BTreeMap<String, u32>,
    pub time_performance: BTreeMap<String, u32>,
    pub type_performance: BTreeMap<String, f64>,
}

impl Demographics {
    /// Fixed figures shown on the dashboard. No visitor data backs them.
    pub fn illustrative() -> Self {
        let device_breakdown = [("desktop", 65), ("mobile", 35)];
        let time_performance = [("09:00-12:00", 42), ("19:00-22:00", 38), ("other", 20)];
        let type_performance = [("update", 3.2), ("announcement", 2.1), ("promotion", 2.8)];
        Self {
            device_breakdown: device_breakdown
                .into_iter()
                .map(|(key, value)| (key.to_string(), value))
                .collect(),
            time_performance: time_performance
                .into_iter()
                .map(|(key, value)| (key.to_string(), value))
                .collect(),
            type_performance: type_performance
                .into_iter()
                .map(|(key, value)| (key.to_string(), value))
                .collect(),
        }
    }
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;

    fn record(id: &str, impressions: u64, clicks: u64, dismissals: u64) -> AnalyticsRecord {
        let mut record = AnalyticsRecord::new(
            id.to_string(),
            id,
            "user1",
            OffsetDateTime::UNIX_EPOCH,
        );
        record.impressions = impressions;
        record.clicks = clicks;
        record.dismissals = dismissals;
        record.refresh_ctr();
        record
    }

    #[test]
    fn summary__should_total_counters_and_average_ctr() {
        // Given
        let records = vec![record("1", 12345, 234, 567), record("2", 8765, 123, 234)];

        // When
        let summary = AnalyticsSummary::from_records(&records);

        // Then
        assert_eq!(summary.total_impressions, 21110);
        assert_eq!(summary.total_clicks, 357);
        assert_eq!(summary.total_dismissals, 801);
        assert_eq!(summary.average_ctr, 1.7);
        assert_eq!(summary.active_notifications, 2);
        assert_eq!(summary.total_notifications, 2);
    }

    #[test]
    fn summary__should_not_count_records_without_impressions_as_active() {
        // Given
        let records = vec![record("1", 0, 0, 0)];

        // When
        let summary = AnalyticsSummary::from_records(&records);

        // Then
        assert_eq!(summary.average_ctr, 0.0);
        assert_eq!(summary.active_notifications, 0);
        assert_eq!(summary.total_notifications, 1);
    }

    #[test]
    fn top_by_ctr__should_sort_descending_and_truncate() {
        // Given
        let records = vec![
            record("low", 100, 1, 0),
            record("high", 100, 9, 0),
            record("mid", 100, 5, 0),
        ];

        // When
        let top = top_by_ctr(&records, 2);

        // Then
        let ids: Vec<&str> = top.iter().map(|record| record.id.as_str()).collect();
        assert_eq!(ids, vec!["high", "mid"]);
    }

    #[test]
    fn performance_point__should_ignore_dismissals() {
        // Given
        let mut point = PerformancePoint {
            date: "2024-01-10".to_string(),
            impressions: 99,
            clicks: 4,
            ctr: 4.04,
        };

        // When
        point.record(EventKind::Dismissal);
        point.record(EventKind::Impression);
        point.record(EventKind::Click);

        // Then
        assert_eq!(point.impressions, 100);
        assert_eq!(point.clicks, 5);
        assert_eq!(point.ctr, 5.0);
    }
}
