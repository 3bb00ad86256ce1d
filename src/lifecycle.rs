//! Optional background sweep moving notifications from `scheduled` to
//! `active` and on to `expired` as their timestamps pass.

use crate::ports;
use crate::store::{LifecycleReport, Store};

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

#[derive(Debug, Clone)]
pub struct LifecycleSweeper<T> {
    time: T,
    store: Arc<Store>,
    interval: Duration,
}

impl<T> LifecycleSweeper<T>
where
    T: ports::TimeProvider,
{
    pub fn new(time: T, store: Arc<Store>, interval: Duration) -> Self {
        Self {
            time,
            store,
            interval,
        }
    }

    pub fn tick(&self) -> LifecycleReport {
        let report = self.store.notifications.advance_lifecycle(self.time.now());
        if !report.is_empty() {
            tracing::info!(
                activated = report.activated,
                expired = report.expired,
                "notification lifecycle advanced"
            );
        }
        report
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                self.time.sleep(self.interval).await;
                self.tick();
            }
        })
    }
}

pub fn maybe_start_sweeper<T: ports::TimeProvider>(
    interval: Option<Duration>,
    time: T,
    store: Arc<Store>,
) -> Option<JoinHandle<()>> {
    let interval = interval?;
    if interval.is_zero() {
        tracing::warn!("lifecycle sweep disabled: interval must be greater than zero");
        return None;
    }
    tracing::info!(?interval, "starting notification lifecycle sweep");
    Some(LifecycleSweeper::new(time, store, interval).spawn())
}
