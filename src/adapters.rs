use std::time::Duration;

use time::OffsetDateTime;

use crate::ports;

/// Wall clock used by the running server; the sweeper sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTimeProvider;

impl ports::TimeProvider for TokioTimeProvider {
    type Sleep<'a>
        = tokio::time::Sleep
    where
        Self: 'a;

    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }

    fn sleep<'a>(&'a self, duration: Duration) -> Self::Sleep<'a> {
        tokio::time::sleep(duration)
    }
}

/// Clock for tests: `now` only moves when told to and `sleep` returns at once.
#[cfg(test)]
#[derive(Debug, Clone)]
pub(crate) struct ManualTimeProvider {
    now: std::sync::Arc<std::sync::Mutex<OffsetDateTime>>,
}

#[cfg(test)]
impl ManualTimeProvider {
    pub(crate) fn at(now: OffsetDateTime) -> Self {
        Self {
            now: std::sync::Arc::new(std::sync::Mutex::new(now)),
        }
    }

    pub(crate) fn advance(&self, by: time::Duration) {
        let mut now = self.now.lock().expect("time lock");
        *now += by;
    }
}

#[cfg(test)]
impl ports::TimeProvider for ManualTimeProvider {
    type Sleep<'a>
        = std::future::Ready<()>
    where
        Self: 'a;

    fn now(&self) -> OffsetDateTime {
        *self.now.lock().expect("time lock")
    }

    fn sleep<'a>(&'a self, _duration: Duration) -> Self::Sleep<'a> {
        std::future::ready(())
    }
}
