use std::time::Duration;

use time::OffsetDateTime;

/// Clock behind session expiry, event timestamps, notification schedules and
/// the lifecycle sweep.
pub trait TimeProvider: Clone + Send + Sync + 'static {
    type Sleep<'a>: Future<Output = ()> + Send + 'a
    where
        Self: 'a;

    /// Current UTC instant, compared against `expires_at`, `scheduled_at` and
    /// session deadlines.
    fn now(&self) -> OffsetDateTime;
    /// Waits between lifecycle sweeps.
    fn sleep<'a>(&'a self, duration: Duration) -> Self::Sleep<'a>;
}
