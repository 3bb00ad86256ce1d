use crate::adapters::TokioTimeProvider;
use crate::auth::SessionStore;
use crate::config::AppConfig;
use crate::ports::TimeProvider;
use crate::seed::{self, SeedError};
use crate::store::Store;

use std::sync::Arc;

#[derive(Clone)]
pub struct AppState<T = TokioTimeProvider> {
    pub config: AppConfig,
    pub store: Arc<Store>,
    pub sessions: Arc<SessionStore>,
    pub time: T,
}

impl<T: TimeProvider> AppState<T> {
    /// Builds fresh stores and fills them from the configured seed.
    pub fn new(config: AppConfig, time: T) -> Result<Self, SeedError> {
        let store = Store::default();
        seed::load(&config.seed, &store, time.now())?;
        Ok(Self {
            config,
            store: Arc::new(store),
            sessions: Arc::new(SessionStore::default()),
            time,
        })
    }
}
