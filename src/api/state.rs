use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::AppConfig;
use crate::storage::RecordStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub config: Arc<AppConfig>,
    /// Held by mutating handlers so team resolution and match entry from
    /// concurrent requests cannot interleave.
    pub write_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>, config: AppConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
            write_lock: Arc::new(Mutex::new(())),
        }
    }
}
