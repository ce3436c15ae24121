use std::sync::Arc;

use crate::config::Config;
use crate::vision::VisionProvider;

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub vision: VisionProvider,
}

impl AppState {
    pub fn new(config: Config, vision: VisionProvider) -> Self {
        Self {
            config: Arc::new(config),
            vision,
        }
    }
}
