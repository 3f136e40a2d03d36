//! Shared handler state

use std::sync::Arc;
use std::time::Instant;

use crate::traits::PromotionTrigger;

/// State handed to every route
#[derive(Clone)]
pub struct AppState {
    pub trigger: Arc<dyn PromotionTrigger>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(trigger: Arc<dyn PromotionTrigger>) -> Self {
        Self {
            trigger,
            started_at: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
