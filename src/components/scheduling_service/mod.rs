mod actor;
mod handle;
pub mod models;

pub use handle::SchedulingServiceHandle;

use crate::config::Config;
use crate::error::AppResult;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Scheduling backend component: extraction, conflict lookup and event creation
#[derive(Default)]
pub struct SchedulingService {
    handle: RwLock<Option<SchedulingServiceHandle>>,
}

impl SchedulingService {
    /// Create a new scheduling service component
    pub fn new() -> Self {
        Self {
            handle: RwLock::new(None),
        }
    }

    /// Get the handle if it exists
    pub async fn get_handle(&self) -> Option<SchedulingServiceHandle> {
        let handle_lock = self.handle.read().await;
        handle_lock.clone()
    }
}

#[async_trait]
impl super::Component for SchedulingService {
    fn name(&self) -> &'static str {
        "scheduling_service"
    }

    async fn init(&self, config: Arc<RwLock<Config>>) -> AppResult<()> {
        // Create a new handle if one doesn't exist
        let mut handle_lock = self.handle.write().await;
        if handle_lock.is_none() {
            *handle_lock = Some(SchedulingServiceHandle::new(config));
        }
        Ok(())
    }

    async fn shutdown(&self) -> AppResult<()> {
        // Shutdown the handle if it exists
        let handle_lock = self.handle.read().await;
        if let Some(handle) = &*handle_lock {
            handle.shutdown().await?;
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
