use super::actor::{SchedulingServiceActor, SchedulingServiceActorHandle};
use crate::config::Config;
use crate::error::AppResult;
use crate::workflow::{
    ConflictChecker, ConflictReport, EventCommitter, EventDraft, EventExtractor, TimeRange,
};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

/// Handle for interacting with the scheduling service actor
#[derive(Clone)]
pub struct SchedulingServiceHandle {
    actor_handle: SchedulingServiceActorHandle,
    _actor_task: Arc<JoinHandle<()>>,
}

impl SchedulingServiceHandle {
    /// Create a new SchedulingServiceHandle and spawn the actor
    pub fn new(config: Arc<RwLock<Config>>) -> Self {
        // Create the actor and get its handle
        let (mut actor, handle) = SchedulingServiceActor::new(config);

        // Spawn a task to run the actor
        let actor_task = tokio::spawn(async move {
            actor.run().await;
        });

        Self {
            actor_handle: handle,
            _actor_task: Arc::new(actor_task),
        }
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> AppResult<()> {
        self.actor_handle.shutdown().await
    }
}

#[async_trait]
impl EventExtractor for SchedulingServiceHandle {
    async fn extract(&self, transcript: &str) -> AppResult<EventDraft> {
        self.actor_handle.extract(transcript).await
    }
}

#[async_trait]
impl ConflictChecker for SchedulingServiceHandle {
    async fn check_conflicts(&self, range: TimeRange) -> AppResult<ConflictReport> {
        self.actor_handle.check_conflicts(range).await
    }
}

#[async_trait]
impl EventCommitter for SchedulingServiceHandle {
    async fn add_event(&self, draft: &EventDraft, force: bool) -> AppResult<String> {
        self.actor_handle.add_event(draft.clone(), force).await
    }
}
