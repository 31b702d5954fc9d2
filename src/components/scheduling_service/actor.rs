use super::models::{
    AddEventRequest, AddEventResponse, ConflictRequest, ConflictResponse, ExtractRequest,
    ExtractResponse, ADD_EVENT_ENDPOINT, CHECK_CONFLICTS_ENDPOINT, EXTRACT_ENDPOINT,
};
use crate::config::Config;
use crate::error::{component_error, config_error, decode_error, transport_error, AppResult};
use crate::workflow::{ConflictReport, EventDraft, TimeRange};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info};

/// The scheduling service actor. Owns the HTTP client and handles one request at a time.
pub struct SchedulingServiceActor {
    config: Arc<RwLock<Config>>,
    client: Client,
    command_rx: mpsc::Receiver<SchedulingCommand>,
}

/// Commands that can be sent to the scheduling service actor
pub enum SchedulingCommand {
    Extract(String, mpsc::Sender<AppResult<EventDraft>>),
    CheckConflicts(TimeRange, mpsc::Sender<AppResult<ConflictReport>>),
    AddEvent {
        draft: EventDraft,
        force: bool,
        response_tx: mpsc::Sender<AppResult<String>>,
    },
    Shutdown,
}

/// Handle for communicating with the scheduling service actor
#[derive(Clone)]
pub struct SchedulingServiceActorHandle {
    command_tx: mpsc::Sender<SchedulingCommand>,
}

impl SchedulingServiceActorHandle {
    /// Extract a draft from a transcript
    pub async fn extract(&self, transcript: impl Into<String>) -> AppResult<EventDraft> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.command_tx
            .send(SchedulingCommand::Extract(transcript.into(), response_tx))
            .await
            .map_err(|e| component_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| component_error("Response channel closed"))?
    }

    /// List events overlapping a range
    pub async fn check_conflicts(&self, range: TimeRange) -> AppResult<ConflictReport> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.command_tx
            .send(SchedulingCommand::CheckConflicts(range, response_tx))
            .await
            .map_err(|e| component_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| component_error("Response channel closed"))?
    }

    /// Add an event, optionally bypassing the backend's conflict policy
    pub async fn add_event(&self, draft: EventDraft, force: bool) -> AppResult<String> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.command_tx
            .send(SchedulingCommand::AddEvent {
                draft,
                force,
                response_tx,
            })
            .await
            .map_err(|e| component_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| component_error("Response channel closed"))?
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> AppResult<()> {
        let _ = self.command_tx.send(SchedulingCommand::Shutdown).await;
        Ok(())
    }
}

impl SchedulingServiceActor {
    /// Create a new actor and return its handle
    pub fn new(config: Arc<RwLock<Config>>) -> (Self, SchedulingServiceActorHandle) {
        let (command_tx, command_rx) = mpsc::channel(32);

        let actor = Self {
            config,
            client: Client::new(),
            command_rx,
        };

        let handle = SchedulingServiceActorHandle { command_tx };

        (actor, handle)
    }

    /// Start the actor's processing loop
    pub async fn run(&mut self) {
        info!("Scheduling service actor started");

        // Process commands
        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                SchedulingCommand::Extract(transcript, response_tx) => {
                    let result = self.extract(transcript).await;
                    let _ = response_tx.send(result).await;
                }
                SchedulingCommand::CheckConflicts(range, response_tx) => {
                    let result = self.check_conflicts(range).await;
                    let _ = response_tx.send(result).await;
                }
                SchedulingCommand::AddEvent {
                    draft,
                    force,
                    response_tx,
                } => {
                    let result = self.add_event(&draft, force).await;
                    let _ = response_tx.send(result).await;
                }
                SchedulingCommand::Shutdown => {
                    info!("Scheduling service actor shutting down");
                    break;
                }
            }
        }

        info!("Scheduling service actor shut down");
    }

    async fn extract(&self, text: String) -> AppResult<EventDraft> {
        let tz = self.config.read().await.tz()?;
        let response: ExtractResponse = self
            .post_json(EXTRACT_ENDPOINT, &ExtractRequest { text })
            .await?;
        Ok(response.into_draft(&tz))
    }

    async fn check_conflicts(&self, range: TimeRange) -> AppResult<ConflictReport> {
        let response: ConflictResponse = self
            .post_json(CHECK_CONFLICTS_ENDPOINT, &ConflictRequest::from(range))
            .await?;
        Ok(response.into_report())
    }

    async fn add_event(&self, draft: &EventDraft, force: bool) -> AppResult<String> {
        let request = AddEventRequest::from_draft(draft, force)
            .ok_or_else(|| component_error("Cannot add an event without start and end"))?;
        let response: AddEventResponse = self.post_json(ADD_EVENT_ENDPOINT, &request).await?;
        Ok(response.spoken_response.unwrap_or_default())
    }

    /// POST a JSON body and decode the JSON reply
    async fn post_json<B, R>(&self, endpoint: &str, body: &B) -> AppResult<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let (base, timeout) = {
            let config_read = self.config.read().await;
            (config_read.backend_base()?, config_read.request_timeout())
        };

        let url = base
            .join(endpoint)
            .map_err(|e| config_error(&format!("Failed to build {} URL: {}", endpoint, e)))?;

        debug!("POST {}", url);
        let mut request = self.client.post(url).json(body);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request
            .send()
            .await
            .map_err(|e| transport_error(&format!("Failed to reach {}: {}", endpoint, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(transport_error(&format!(
                "{} returned HTTP {} - {}",
                endpoint, status, error_body
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| transport_error(&format!("Failed to read {} response: {}", endpoint, e)))?;

        // An empty body carries no fields, which is the same as all of them absent
        let text = if text.trim().is_empty() { "{}" } else { text.as_str() };

        serde_json::from_str(text)
            .map_err(|e| decode_error(&format!("Failed to parse {} response: {}", endpoint, e)))
    }
}
