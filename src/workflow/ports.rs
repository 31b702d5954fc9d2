//! Seams between the resolution workflow and the outside world.
//!
//! The three remote clients are implemented by the scheduling service handle.
//! The collaborators are implemented by whatever front end embeds the
//! workflow; the terminal implementations live in `commands::terminal`.

use super::draft::{ConflictReport, EventDraft, ResolutionOutcome, TimeRange, Timestamp};
use crate::error::AppResult;
use async_trait::async_trait;

/// Turns a transcript into a candidate event
#[async_trait]
pub trait EventExtractor: Send + Sync {
    async fn extract(&self, transcript: &str) -> AppResult<EventDraft>;
}

/// Looks up existing events overlapping a range
#[async_trait]
pub trait ConflictChecker: Send + Sync {
    async fn check_conflicts(&self, range: TimeRange) -> AppResult<ConflictReport>;
}

/// Persists a finished draft. `force` asks the backend to skip its own conflict policy.
#[async_trait]
pub trait EventCommitter: Send + Sync {
    async fn add_event(&self, draft: &EventDraft, force: bool) -> AppResult<String>;
}

/// Produces one finalized transcript per listening session
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// `None` when the session ended without any speech
    async fn listen(&self) -> AppResult<Option<String>>;
}

/// Best-effort speech. Failures are the implementation's problem.
pub trait SpeechOutput: Send + Sync {
    fn speak(&self, text: &str);
}

/// Lets the user pick a new start and end
#[async_trait]
pub trait TimeRangePicker: Send + Sync {
    /// `None` if the user backs out of any step
    async fn pick(
        &self,
        current_start: Option<Timestamp>,
        current_end: Option<Timestamp>,
    ) -> Option<TimeRange>;
}

/// Asks the user what to do about conflicts
#[async_trait]
pub trait ChoicePrompter: Send + Sync {
    /// `None` if dismissed without a choice
    async fn prompt(&self, message: &str, conflicts: &str) -> Option<ResolutionOutcome>;
}
