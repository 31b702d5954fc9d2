use super::draft::EventDraft;
use crate::error::Error;
use std::fmt;
use thiserror::Error;

/// States of the resolution workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionState {
    Idle,
    Extracting,
    AwaitingConflictCheck,
    CheckingConflicts,
    AwaitingChoice,
    AwaitingTimePick,
    Committing { force: bool },
    Committed,
    Failed,
}

impl fmt::Display for ResolutionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionState::Idle => write!(f, "idle"),
            ResolutionState::Extracting => write!(f, "extracting"),
            ResolutionState::AwaitingConflictCheck => write!(f, "awaiting_conflict_check"),
            ResolutionState::CheckingConflicts => write!(f, "checking_conflicts"),
            ResolutionState::AwaitingChoice => write!(f, "awaiting_choice"),
            ResolutionState::AwaitingTimePick => write!(f, "awaiting_time_pick"),
            ResolutionState::Committing { force } => write!(f, "committing(force={})", force),
            ResolutionState::Committed => write!(f, "committed"),
            ResolutionState::Failed => write!(f, "failed"),
        }
    }
}

/// A remote call that ended the attempt
#[derive(Debug, Error)]
pub enum StepError {
    #[error("listening failed: {0}")]
    Listening(#[source] Error),
    #[error("extraction failed: {0}")]
    Extraction(#[source] Error),
    #[error("conflict check failed: {0}")]
    ConflictCheck(#[source] Error),
    #[error("commit failed: {0}")]
    Commit(#[source] Error),
}

impl StepError {
    pub fn inner(&self) -> &Error {
        match self {
            StepError::Listening(e)
            | StepError::Extraction(e)
            | StepError::ConflictCheck(e)
            | StepError::Commit(e) => e,
        }
    }
}

/// How a controller operation ended
#[derive(Debug)]
pub enum Outcome {
    /// Empty transcript, nothing was sent
    Ignored,
    /// Draft populated from a transcript
    Extracted,
    /// Start or end missing
    NeedsTimes,
    /// End not after start
    InvalidRange,
    /// Title or times missing at commit time
    NeedsDetails,
    Committed { message: String, forced: bool },
    Cancelled,
    /// User backed out of the time picker
    RescheduleAborted,
    Failed(StepError),
}

impl Outcome {
    /// The stable state the session rests in after this outcome
    pub fn resting_state(&self) -> ResolutionState {
        match self {
            Outcome::Extracted
            | Outcome::NeedsTimes
            | Outcome::InvalidRange
            | Outcome::NeedsDetails => ResolutionState::AwaitingConflictCheck,
            Outcome::Ignored
            | Outcome::Committed { .. }
            | Outcome::Cancelled
            | Outcome::RescheduleAborted
            | Outcome::Failed(_) => ResolutionState::Idle,
        }
    }
}

/// Result of one controller operation: the draft to hand back next time, how it
/// ended, and every state passed through on the way
#[derive(Debug)]
pub struct Step {
    pub draft: EventDraft,
    pub outcome: Outcome,
    pub path: Vec<ResolutionState>,
}

impl Step {
    /// Times the workflow entered `state`
    pub fn visits(&self, state: ResolutionState) -> usize {
        self.path.iter().filter(|s| **s == state).count()
    }
}
