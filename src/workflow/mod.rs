//! Conflict-resolution workflow: transcript in, calendar event out.

mod controller;
pub mod draft;
pub mod ports;
mod state;

pub use controller::ResolutionController;
pub use draft::{
    ConflictRecord, ConflictReport, EventDraft, ResolutionOutcome, TimeRange, Timestamp,
};
pub use ports::{
    ChoicePrompter, ConflictChecker, EventCommitter, EventExtractor, SpeechOutput,
    TimeRangePicker, TranscriptSource,
};
pub use state::{Outcome, ResolutionState, Step, StepError};
