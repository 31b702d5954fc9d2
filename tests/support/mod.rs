#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{FixedOffset, TimeZone};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use voicecal::error::{transport_error, AppResult};
use voicecal::workflow::{
    ChoicePrompter, ConflictChecker, ConflictRecord, ConflictReport, EventCommitter, EventDraft,
    EventExtractor, ResolutionController, ResolutionOutcome, SpeechOutput, TimeRange,
    TimeRangePicker, Timestamp, TranscriptSource,
};

/// A timestamp on May 2024 in UTC
pub fn at(day: u32, hour: u32, minute: u32) -> Timestamp {
    FixedOffset::east_opt(0)
        .unwrap()
        .with_ymd_and_hms(2024, 5, day, hour, minute, 0)
        .unwrap()
}

pub fn range(day: u32, start_hour: u32, end_hour: u32) -> TimeRange {
    TimeRange::new(at(day, start_hour, 0), at(day, end_hour, 0))
}

pub fn draft(title: &str, range: Option<TimeRange>) -> EventDraft {
    EventDraft {
        title: title.to_string(),
        start: range.map(|r| r.start),
        end: range.map(|r| r.end),
        location: String::new(),
        assistant_message: String::new(),
    }
}

pub fn conflict(title: &str, start: &str, end: &str) -> ConflictRecord {
    ConflictRecord {
        title: title.to_string(),
        start: start.to_string(),
        end: end.to_string(),
    }
}

pub fn clear() -> ConflictReport {
    ConflictReport::default()
}

pub fn conflicts(records: Vec<ConflictRecord>) -> ConflictReport {
    ConflictReport {
        assistant_message: String::new(),
        conflicts: records,
    }
}

/// A call that reached the backend
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Extract(String),
    CheckConflicts(TimeRange),
    AddEvent { draft: EventDraft, force: bool },
}

/// Backend with scripted replies that records every call
#[derive(Default)]
pub struct MockBackend {
    extractions: Mutex<VecDeque<AppResult<EventDraft>>>,
    reports: Mutex<VecDeque<AppResult<ConflictReport>>>,
    commits: Mutex<VecDeque<AppResult<String>>>,
    calls: Mutex<Vec<Call>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_extraction(self, result: AppResult<EventDraft>) -> Self {
        self.extractions.lock().unwrap().push_back(result);
        self
    }

    pub fn with_report(self, result: AppResult<ConflictReport>) -> Self {
        self.reports.lock().unwrap().push_back(result);
        self
    }

    pub fn with_commit(self, result: AppResult<String>) -> Self {
        self.commits.lock().unwrap().push_back(result);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn conflict_checks(&self) -> Vec<TimeRange> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::CheckConflicts(range) => Some(range),
                _ => None,
            })
            .collect()
    }

    pub fn commits(&self) -> Vec<(EventDraft, bool)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::AddEvent { draft, force } => Some((draft, force)),
                _ => None,
            })
            .collect()
    }

    fn next<T>(queue: &Mutex<VecDeque<AppResult<T>>>) -> AppResult<T> {
        queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(transport_error("no scripted response")))
    }
}

#[async_trait]
impl EventExtractor for MockBackend {
    async fn extract(&self, transcript: &str) -> AppResult<EventDraft> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Extract(transcript.to_string()));
        Self::next(&self.extractions)
    }
}

#[async_trait]
impl ConflictChecker for MockBackend {
    async fn check_conflicts(&self, range: TimeRange) -> AppResult<ConflictReport> {
        self.calls.lock().unwrap().push(Call::CheckConflicts(range));
        Self::next(&self.reports)
    }
}

#[async_trait]
impl EventCommitter for MockBackend {
    async fn add_event(&self, draft: &EventDraft, force: bool) -> AppResult<String> {
        self.calls.lock().unwrap().push(Call::AddEvent {
            draft: draft.clone(),
            force,
        });
        Self::next(&self.commits)
    }
}

/// Choice prompter answering from a script
#[derive(Default)]
pub struct ScriptedPrompter {
    answers: Mutex<VecDeque<Option<ResolutionOutcome>>>,
    prompts: Mutex<Vec<(String, String)>>,
}

impl ScriptedPrompter {
    pub fn answering(answers: Vec<Option<ResolutionOutcome>>) -> Self {
        Self {
            answers: Mutex::new(answers.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<(String, String)> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChoicePrompter for ScriptedPrompter {
    async fn prompt(&self, message: &str, conflicts: &str) -> Option<ResolutionOutcome> {
        self.prompts
            .lock()
            .unwrap()
            .push((message.to_string(), conflicts.to_string()));
        self.answers.lock().unwrap().pop_front().flatten()
    }
}

/// Time picker answering from a script
#[derive(Default)]
pub struct ScriptedPicker {
    answers: Mutex<VecDeque<Option<TimeRange>>>,
    requests: Mutex<Vec<(Option<Timestamp>, Option<Timestamp>)>>,
}

impl ScriptedPicker {
    pub fn answering(answers: Vec<Option<TimeRange>>) -> Self {
        Self {
            answers: Mutex::new(answers.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<(Option<Timestamp>, Option<Timestamp>)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TimeRangePicker for ScriptedPicker {
    async fn pick(
        &self,
        current_start: Option<Timestamp>,
        current_end: Option<Timestamp>,
    ) -> Option<TimeRange> {
        self.requests
            .lock()
            .unwrap()
            .push((current_start, current_end));
        self.answers.lock().unwrap().pop_front().flatten()
    }
}

/// Speech output that remembers what it said
#[derive(Default)]
pub struct RecordingSpeech {
    spoken: Mutex<Vec<String>>,
}

impl RecordingSpeech {
    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<String> {
        self.spoken.lock().unwrap().last().cloned()
    }
}

impl SpeechOutput for RecordingSpeech {
    fn speak(&self, text: &str) {
        self.spoken.lock().unwrap().push(text.to_string());
    }
}

/// Transcript source replaying fixed sessions
pub struct ScriptedTranscripts {
    sessions: Mutex<VecDeque<AppResult<Option<String>>>>,
}

impl ScriptedTranscripts {
    pub fn new(sessions: Vec<AppResult<Option<String>>>) -> Self {
        Self {
            sessions: Mutex::new(sessions.into()),
        }
    }
}

#[async_trait]
impl TranscriptSource for ScriptedTranscripts {
    async fn listen(&self) -> AppResult<Option<String>> {
        self.sessions.lock().unwrap().pop_front().unwrap_or(Ok(None))
    }
}

/// Everything a controller test needs to inspect afterwards
pub struct Harness {
    pub backend: Arc<MockBackend>,
    pub prompter: Arc<ScriptedPrompter>,
    pub picker: Arc<ScriptedPicker>,
    pub speech: Arc<RecordingSpeech>,
    pub controller: ResolutionController,
}

impl Harness {
    pub fn new(backend: MockBackend, prompter: ScriptedPrompter, picker: ScriptedPicker) -> Self {
        let backend = Arc::new(backend);
        let prompter = Arc::new(prompter);
        let picker = Arc::new(picker);
        let speech = Arc::new(RecordingSpeech::default());

        let controller = ResolutionController::with_service(
            backend.clone(),
            picker.clone(),
            prompter.clone(),
            speech.clone(),
        );

        Self {
            backend,
            prompter,
            picker,
            speech,
            controller,
        }
    }

    pub fn with_backend(backend: MockBackend) -> Self {
        Self::new(backend, ScriptedPrompter::default(), ScriptedPicker::default())
    }
}
