use super::draft::{ConflictReport, EventDraft, ResolutionOutcome, TimeRange};
use super::ports::{
    ChoicePrompter, ConflictChecker, EventCommitter, EventExtractor, SpeechOutput,
    TimeRangePicker, TranscriptSource,
};
use super::state::{Outcome, ResolutionState, Step, StepError};
use crate::error::Error;
use rust_i18n::t;
use std::sync::Arc;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Drives a draft from transcript to calendar.
///
/// The controller holds no draft of its own. Each operation takes the current
/// draft and returns the updated one in a [`Step`], so whatever front end embeds
/// it owns the value between operations and may edit fields freely.
/// Operations must not run concurrently against the same session.
#[derive(Clone)]
pub struct ResolutionController {
    extractor: Arc<dyn EventExtractor>,
    checker: Arc<dyn ConflictChecker>,
    committer: Arc<dyn EventCommitter>,
    picker: Arc<dyn TimeRangePicker>,
    prompter: Arc<dyn ChoicePrompter>,
    speech: Arc<dyn SpeechOutput>,
}

/// Where the resolution loop goes next
enum Phase {
    Guard,
    CheckConflicts(TimeRange),
    Choose(ConflictReport),
    PickTime,
    Commit { force: bool },
}

impl ResolutionController {
    pub fn new(
        extractor: Arc<dyn EventExtractor>,
        checker: Arc<dyn ConflictChecker>,
        committer: Arc<dyn EventCommitter>,
        picker: Arc<dyn TimeRangePicker>,
        prompter: Arc<dyn ChoicePrompter>,
        speech: Arc<dyn SpeechOutput>,
    ) -> Self {
        Self {
            extractor,
            checker,
            committer,
            picker,
            prompter,
            speech,
        }
    }

    /// Build a controller whose three remote clients are one service
    pub fn with_service<S>(
        service: Arc<S>,
        picker: Arc<dyn TimeRangePicker>,
        prompter: Arc<dyn ChoicePrompter>,
        speech: Arc<dyn SpeechOutput>,
    ) -> Self
    where
        S: EventExtractor + ConflictChecker + EventCommitter + 'static,
    {
        Self::new(
            service.clone(),
            service.clone(),
            service,
            picker,
            prompter,
            speech,
        )
    }

    /// Run one listening session and extract whatever was said
    pub async fn listen(&self, source: &dyn TranscriptSource, draft: EventDraft) -> Step {
        match source.listen().await {
            Ok(Some(transcript)) => self.extract(&transcript, draft).await,
            Ok(None) => Step {
                draft,
                outcome: Outcome::Ignored,
                path: vec![ResolutionState::Idle],
            },
            Err(e) => {
                error!("Transcript capture failed: {:?}", e);
                let mut draft = draft;
                self.surface(&mut draft, t!("listen_error").to_string());
                Step {
                    draft,
                    outcome: Outcome::Failed(StepError::Listening(e)),
                    path: vec![ResolutionState::Idle, ResolutionState::Failed],
                }
            }
        }
    }

    /// Turn a transcript into a fresh draft.
    ///
    /// Empty transcripts are a no-op. On failure only `assistant_message` changes.
    pub async fn extract(&self, transcript: &str, draft: EventDraft) -> Step {
        let span = info_span!("extract", run_id = %Uuid::new_v4());
        self.extract_inner(transcript, draft).instrument(span).await
    }

    async fn extract_inner(&self, transcript: &str, mut draft: EventDraft) -> Step {
        let mut path = vec![ResolutionState::Idle];

        let transcript = transcript.trim();
        if transcript.is_empty() {
            debug!("Empty transcript, skipping extraction");
            return Step {
                draft,
                outcome: Outcome::Ignored,
                path,
            };
        }

        enter(&mut path, ResolutionState::Extracting);
        match self.extractor.extract(transcript).await {
            Ok(extracted) => {
                info!(
                    has_start = extracted.start.is_some(),
                    has_end = extracted.end.is_some(),
                    "Extracted draft \"{}\"",
                    extracted.title
                );
                enter(&mut path, ResolutionState::AwaitingConflictCheck);
                let message = extracted.assistant_message.clone();
                if !message.is_empty() {
                    self.speech.speak(&message);
                }
                Step {
                    draft: extracted,
                    outcome: Outcome::Extracted,
                    path,
                }
            }
            Err(e) => {
                log_remote_failure("extraction", &e);
                enter(&mut path, ResolutionState::Failed);
                self.surface(&mut draft, t!("network_error").to_string());
                enter(&mut path, ResolutionState::Idle);
                Step {
                    draft,
                    outcome: Outcome::Failed(StepError::Extraction(e)),
                    path,
                }
            }
        }
    }

    /// Check the draft's range against the calendar and resolve any conflicts
    /// with the user until the event is added, the user gives up, or a call fails.
    pub async fn check_and_add(&self, draft: EventDraft) -> Step {
        let span = info_span!("check_and_add", run_id = %Uuid::new_v4());
        self.resolve(draft).instrument(span).await
    }

    async fn resolve(&self, mut draft: EventDraft) -> Step {
        let mut path = vec![ResolutionState::AwaitingConflictCheck];
        let mut phase = Phase::Guard;

        let outcome = loop {
            phase = match phase {
                Phase::Guard => match draft.time_range() {
                    None => {
                        self.surface(&mut draft, t!("missing_times").to_string());
                        break Outcome::NeedsTimes;
                    }
                    Some(range) if !range.is_ordered() => {
                        self.surface(&mut draft, t!("invalid_range").to_string());
                        break Outcome::InvalidRange;
                    }
                    Some(range) => Phase::CheckConflicts(range),
                },

                Phase::CheckConflicts(range) => {
                    enter(&mut path, ResolutionState::CheckingConflicts);
                    match self.checker.check_conflicts(range).await {
                        Ok(report) if report.is_clear() => {
                            debug!("No conflicts");
                            draft.assistant_message = report.assistant_message;
                            Phase::Commit { force: false }
                        }
                        Ok(report) => {
                            info!("{} conflict(s) found", report.conflicts.len());
                            Phase::Choose(report)
                        }
                        Err(e) => {
                            log_remote_failure("conflict check", &e);
                            enter(&mut path, ResolutionState::Failed);
                            self.surface(&mut draft, t!("conflict_check_error").to_string());
                            break Outcome::Failed(StepError::ConflictCheck(e));
                        }
                    }
                }

                Phase::Choose(report) => {
                    enter(&mut path, ResolutionState::AwaitingChoice);
                    let message = if report.assistant_message.is_empty() {
                        t!("conflicts_found", count = report.conflicts.len()).to_string()
                    } else {
                        report.assistant_message.clone()
                    };
                    self.surface(&mut draft, message.clone());

                    let choice = self
                        .prompter
                        .prompt(&message, &report.render())
                        .await
                        .unwrap_or(ResolutionOutcome::Cancel);
                    debug!("User chose {:?}", choice);

                    match choice {
                        ResolutionOutcome::Reschedule => Phase::PickTime,
                        ResolutionOutcome::ForceAdd => Phase::Commit { force: true },
                        ResolutionOutcome::Cancel => {
                            self.surface(&mut draft, t!("cancelled").to_string());
                            break Outcome::Cancelled;
                        }
                    }
                }

                Phase::PickTime => {
                    enter(&mut path, ResolutionState::AwaitingTimePick);
                    match self.picker.pick(draft.start, draft.end).await {
                        Some(range) => {
                            debug!("Rescheduled to {} - {}", range.start, range.end);
                            draft.set_time_range(range);
                            enter(&mut path, ResolutionState::AwaitingConflictCheck);
                            Phase::Guard
                        }
                        None => {
                            self.surface(&mut draft, t!("reschedule_aborted").to_string());
                            break Outcome::RescheduleAborted;
                        }
                    }
                }

                Phase::Commit { force } => {
                    if !draft.is_complete() {
                        warn!("Draft incomplete at commit time");
                        self.surface(&mut draft, t!("missing_details").to_string());
                        break Outcome::NeedsDetails;
                    }

                    enter(&mut path, ResolutionState::Committing { force });
                    match self.committer.add_event(&draft, force).await {
                        Ok(message) => {
                            enter(&mut path, ResolutionState::Committed);
                            info!(force, "Event \"{}\" added", draft.title);
                            let message = if message.is_empty() {
                                t!("event_added").to_string()
                            } else {
                                message
                            };
                            self.surface(&mut draft, message.clone());
                            break Outcome::Committed {
                                message,
                                forced: force,
                            };
                        }
                        Err(e) => {
                            log_remote_failure("commit", &e);
                            enter(&mut path, ResolutionState::Failed);
                            self.surface(&mut draft, t!("commit_error").to_string());
                            break Outcome::Failed(StepError::Commit(e));
                        }
                    }
                }
            };
        };

        let resting = outcome.resting_state();
        if path.last() != Some(&resting) {
            enter(&mut path, resting);
        }

        Step {
            draft,
            outcome,
            path,
        }
    }

    /// Show and speak a message
    fn surface(&self, draft: &mut EventDraft, message: String) {
        if !message.is_empty() {
            self.speech.speak(&message);
        }
        draft.assistant_message = message;
    }
}

fn enter(path: &mut Vec<ResolutionState>, state: ResolutionState) {
    if let Some(from) = path.last() {
        debug!("{} -> {}", from, state);
    }
    path.push(state);
}

fn log_remote_failure(call: &str, err: &Error) {
    match err {
        Error::Transport(msg) => error!("{} transport failure: {}", call, msg),
        Error::Decode(msg) => error!("{} response could not be decoded: {}", call, msg),
        other => error!("{} failed: {:?}", call, other),
    }
}
