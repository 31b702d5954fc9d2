//! Terminal stand-ins for the voice front end.
//!
//! Typing replaces speech capture and printed lines replace speech synthesis.
//! `inquire` prompts block, so each one runs on the blocking pool.

use crate::error::{AppResult, Error};
use crate::utils::time::{combine_date_time, parse_time};
use crate::workflow::{
    ChoicePrompter, ResolutionOutcome, SpeechOutput, TimeRange, TimeRangePicker, Timestamp,
    TranscriptSource,
};
use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use inquire::validator::Validation;
use inquire::{CustomUserError, DateSelect, InquireError, Select, Text};
use rust_i18n::t;
use std::fmt;
use tracing::{debug, info, warn};

/// Run a blocking prompt off the async runtime
pub async fn blocking<T, F>(prompt: F) -> AppResult<T>
where
    F: FnOnce() -> Result<T, InquireError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(prompt)
        .await
        .map_err(|e| Error::Other(format!("Prompt task failed: {}", e)))?
        .map_err(Error::from)
}

/// Esc and Ctrl+C both mean "never mind"
pub fn is_dismissal(err: &InquireError) -> bool {
    matches!(
        err,
        InquireError::OperationCanceled | InquireError::OperationInterrupted
    )
}

/// Prompt for one line of text, `None` if dismissed
pub fn prompt_line(message: String, current: String) -> Result<Option<String>, InquireError> {
    match Text::new(&message).with_initial_value(&current).prompt_skippable() {
        Err(e) if is_dismissal(&e) => Ok(None),
        other => other,
    }
}

/// Typed transcripts, one per "listening session"
pub struct TerminalTranscriptSource;

#[async_trait]
impl TranscriptSource for TerminalTranscriptSource {
    async fn listen(&self) -> AppResult<Option<String>> {
        let message = t!("prompt_transcript").to_string();
        let transcript = blocking(move || prompt_line(message, String::new())).await?;
        Ok(transcript.filter(|text| !text.trim().is_empty()))
    }
}

/// Stand-in for text-to-speech. Display is handled by the menu loop, so this
/// only records the utterance on the `voicecal::speech` log target.
pub struct TerminalSpeech {
    enabled: bool,
}

impl TerminalSpeech {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl SpeechOutput for TerminalSpeech {
    fn speak(&self, text: &str) {
        if self.enabled {
            info!(target: "voicecal::speech", "» {}", text);
        } else {
            debug!("Muted speech: {}", text);
        }
    }
}

/// Date picker followed by an HH:MM field, once for the start and once for the end
pub struct TerminalTimePicker {
    tz: Tz,
}

impl TerminalTimePicker {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }
}

#[async_trait]
impl TimeRangePicker for TerminalTimePicker {
    async fn pick(
        &self,
        current_start: Option<Timestamp>,
        current_end: Option<Timestamp>,
    ) -> Option<TimeRange> {
        let tz = self.tz;
        match blocking(move || pick_range(&tz, current_start, current_end)).await {
            Ok(range) => range,
            Err(e) => {
                warn!("Time picker failed: {:?}", e);
                None
            }
        }
    }
}

fn pick_range(
    tz: &Tz,
    current_start: Option<Timestamp>,
    current_end: Option<Timestamp>,
) -> Result<Option<TimeRange>, InquireError> {
    let Some(start) = pick_timestamp(
        tz,
        t!("prompt_start_date").to_string(),
        t!("prompt_start_time").to_string(),
        current_start,
    )?
    else {
        return Ok(None);
    };

    let suggested_end = Some(suggest_end(start, current_start, current_end));
    let Some(end) = pick_timestamp(
        tz,
        t!("prompt_end_date").to_string(),
        t!("prompt_end_time").to_string(),
        suggested_end,
    )?
    else {
        return Ok(None);
    };

    Ok(Some(TimeRange::new(start, end)))
}

/// Default for the end prompt once the start is known. The old end is kept while it is
/// still after the new start, otherwise the old duration (or one hour) is carried over.
fn suggest_end(
    start: Timestamp,
    current_start: Option<Timestamp>,
    current_end: Option<Timestamp>,
) -> Timestamp {
    match (current_start, current_end) {
        (_, Some(end)) if end > start => end,
        (Some(old_start), Some(old_end)) if old_end > old_start => start + (old_end - old_start),
        _ => start + Duration::hours(1),
    }
}

fn pick_timestamp(
    tz: &Tz,
    date_message: String,
    time_message: String,
    current: Option<Timestamp>,
) -> Result<Option<Timestamp>, InquireError> {
    let local = current.map(|dt| dt.with_timezone(tz));
    let default_date: NaiveDate = local
        .map(|dt| dt.date_naive())
        .unwrap_or_else(|| Utc::now().with_timezone(tz).date_naive());

    let date = match DateSelect::new(&date_message)
        .with_default(default_date)
        .prompt_skippable()
    {
        Ok(Some(date)) => date,
        Ok(None) => return Ok(None),
        Err(e) if is_dismissal(&e) => return Ok(None),
        Err(e) => return Err(e),
    };

    let default_time = local
        .map(|dt| dt.format("%H:%M").to_string())
        .unwrap_or_else(|| "09:00".to_string());
    let invalid = t!("invalid_time_format").to_string();

    let time = match Text::new(&time_message)
        .with_default(&default_time)
        .with_validator(move |input: &str| -> Result<Validation, CustomUserError> {
            if parse_time(input).is_some() {
                Ok(Validation::Valid)
            } else {
                Ok(Validation::Invalid(invalid.clone().into()))
            }
        })
        .prompt_skippable()
    {
        Ok(Some(time)) => time,
        Ok(None) => return Ok(None),
        Err(e) if is_dismissal(&e) => return Ok(None),
        Err(e) => return Err(e),
    };

    Ok(combine_date_time(date, &time, tz))
}

/// Menu entry wrapper so `Select` can show localised labels
#[derive(Debug, Clone, Copy)]
struct Choice(ResolutionOutcome);

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.0 {
            ResolutionOutcome::Reschedule => t!("choice_reschedule"),
            ResolutionOutcome::ForceAdd => t!("choice_force_add"),
            ResolutionOutcome::Cancel => t!("choice_cancel"),
        };
        write!(f, "{}", label)
    }
}

/// Lists the conflicts and asks what to do
pub struct TerminalChoicePrompter;

#[async_trait]
impl ChoicePrompter for TerminalChoicePrompter {
    async fn prompt(&self, message: &str, conflicts: &str) -> Option<ResolutionOutcome> {
        println!("{}", conflicts);

        let message = message.to_string();
        let options = vec![
            Choice(ResolutionOutcome::Reschedule),
            Choice(ResolutionOutcome::ForceAdd),
            Choice(ResolutionOutcome::Cancel),
        ];

        let result = blocking(move || {
            match Select::new(&message, options).prompt_skippable() {
                Err(e) if is_dismissal(&e) => Ok(None),
                other => other,
            }
        })
        .await;

        match result {
            Ok(choice) => choice.map(|Choice(outcome)| outcome),
            Err(e) => {
                warn!("Choice prompt failed: {:?}", e);
                None
            }
        }
    }
}
