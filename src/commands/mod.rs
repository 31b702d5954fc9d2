use crate::config::Config;
use crate::error::AppResult;
use crate::utils::time::display_timestamp;
use crate::workflow::{
    EventDraft, Outcome, ResolutionController, Step, TimeRangePicker, Timestamp, TranscriptSource,
};
use chrono_tz::Tz;
use inquire::Select;
use rust_i18n::t;
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

// Export submodules
pub mod terminal;

/// Shared context for the menu loop
pub struct CommandContext {
    pub config: Arc<RwLock<Config>>,
    pub controller: ResolutionController,
    pub transcripts: Arc<dyn TranscriptSource>,
    pub picker: Arc<dyn TimeRangePicker>,
}

impl CommandContext {
    /// Create a new command context
    pub fn new(
        config: Arc<RwLock<Config>>,
        controller: ResolutionController,
        transcripts: Arc<dyn TranscriptSource>,
        picker: Arc<dyn TimeRangePicker>,
    ) -> Self {
        Self {
            config,
            controller,
            transcripts,
            picker,
        }
    }
}

/// Entries of the main menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Listen,
    EditTitle,
    EditLocation,
    PickTimes,
    CheckAndAdd,
    ShowDraft,
    Quit,
}

impl MenuAction {
    pub const ALL: [MenuAction; 7] = [
        MenuAction::Listen,
        MenuAction::EditTitle,
        MenuAction::EditLocation,
        MenuAction::PickTimes,
        MenuAction::CheckAndAdd,
        MenuAction::ShowDraft,
        MenuAction::Quit,
    ];
}

impl fmt::Display for MenuAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MenuAction::Listen => t!("menu_listen"),
            MenuAction::EditTitle => t!("menu_edit_title"),
            MenuAction::EditLocation => t!("menu_edit_location"),
            MenuAction::PickTimes => t!("menu_pick_times"),
            MenuAction::CheckAndAdd => t!("menu_check_and_add"),
            MenuAction::ShowDraft => t!("menu_show_draft"),
            MenuAction::Quit => t!("menu_quit"),
        };
        write!(f, "{}", label)
    }
}

/// Run the menu until the user quits. The draft lives here between steps.
pub async fn run(ctx: &CommandContext) -> AppResult<()> {
    let tz = ctx.config.read().await.tz()?;
    let mut draft = EventDraft::new();

    loop {
        let action = terminal::blocking(|| {
            match Select::new("voicecal", MenuAction::ALL.to_vec()).prompt_skippable() {
                Err(e) if terminal::is_dismissal(&e) => Ok(None),
                other => other,
            }
        })
        .await?
        .unwrap_or(MenuAction::Quit);

        debug!("Menu action {:?}", action);

        draft = match action {
            MenuAction::Listen => {
                let step = ctx.controller.listen(ctx.transcripts.as_ref(), draft).await;
                report(&step);
                if let Some(message) = feedback(&step) {
                    println!("{}", message);
                }
                step.draft
            }
            MenuAction::EditTitle => {
                let message = t!("prompt_title").to_string();
                let current = draft.title.clone();
                if let Some(title) =
                    terminal::blocking(move || terminal::prompt_line(message, current)).await?
                {
                    draft.title = title.trim().to_string();
                }
                draft
            }
            MenuAction::EditLocation => {
                let message = t!("prompt_location").to_string();
                let current = draft.location.clone();
                if let Some(location) =
                    terminal::blocking(move || terminal::prompt_line(message, current)).await?
                {
                    draft.location = location.trim().to_string();
                }
                draft
            }
            MenuAction::PickTimes => {
                if let Some(range) = ctx.picker.pick(draft.start, draft.end).await {
                    draft.set_time_range(range);
                }
                draft
            }
            MenuAction::CheckAndAdd => {
                let step = ctx.controller.check_and_add(draft).await;
                report(&step);
                if let Some(message) = feedback(&step) {
                    println!("{}", message);
                }
                step.draft
            }
            MenuAction::ShowDraft => {
                println!("{}", describe_draft(&draft, &tz));
                draft
            }
            MenuAction::Quit => break,
        };
    }

    info!("Menu closed");
    Ok(())
}

/// Log where a step ended up; the message itself was already spoken
fn report(step: &Step) {
    match &step.outcome {
        Outcome::Failed(e) => info!("Step failed: {}", e),
        Outcome::Committed { forced, .. } => info!(forced, "Event committed"),
        other => debug!("Step ended with {:?}", other),
    }
    debug!("Now {}", step.outcome.resting_state());
}

/// Message to display after a step, independent of whether speech is on.
///
/// An ignored step leaves the previous message on the draft, so nothing new is shown.
pub fn feedback(step: &Step) -> Option<&str> {
    match step.outcome {
        Outcome::Ignored => None,
        _ => Some(step.draft.assistant_message.as_str()).filter(|message| !message.is_empty()),
    }
}

/// Multi-line summary of the draft for display
pub fn describe_draft(draft: &EventDraft, tz: &Tz) -> String {
    let unset = t!("draft_empty_field").to_string();
    let text = |value: &str| {
        if value.is_empty() {
            unset.clone()
        } else {
            value.to_string()
        }
    };
    let time = |value: &Option<Timestamp>| {
        value
            .as_ref()
            .map(|dt| display_timestamp(dt, tz))
            .unwrap_or_else(|| unset.clone())
    };

    format!(
        "{}: {}\n{}: {}\n{}: {}\n{}: {}",
        t!("draft_title"),
        text(&draft.title),
        t!("draft_location"),
        text(&draft.location),
        t!("draft_start"),
        time(&draft.start),
        t!("draft_end"),
        time(&draft.end),
    )
}
