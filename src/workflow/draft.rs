use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Timestamp type used throughout the workflow
pub type Timestamp = DateTime<FixedOffset>;

/// The event being scheduled, before it reaches the calendar.
///
/// Every field may be unset at any point: extraction is partial more often than
/// not and the user edits fields one at a time between steps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventDraft {
    pub title: String,
    pub start: Option<Timestamp>,
    pub end: Option<Timestamp>,
    pub location: String,
    /// Last feedback shown and spoken to the user
    pub assistant_message: String,
}

impl EventDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Both ends of the range, if both are set
    pub fn time_range(&self) -> Option<TimeRange> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Some(TimeRange { start, end }),
            _ => None,
        }
    }

    /// Overwrite both times at once
    pub fn set_time_range(&mut self, range: TimeRange) {
        self.start = Some(range.start);
        self.end = Some(range.end);
    }

    /// Whether the draft carries everything the calendar needs
    pub fn is_complete(&self) -> bool {
        !self.title.trim().is_empty() && self.time_range().is_some()
    }
}

/// A start/end pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl TimeRange {
    pub fn new(start: Timestamp, end: Timestamp) -> Self {
        Self { start, end }
    }

    /// Start strictly before end
    pub fn is_ordered(&self) -> bool {
        self.start < self.end
    }
}

/// An existing calendar event that overlaps the draft
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictRecord {
    pub title: String,
    pub start: String,
    pub end: String,
}

impl fmt::Display for ConflictRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} — {} to {}", self.title, self.start, self.end)
    }
}

/// Result of a conflict check
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConflictReport {
    pub assistant_message: String,
    pub conflicts: Vec<ConflictRecord>,
}

impl ConflictReport {
    pub fn is_clear(&self) -> bool {
        self.conflicts.is_empty()
    }

    /// One line per conflict, in the order the calendar returned them
    pub fn render(&self) -> String {
        self.conflicts
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// What the user chose to do about a conflict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionOutcome {
    Reschedule,
    ForceAdd,
    Cancel,
}
