//! Wire schema for the scheduling backend.
//!
//! Every response field is optional. Absent or `null` fields become empty text
//! or empty lists, and timestamps that do not parse become unset, so a partly
//! useful response is never thrown away.

use crate::utils::time::{format_timestamp, parse_timestamp};
use crate::workflow::{ConflictRecord, ConflictReport, EventDraft, TimeRange, Timestamp};
use chrono_tz::Tz;
use rust_i18n::t;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const EXTRACT_ENDPOINT: &str = "extract";
pub const CHECK_CONFLICTS_ENDPOINT: &str = "check_conflicts";
pub const ADD_EVENT_ENDPOINT: &str = "add_event";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExtractRequest {
    pub text: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExtractResponse {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub start: Option<Value>,
    #[serde(default)]
    pub end: Option<Value>,
    #[serde(default)]
    pub spoken_response: Option<String>,
}

impl ExtractResponse {
    /// Build a fresh draft. `start` and `end` are parsed independently.
    pub fn into_draft(self, tz: &Tz) -> EventDraft {
        EventDraft {
            title: self.title.unwrap_or_default(),
            start: timestamp_field(self.start.as_ref(), tz),
            end: timestamp_field(self.end.as_ref(), tz),
            location: self.location.unwrap_or_default(),
            assistant_message: self.spoken_response.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConflictRequest {
    pub start: String,
    pub end: String,
}

impl From<TimeRange> for ConflictRequest {
    fn from(range: TimeRange) -> Self {
        Self {
            start: format_timestamp(&range.start),
            end: format_timestamp(&range.end),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ConflictResponse {
    #[serde(default)]
    pub spoken_response: Option<String>,
    #[serde(default)]
    pub conflicts: Option<Vec<ConflictEntry>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ConflictEntry {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub start: Option<Value>,
    #[serde(default)]
    pub end: Option<Value>,
}

impl ConflictResponse {
    /// Conflicts are kept in the order the backend sent them
    pub fn into_report(self) -> ConflictReport {
        let conflicts = self
            .conflicts
            .unwrap_or_default()
            .into_iter()
            .map(|entry| ConflictRecord {
                title: entry
                    .title
                    .filter(|title| !title.trim().is_empty())
                    .unwrap_or_else(|| t!("conflict_untitled").to_string()),
                start: text_field(entry.start.as_ref()),
                end: text_field(entry.end.as_ref()),
            })
            .collect();

        ConflictReport {
            assistant_message: self.spoken_response.unwrap_or_default(),
            conflicts,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddEventRequest {
    pub title: String,
    pub start: String,
    pub end: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub force: bool,
}

impl AddEventRequest {
    /// `None` when the draft lacks either time
    pub fn from_draft(draft: &EventDraft, force: bool) -> Option<Self> {
        let range = draft.time_range()?;
        Some(Self {
            title: draft.title.clone(),
            start: format_timestamp(&range.start),
            end: format_timestamp(&range.end),
            location: Some(draft.location.clone()).filter(|l| !l.is_empty()),
            force,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AddEventResponse {
    #[serde(default)]
    pub spoken_response: Option<String>,
}

fn timestamp_field(value: Option<&Value>, tz: &Tz) -> Option<Timestamp> {
    value
        .and_then(Value::as_str)
        .and_then(|raw| parse_timestamp(raw, tz))
}

fn text_field(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use serde_json::json;

    fn extract(value: Value) -> EventDraft {
        serde_json::from_value::<ExtractResponse>(value)
            .unwrap()
            .into_draft(&Tz::UTC)
    }

    #[test]
    fn full_extraction_populates_draft() {
        let draft = extract(json!({
            "title": "Lunch with Sam",
            "location": "Cafe",
            "start": "2024-05-02T12:00:00",
            "end": "2024-05-02T13:00:00",
            "spoken_response": "Lunch with Sam tomorrow at noon."
        }));

        assert_eq!(draft.title, "Lunch with Sam");
        assert_eq!(draft.location, "Cafe");
        assert_eq!(draft.start.unwrap().hour(), 12);
        assert_eq!(draft.end.unwrap().hour(), 13);
        assert_eq!(draft.assistant_message, "Lunch with Sam tomorrow at noon.");
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let draft = extract(json!({}));
        assert_eq!(draft, EventDraft::default());

        let draft = extract(json!({"title": null, "start": null}));
        assert_eq!(draft, EventDraft::default());
    }

    #[test]
    fn bad_start_does_not_affect_end() {
        let draft = extract(json!({
            "title": "Dentist",
            "start": "next tuesday-ish",
            "end": "2024-05-02T10:00:00Z"
        }));
        assert!(draft.start.is_none());
        assert_eq!(draft.end.unwrap().hour(), 10);

        let draft = extract(json!({
            "start": "2024-05-02T09:00:00Z",
            "end": 42
        }));
        assert_eq!(draft.start.unwrap().hour(), 9);
        assert!(draft.end.is_none());
    }

    #[test]
    fn conflicts_keep_order_and_default_title() {
        let report = serde_json::from_value::<ConflictResponse>(json!({
            "spoken_response": "You have two overlaps.",
            "conflicts": [
                {"title": "Standup", "start": "2024-05-02T09:00:00", "end": "2024-05-02T09:15:00"},
                {"start": "2024-05-02T09:00:00"},
                {"title": "Standup", "start": "2024-05-02T09:00:00", "end": "2024-05-02T09:15:00"}
            ]
        }))
        .unwrap()
        .into_report();

        assert_eq!(report.assistant_message, "You have two overlaps.");
        assert_eq!(report.conflicts.len(), 3);
        assert_eq!(report.conflicts[0].title, "Standup");
        assert_eq!(report.conflicts[1].title, t!("conflict_untitled"));
        assert_eq!(report.conflicts[1].end, "");
        assert_eq!(report.conflicts[2], report.conflicts[0]);
    }

    #[test]
    fn null_conflict_list_is_clear() {
        let report = serde_json::from_value::<ConflictResponse>(json!({"conflicts": null}))
            .unwrap()
            .into_report();
        assert!(report.is_clear());
        assert!(report.assistant_message.is_empty());
    }

    #[test]
    fn add_event_request_mirrors_draft() {
        let mut draft = extract(json!({
            "title": "Standup",
            "start": "2024-05-02T09:00:00+00:00",
            "end": "2024-05-02T09:15:00+00:00"
        }));

        let request = AddEventRequest::from_draft(&draft, true).unwrap();
        assert_eq!(request.title, "Standup");
        assert_eq!(request.start, "2024-05-02T09:00:00+00:00");
        assert_eq!(request.end, "2024-05-02T09:15:00+00:00");
        assert_eq!(request.location, None);
        assert!(request.force);

        let body = serde_json::to_value(&request).unwrap();
        assert!(body.get("location").is_none());

        draft.location = "Room 4".to_string();
        let request = AddEventRequest::from_draft(&draft, false).unwrap();
        assert_eq!(request.location.as_deref(), Some("Room 4"));
        assert!(!request.force);

        draft.end = None;
        assert!(AddEventRequest::from_draft(&draft, false).is_none());
    }
}
