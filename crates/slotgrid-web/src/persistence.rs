#![forbid(unsafe_code)]

//! Collaborator boundary for availability reads and selection writes.
//!
//! The grid never talks to storage itself. A host supplies an
//! [`AvailabilitySource`] that returns the per-date slot list and a
//! [`SelectionSink`] that stores the final selection. The JSON helpers
//! read and write the document shapes the meeting store uses:
//!
//! ```json
//! [{ "time": "09:00", "isSelected": false, "isAvailable": true }]
//! ```
//!
//! # Failure Modes
//!
//! Readers are lenient per record: a missing or empty `time` drops the
//! record, missing or `null` flags fall back to their defaults. Only a
//! document that is not a JSON array of objects is [`LoadError::Malformed`].

use std::fmt;

use serde::{Deserialize, Serialize};
use slotgrid_core::{AvailabilityRecord, SelectionRecord};

/// Read side of the persistence boundary.
pub trait AvailabilitySource {
    fn fetch(&self, meeting_id: &str, date_id: &str) -> Result<Vec<AvailabilityRecord>, LoadError>;
}

/// Write side of the persistence boundary.
pub trait SelectionSink {
    fn persist(
        &self,
        meeting_id: &str,
        date_id: &str,
        selection: &[SelectionRecord],
    ) -> Result<(), SaveError>;
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Availability could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// The store was unreachable or refused the read.
    Transport(String),
    /// The store answered with something that is not an availability list.
    Malformed(String),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(msg) => write!(f, "availability transport error: {msg}"),
            Self::Malformed(msg) => write!(f, "malformed availability document: {msg}"),
        }
    }
}

impl std::error::Error for LoadError {}

/// The selection could not be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveError {
    Transport(String),
    /// The sink refused the write (for example a closed poll).
    Rejected(String),
    /// The selection could not be encoded locally; nothing was sent.
    Encode(String),
}

impl fmt::Display for SaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(msg) => write!(f, "selection transport error: {msg}"),
            Self::Rejected(msg) => write!(f, "selection rejected: {msg}"),
            Self::Encode(msg) => write!(f, "selection encoding failed: {msg}"),
        }
    }
}

impl std::error::Error for SaveError {}

// ---------------------------------------------------------------------------
// JSON wire helpers
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireAvailability {
    #[serde(default)]
    time: Option<String>,
    #[serde(default)]
    is_selected: Option<bool>,
    #[serde(default)]
    is_available: Option<bool>,
}

/// Parse a JSON array of availability documents.
pub fn parse_availability_json(json: &str) -> Result<Vec<AvailabilityRecord>, LoadError> {
    let wire: Vec<WireAvailability> =
        serde_json::from_str(json).map_err(|e| LoadError::Malformed(e.to_string()))?;
    let total = wire.len();
    let records: Vec<AvailabilityRecord> = wire
        .into_iter()
        .filter_map(|w| {
            let time = w.time.filter(|t| !t.is_empty())?;
            Some(AvailabilityRecord::new(
                time,
                w.is_selected.unwrap_or(false),
                w.is_available.unwrap_or(true),
            ))
        })
        .collect();
    if records.len() < total {
        tracing::debug!(
            dropped = total - records.len(),
            "availability records without time dropped"
        );
    }
    Ok(records)
}

/// Serialize a selection as a JSON array of `{ time, isSelected }`.
pub fn selection_to_json(selection: &[SelectionRecord]) -> Result<String, SaveError> {
    encode(selection)
}

fn encode<T: Serialize + ?Sized>(value: &T) -> Result<String, SaveError> {
    serde_json::to_string(value).map_err(|e| SaveError::Encode(e.to_string()))
}

/// One participant's answer for one date, as written to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantSubmission {
    pub name: String,
    pub selected_times: Vec<String>,
}

impl ParticipantSubmission {
    /// Collect the selected times from a full selection.
    #[must_use]
    pub fn from_selection(name: impl Into<String>, selection: &[SelectionRecord]) -> Self {
        Self {
            name: name.into(),
            selected_times: selection
                .iter()
                .filter(|r| r.is_selected)
                .map(|r| r.time.clone())
                .collect(),
        }
    }

    /// Document key: the name with whitespace runs collapsed to `-`,
    /// suffixed with the submission time in Unix milliseconds.
    #[must_use]
    pub fn participant_id(&self, submitted_at_ms: u64) -> String {
        let slug = self.name.split_whitespace().collect::<Vec<_>>().join("-");
        format!("{slug}-{submitted_at_ms}")
    }

    pub fn to_json(&self) -> Result<String, SaveError> {
        encode(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_applies_reader_defaults() {
        let records = parse_availability_json(
            r#"[
                {"id": "a", "time": "09:00", "isSelected": true},
                {"time": "09:30", "isAvailable": false},
                {"time": "10:00", "isSelected": null, "isAvailable": null}
            ]"#,
        )
        .expect("valid document");
        assert_eq!(records, [
            AvailabilityRecord::new("09:00", true, true),
            AvailabilityRecord::new("09:30", false, false),
            AvailabilityRecord::new("10:00", false, true),
        ]);
    }

    #[test]
    fn parse_drops_records_without_time() {
        let records =
            parse_availability_json(r#"[{"time": ""}, {"isSelected": true}, {"time": "11:00"}]"#)
                .expect("valid document");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].time, "11:00");
    }

    #[test]
    fn non_array_is_malformed() {
        for doc in [r#"{"time": "09:00"}"#, "nope", r#"[1, 2]"#] {
            let err = parse_availability_json(doc).unwrap_err();
            assert!(matches!(err, LoadError::Malformed(_)), "{doc}");
        }
    }

    #[test]
    fn selection_json_is_camel_case() {
        let json = selection_to_json(&[SelectionRecord {
            time: "09:00".into(),
            is_selected: true,
        }])
        .expect("serializable");
        assert_eq!(json, r#"[{"time":"09:00","isSelected":true}]"#);
    }

    #[test]
    fn submission_keeps_selected_times_in_order() {
        let selection = [
            SelectionRecord {
                time: "09:00".into(),
                is_selected: true,
            },
            SelectionRecord {
                time: "09:30".into(),
                is_selected: false,
            },
            SelectionRecord {
                time: "10:00".into(),
                is_selected: true,
            },
        ];
        let submission = ParticipantSubmission::from_selection("Kim  Min Ji", &selection);
        assert_eq!(submission.selected_times, ["09:00", "10:00"]);
        assert_eq!(
            submission.participant_id(1_700_000_000_000),
            "Kim-Min-Ji-1700000000000"
        );
        assert_eq!(
            submission.to_json().expect("serializable"),
            r#"{"name":"Kim  Min Ji","selectedTimes":["09:00","10:00"]}"#
        );
    }

    #[test]
    fn error_display() {
        assert_eq!(
            LoadError::Transport("offline".into()).to_string(),
            "availability transport error: offline"
        );
        assert_eq!(
            SaveError::Rejected("closed".into()).to_string(),
            "selection rejected: closed"
        );
    }

    #[test]
    fn encoding_failure_is_not_a_rejection() {
        use std::collections::BTreeMap;

        // JSON object keys must be strings.
        let unencodable: BTreeMap<(u8, u8), bool> = BTreeMap::from([((9, 0), true)]);
        let err = encode(&unencodable).unwrap_err();
        assert!(matches!(err, SaveError::Encode(_)), "got {err:?}");
        assert!(err.to_string().starts_with("selection encoding failed"));
    }
}
