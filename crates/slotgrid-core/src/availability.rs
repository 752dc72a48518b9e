#![forbid(unsafe_code)]

//! Availability merge policy and load sequencing.
//!
//! The availability list arrives asynchronously, after the grid is already
//! interactive. The merge is "replace untouched":
//!
//! - An empty server list is a no-op; defaults stay in place.
//! - Otherwise every slot's `is_available` is replaced by the server value,
//!   and slots missing from the list become unavailable.
//! - `is_selected` is replaced by the server value (missing means `false`)
//!   only for slots the user has not changed interactively. Touched slots keep
//!   their local value.
//!
//! [`LoadSequencer`] hands out monotonically increasing [`LoadTicket`]s so
//! that only the most recent request's completion is merged.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::slot::TimeSlot;

/// One server-side slot entry, keyed by `time`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityRecord {
    pub time: String,
    #[serde(default)]
    pub is_selected: bool,
    #[serde(default = "default_available")]
    pub is_available: bool,
}

const fn default_available() -> bool {
    true
}

impl AvailabilityRecord {
    #[must_use]
    pub fn new(time: impl Into<String>, is_selected: bool, is_available: bool) -> Self {
        Self {
            time: time.into(),
            is_selected,
            is_available,
        }
    }
}

/// One slot of the final selection, in the shape the write contract expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionRecord {
    pub time: String,
    pub is_selected: bool,
}

/// Outcome counters for one merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MergeReport {
    /// Slots that found a server record.
    pub matched: usize,
    /// Server records whose time matched no slot.
    pub unmatched_server: usize,
    /// Touched slots whose local selection was kept.
    pub preserved_local: usize,
    /// The server list was empty and nothing was changed.
    pub skipped: bool,
}

pub(crate) fn merge(
    slots: &mut [TimeSlot],
    touched: &[bool],
    records: &[AvailabilityRecord],
) -> MergeReport {
    if records.is_empty() {
        return MergeReport {
            skipped: true,
            ..MergeReport::default()
        };
    }

    // Later duplicates win.
    let by_time: HashMap<&str, &AvailabilityRecord> = records
        .iter()
        .map(|record| (record.time.as_str(), record))
        .collect();

    let mut report = MergeReport::default();
    for (index, slot) in slots.iter_mut().enumerate() {
        let matched = by_time.get(slot.time.as_str()).copied();
        if matched.is_some() {
            report.matched += 1;
        }
        slot.is_available = Some(matched.is_some_and(|record| record.is_available));
        if touched.get(index).copied().unwrap_or(false) {
            report.preserved_local += 1;
        } else {
            slot.is_selected = matched.is_some_and(|record| record.is_selected);
        }
    }
    report.unmatched_server = by_time.len() - report.matched;
    report
}

/// Identifies one availability request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoadTicket(u64);

impl LoadTicket {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Issues load tickets and decides which completion is current.
#[derive(Debug, Clone, Default)]
pub struct LoadSequencer {
    latest: u64,
}

impl LoadSequencer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a ticket for a new request; it supersedes all earlier tickets.
    pub fn issue(&mut self) -> LoadTicket {
        self.latest = self.latest.saturating_add(1);
        LoadTicket(self.latest)
    }

    /// Whether `ticket` belongs to the most recent request.
    #[must_use]
    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.0 == self.latest
    }

    /// The most recently issued ticket, if any.
    #[must_use]
    pub fn latest(&self) -> Option<LoadTicket> {
        (self.latest > 0).then_some(LoadTicket(self.latest))
    }
}
