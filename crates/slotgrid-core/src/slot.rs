#![forbid(unsafe_code)]

//! Slot registry: the ordered half-hour slots of one date and their selection.
//!
//! [`SlotRegistry`] owns a contiguous, time-ordered sequence of [`TimeSlot`]s.
//! Index order is the canonical index space used by the gesture machine for
//! range computation, so index order always equals time order.
//!
//! # Invariants
//!
//! 1. The sequence is generated once and never reordered or resized.
//! 2. `time` is unique across the sequence.
//! 3. [`apply_range`](SlotRegistry::apply_range) is idempotent: repeating a
//!    call with identical arguments leaves the state unchanged.
//! 4. Every rejected mutation (`IndexOutOfRange`, `SnapshotLength`,
//!    `Unavailable`) leaves the registry untouched.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::availability::{self, AvailabilityRecord, MergeReport, SelectionRecord};

/// First hour of the default poll day.
pub const DEFAULT_START_HOUR: u8 = 9;
/// Last hour (inclusive) of the default poll day.
pub const DEFAULT_END_HOUR: u8 = 22;
/// Default slot length.
pub const DEFAULT_STEP_MINUTES: u16 = 30;

/// Locale used for the human-readable slot label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayLocale {
    /// `오전 9:00`, `오후 1:30`.
    #[default]
    Korean,
    /// `9:00 AM`, `1:30 PM`.
    English,
}

impl DisplayLocale {
    /// Render the label for `hour:minute`.
    #[must_use]
    pub fn label(self, hour: u8, minute: u8) -> String {
        match self {
            Self::Korean => {
                let meridiem = if hour < 12 { "오전" } else { "오후" };
                let display_hour = if hour <= 12 { hour } else { hour - 12 };
                format!("{meridiem} {display_hour}:{minute:02}")
            }
            Self::English => {
                let suffix = if hour < 12 { "AM" } else { "PM" };
                let display_hour = match hour % 12 {
                    0 => 12,
                    h => h,
                };
                format!("{display_hour}:{minute:02} {suffix}")
            }
        }
    }
}

/// One selectable time unit in the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    /// Stable identity, `slot-HH:MM`.
    pub id: String,
    /// Canonical 24-hour `HH:MM` key.
    pub time: String,
    /// Localized label; never used for identity.
    pub display: String,
    pub is_selected: bool,
    /// Set by the availability load. `None` until a load has been merged.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_available: Option<bool>,
    #[serde(skip)]
    minute_of_day: u16,
}

impl TimeSlot {
    fn new(hour: u8, minute: u8, locale: DisplayLocale) -> Self {
        let time = format!("{hour:02}:{minute:02}");
        Self {
            id: format!("slot-{time}"),
            display: locale.label(hour, minute),
            time,
            is_selected: false,
            is_available: None,
            minute_of_day: u16::from(hour) * 60 + u16::from(minute),
        }
    }

    /// Hour component (0-23).
    #[inline]
    #[must_use]
    pub const fn hour(&self) -> u8 {
        (self.minute_of_day / 60) as u8
    }

    /// Minute component (0-59).
    #[inline]
    #[must_use]
    pub const fn minute(&self) -> u8 {
        (self.minute_of_day % 60) as u8
    }

    /// Minutes since midnight.
    #[inline]
    #[must_use]
    pub const fn minute_of_day(&self) -> u16 {
        self.minute_of_day
    }
}

/// Ordered slot sequence with selection state and interaction history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotRegistry {
    slots: Vec<TimeSlot>,
    touched: Vec<bool>,
    enforce_availability: bool,
}

impl SlotRegistry {
    /// Generate the slots for `start_hour..=end_hour` at `step_minutes`
    /// intervals within each hour, labeled in the default locale.
    pub fn initialize(start_hour: u8, end_hour: u8, step_minutes: u16) -> Result<Self, SlotError> {
        Self::initialize_with_locale(start_hour, end_hour, step_minutes, DisplayLocale::default())
    }

    /// Like [`initialize`](Self::initialize) with an explicit label locale.
    pub fn initialize_with_locale(
        start_hour: u8,
        end_hour: u8,
        step_minutes: u16,
        locale: DisplayLocale,
    ) -> Result<Self, SlotError> {
        let reject = |reason| SlotError::Configuration {
            start_hour,
            end_hour,
            step_minutes,
            reason,
        };
        if start_hour > end_hour {
            return Err(reject("start hour is after end hour"));
        }
        if end_hour > 23 {
            return Err(reject("end hour must be at most 23"));
        }
        if step_minutes == 0 {
            return Err(reject("step must be positive"));
        }
        if 60 % step_minutes != 0 {
            return Err(reject("step must divide an hour evenly"));
        }

        let per_hour = usize::from(60 / step_minutes);
        let mut slots = Vec::with_capacity(usize::from(end_hour - start_hour + 1) * per_hour);
        for hour in start_hour..=end_hour {
            for minute in (0..60u16).step_by(usize::from(step_minutes)) {
                slots.push(TimeSlot::new(hour, minute as u8, locale));
            }
        }
        let touched = vec![false; slots.len()];
        Ok(Self {
            slots,
            touched,
            enforce_availability: false,
        })
    }

    /// Number of slots.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the registry has no slots.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// All slots in index order.
    #[must_use]
    pub fn slots(&self) -> &[TimeSlot] {
        &self.slots
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&TimeSlot> {
        self.slots.get(index)
    }

    /// Index of the slot with the given `HH:MM` key.
    #[must_use]
    pub fn index_of(&self, time: &str) -> Option<usize> {
        self.slots.iter().position(|slot| slot.time == time)
    }

    /// Whether slot `index` is currently selected. Out of range reads as `false`.
    #[must_use]
    pub fn is_selected(&self, index: usize) -> bool {
        self.slots.get(index).is_some_and(|slot| slot.is_selected)
    }

    /// Whether unavailable slots are locked against interaction.
    #[must_use]
    pub const fn enforce_availability(&self) -> bool {
        self.enforce_availability
    }

    pub fn set_enforce_availability(&mut self, enforce: bool) {
        self.enforce_availability = enforce;
    }

    /// Whether slot `index` may be changed by the user.
    ///
    /// Slots with unknown availability are selectable; only an explicit
    /// `is_available == Some(false)` locks a slot, and only when enforcement
    /// is on.
    #[must_use]
    pub fn is_selectable(&self, index: usize) -> bool {
        self.slots.get(index).is_some_and(|slot| {
            !self.enforce_availability || slot.is_available.unwrap_or(true)
        })
    }

    /// Current selection as a boolean vector in index order.
    #[must_use]
    pub fn selection_vector(&self) -> Vec<bool> {
        self.slots.iter().map(|slot| slot.is_selected).collect()
    }

    /// Flip exactly one slot, returning its new value.
    pub fn toggle(&mut self, index: usize) -> Result<bool, SlotError> {
        let len = self.slots.len();
        if index >= len {
            tracing::warn!(index, len, "toggle ignored: slot index out of range");
            return Err(SlotError::IndexOutOfRange { index, len });
        }
        if !self.is_selectable(index) {
            return Err(SlotError::Unavailable { index });
        }
        let slot = &mut self.slots[index];
        slot.is_selected = !slot.is_selected;
        Ok(slot.is_selected)
    }

    /// Set `[start, end]` (inclusive) to `selected` and every other slot to
    /// `fallback[index]`.
    ///
    /// Bounds may be given in either order; `end` is clamped to the last slot.
    /// When availability is enforced, unavailable slots inside the range keep
    /// their fallback value. Returns the number of slots whose value changed.
    pub fn apply_range(
        &mut self,
        start: usize,
        end: usize,
        selected: bool,
        fallback: &[bool],
    ) -> Result<usize, SlotError> {
        let len = self.slots.len();
        if fallback.len() != len {
            return Err(SlotError::SnapshotLength {
                expected: len,
                got: fallback.len(),
            });
        }
        let (lo, hi) = (start.min(end), start.max(end));
        if lo >= len {
            tracing::warn!(index = lo, len, "range ignored: slot index out of range");
            return Err(SlotError::IndexOutOfRange { index: lo, len });
        }
        let hi = hi.min(len - 1);

        let mut changed = 0;
        for index in 0..len {
            let value = if (lo..=hi).contains(&index) && self.is_selectable(index) {
                selected
            } else {
                fallback[index]
            };
            let slot = &mut self.slots[index];
            if slot.is_selected != value {
                slot.is_selected = value;
                changed += 1;
            }
        }
        Ok(changed)
    }

    /// Overwrite the selection with `snapshot`.
    pub fn restore(&mut self, snapshot: &[bool]) -> Result<(), SlotError> {
        if snapshot.len() != self.slots.len() {
            return Err(SlotError::SnapshotLength {
                expected: self.slots.len(),
                got: snapshot.len(),
            });
        }
        for (slot, &value) in self.slots.iter_mut().zip(snapshot) {
            slot.is_selected = value;
        }
        Ok(())
    }

    /// Record every slot whose selection differs from `snapshot` as changed by
    /// the user. Returns how many slots were newly marked.
    pub fn mark_touched_since(&mut self, snapshot: &[bool]) -> usize {
        let mut marked = 0;
        for ((slot, touched), &before) in self.slots.iter().zip(&mut self.touched).zip(snapshot) {
            if slot.is_selected != before && !*touched {
                *touched = true;
                marked += 1;
            }
        }
        marked
    }

    /// Whether the user changed slot `index` interactively.
    #[must_use]
    pub fn is_touched(&self, index: usize) -> bool {
        self.touched.get(index).copied().unwrap_or(false)
    }

    /// Merge a server availability list. See [`availability`] for the policy.
    pub fn load_availability(&mut self, records: &[AvailabilityRecord]) -> MergeReport {
        let report = availability::merge(&mut self.slots, &self.touched, records);
        if !report.skipped {
            tracing::info!(
                matched = report.matched,
                unmatched = report.unmatched_server,
                preserved = report.preserved_local,
                "availability merged"
            );
        }
        report
    }

    /// Final selection in the `{time, isSelected}` shape used for persistence.
    #[must_use]
    pub fn selection_record(&self) -> Vec<SelectionRecord> {
        self.slots
            .iter()
            .map(|slot| SelectionRecord {
                time: slot.time.clone(),
                is_selected: slot.is_selected,
            })
            .collect()
    }

    /// Times of the currently selected slots, in order.
    #[must_use]
    pub fn selected_times(&self) -> Vec<&str> {
        self.slots
            .iter()
            .filter(|slot| slot.is_selected)
            .map(|slot| slot.time.as_str())
            .collect()
    }
}

/// Slot registry errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotError {
    /// Invalid generation bounds; fatal at setup.
    Configuration {
        start_hour: u8,
        end_hour: u8,
        step_minutes: u16,
        reason: &'static str,
    },
    /// Index outside the slot sequence; callers swallow it as a no-op.
    IndexOutOfRange { index: usize, len: usize },
    /// A fallback/snapshot vector does not match the slot count.
    SnapshotLength { expected: usize, got: usize },
    /// The slot is locked because the server marked it unavailable.
    Unavailable { index: usize },
}

impl fmt::Display for SlotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration {
                start_hour,
                end_hour,
                step_minutes,
                reason,
            } => write!(
                f,
                "invalid slot bounds {start_hour}..={end_hour} step {step_minutes}m: {reason}"
            ),
            Self::IndexOutOfRange { index, len } => {
                write!(f, "slot index {index} out of range (len {len})")
            }
            Self::SnapshotLength { expected, got } => {
                write!(f, "snapshot length {got} does not match slot count {expected}")
            }
            Self::Unavailable { index } => write!(f, "slot {index} is not available"),
        }
    }
}

impl std::error::Error for SlotError {}
