#![forbid(unsafe_code)]

//! `TimeTable`: the composition root for one date's slot grid.
//!
//! A `TimeTable` owns the browser input adapter (and through it the slot
//! registry, gesture machine and spatial index), sequences availability
//! loads, and renders a column/row snapshot for the host.
//!
//! # Invariants
//!
//! 1. Only the completion of the most recently issued [`LoadTicket`] is
//!    merged; earlier completions are discarded.
//! 2. A completion that arrives mid-gesture is held and merged as soon as the
//!    gesture returns to Idle, so a load never rewrites slots under a drag.
//! 3. A failed load leaves the slots as they were; the grid stays usable.
//!
//! # Failure Modes
//!
//! Load failures are logged at `warn` and reported as
//! [`LoadOutcome::Failed`] with their [`DegradationAction`]. Save failures
//! propagate as [`Error::Save`].

use serde::Serialize;
use slotgrid_core::{
    AvailabilityRecord, BoundsProvider, GridConfig, LoadSequencer, LoadTicket, MergeReport,
    SelectionRecord, SlotRegistry, SpatialIndex, hour_groups, slot_transform, split_columns,
};
use slotgrid_web::{
    AvailabilitySource, LoadError, ParticipantSubmission, SelectionSink, SlotInputAdapter,
    SlotInputDispatch, TouchPoint,
};
use web_time::Instant;

use crate::error::{DegradationAction, Error, Result};

/// One host callback, ready to dispatch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SlotInput<'a> {
    MouseDown { index: usize, client_y: f64 },
    MouseEnter { index: usize, client_y: f64 },
    MouseMove { index: usize, client_y: f64 },
    MouseUp,
    DocumentMouseUp,
    TouchStart {
        index: usize,
        touches: &'a [TouchPoint],
    },
    TouchMove { touches: &'a [TouchPoint] },
    TouchEnd,
    TouchCancel,
}

/// What happened to one load completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied(MergeReport),
    /// Held until the active gesture ends.
    Deferred,
    /// A newer load was issued after this one.
    Stale,
    Failed(DegradationAction),
}

/// Interactive time table for one date.
#[derive(Debug)]
pub struct TimeTable {
    config: GridConfig,
    input: SlotInputAdapter,
    loads: LoadSequencer,
    deferred: Option<(LoadTicket, Vec<AvailabilityRecord>)>,
}

impl TimeTable {
    /// Build a table from a validated configuration.
    pub fn new(config: GridConfig) -> Result<Self> {
        let config = config.validated()?;
        let input = SlotInputAdapter::from_config(&config)?;
        Ok(Self {
            config,
            input,
            loads: LoadSequencer::new(),
            deferred: None,
        })
    }

    /// Build a table from TOML configuration text.
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        Self::new(GridConfig::from_toml_str(toml)?)
    }

    #[must_use]
    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    #[must_use]
    pub fn registry(&self) -> &SlotRegistry {
        self.input.registry()
    }

    #[must_use]
    pub fn input(&self) -> &SlotInputAdapter {
        &self.input
    }

    #[must_use]
    pub const fn is_gesture_active(&self) -> bool {
        self.input.is_active()
    }

    #[must_use]
    pub fn has_deferred_load(&self) -> bool {
        self.deferred.is_some()
    }

    /// Associate a rendered slot element with its geometry provider.
    ///
    /// An index outside the grid is rejected with `Error::Slot`, which
    /// degrades to `Ignore`.
    pub fn register_slot_element(
        &mut self,
        index: usize,
        provider: impl BoundsProvider + 'static,
    ) -> Result<()> {
        self.input
            .spatial_mut()
            .register_slot_element(index, provider)?;
        Ok(())
    }

    pub fn spatial_mut(&mut self) -> &mut SpatialIndex {
        self.input.spatial_mut()
    }

    // --- Input ------------------------------------------------------------

    /// Dispatch one host callback, then merge any load that was waiting for
    /// the gesture to end.
    pub fn handle(&mut self, input: SlotInput<'_>, now: Instant) -> SlotInputDispatch {
        let dispatch = match input {
            SlotInput::MouseDown { index, client_y } => self.input.mouse_down(index, client_y, now),
            SlotInput::MouseEnter { index, client_y } => {
                self.input.mouse_enter(index, client_y, now)
            }
            SlotInput::MouseMove { index, client_y } => self.input.mouse_move(index, client_y, now),
            SlotInput::MouseUp => self.input.mouse_up(now),
            SlotInput::DocumentMouseUp => self.input.document_mouse_up(now),
            SlotInput::TouchStart { index, touches } => {
                self.input.touch_start(index, touches, now)
            }
            SlotInput::TouchMove { touches } => self.input.touch_move(touches, now),
            SlotInput::TouchEnd => self.input.touch_end(now),
            SlotInput::TouchCancel => self.input.touch_cancel(now),
        };
        self.settle();
        dispatch
    }

    /// Abort a live gesture without an input event.
    pub fn teardown(&mut self) -> SlotInputDispatch {
        let dispatch = self.input.teardown();
        self.settle();
        dispatch
    }

    /// Regenerate the slots for a newly selected date.
    ///
    /// Any live gesture is aborted, held loads are dropped and loads still in
    /// flight for the previous date become stale.
    pub fn reset_for_date(&mut self) -> Result<()> {
        self.input.teardown();
        *self.input.registry_mut() = self.config.build_registry()?;
        self.deferred = None;
        let fence = self.loads.issue();
        tracing::debug!(fence = fence.get(), "time table reset for new date");
        Ok(())
    }

    // --- Availability -----------------------------------------------------

    /// Start a load; only the newest ticket's completion is applied.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.loads.issue()
    }

    /// Deliver the result of the load identified by `ticket`.
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        result: std::result::Result<Vec<AvailabilityRecord>, LoadError>,
    ) -> LoadOutcome {
        if !self.loads.is_current(ticket) {
            tracing::debug!(ticket = ticket.get(), "stale availability load discarded");
            return LoadOutcome::Stale;
        }
        // Anything still held belongs to an older ticket.
        self.deferred = None;
        match result {
            Err(error) => {
                let error = Error::from(error);
                let action = error.degradation();
                tracing::warn!(
                    ticket = ticket.get(),
                    %error,
                    %action,
                    "availability load failed"
                );
                LoadOutcome::Failed(action)
            }
            Ok(records) if self.input.is_active() => {
                tracing::debug!(
                    ticket = ticket.get(),
                    records = records.len(),
                    "availability load deferred until gesture ends"
                );
                self.deferred = Some((ticket, records));
                LoadOutcome::Deferred
            }
            Ok(records) => LoadOutcome::Applied(self.input.registry_mut().load_availability(&records)),
        }
    }

    /// Fetch and merge availability synchronously from `source`.
    pub fn load_from(
        &mut self,
        source: &dyn AvailabilitySource,
        meeting_id: &str,
        date_id: &str,
    ) -> LoadOutcome {
        let _span = tracing::debug_span!("availability_load", meeting_id, date_id).entered();
        let ticket = self.begin_load();
        let result = source.fetch(meeting_id, date_id);
        self.complete_load(ticket, result)
    }

    fn settle(&mut self) -> Option<MergeReport> {
        if self.input.is_active() {
            return None;
        }
        let (ticket, records) = self.deferred.take()?;
        if !self.loads.is_current(ticket) {
            tracing::debug!(ticket = ticket.get(), "held availability load went stale");
            return None;
        }
        Some(self.input.registry_mut().load_availability(&records))
    }

    // --- Output -----------------------------------------------------------

    /// Full selection in `{time, isSelected}` form.
    #[must_use]
    pub fn selection(&self) -> Vec<SelectionRecord> {
        self.registry().selection_record()
    }

    #[must_use]
    pub fn submission(&self, name: impl Into<String>) -> ParticipantSubmission {
        ParticipantSubmission::from_selection(name, &self.selection())
    }

    /// Store the current selection through `sink`.
    pub fn save_to(&self, sink: &dyn SelectionSink, meeting_id: &str, date_id: &str) -> Result<()> {
        let selection = self.selection();
        sink.persist(meeting_id, date_id, &selection).inspect_err(|error| {
            tracing::warn!(meeting_id, date_id, %error, "selection save failed");
        })?;
        tracing::debug!(
            meeting_id,
            date_id,
            selected = selection.iter().filter(|r| r.is_selected).count(),
            "selection saved"
        );
        Ok(())
    }

    /// Render snapshot: columns of hour rows of slots.
    #[must_use]
    pub fn view(&self) -> TableView {
        let registry = self.registry();
        let state = self.input.gesture_state();
        let range = state.drag_range();
        let slot_view = |index: usize| {
            let slot = &registry.slots()[index];
            let transform = slot_transform(state, index);
            SlotView {
                index,
                time: slot.time.clone(),
                display: slot.display.clone(),
                selected: slot.is_selected,
                available: slot.is_available,
                locked: !registry.is_selectable(index),
                in_drag_range: range.is_some_and(|(lo, hi)| (lo..=hi).contains(&index)),
                is_current: state.is_active() && state.current_index() == Some(index),
                transform: transform.to_css(),
                transition: transform.transition.to_css(),
            }
        };
        let groups = hour_groups(registry.slots());
        let columns = split_columns(&groups, self.config.columns)
            .into_iter()
            .map(|column| {
                column
                    .into_iter()
                    .map(|group| HourRowView {
                        hour: group.hour,
                        slots: group.slots.into_iter().map(&slot_view).collect(),
                    })
                    .collect()
            })
            .collect();
        TableView { columns }
    }
}

// ---------------------------------------------------------------------------
// Render snapshot
// ---------------------------------------------------------------------------

/// Everything a host needs to draw one slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotView {
    pub index: usize,
    pub time: String,
    pub display: String,
    pub selected: bool,
    pub available: Option<bool>,
    /// Unavailable and `enforce_availability` is on.
    pub locked: bool,
    pub in_drag_range: bool,
    pub is_current: bool,
    /// CSS `transform` value.
    pub transform: String,
    /// CSS `transition` value.
    pub transition: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourRowView {
    pub hour: u8,
    pub slots: Vec<SlotView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableView {
    pub columns: Vec<Vec<HourRowView>>,
}

impl TableView {
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Slots in index order, flattening columns and rows.
    pub fn slots(&self) -> impl Iterator<Item = &SlotView> {
        self.columns.iter().flatten().flat_map(|row| &row.slots)
    }
}
