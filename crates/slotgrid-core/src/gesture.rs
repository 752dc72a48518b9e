#![forbid(unsafe_code)]

//! Drag/tap gesture machine: turns [`GestureEvent`]s into slot mutations.
//!
//! The machine is split in two layers:
//!
//! - [`GestureState::transition`] is a pure function from the current state,
//!   one event, a read-only view of the registry and the current instant to
//!   the next state plus a [`GestureEffect`].
//! - [`GestureMachine`] owns the state, applies effects to a
//!   [`SlotRegistry`], and emits [`GestureTransition`] diagnostics.
//!
//! # State Machine
//!
//! ```text
//! Idle --Start(i)--> Active(origin=i, kind=!selected[i])
//! Active --Move(j)--> Active            paint [min(i,j), max(i,j)]
//! Active --End-----> Idle               tap-toggle if current == origin
//! Active --Release/Cancel--> Idle       no further mutation
//! ```
//!
//! # Invariants
//!
//! 1. The brush kind is fixed at gesture start and applies uniformly to the
//!    whole drag range; it is the opposite of the origin slot's selection.
//! 2. During a drag every slot outside the live range shows its value from
//!    the start-of-gesture snapshot, so shrinking a drag un-paints.
//! 3. A release with `current == origin` flips the origin exactly once
//!    relative to the pre-gesture state, even if the pointer left and came
//!    back.
//! 4. Direction and relative offset never influence selection.
//! 5. After a touch gesture finishes, mouse events are ignored until the
//!    touch cooldown expires; mouse events are also ignored while a touch
//!    gesture is active.
//!
//! # Failure Modes
//!
//! Malformed or out-of-sequence events are answered with
//! [`GestureEffect::Noop`] and never mutate anything: move/end while idle,
//! unknown slot indices, events from the other input source, a second start
//! during an active gesture, and invalid coordinates.

use std::fmt;
use std::time::Duration;

use web_time::Instant;

use crate::event::{CancelReason, GestureEvent, GestureEventKind, InputSource};
use crate::slot::SlotRegistry;

/// Default window after a touch gesture during which mouse input is ignored.
pub const DEFAULT_TOUCH_COOLDOWN: Duration = Duration::from_millis(500);

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Gesture machine tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GestureConfig {
    /// Mouse lockout after a touch gesture ends (default: 500ms).
    pub touch_cooldown: Duration,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            touch_cooldown: DEFAULT_TOUCH_COOLDOWN,
        }
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Whether a gesture paints or erases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BrushKind {
    Select,
    Deselect,
}

impl BrushKind {
    /// Brush for a gesture starting on a slot whose selection is `selected`.
    #[inline]
    #[must_use]
    pub const fn for_origin(selected: bool) -> Self {
        if selected { Self::Deselect } else { Self::Select }
    }

    /// Value written into the drag range.
    #[inline]
    #[must_use]
    pub const fn paints(self) -> bool {
        matches!(self, Self::Select)
    }
}

/// Vertical drag direction from consecutive pointer samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DragDirection {
    Up,
    Down,
    #[default]
    Stationary,
}

/// Coarse gesture lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GestureMode {
    #[default]
    Idle,
    Active { origin: usize, kind: BrushKind },
}

/// Complete transient state of the current gesture.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GestureState {
    mode: GestureMode,
    current_index: Option<usize>,
    original_snapshot: Vec<bool>,
    last_committed_range: Option<(usize, usize)>,
    direction: DragDirection,
    relative_offset: f64,
    last_client_y: Option<f64>,
    pointer_source: Option<InputSource>,
    touch_lock_until: Option<Instant>,
}

/// Explicit no-op diagnostics for events that are safely ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GestureNoopReason {
    IdleWithoutActiveGesture,
    ActiveGestureInProgress,
    IndexOutOfRange,
    SlotUnavailable,
    SourceMismatch,
    MouseSuppressedAfterTouch,
    InvalidEvent,
}

/// What one transition asks the registry to do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEffect {
    /// A gesture began; the origin slot is painted with `kind`.
    /// `superseded` is set when a touch start replaced an active mouse gesture.
    Started {
        origin: usize,
        kind: BrushKind,
        source: InputSource,
        superseded: bool,
    },
    /// The live range changed; paint `[start, end]`, restore everything else.
    Painted {
        start: usize,
        end: usize,
        selected: bool,
    },
    /// Pointer feedback changed without touching selection.
    Hovered { index: usize },
    /// Release on the origin: restore the snapshot and toggle the origin.
    Tapped { index: usize },
    /// Gesture finished; the last painted range stands.
    Committed {
        origin: usize,
        current: Option<usize>,
    },
    /// Gesture aborted; already-applied changes stand.
    Canceled { reason: CancelReason },
    Noop { reason: GestureNoopReason },
}

impl GestureEffect {
    #[inline]
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        matches!(self, Self::Noop { .. })
    }
}

/// Result of the pure transition function.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureStep {
    pub next: GestureState,
    pub effect: GestureEffect,
}

impl GestureState {
    /// A fresh idle state with no touch lockout.
    #[must_use]
    pub fn idle() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub const fn mode(&self) -> GestureMode {
        self.mode
    }

    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self.mode, GestureMode::Active { .. })
    }

    #[inline]
    #[must_use]
    pub const fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    /// Selection vector captured when the gesture started; empty when idle.
    #[must_use]
    pub fn original_snapshot(&self) -> &[bool] {
        &self.original_snapshot
    }

    #[inline]
    #[must_use]
    pub const fn last_committed_range(&self) -> Option<(usize, usize)> {
        self.last_committed_range
    }

    #[inline]
    #[must_use]
    pub const fn direction(&self) -> DragDirection {
        self.direction
    }

    /// Last pointer offset within the current slot, in `[-1, 1]`.
    #[inline]
    #[must_use]
    pub const fn relative_offset(&self) -> f64 {
        self.relative_offset
    }

    #[inline]
    #[must_use]
    pub const fn pointer_source(&self) -> Option<InputSource> {
        self.pointer_source
    }

    #[inline]
    #[must_use]
    pub const fn touch_lock_until(&self) -> Option<Instant> {
        self.touch_lock_until
    }

    /// Whether mouse input is locked out at `now`.
    #[must_use]
    pub fn mouse_suppressed(&self, now: Instant) -> bool {
        let touch_active = self.is_active() && self.pointer_source == Some(InputSource::Touch);
        touch_active || self.touch_lock_until.is_some_and(|until| now < until)
    }

    /// Live drag range `[min(origin, current), max(origin, current)]`.
    #[must_use]
    pub fn drag_range(&self) -> Option<(usize, usize)> {
        match (self.mode, self.current_index) {
            (GestureMode::Active { origin, .. }, Some(current)) => {
                Some((origin.min(current), origin.max(current)))
            }
            _ => None,
        }
    }

    /// Compute the next state and effect for `event`.
    ///
    /// `registry` is only read. The caller applies the returned effect.
    #[must_use]
    pub fn transition(
        &self,
        event: &GestureEvent,
        registry: &SlotRegistry,
        now: Instant,
        config: &GestureConfig,
    ) -> GestureStep {
        if event.validate().is_err() {
            return self.noop(GestureNoopReason::InvalidEvent);
        }
        if event.source == InputSource::Mouse && self.mouse_suppressed(now) {
            return self.noop(GestureNoopReason::MouseSuppressedAfterTouch);
        }

        match (self.mode, event.kind) {
            (GestureMode::Idle, GestureEventKind::Start { index, client_y }) => {
                self.start(index, client_y, event.source, registry, false)
            }
            (GestureMode::Active { .. }, GestureEventKind::Start { index, client_y })
                if event.source == InputSource::Touch
                    && self.pointer_source == Some(InputSource::Mouse) =>
            {
                self.start(index, client_y, event.source, registry, true)
            }
            (GestureMode::Active { .. }, GestureEventKind::Start { .. }) => {
                self.noop(GestureNoopReason::ActiveGestureInProgress)
            }
            (GestureMode::Idle, _) => self.noop(GestureNoopReason::IdleWithoutActiveGesture),
            (GestureMode::Active { .. }, _) if self.pointer_source != Some(event.source) => {
                self.noop(GestureNoopReason::SourceMismatch)
            }
            (
                GestureMode::Active { origin, kind },
                GestureEventKind::Move {
                    index,
                    client_y,
                    relative_offset,
                },
            ) => self.drag_to(origin, kind, index, client_y, relative_offset, registry),
            (GestureMode::Active { origin, .. }, GestureEventKind::End) => {
                let effect = if self.current_index == Some(origin) {
                    GestureEffect::Tapped { index: origin }
                } else {
                    GestureEffect::Committed {
                        origin,
                        current: self.current_index,
                    }
                };
                self.finish(event.source, now, config, effect)
            }
            (GestureMode::Active { origin, .. }, GestureEventKind::Release) => self.finish(
                event.source,
                now,
                config,
                GestureEffect::Committed {
                    origin,
                    current: self.current_index,
                },
            ),
            (GestureMode::Active { .. }, GestureEventKind::Cancel { reason }) => {
                self.finish(event.source, now, config, GestureEffect::Canceled { reason })
            }
        }
    }

    fn noop(&self, reason: GestureNoopReason) -> GestureStep {
        GestureStep {
            next: self.clone(),
            effect: GestureEffect::Noop { reason },
        }
    }

    fn start(
        &self,
        index: usize,
        client_y: f64,
        source: InputSource,
        registry: &SlotRegistry,
        superseded: bool,
    ) -> GestureStep {
        if index >= registry.len() {
            return self.noop(GestureNoopReason::IndexOutOfRange);
        }
        if !registry.is_selectable(index) {
            return self.noop(GestureNoopReason::SlotUnavailable);
        }
        let kind = BrushKind::for_origin(registry.is_selected(index));
        let touch_lock_until = match source {
            InputSource::Touch => None,
            InputSource::Mouse => self.touch_lock_until,
        };
        GestureStep {
            next: Self {
                mode: GestureMode::Active {
                    origin: index,
                    kind,
                },
                current_index: Some(index),
                original_snapshot: registry.selection_vector(),
                last_committed_range: Some((index, index)),
                direction: DragDirection::Stationary,
                relative_offset: 0.0,
                last_client_y: Some(client_y),
                pointer_source: Some(source),
                touch_lock_until,
            },
            effect: GestureEffect::Started {
                origin: index,
                kind,
                source,
                superseded,
            },
        }
    }

    fn drag_to(
        &self,
        origin: usize,
        kind: BrushKind,
        index: usize,
        client_y: f64,
        relative_offset: f64,
        registry: &SlotRegistry,
    ) -> GestureStep {
        if index >= registry.len() {
            return self.noop(GestureNoopReason::IndexOutOfRange);
        }
        let mut next = self.clone();
        next.direction = match self.last_client_y {
            Some(last) if client_y < last => DragDirection::Up,
            Some(last) if client_y > last => DragDirection::Down,
            _ => self.direction,
        };
        next.last_client_y = Some(client_y);
        next.relative_offset = relative_offset.clamp(-1.0, 1.0);

        let mut effect = GestureEffect::Hovered { index };
        if self.current_index != Some(index) {
            next.current_index = Some(index);
            let range = (origin.min(index), origin.max(index));
            if self.last_committed_range != Some(range) {
                next.last_committed_range = Some(range);
                effect = GestureEffect::Painted {
                    start: range.0,
                    end: range.1,
                    selected: kind.paints(),
                };
            }
        }
        GestureStep { next, effect }
    }

    fn finish(
        &self,
        source: InputSource,
        now: Instant,
        config: &GestureConfig,
        effect: GestureEffect,
    ) -> GestureStep {
        let touch_lock_until = match source {
            InputSource::Touch => now.checked_add(config.touch_cooldown),
            InputSource::Mouse => self.touch_lock_until,
        };
        GestureStep {
            next: Self {
                touch_lock_until,
                ..Self::default()
            },
            effect,
        }
    }
}

// ---------------------------------------------------------------------------
// Machine
// ---------------------------------------------------------------------------

/// One machine step with deterministic telemetry fields.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureTransition {
    pub transition_id: u64,
    pub sequence: u64,
    pub from: GestureMode,
    pub to: GestureMode,
    pub effect: GestureEffect,
}

/// Stateful driver that applies [`GestureState::transition`] effects to a
/// [`SlotRegistry`].
#[derive(Debug, Clone, Default)]
pub struct GestureMachine {
    config: GestureConfig,
    state: GestureState,
    transition_counter: u64,
}

impl GestureMachine {
    #[must_use]
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            state: GestureState::idle(),
            transition_counter: 0,
        }
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> &GestureState {
        &self.state
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.state.is_active()
    }

    /// Apply one event, mutate `registry` accordingly, and report the step.
    pub fn apply_event(
        &mut self,
        event: &GestureEvent,
        registry: &mut SlotRegistry,
        now: Instant,
    ) -> GestureTransition {
        let step = self.state.transition(event, registry, now, &self.config);
        let from = self.state.mode;

        match step.effect {
            GestureEffect::Started {
                origin,
                kind,
                superseded,
                ..
            } => {
                if superseded {
                    registry.mark_touched_since(&self.state.original_snapshot);
                }
                log_registry_error(registry.apply_range(
                    origin,
                    origin,
                    kind.paints(),
                    &step.next.original_snapshot,
                ));
            }
            GestureEffect::Painted {
                start,
                end,
                selected,
            } => {
                log_registry_error(registry.apply_range(
                    start,
                    end,
                    selected,
                    &self.state.original_snapshot,
                ));
            }
            GestureEffect::Tapped { index } => {
                log_registry_error(registry.restore(&self.state.original_snapshot));
                log_registry_error(registry.toggle(index));
            }
            _ => {}
        }

        if self.state.is_active() && !step.next.is_active() {
            registry.mark_touched_since(&self.state.original_snapshot);
        }

        self.transition_counter = self.transition_counter.saturating_add(1);
        let transition = GestureTransition {
            transition_id: self.transition_counter,
            sequence: event.sequence,
            from,
            to: step.next.mode,
            effect: step.effect,
        };
        if transition.effect.is_noop() {
            tracing::trace!(
                sequence = event.sequence,
                source = ?event.source,
                effect = ?transition.effect,
                "gesture event ignored"
            );
        } else {
            tracing::debug!(
                transition_id = transition.transition_id,
                sequence = event.sequence,
                source = ?event.source,
                from = ?transition.from,
                to = ?transition.to,
                effect = ?transition.effect,
                "gesture transition"
            );
        }
        self.state = step.next;
        transition
    }

    /// Unconditionally return to Idle without any further mutation.
    ///
    /// Safety valve for host teardown paths (date change, unmount) where no
    /// input event exists. Returns `None` if already idle. The touch lockout
    /// is preserved.
    pub fn force_cancel(&mut self, registry: &mut SlotRegistry) -> Option<GestureTransition> {
        if !self.state.is_active() {
            return None;
        }
        registry.mark_touched_since(&self.state.original_snapshot);
        let from = self.state.mode;
        self.state = GestureState {
            touch_lock_until: self.state.touch_lock_until,
            ..GestureState::default()
        };
        self.transition_counter = self.transition_counter.saturating_add(1);
        Some(GestureTransition {
            transition_id: self.transition_counter,
            sequence: 0,
            from,
            to: GestureMode::Idle,
            effect: GestureEffect::Canceled {
                reason: CancelReason::Programmatic,
            },
        })
    }
}

fn log_registry_error<T, E: fmt::Display>(result: Result<T, E>) {
    if let Err(error) = result {
        tracing::warn!(%error, "gesture effect rejected by slot registry");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
