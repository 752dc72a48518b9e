#![forbid(unsafe_code)]

//! Deterministic browser lifecycle adapter for slot selection gestures.
//!
//! This module bridges DOM mouse and touch callbacks into
//! [`slotgrid_core::GestureEvent`] values while enforcing:
//! - mouse callbacks arrive per slot element, touch moves are hit-tested,
//! - `mousemove` only counts on the slot that is already current,
//! - a document-level `mouseup` ends a drag released outside the grid, and
//! - `touchmove` default scrolling is suppressed only while a touch gesture
//!   is live.
//!
//! Every callback returns a [`SlotInputDispatch`] carrying the forwarded
//! event, the machine transition and a structured [`SlotInputLogEntry`].

use slotgrid_core::{
    CancelReason, GestureConfig, GestureEffect, GestureEvent, GestureEventKind, GestureMachine,
    GestureNoopReason, GestureState, GestureTransition, GridConfig, InputSource, SlotError,
    SlotRegistry, SpatialIndex,
};
use web_time::Instant;

/// One active touch point in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    pub client_x: f64,
    pub client_y: f64,
}

impl TouchPoint {
    #[must_use]
    pub const fn new(client_x: f64, client_y: f64) -> Self {
        Self { client_x, client_y }
    }
}

/// Lifecycle phase recorded for one adapter dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotInputLifecyclePhase {
    MouseDown,
    MouseEnter,
    MouseMove,
    MouseUp,
    DocumentMouseUp,
    TouchStart,
    TouchMove,
    TouchEnd,
    TouchCancel,
    Teardown,
}

impl SlotInputLifecyclePhase {
    #[must_use]
    pub const fn source(self) -> Option<InputSource> {
        match self {
            Self::MouseDown
            | Self::MouseEnter
            | Self::MouseMove
            | Self::MouseUp
            | Self::DocumentMouseUp => Some(InputSource::Mouse),
            Self::TouchStart | Self::TouchMove | Self::TouchEnd | Self::TouchCancel => {
                Some(InputSource::Touch)
            }
            Self::Teardown => None,
        }
    }
}

/// Deterministic reason why an incoming lifecycle signal was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotInputIgnoredReason {
    /// `touchmove` carried an empty touch list.
    NoTouchPoints,
    /// No touch gesture is live, so there is nothing to hit-test for.
    NoActiveTouch,
    /// The touch point is over a gap or outside the grid.
    NoSlotUnderPoint,
    /// `mousemove` on a slot other than the current one.
    NotCurrentSlot,
    /// Teardown with no gesture in progress.
    AlreadyIdle,
    /// Forwarded, but the machine answered with a no-op.
    MachineNoop(GestureNoopReason),
}

/// Outcome category for one lifecycle dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotInputLogOutcome {
    Forwarded,
    Ignored(SlotInputIgnoredReason),
}

/// Structured lifecycle log record for one adapter dispatch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotInputLogEntry {
    pub phase: SlotInputLifecyclePhase,
    pub sequence: Option<u64>,
    pub index: Option<usize>,
    pub source: Option<InputSource>,
    pub outcome: SlotInputLogOutcome,
}

/// Result of one lifecycle dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotInputDispatch {
    pub gesture_event: Option<GestureEvent>,
    pub transition: Option<GestureTransition>,
    /// The host should call `preventDefault()` on the DOM event.
    pub prevent_default: bool,
    pub log: SlotInputLogEntry,
}

impl SlotInputDispatch {
    fn ignored(
        phase: SlotInputLifecyclePhase,
        reason: SlotInputIgnoredReason,
        index: Option<usize>,
        prevent_default: bool,
    ) -> Self {
        tracing::trace!(?phase, ?reason, ?index, "slot input ignored");
        Self {
            gesture_event: None,
            transition: None,
            prevent_default,
            log: SlotInputLogEntry {
                phase,
                sequence: None,
                index,
                source: phase.source(),
                outcome: SlotInputLogOutcome::Ignored(reason),
            },
        }
    }

    /// Whether the dispatch changed gesture state or selection.
    #[must_use]
    pub fn is_forwarded(&self) -> bool {
        self.log.outcome == SlotInputLogOutcome::Forwarded
    }
}

/// Deterministic lifecycle adapter for slot-grid web hosts.
///
/// Owns the slot registry, the gesture machine and the spatial index. The
/// host registers one bounds provider per rendered slot element and calls
/// the lifecycle methods from its DOM listeners, passing the current
/// instant explicitly.
#[derive(Debug)]
pub struct SlotInputAdapter {
    registry: SlotRegistry,
    machine: GestureMachine,
    spatial: SpatialIndex,
    next_sequence: u64,
}

impl SlotInputAdapter {
    #[must_use]
    pub fn new(registry: SlotRegistry, config: GestureConfig) -> Self {
        let spatial = SpatialIndex::with_slots(registry.len());
        Self {
            registry,
            machine: GestureMachine::new(config),
            spatial,
            next_sequence: 1,
        }
    }

    /// Build the registry and machine described by `config`.
    pub fn from_config(config: &GridConfig) -> Result<Self, SlotError> {
        Ok(Self::new(config.build_registry()?, config.to_gesture_config()))
    }

    #[must_use]
    pub fn registry(&self) -> &SlotRegistry {
        &self.registry
    }

    /// Direct registry access for availability merges and host resets.
    pub fn registry_mut(&mut self) -> &mut SlotRegistry {
        &mut self.registry
    }

    #[must_use]
    pub fn spatial(&self) -> &SpatialIndex {
        &self.spatial
    }

    pub fn spatial_mut(&mut self) -> &mut SpatialIndex {
        &mut self.spatial
    }

    #[must_use]
    pub fn gesture_state(&self) -> &GestureState {
        self.machine.state()
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.machine.is_active()
    }

    /// Handle `mousedown` on slot `index`.
    pub fn mouse_down(&mut self, index: usize, client_y: f64, now: Instant) -> SlotInputDispatch {
        self.forward(
            SlotInputLifecyclePhase::MouseDown,
            InputSource::Mouse,
            GestureEventKind::Start { index, client_y },
            Some(index),
            now,
        )
    }

    /// Handle `mouseenter` on slot `index`.
    pub fn mouse_enter(&mut self, index: usize, client_y: f64, now: Instant) -> SlotInputDispatch {
        let kind = self.move_kind(index, client_y);
        self.forward(
            SlotInputLifecyclePhase::MouseEnter,
            InputSource::Mouse,
            kind,
            Some(index),
            now,
        )
    }

    /// Handle `mousemove` on slot `index`; only the current slot counts.
    pub fn mouse_move(&mut self, index: usize, client_y: f64, now: Instant) -> SlotInputDispatch {
        if self.machine.state().current_index() != Some(index) {
            return SlotInputDispatch::ignored(
                SlotInputLifecyclePhase::MouseMove,
                SlotInputIgnoredReason::NotCurrentSlot,
                Some(index),
                false,
            );
        }
        let kind = self.move_kind(index, client_y);
        self.forward(
            SlotInputLifecyclePhase::MouseMove,
            InputSource::Mouse,
            kind,
            Some(index),
            now,
        )
    }

    /// Handle `mouseup` on the grid.
    pub fn mouse_up(&mut self, now: Instant) -> SlotInputDispatch {
        self.forward(
            SlotInputLifecyclePhase::MouseUp,
            InputSource::Mouse,
            GestureEventKind::End,
            None,
            now,
        )
    }

    /// Handle a document-level `mouseup`, covering releases outside the grid.
    pub fn document_mouse_up(&mut self, now: Instant) -> SlotInputDispatch {
        self.forward(
            SlotInputLifecyclePhase::DocumentMouseUp,
            InputSource::Mouse,
            GestureEventKind::Release,
            None,
            now,
        )
    }

    /// Handle `touchstart` on slot `index`.
    pub fn touch_start(
        &mut self,
        index: usize,
        touches: &[TouchPoint],
        now: Instant,
    ) -> SlotInputDispatch {
        let client_y = touches
            .first()
            .map(|t| t.client_y)
            .or_else(|| self.spatial.rect(index).map(|r| r.center_y()))
            .unwrap_or(0.0);
        self.forward(
            SlotInputLifecyclePhase::TouchStart,
            InputSource::Touch,
            GestureEventKind::Start { index, client_y },
            Some(index),
            now,
        )
    }

    /// Handle `touchmove` on the grid container.
    ///
    /// The slot under the first touch point is found by hit-testing. While a
    /// touch gesture is live the dispatch asks the host to prevent scrolling,
    /// including when the finger is over a gap.
    pub fn touch_move(&mut self, touches: &[TouchPoint], now: Instant) -> SlotInputDispatch {
        let phase = SlotInputLifecyclePhase::TouchMove;
        let state = self.machine.state();
        if !(state.is_active() && state.pointer_source() == Some(InputSource::Touch)) {
            return SlotInputDispatch::ignored(
                phase,
                SlotInputIgnoredReason::NoActiveTouch,
                None,
                false,
            );
        }
        let Some(touch) = touches.first() else {
            return SlotInputDispatch::ignored(
                phase,
                SlotInputIgnoredReason::NoTouchPoints,
                None,
                true,
            );
        };
        let Some(index) = self.spatial.hit_test(touch.client_x, touch.client_y) else {
            return SlotInputDispatch::ignored(
                phase,
                SlotInputIgnoredReason::NoSlotUnderPoint,
                None,
                true,
            );
        };
        let kind = self.move_kind(index, touch.client_y);
        let mut dispatch = self.forward(phase, InputSource::Touch, kind, Some(index), now);
        dispatch.prevent_default = true;
        dispatch
    }

    /// Handle a document-level `touchend`.
    pub fn touch_end(&mut self, now: Instant) -> SlotInputDispatch {
        self.forward(
            SlotInputLifecyclePhase::TouchEnd,
            InputSource::Touch,
            GestureEventKind::End,
            None,
            now,
        )
    }

    /// Handle `touchcancel`; the gesture stops where it is.
    pub fn touch_cancel(&mut self, now: Instant) -> SlotInputDispatch {
        self.forward(
            SlotInputLifecyclePhase::TouchCancel,
            InputSource::Touch,
            GestureEventKind::Cancel {
                reason: CancelReason::TouchCancel,
            },
            None,
            now,
        )
    }

    /// Abort any live gesture without an input event (date change, unmount).
    pub fn teardown(&mut self) -> SlotInputDispatch {
        let phase = SlotInputLifecyclePhase::Teardown;
        match self.machine.force_cancel(&mut self.registry) {
            Some(transition) => SlotInputDispatch {
                gesture_event: None,
                transition: Some(transition),
                prevent_default: false,
                log: SlotInputLogEntry {
                    phase,
                    sequence: None,
                    index: None,
                    source: None,
                    outcome: SlotInputLogOutcome::Forwarded,
                },
            },
            None => {
                SlotInputDispatch::ignored(phase, SlotInputIgnoredReason::AlreadyIdle, None, false)
            }
        }
    }

    fn move_kind(&self, index: usize, client_y: f64) -> GestureEventKind {
        GestureEventKind::Move {
            index,
            client_y,
            relative_offset: self.spatial.relative_offset(client_y, index),
        }
    }

    fn forward(
        &mut self,
        phase: SlotInputLifecyclePhase,
        source: InputSource,
        kind: GestureEventKind,
        index: Option<usize>,
        now: Instant,
    ) -> SlotInputDispatch {
        let event = GestureEvent::new(self.next_sequence(), source, kind);
        let transition = self.machine.apply_event(&event, &mut self.registry, now);
        let outcome = match transition.effect {
            GestureEffect::Noop { reason } => {
                SlotInputLogOutcome::Ignored(SlotInputIgnoredReason::MachineNoop(reason))
            }
            _ => SlotInputLogOutcome::Forwarded,
        };
        SlotInputDispatch {
            gesture_event: Some(event),
            transition: Some(transition),
            prevent_default: false,
            log: SlotInputLogEntry {
                phase,
                sequence: Some(event.sequence),
                index,
                source: Some(source),
                outcome,
            },
        }
    }

    fn next_sequence(&mut self) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence = self.next_sequence.saturating_add(1);
        sequence
    }
}
