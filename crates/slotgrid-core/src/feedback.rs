#![forbid(unsafe_code)]

//! Elastic drag feedback: maps gesture state to a per-slot transform.
//!
//! The slot under the pointer of an active gesture stretches vertically as
//! the pointer moves away from its center and compresses horizontally in
//! step; a 2px nudge follows the drag direction. Every other slot gets the
//! identity transform. The mapping is pure and has no state of its own.

use std::fmt::Write as _;
use std::time::Duration;

use crate::gesture::{DragDirection, GestureState};

/// Vertical scale at the slot center.
pub const SCALE_Y_BASE: f64 = 0.95;
/// Horizontal scale at the slot center.
pub const SCALE_X_BASE: f64 = 1.05;
/// Scale change per unit of `|relative_offset|`.
pub const SCALE_GAIN: f64 = 0.15;
/// Directional nudge in CSS pixels.
pub const DIRECTION_NUDGE_PX: f64 = 2.0;

/// Fixed transition timing for slot transforms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionSpec {
    pub property: &'static str,
    pub duration: Duration,
    /// Cubic-bezier control points `(x1, y1, x2, y2)`.
    pub bezier: (f64, f64, f64, f64),
}

/// Slight overshoot on `y2` gives the snap-back its bounce.
pub const ELASTIC_TRANSITION: TransitionSpec = TransitionSpec {
    property: "transform",
    duration: Duration::from_millis(80),
    bezier: (0.25, 0.1, 0.25, 1.5),
};

impl TransitionSpec {
    /// CSS `transition` value, e.g. `transform 80ms cubic-bezier(0.25, 0.1, 0.25, 1.5)`.
    #[must_use]
    pub fn to_css(&self) -> String {
        let (x1, y1, x2, y2) = self.bezier;
        format!(
            "{} {}ms cubic-bezier({x1}, {y1}, {x2}, {y2})",
            self.property,
            self.duration.as_millis()
        )
    }
}

/// Presentational transform for one slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotTransform {
    pub scale_y: f64,
    pub scale_x: f64,
    pub translate_y_px: f64,
    pub transition: TransitionSpec,
}

impl SlotTransform {
    pub const IDENTITY: Self = Self {
        scale_y: 1.0,
        scale_x: 1.0,
        translate_y_px: 0.0,
        transition: ELASTIC_TRANSITION,
    };

    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.scale_y == 1.0 && self.scale_x == 1.0 && self.translate_y_px == 0.0
    }

    /// CSS `transform` value; `none` for the identity.
    #[must_use]
    pub fn to_css(&self) -> String {
        if self.is_identity() {
            return "none".to_owned();
        }
        let mut css = format!("scaleY({:.3}) scaleX({:.3})", self.scale_y, self.scale_x);
        if self.translate_y_px != 0.0 {
            let _ = write!(css, " translateY({}px)", self.translate_y_px);
        }
        css
    }
}

/// Transform from a relative offset and direction, ignoring gesture state.
#[must_use]
pub fn elastic_transform(relative_offset: f64, direction: DragDirection) -> SlotTransform {
    let magnitude = relative_offset.abs().min(1.0);
    let translate_y_px = match direction {
        DragDirection::Up => -DIRECTION_NUDGE_PX,
        DragDirection::Down => DIRECTION_NUDGE_PX,
        DragDirection::Stationary => 0.0,
    };
    SlotTransform {
        scale_y: SCALE_Y_BASE + magnitude * SCALE_GAIN,
        scale_x: SCALE_X_BASE - magnitude * SCALE_GAIN,
        translate_y_px,
        transition: ELASTIC_TRANSITION,
    }
}

/// Transform for slot `index` under `state`.
#[must_use]
pub fn slot_transform(state: &GestureState, index: usize) -> SlotTransform {
    if state.is_active() && state.current_index() == Some(index) {
        elastic_transform(state.relative_offset(), state.direction())
    } else {
        SlotTransform::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{GestureEvent, GestureEventKind, InputSource};
    use crate::gesture::GestureConfig;
    use crate::slot::SlotRegistry;
    use web_time::Instant;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn centered_pointer_uses_base_scales() {
        let t = elastic_transform(0.0, DragDirection::Stationary);
        assert!(close(t.scale_y, 0.95));
        assert!(close(t.scale_x, 1.05));
        assert_eq!(t.translate_y_px, 0.0);
    }

    #[test]
    fn edge_pointer_hits_bounds() {
        let top = elastic_transform(-1.0, DragDirection::Up);
        assert!(close(top.scale_y, 1.10));
        assert!(close(top.scale_x, 0.90));
        assert_eq!(top.translate_y_px, -2.0);

        let bottom = elastic_transform(3.0, DragDirection::Down);
        assert!(close(bottom.scale_y, 1.10));
        assert_eq!(bottom.translate_y_px, 2.0);
    }

    #[test]
    fn css_rendering() {
        let t = elastic_transform(0.5, DragDirection::Down);
        assert_eq!(t.to_css(), "scaleY(1.025) scaleX(0.975) translateY(2px)");
        assert_eq!(SlotTransform::IDENTITY.to_css(), "none");
        assert_eq!(
            ELASTIC_TRANSITION.to_css(),
            "transform 80ms cubic-bezier(0.25, 0.1, 0.25, 1.5)"
        );
    }

    #[test]
    fn only_current_slot_of_active_gesture_is_transformed() {
        let registry = SlotRegistry::initialize(9, 10, 30).expect("valid");
        let idle = GestureState::idle();
        assert_eq!(slot_transform(&idle, 0), SlotTransform::IDENTITY);

        let start = GestureEvent::new(
            1,
            InputSource::Mouse,
            GestureEventKind::Start {
                index: 1,
                client_y: 10.0,
            },
        );
        let step = idle.transition(&start, &registry, Instant::now(), &GestureConfig::default());
        let active = step.next;
        assert!(!slot_transform(&active, 1).is_identity());
        assert!(slot_transform(&active, 0).is_identity());
        assert!(slot_transform(&active, 2).is_identity());
    }
}
