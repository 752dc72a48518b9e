#![forbid(unsafe_code)]

//! Unified gesture input vocabulary.
//!
//! Mouse and touch callbacks are normalized into one [`GestureEvent`] stream
//! tagged with its [`InputSource`], so the gesture machine has a single
//! transition table instead of parallel mouse and touch paths.
//!
//! | Kind | Mouse origin | Touch origin |
//! |------|--------------|--------------|
//! | `Start` | `mousedown` on a slot | `touchstart` on a slot |
//! | `Move` | `mouseenter` / `mousemove` on a slot | `touchmove` hit-tested to a slot |
//! | `End` | `mouseup` on a slot | `touchend` |
//! | `Release` | document `mouseup` | none |
//! | `Cancel` | none | `touchcancel`, touch takeover |

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which input system produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputSource {
    Mouse,
    Touch,
}

/// Why a gesture was canceled rather than ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelReason {
    /// The OS interrupted the touch sequence.
    TouchCancel,
    /// The host tore the grid down (date change, unmount, blur).
    Programmatic,
}

/// Gesture lifecycle signal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GestureEventKind {
    /// Pointer pressed on slot `index`.
    Start { index: usize, client_y: f64 },
    /// Pointer is over slot `index`; `relative_offset` is the signed position
    /// within that slot in `[-1, 1]`.
    Move {
        index: usize,
        client_y: f64,
        relative_offset: f64,
    },
    /// Pointer released inside the grid.
    End,
    /// Document-level release; forces the gesture to finish wherever the
    /// pointer is.
    Release,
    Cancel { reason: CancelReason },
}

/// One normalized input event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GestureEvent {
    /// Monotonic per-adapter sequence number, starting at 1.
    pub sequence: u64,
    pub source: InputSource,
    pub kind: GestureEventKind,
}

impl GestureEvent {
    #[must_use]
    pub const fn new(sequence: u64, source: InputSource, kind: GestureEventKind) -> Self {
        Self {
            sequence,
            source,
            kind,
        }
    }

    /// Check structural validity.
    pub fn validate(&self) -> Result<(), GestureEventError> {
        if self.sequence == 0 {
            return Err(GestureEventError::ZeroSequence);
        }
        match self.kind {
            GestureEventKind::Start { client_y, .. } if !client_y.is_finite() => {
                Err(GestureEventError::NonFiniteCoordinate)
            }
            GestureEventKind::Move {
                client_y,
                relative_offset,
                ..
            } if !client_y.is_finite() || !relative_offset.is_finite() => {
                Err(GestureEventError::NonFiniteCoordinate)
            }
            _ => Ok(()),
        }
    }
}

/// Structural problems with a [`GestureEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureEventError {
    ZeroSequence,
    NonFiniteCoordinate,
}

impl fmt::Display for GestureEventError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroSequence => write!(f, "gesture event sequence must be > 0"),
            Self::NonFiniteCoordinate => write!(f, "gesture event carries a non-finite coordinate"),
        }
    }
}

impl std::error::Error for GestureEventError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_sequence_is_invalid() {
        let event = GestureEvent::new(0, InputSource::Mouse, GestureEventKind::End);
        assert_eq!(event.validate(), Err(GestureEventError::ZeroSequence));
    }

    #[test]
    fn nan_coordinates_are_invalid() {
        let start = GestureEvent::new(
            1,
            InputSource::Touch,
            GestureEventKind::Start {
                index: 0,
                client_y: f64::NAN,
            },
        );
        assert_eq!(start.validate(), Err(GestureEventError::NonFiniteCoordinate));

        let mv = GestureEvent::new(
            2,
            InputSource::Mouse,
            GestureEventKind::Move {
                index: 0,
                client_y: 10.0,
                relative_offset: f64::INFINITY,
            },
        );
        assert_eq!(mv.validate(), Err(GestureEventError::NonFiniteCoordinate));
    }

    #[test]
    fn serializes_with_kind_tag() {
        let event = GestureEvent::new(
            3,
            InputSource::Touch,
            GestureEventKind::Cancel {
                reason: CancelReason::TouchCancel,
            },
        );
        let json = serde_json::to_string(&event).expect("serializable");
        assert_eq!(
            json,
            r#"{"sequence":3,"source":"touch","kind":{"kind":"cancel","reason":"touch_cancel"}}"#
        );
    }
}
