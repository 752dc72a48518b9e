#![forbid(unsafe_code)]

//! Property-based tests for the browser lifecycle adapter.
//!
//! These tests verify that:
//!
//! 1. A mouse callback that lands while a touch gesture is live, or inside
//!    the cooldown after one ends, is never forwarded and never changes the
//!    selection.
//! 2. The selection only changes on forwarded dispatches.
//! 3. Sequence numbers handed to the machine strictly increase.
//! 4. `touchmove` asks the host to prevent scrolling exactly while a touch
//!    gesture is live.
//! 5. A touch tap followed by the browser's synthetic click inside the
//!    cooldown flips the slot once, not twice.
//!
//! Run:
//!   cargo test -p slotgrid-web --test proptest_callback_streams

use std::time::Duration;

use proptest::prelude::*;
use slotgrid_core::{ClientRect, GestureConfig, InputSource, SlotRegistry};
use slotgrid_web::{SlotInputAdapter, SlotInputDispatch, TouchPoint};
use web_time::Instant;

const SLOTS: usize = 28;
const SLOT_HEIGHT: f64 = 40.0;
const COOLDOWN: Duration = Duration::from_millis(500);

// ── Helpers ─────────────────────────────────────────────────────────────

fn adapter(selection: &[bool]) -> SlotInputAdapter {
    let mut registry = SlotRegistry::initialize(9, 22, 30).expect("default bounds");
    registry.restore(selection).expect("matching length");
    let config = GestureConfig {
        touch_cooldown: COOLDOWN,
    };
    let mut adapter = SlotInputAdapter::new(registry, config);
    for i in 0..SLOTS {
        adapter
            .spatial_mut()
            .register_slot_element(
                i,
                ClientRect::new(0.0, i as f64 * SLOT_HEIGHT, 100.0, SLOT_HEIGHT - 2.0),
            )
            .expect("slot in range");
    }
    adapter
}

fn finger_at(y: f64) -> [TouchPoint; 1] {
    [TouchPoint::new(20.0, y)]
}

fn center_of(index: usize) -> f64 {
    index as f64 * SLOT_HEIGHT + SLOT_HEIGHT / 2.0
}

#[derive(Debug, Clone, Copy)]
enum Callback {
    MouseDown(usize),
    MouseEnter(usize),
    MouseMove(usize),
    MouseUp,
    DocumentMouseUp,
    TouchStart(usize),
    TouchMove(f64),
    TouchEnd,
    TouchCancel,
    Teardown,
}

impl Callback {
    const fn is_mouse(self) -> bool {
        matches!(
            self,
            Self::MouseDown(_)
                | Self::MouseEnter(_)
                | Self::MouseMove(_)
                | Self::MouseUp
                | Self::DocumentMouseUp
        )
    }
}

fn callback() -> impl Strategy<Value = Callback> {
    // Indices run past the grid so stray callbacks are exercised too.
    prop_oneof![
        (0usize..32).prop_map(Callback::MouseDown),
        (0usize..32).prop_map(Callback::MouseEnter),
        (0usize..32).prop_map(Callback::MouseMove),
        Just(Callback::MouseUp),
        Just(Callback::DocumentMouseUp),
        (0usize..32).prop_map(Callback::TouchStart),
        (-20.0f64..1200.0).prop_map(Callback::TouchMove),
        Just(Callback::TouchEnd),
        Just(Callback::TouchCancel),
        Just(Callback::Teardown),
    ]
}

/// Callbacks separated by 0-300ms, so some land inside the cooldown and
/// some after it.
fn stream() -> impl Strategy<Value = Vec<(Callback, u64)>> {
    proptest::collection::vec((callback(), 0u64..300), 1..60)
}

fn dispatch(adapter: &mut SlotInputAdapter, cb: Callback, now: Instant) -> SlotInputDispatch {
    match cb {
        Callback::MouseDown(i) => adapter.mouse_down(i, center_of(i), now),
        Callback::MouseEnter(i) => adapter.mouse_enter(i, center_of(i), now),
        Callback::MouseMove(i) => adapter.mouse_move(i, center_of(i), now),
        Callback::MouseUp => adapter.mouse_up(now),
        Callback::DocumentMouseUp => adapter.document_mouse_up(now),
        Callback::TouchStart(i) => adapter.touch_start(i, &finger_at(center_of(i)), now),
        Callback::TouchMove(y) => adapter.touch_move(&finger_at(y), now),
        Callback::TouchEnd => adapter.touch_end(now),
        Callback::TouchCancel => adapter.touch_cancel(now),
        Callback::Teardown => adapter.teardown(),
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 1-4. Random callback streams
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn callback_streams_respect_touch_lockout(
        selection in proptest::collection::vec(any::<bool>(), SLOTS),
        stream in stream(),
    ) {
        let mut adapter = adapter(&selection);
        let base = Instant::now();
        let mut elapsed = Duration::ZERO;
        let mut lock_until: Option<Instant> = None;
        let mut last_sequence: Option<u64> = None;

        for (cb, gap_ms) in stream {
            elapsed += Duration::from_millis(gap_ms);
            let now = base + elapsed;
            let state = adapter.gesture_state();
            let touch_live = state.is_active() && state.pointer_source() == Some(InputSource::Touch);
            let before = adapter.registry().selection_vector();

            let d = dispatch(&mut adapter, cb, now);
            let after = adapter.registry().selection_vector();

            if cb.is_mouse() && (touch_live || lock_until.is_some_and(|until| now < until)) {
                prop_assert!(!d.is_forwarded(), "{cb:?} forwarded during lockout");
                prop_assert_eq!(&after, &before);
            }
            if !d.is_forwarded() {
                prop_assert_eq!(&after, &before, "{:?} ignored but mutated", cb);
            }
            if let Some(event) = d.gesture_event {
                if let Some(last) = last_sequence {
                    prop_assert!(event.sequence > last);
                }
                last_sequence = Some(event.sequence);
            }
            if let Callback::TouchMove(_) = cb {
                prop_assert_eq!(d.prevent_default, touch_live);
            }

            match cb {
                Callback::TouchStart(_) if d.is_forwarded() => lock_until = None,
                Callback::TouchEnd | Callback::TouchCancel if touch_live => {
                    lock_until = Some(now + COOLDOWN);
                }
                _ => {}
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Tap then synthetic click
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn synthetic_click_after_touch_tap_flips_once(
        selection in proptest::collection::vec(any::<bool>(), SLOTS),
        slot in 0usize..SLOTS,
        delay_ms in 0u64..500,
    ) {
        let mut adapter = adapter(&selection);
        let t0 = Instant::now();
        adapter.touch_start(slot, &finger_at(center_of(slot)), t0);
        adapter.touch_end(t0);

        let click = t0 + Duration::from_millis(delay_ms);
        prop_assert!(!adapter.mouse_down(slot, center_of(slot), click).is_forwarded());
        prop_assert!(!adapter.mouse_up(click).is_forwarded());

        let mut expected = selection.clone();
        expected[slot] = !expected[slot];
        prop_assert_eq!(adapter.registry().selection_vector(), expected);
    }
}
