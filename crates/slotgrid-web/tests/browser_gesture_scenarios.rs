#![forbid(unsafe_code)]

//! End-to-end selection scenarios driven through the browser lifecycle
//! adapter, the way a DOM host would call it.
//!
//! Run:
//!   cargo test -p slotgrid-web --test browser_gesture_scenarios

use std::time::Duration;

use pretty_assertions::assert_eq;
use slotgrid_core::{ClientRect, GestureConfig, SlotRegistry};
use slotgrid_web::{
    SlotInputAdapter, SlotInputIgnoredReason, SlotInputLifecyclePhase, SlotInputLogEntry,
    SlotInputLogOutcome, TouchPoint,
};
use web_time::Instant;

const SLOT_HEIGHT: f64 = 32.0;
const COLUMN_WIDTH: f64 = 160.0;

/// Two columns of 14 slots, the default 09:00-22:30 grid.
fn grid() -> SlotInputAdapter {
    let registry = SlotRegistry::initialize(9, 22, 30).expect("default bounds");
    let mut adapter = SlotInputAdapter::new(registry, GestureConfig::default());
    for i in 0..28 {
        let (column, row) = (i / 14, i % 14);
        adapter.spatial_mut().register_slot_element(
            i,
            ClientRect::new(
                column as f64 * COLUMN_WIDTH,
                row as f64 * SLOT_HEIGHT,
                COLUMN_WIDTH - 8.0,
                SLOT_HEIGHT - 2.0,
            ),
        )
        .expect("slot in range");
    }
    adapter
}

fn y_of(index: usize) -> f64 {
    (index % 14) as f64 * SLOT_HEIGHT + SLOT_HEIGHT / 2.0
}

fn finger_on(index: usize) -> [TouchPoint; 1] {
    [TouchPoint::new(
        (index / 14) as f64 * COLUMN_WIDTH + 20.0,
        y_of(index),
    )]
}

fn selected(adapter: &SlotInputAdapter) -> Vec<&str> {
    adapter.registry().selected_times()
}

#[test]
fn click_toggles_one_slot() {
    let mut grid = grid();
    let now = Instant::now();
    grid.mouse_down(4, y_of(4), now);
    grid.mouse_up(now);
    grid.document_mouse_up(now);
    assert_eq!(selected(&grid), ["11:00"]);

    grid.mouse_down(4, y_of(4), now);
    grid.mouse_up(now);
    assert!(selected(&grid).is_empty());
}

#[test]
fn drag_paints_and_shrinks() {
    let mut grid = grid();
    let now = Instant::now();
    grid.mouse_down(5, y_of(5), now);
    for i in 6..=8 {
        grid.mouse_enter(i, y_of(i), now);
    }
    assert_eq!(selected(&grid), ["11:30", "12:00", "12:30", "13:00"]);

    grid.mouse_enter(7, y_of(7), now);
    grid.mouse_enter(6, y_of(6), now);
    grid.mouse_up(now);
    assert_eq!(selected(&grid), ["11:30", "12:00"]);
}

#[test]
fn erase_drag_clears_mixed_range() {
    let mut grid = grid();
    let now = Instant::now();
    for i in [2, 4] {
        grid.mouse_down(i, y_of(i), now);
        grid.mouse_up(now);
    }
    grid.mouse_down(2, y_of(2), now);
    for i in 3..=5 {
        grid.mouse_enter(i, y_of(i), now);
    }
    grid.mouse_up(now);
    assert!(selected(&grid).is_empty());
}

#[test]
fn release_outside_grid_ends_drag() {
    let mut grid = grid();
    let now = Instant::now();
    grid.mouse_down(2, y_of(2), now);
    grid.mouse_enter(3, y_of(3), now);
    grid.mouse_enter(4, y_of(4), now);
    let release = grid.document_mouse_up(now);
    assert!(release.is_forwarded());
    assert!(!grid.is_active());

    for i in 5..10 {
        let hover = grid.mouse_enter(i, y_of(i), now);
        assert!(!hover.is_forwarded());
    }
    assert_eq!(selected(&grid), ["10:00", "10:30", "11:00"]);
}

#[test]
fn touch_drag_crosses_columns_by_hit_test() {
    let mut grid = grid();
    let now = Instant::now();
    grid.touch_start(12, &finger_on(12), now);
    grid.touch_move(&finger_on(13), now);
    let dispatch = grid.touch_move(&finger_on(15), now);
    assert_eq!(dispatch.log.index, Some(15));
    grid.touch_end(now);
    assert_eq!(selected(&grid), ["15:00", "15:30", "16:00", "16:30"]);
}

#[test]
fn mouse_is_ignored_until_touch_cooldown_expires() {
    let mut grid = grid();
    let t0 = Instant::now();
    grid.touch_start(0, &finger_on(0), t0);
    grid.touch_end(t0);

    // Compatibility mouse events the browser fires after a tap.
    let synthetic = t0 + Duration::from_millis(40);
    let down = grid.mouse_down(0, y_of(0), synthetic);
    grid.mouse_up(synthetic);
    assert!(matches!(
        down.log.outcome,
        SlotInputLogOutcome::Ignored(SlotInputIgnoredReason::MachineNoop(_))
    ));
    assert_eq!(selected(&grid), ["09:00"]);

    let later = t0 + Duration::from_millis(501);
    grid.mouse_down(1, y_of(1), later);
    grid.mouse_up(later);
    assert_eq!(selected(&grid), ["09:00", "09:30"]);
}

#[test]
fn touch_cancel_keeps_partial_range() {
    let mut grid = grid();
    let now = Instant::now();
    grid.touch_start(1, &finger_on(1), now);
    grid.touch_move(&finger_on(3), now);
    grid.touch_cancel(now);
    assert!(!grid.is_active());
    assert_eq!(selected(&grid), ["09:30", "10:00", "10:30"]);
}

#[test]
fn replayed_callback_stream_is_deterministic() {
    fn run() -> (Vec<SlotInputLogEntry>, Vec<String>) {
        let mut grid = grid();
        let t0 = Instant::now();
        let mut log = Vec::new();
        log.push(grid.mouse_down(3, y_of(3), t0).log);
        log.push(grid.mouse_move(3, y_of(3) + 4.0, t0).log);
        log.push(grid.mouse_enter(5, y_of(5), t0).log);
        log.push(grid.mouse_move(9, y_of(9), t0).log);
        log.push(grid.document_mouse_up(t0).log);
        log.push(grid.touch_start(20, &finger_on(20), t0).log);
        log.push(grid.touch_move(&[TouchPoint::new(1000.0, 5.0)], t0).log);
        log.push(grid.touch_move(&finger_on(18), t0).log);
        log.push(grid.touch_end(t0).log);
        let times = selected(&grid).into_iter().map(str::to_owned).collect();
        (log, times)
    }

    let (first_log, first_times) = run();
    let (second_log, second_times) = run();
    assert_eq!(first_log, second_log);
    assert_eq!(first_times, second_times);

    let phases: Vec<_> = first_log.iter().map(|entry| entry.phase).collect();
    assert_eq!(phases[3], SlotInputLifecyclePhase::MouseMove);
    assert_eq!(
        first_log[3].outcome,
        SlotInputLogOutcome::Ignored(SlotInputIgnoredReason::NotCurrentSlot)
    );
    assert_eq!(
        first_log[6].outcome,
        SlotInputLogOutcome::Ignored(SlotInputIgnoredReason::NoSlotUnderPoint)
    );
    // Only forwarded callbacks consume a sequence number.
    let sequences: Vec<_> = first_log.iter().filter_map(|entry| entry.sequence).collect();
    assert_eq!(sequences, [1, 2, 3, 4, 5, 6, 7]);
    assert_eq!(
        first_times,
        [
            "10:30", "11:00", "11:30", "18:00", "18:30", "19:00"
        ]
    );
}
