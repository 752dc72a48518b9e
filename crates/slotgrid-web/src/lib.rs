#![forbid(unsafe_code)]

//! `slotgrid-web` connects a browser host to the SlotGrid interaction kernel.
//!
//! Design goals:
//! - **Host-driven I/O**: the embedding page pushes DOM callbacks and the
//!   current instant; nothing here blocks or spawns.
//! - **Deterministic dispatch**: every callback yields a structured log entry,
//!   so a recorded callback stream replays to the same selection.
//! - **Storage-agnostic**: availability and selection cross the boundary
//!   through two small traits and plain JSON records.
//!
//! This crate does not bind to `wasm-bindgen`; a host wraps
//! [`SlotInputAdapter`] with its own JS glue.

pub mod persistence;
pub mod slot_input;

pub use persistence::{
    AvailabilitySource, LoadError, ParticipantSubmission, SaveError, SelectionSink,
    parse_availability_json, selection_to_json,
};
pub use slot_input::{
    SlotInputAdapter, SlotInputDispatch, SlotInputIgnoredReason, SlotInputLifecyclePhase,
    SlotInputLogEntry, SlotInputLogOutcome, TouchPoint,
};
