#![forbid(unsafe_code)]

//! SlotGrid public facade and prelude.
//!
//! SlotGrid is the interaction kernel of a group-scheduling poll: a grid of
//! half-hour slots on which an invitee taps to toggle and drags to paint or
//! erase, with mouse and touch behind one gesture vocabulary.
//!
//! [`TimeTable`] is the composition root a host embeds; the `core` and `web`
//! crates are re-exported for finer-grained use, and [`prelude`] gathers the
//! day-to-day names.

pub mod error;
pub mod time_table;

// --- Core re-exports -------------------------------------------------------

pub use slotgrid_core::{
    AvailabilityRecord, ClientRect, DisplayLocale, GestureConfig, GridConfig, LoadTicket,
    MergeReport, SelectionRecord, SlotRegistry, SlotTransform, TimeSlot,
};

// --- Web re-exports --------------------------------------------------------

pub use slotgrid_web::{
    AvailabilitySource, LoadError, ParticipantSubmission, SaveError, SelectionSink,
    SlotInputDispatch, SlotInputLogOutcome, TouchPoint,
};

// --- Facade ----------------------------------------------------------------

pub use error::{DegradationAction, Error, Result};
pub use time_table::{HourRowView, LoadOutcome, SlotInput, SlotView, TableView, TimeTable};

pub mod prelude {
    pub use crate::{
        AvailabilityRecord, AvailabilitySource, ClientRect, DegradationAction, Error, GridConfig,
        LoadOutcome, Result, SelectionSink, SlotInput, TimeTable, TouchPoint,
    };

    pub use crate::{core, web};
}

pub use slotgrid_core as core;
pub use slotgrid_web as web;
