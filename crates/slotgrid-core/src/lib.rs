#![forbid(unsafe_code)]

//! Core: slot registry, hit-testing, and the drag/tap gesture machine.
//!
//! # Role in SlotGrid
//! `slotgrid-core` is the interaction kernel of a group-scheduling time
//! table. It owns the ordered slot sequence of one date, interprets a
//! normalized gesture stream into selection changes, and computes the
//! elastic drag feedback. It knows nothing about meetings, storage or the
//! DOM.
//!
//! # Primary responsibilities
//! - **SlotRegistry**: slot generation, toggle, range painting, availability merge.
//! - **SpatialIndex**: point → slot lookup and sub-slot offsets, queried lazily.
//! - **GestureMachine**: tap vs. drag-paint vs. drag-erase, mouse/touch lockout.
//! - **Feedback**: per-slot elastic transform.
//! - **Layout**: hour rows and column split.
//!
//! # How it fits in the system
//! `slotgrid-web` translates browser callbacks into [`event::GestureEvent`]s
//! and feeds them to the machine; the `slotgrid` facade composes everything
//! into a `TimeTable` with availability loading.

pub mod availability;
pub mod config;
pub mod event;
pub mod feedback;
pub mod geometry;
pub mod gesture;
pub mod layout;
pub mod slot;
pub mod spatial;

pub use availability::{
    AvailabilityRecord, LoadSequencer, LoadTicket, MergeReport, SelectionRecord,
};
pub use config::{ConfigError, GesturePolicyConfig, GridConfig};
pub use event::{CancelReason, GestureEvent, GestureEventError, GestureEventKind, InputSource};
pub use feedback::{SlotTransform, TransitionSpec, slot_transform};
pub use geometry::ClientRect;
pub use gesture::{
    BrushKind, DragDirection, GestureConfig, GestureEffect, GestureMachine, GestureMode,
    GestureNoopReason, GestureState, GestureStep, GestureTransition,
};
pub use layout::{HourGroup, hour_groups, split_columns};
pub use slot::{DisplayLocale, SlotError, SlotRegistry, TimeSlot};
pub use spatial::{BoundsProvider, SpatialIndex};
