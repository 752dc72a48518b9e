#![forbid(unsafe_code)]

//! SlotGrid error model and graceful degradation.
//!
//! # Design Principles
//!
//! 1. **Result at the edges**: setup and persistence return `Result`; the
//!    input path never fails, it answers with no-op dispatches.
//! 2. **Domain-specific errors**: each crate owns its typed error and this
//!    module only aggregates them.
//! 3. **Graceful degradation**: every variant maps to a [`DegradationAction`]
//!    that tells the host how to keep the poll usable.

use std::fmt;

use slotgrid_core::{ConfigError, SlotError};
use slotgrid_web::{LoadError, SaveError};

// ── Unified Error ───────────────────────────────────────────────────────

/// Top-level error type for SlotGrid hosts.
#[derive(Debug)]
pub enum Error {
    /// Slot registry rejected an operation or its bounds.
    Slot(SlotError),
    /// Configuration could not be read or is invalid.
    Config(ConfigError),
    /// Availability could not be loaded.
    Load(LoadError),
    /// The selection could not be stored.
    Save(SaveError),
}

/// Standard result type for SlotGrid APIs.
pub type Result<T> = std::result::Result<T, Error>;

// ── Graceful Degradation ────────────────────────────────────────────────

/// What the host should do when an error occurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegradationAction {
    /// Keep the all-unselected defaults and stay interactive.
    KeepDefaults,
    /// Drop the operation; nothing changed.
    Ignore,
    /// Keep the local selection and offer to submit again.
    RetrySave,
    /// The grid cannot be built or the submission can never succeed.
    Abort,
}

impl Error {
    /// Determine the graceful degradation action for this error.
    #[must_use]
    pub fn degradation(&self) -> DegradationAction {
        match self {
            Self::Slot(SlotError::Configuration { .. }) => DegradationAction::Abort,
            Self::Slot(
                SlotError::IndexOutOfRange { .. }
                | SlotError::SnapshotLength { .. }
                | SlotError::Unavailable { .. },
            ) => DegradationAction::Ignore,

            Self::Config(_) => DegradationAction::Abort,

            Self::Load(LoadError::Transport(_) | LoadError::Malformed(_)) => {
                DegradationAction::KeepDefaults
            }

            // Nothing left the process on an encoding failure; the local
            // selection is intact.
            Self::Save(SaveError::Transport(_) | SaveError::Encode(_)) => {
                DegradationAction::RetrySave
            }
            Self::Save(SaveError::Rejected(_)) => DegradationAction::Abort,
        }
    }

    /// Error type label for tracing fields.
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Slot(_) => "slot",
            Self::Config(_) => "config",
            Self::Load(_) => "load",
            Self::Save(_) => "save",
        }
    }

    /// Whether the poll stays usable after this error.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        !matches!(self.degradation(), DegradationAction::Abort)
    }
}

// ── Display ─────────────────────────────────────────────────────────────

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Slot(err) => write!(f, "{err}"),
            Self::Config(err) => write!(f, "config: {err}"),
            Self::Load(err) => write!(f, "{err}"),
            Self::Save(err) => write!(f, "{err}"),
        }
    }
}

impl fmt::Display for DegradationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeepDefaults => write!(f, "keep_defaults"),
            Self::Ignore => write!(f, "ignore"),
            Self::RetrySave => write!(f, "retry_save"),
            Self::Abort => write!(f, "abort"),
        }
    }
}

// ── std::error::Error ───────────────────────────────────────────────────

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Slot(err) => Some(err),
            Self::Config(err) => Some(err),
            Self::Load(err) => Some(err),
            Self::Save(err) => Some(err),
        }
    }
}

// ── From conversions ────────────────────────────────────────────────────

impl From<SlotError> for Error {
    fn from(err: SlotError) -> Self {
        Self::Slot(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<LoadError> for Error {
    fn from(err: LoadError) -> Self {
        Self::Load(err)
    }
}

impl From<SaveError> for Error {
    fn from(err: SaveError) -> Self {
        Self::Save(err)
    }
}

// ── Tests ───────────────────────────────────────────────────────────────
