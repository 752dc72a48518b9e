#![forbid(unsafe_code)]

//! Slot position tracker for touch hit-testing and sub-slot offsets.
//!
//! Touch input has no per-element enter/leave events, so the slot under a
//! moving finger is found by point query. [`SpatialIndex`] associates each
//! slot index with a [`BoundsProvider`] that reports the element's rectangle
//! *at query time*; slot rectangles move on scroll and resize, so nothing is
//! cached between events.
//!
//! # Invariants
//!
//! 1. `hit_test` on a point outside every registered rectangle returns `None`.
//! 2. When rectangles overlap the lowest index wins, which keeps hit-testing
//!    deterministic for any registration order.
//! 3. `relative_offset` is always finite and within `[-1, 1]`.
//! 4. Capacity is fixed at construction; registering an index at or past it
//!    is rejected and never grows the index.

use std::fmt;

use crate::geometry::ClientRect;
use crate::slot::SlotError;

/// Lazily queried on-screen geometry of one slot element.
///
/// Returns `None` when the element is detached or not laid out.
pub trait BoundsProvider {
    fn client_rect(&self) -> Option<ClientRect>;
}

impl<F> BoundsProvider for F
where
    F: Fn() -> Option<ClientRect>,
{
    fn client_rect(&self) -> Option<ClientRect> {
        self()
    }
}

/// A fixed rectangle, for hosts whose layout never moves.
impl BoundsProvider for ClientRect {
    fn client_rect(&self) -> Option<ClientRect> {
        Some(*self)
    }
}

/// Index → geometry-provider association, independent of render cycles.
pub struct SpatialIndex {
    providers: Vec<Option<Box<dyn BoundsProvider>>>,
}

impl fmt::Debug for SpatialIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpatialIndex")
            .field("registered", &self.len())
            .field("capacity", &self.providers.len())
            .finish()
    }
}

impl SpatialIndex {
    /// Index with room for slot indices `0..slots`.
    #[must_use]
    pub fn with_slots(slots: usize) -> Self {
        let mut providers = Vec::with_capacity(slots);
        providers.resize_with(slots, || None);
        Self { providers }
    }

    /// Number of slot indices this index can hold.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.providers.len()
    }

    /// Associate `index` with `provider`, replacing any earlier provider.
    ///
    /// # Errors
    ///
    /// [`SlotError::IndexOutOfRange`] when `index` is not below
    /// [`capacity`](Self::capacity); nothing is stored.
    pub fn register_slot_element(
        &mut self,
        index: usize,
        provider: impl BoundsProvider + 'static,
    ) -> Result<(), SlotError> {
        let len = self.providers.len();
        let Some(entry) = self.providers.get_mut(index) else {
            tracing::warn!(index, len, "slot element ignored: index out of range");
            return Err(SlotError::IndexOutOfRange { index, len });
        };
        *entry = Some(Box::new(provider));
        Ok(())
    }

    /// Drop the provider for `index`. Returns whether one was registered.
    pub fn unregister(&mut self, index: usize) -> bool {
        self.providers
            .get_mut(index)
            .and_then(Option::take)
            .is_some()
    }

    /// Drop every provider; capacity is kept.
    pub fn clear(&mut self) {
        self.providers.iter_mut().for_each(|p| *p = None);
    }

    /// Number of registered slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.iter().filter(|p| p.is_some()).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn is_registered(&self, index: usize) -> bool {
        self.providers.get(index).is_some_and(Option::is_some)
    }

    /// Current rectangle of slot `index`, queried now.
    #[must_use]
    pub fn rect(&self, index: usize) -> Option<ClientRect> {
        self.providers
            .get(index)?
            .as_ref()?
            .client_rect()
    }

    /// Slot whose rectangle contains the client point, if any.
    #[must_use]
    pub fn hit_test(&self, client_x: f64, client_y: f64) -> Option<usize> {
        self.providers.iter().enumerate().find_map(|(index, provider)| {
            let rect = provider.as_ref()?.client_rect()?;
            rect.contains(client_x, client_y).then_some(index)
        })
    }

    /// Signed distance of `client_y` from the slot's vertical center,
    /// normalized by half the slot height and clamped to `[-1, 1]`.
    ///
    /// `-1` is the top edge, `+1` the bottom edge. Unknown slots, empty
    /// rectangles and non-finite input yield `0.0`.
    #[must_use]
    pub fn relative_offset(&self, client_y: f64, index: usize) -> f64 {
        let Some(rect) = self.rect(index) else {
            return 0.0;
        };
        if rect.is_empty() {
            return 0.0;
        }
        let relative = (client_y - rect.center_y()) / (rect.height / 2.0);
        if relative.is_finite() {
            relative.clamp(-1.0, 1.0)
        } else {
            0.0
        }
    }
}
