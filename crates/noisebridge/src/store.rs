//! Shared store for the reconciled device state.

use parking_lot::RwLock;

use crate::state::{Availability, DeviceState};

/// Holds the latest reconciled device state and availability flag.
///
/// Single-writer discipline: only the bridge's inbound handlers mutate the
/// store. Readers get cloned snapshots, never a reference into the lock, so
/// a consumer can never corrupt reconciled state. Each write is atomic with
/// respect to [`StateStore::snapshot`].
#[derive(Debug, Default)]
pub struct StateStore {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    state: DeviceState,
    availability: Availability,
}

impl StateStore {
    /// Create a store with empty state and unknown availability.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored state with a merged decode result.
    pub fn apply_status(&self, state: DeviceState) {
        self.inner.write().state = state;
    }

    /// Update availability, returning whether the value changed.
    ///
    /// The last known device state is retained across Offline transitions so
    /// the host sees continuity when the device comes back.
    pub fn apply_availability(&self, availability: Availability) -> bool {
        let mut inner = self.inner.write();
        let changed = inner.availability != availability;
        inner.availability = availability;
        changed
    }

    /// Read-only copy of the current state and availability.
    pub fn snapshot(&self) -> (DeviceState, Availability) {
        let inner = self.inner.read();
        (inner.state.clone(), inner.availability)
    }
}
