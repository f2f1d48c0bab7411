//! Shared, reference-counted ownership of a single resource

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, error, info, warn};

use crate::resource::Resource;

/// What a call to [`ManagedResource::close`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    /// Count decremented; other attachments keep the resource alive
    Detached { remaining: usize },
    /// Count reached zero and the resource was physically closed
    Released,
    /// Count reached zero but the physical close failed (logged)
    ReleaseFailed,
    /// Count was already zero; nothing happened
    AlreadyReleased,
}

impl CloseOutcome {
    /// Whether this call observed the zero transition
    #[must_use]
    pub fn reached_zero(self) -> bool {
        matches!(self, Self::Released | Self::ReleaseFailed)
    }
}

/// Thread-safe reference-counting wrapper around one [`Resource`].
///
/// The count starts at 1. [`reference`](Self::reference) adds one,
/// [`close`](Self::close) removes one, and the wrapped resource is closed on
/// the single call that takes the count from 1 to 0.
pub struct ManagedResource {
    name: Option<String>,
    count: AtomicUsize,
    resource: Mutex<Option<Box<dyn Resource>>>,
}

impl ManagedResource {
    /// Wrap a resource with a count of 1
    #[must_use]
    pub fn new(resource: Box<dyn Resource>) -> Arc<Self> {
        let name = resource.name().map(str::to_owned);
        debug!(name = ?name, "managing resource");
        Arc::new(Self {
            name,
            count: AtomicUsize::new(1),
            resource: Mutex::new(Some(resource)),
        })
    }

    /// Add one attachment and hand back the same wrapper
    #[must_use]
    pub fn reference(self: &Arc<Self>) -> Arc<Self> {
        let previous = self.count.fetch_add(1, Ordering::AcqRel);
        debug_assert_ne!(previous, 0, "referenced a released resource");
        debug!(name = ?self.name, count = previous + 1, "resource referenced");
        Arc::clone(self)
    }

    /// Remove one attachment, closing the resource if it was the last.
    ///
    /// Close failures are logged and reported as [`CloseOutcome::ReleaseFailed`];
    /// the decrement has happened either way.
    pub fn close(&self) -> CloseOutcome {
        let previous = self
            .count
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));

        match previous {
            Err(_) => {
                debug!(name = ?self.name, "close on released resource ignored");
                CloseOutcome::AlreadyReleased
            }
            Ok(1) => self.release(),
            Ok(n) => {
                debug!(name = ?self.name, remaining = n - 1, "resource detached");
                CloseOutcome::Detached { remaining: n - 1 }
            }
        }
    }

    /// Name of the wrapped resource, if it has one
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Current number of attachments
    #[must_use]
    pub fn ref_count(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }

    /// Whether the physical close has already run
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.slot().is_none()
    }

    fn slot(&self) -> MutexGuard<'_, Option<Box<dyn Resource>>> {
        self.resource.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn release(&self) -> CloseOutcome {
        // Only the caller that observed 1 -> 0 gets here, so the slot is full.
        let Some(mut resource) = self.slot().take() else {
            return CloseOutcome::AlreadyReleased;
        };

        match resource.close() {
            Ok(()) => {
                info!(name = ?self.name, "resource released");
                CloseOutcome::Released
            }
            Err(e) => {
                error!(name = ?self.name, error = %e, "failed to close resource");
                CloseOutcome::ReleaseFailed
            }
        }
    }
}

impl Drop for ManagedResource {
    fn drop(&mut self) {
        let slot = self
            .resource
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(mut resource) = slot.take() {
            warn!(
                name = ?self.name,
                count = *self.count.get_mut(),
                "resource dropped without release, closing"
            );
            if let Err(e) = resource.close() {
                error!(name = ?self.name, error = %e, "failed to close leaked resource");
            }
        }
    }
}

impl fmt::Debug for ManagedResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagedResource")
            .field("name", &self.name)
            .field("count", &self.ref_count())
            .finish_non_exhaustive()
    }
}
