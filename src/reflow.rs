use std::collections::BTreeSet;

use tracing::trace;

/// Host-supplied size observation primitive (a ResizeObserver analog). The
/// host is expected to deliver coalesced change notifications by calling
/// [`crate::engine::TreeViewEngine::notify_resized`]; one callback already
/// covers a whole burst, so the engine adds no debouncing of its own.
pub trait SizeObserver {
    /// Starts watching the elements rendered for `id`.
    fn observe(&mut self, id: &str);
    /// Stops watching the elements rendered for `id`.
    fn unobserve(&mut self, id: &str);
    /// Releases every handle held by the primitive.
    fn disconnect(&mut self);
}

/// Tracks which node ids are currently observed and reconciles that set
/// against the visible rows after each structural change. Re-observing a
/// still-observed id is a no-op, and ids that leave the visible set are
/// released before their elements unmount.
#[derive(Debug, Default)]
pub struct ObservationRegistry {
    observed: BTreeSet<String>,
}

impl ObservationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observed(&self) -> &BTreeSet<String> {
        &self.observed
    }

    pub fn sync(&mut self, desired: &BTreeSet<String>, observer: &mut dyn SizeObserver) {
        for id in self.observed.difference(desired) {
            trace!(node = id.as_str(), "releasing size observation");
            observer.unobserve(id);
        }
        for id in desired.difference(&self.observed) {
            trace!(node = id.as_str(), "establishing size observation");
            observer.observe(id);
        }
        self.observed = desired.clone();
    }

    pub fn release(&mut self, observer: &mut dyn SizeObserver) {
        for id in &self.observed {
            observer.unobserve(id);
        }
        observer.disconnect();
        self.observed.clear();
    }
}
