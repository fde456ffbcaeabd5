use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

use crate::models::FilterState;

/// Notification that the shared filter state changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FiltersChanged {
    /// Increments on every effective change
    pub revision: u64,
}

#[derive(Debug, Default)]
struct Current {
    state: FilterState,
    revision: u64,
}

/// Shared filter state with a "filters changed" broadcast
///
/// Consumers subscribe, and on each notification re-read [`FilterBus::current`]
/// and re-translate. Setting a state whose canonical content matches the
/// current one does not notify.
#[derive(Debug, Clone)]
pub struct FilterBus {
    current: Arc<RwLock<Current>>,
    sender: broadcast::Sender<FiltersChanged>,
}

impl FilterBus {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            current: Arc::new(RwLock::new(Current::default())),
            sender,
        }
    }

    #[must_use]
    pub fn current(&self) -> FilterState {
        self.current.read().state.clone()
    }

    #[must_use]
    pub fn revision(&self) -> u64 {
        self.current.read().revision
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<FiltersChanged> {
        self.sender.subscribe()
    }

    /// Replace the filter state. Returns whether anything changed.
    pub fn set(&self, state: FilterState) -> bool {
        let revision = {
            let mut current = self.current.write();
            if current.state.normalize() == state.normalize() {
                current.state = state;
                return false;
            }
            current.state = state;
            current.revision += 1;
            current.revision
        };

        debug!(revision, "Filters changed");
        // Nobody listening is fine
        let _ = self.sender.send(FiltersChanged { revision });
        true
    }

    /// Edit the current state in place.
    pub fn update(&self, edit: impl FnOnce(&mut FilterState)) -> bool {
        let mut state = self.current();
        edit(&mut state);
        self.set(state)
    }

    pub fn reset(&self) -> bool {
        self.set(FilterState::default())
    }
}

impl Default for FilterBus {
    fn default() -> Self {
        Self::new(64)
    }
}
