//! Venue registry: a lookup table from `VenueId` to the live adapter
//! instance, built once at startup and shared read-only across scan workers.

use crate::adapter::VenueAdapter;
use crate::error::VenueError;
use cryptorun_types::VenueId;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Default, Clone)]
pub struct VenueRegistry {
    adapters: HashMap<VenueId, Arc<dyn VenueAdapter>>,
}

impl VenueRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, adapter: Arc<dyn VenueAdapter>) {
        self.adapters.insert(adapter.venue_id(), adapter);
    }

    pub fn get(&self, venue: VenueId) -> Result<&Arc<dyn VenueAdapter>, VenueError> {
        self.adapters.get(&venue).ok_or_else(|| VenueError::Transport {
            venue,
            endpoint: "registry".to_string(),
            message: "no adapter registered for venue".to_string(),
        })
    }

    pub fn venues(&self) -> impl Iterator<Item = VenueId> + '_ {
        self.adapters.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}
