//! Selection store
//!
//! Single source of truth for which location the analyst is looking at.

use crate::constants::map::{DEFAULT_CENTER_LAT, DEFAULT_CENTER_LNG, DEFAULT_ZOOM, SELECTED_ZOOM};
use crate::model::{Coordinates, Location};
use serde::{Deserialize, Serialize};

/// Identifies the selection a request was issued for
///
/// The generation changes on every select and clear, so a result issued for
/// an earlier selection of the same location id never matches.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ticket {
    pub location_id: String,
    pub generation: u64,
}

/// Map centre and zoom
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub center: Coordinates,
    pub zoom: u8,
}

impl Viewport {
    /// Viewport for the given selection
    pub fn for_selection(location: Option<&Location>) -> Self {
        match location {
            Some(loc) => Self {
                center: loc.coordinates(),
                zoom: SELECTED_ZOOM,
            },
            None => Self::default(),
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            center: Coordinates::new(DEFAULT_CENTER_LAT, DEFAULT_CENTER_LNG),
            zoom: DEFAULT_ZOOM,
        }
    }
}

/// Active location and the stores shown on the map
#[derive(Debug, Default)]
pub struct SelectionStore {
    active: Option<Location>,
    stores: Vec<Location>,
    generation: u64,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `location` the active one and return its ticket
    pub fn select(&mut self, location: Location) -> Ticket {
        self.generation += 1;
        let ticket = Ticket {
            location_id: location.id.clone(),
            generation: self.generation,
        };
        self.active = Some(location);
        ticket
    }

    /// Drop the selection and the displayed store markers
    pub fn clear(&mut self) {
        self.generation += 1;
        self.active = None;
        self.stores.clear();
    }

    pub fn set_stores(&mut self, stores: Vec<Location>) {
        self.stores = stores;
    }

    pub fn active(&self) -> Option<&Location> {
        self.active.as_ref()
    }

    pub fn stores(&self) -> &[Location] {
        &self.stores
    }

    /// Ticket of the current selection, if any
    pub fn ticket(&self) -> Option<Ticket> {
        self.active.as_ref().map(|loc| Ticket {
            location_id: loc.id.clone(),
            generation: self.generation,
        })
    }

    /// Whether a result issued under `ticket` may still be applied
    pub fn is_current(&self, ticket: &Ticket) -> bool {
        self.generation == ticket.generation
            && self
                .active
                .as_ref()
                .is_some_and(|loc| loc.id == ticket.location_id)
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::for_selection(self.active.as_ref())
    }
}
