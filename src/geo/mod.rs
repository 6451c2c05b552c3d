//! Place lookup
//!
//! Turns a free-text query ("Home Depot, Chaska") into a place that can be
//! selected on the dashboard.

pub mod nominatim;

use crate::error::{Error, Result};
use crate::model::{Coordinates, Location};
use serde::{Deserialize, Serialize};

/// A place returned by a lookup provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    /// Provider-specific identifier
    pub place_id: String,
    pub name: String,
    pub formatted_address: String,
    /// Missing when the provider has no geometry for the place
    pub coordinates: Option<Coordinates>,
}

impl TryFrom<Place> for Location {
    type Error = Error;

    fn try_from(place: Place) -> Result<Self> {
        let coords = place
            .coordinates
            .ok_or_else(|| Error::MissingGeometry(place.name.clone()))?;
        coords.validate()?;
        Ok(Location::new(
            place.place_id,
            place.name,
            place.formatted_address,
            coords,
        ))
    }
}

/// Trait for place lookup backends
pub trait PlaceLookup: Send + Sync {
    /// Look up the best match for a query, or None if nothing matches
    fn search(&self, query: &str) -> impl std::future::Future<Output = Result<Option<Place>>> + Send;
}

/// Look up `query` and adapt the match into a Location
pub async fn locate<P: PlaceLookup>(lookup: &P, query: &str) -> Result<Location> {
    let place = lookup
        .search(query)
        .await?
        .ok_or_else(|| Error::Geocoding(format!("No place found for '{}'", query)))?;
    Location::try_from(place)
}
