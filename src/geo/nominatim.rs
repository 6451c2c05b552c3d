//! Nominatim place lookup (OpenStreetMap)
//!
//! Uses the free Nominatim API.
//! Rate limit: 1 request per second; a User-Agent is mandatory.

use crate::config::Config;
use crate::constants::api::{NOMINATIM_URL, USER_AGENT};
use crate::error::{Error, Result};
use crate::geo::{Place, PlaceLookup};
use crate::model::Coordinates;
use serde::Deserialize;

/// Nominatim lookup backend
#[derive(Debug, Clone)]
pub struct NominatimBackend {
    client: reqwest::Client,
    base_url: String,
}

/// Nominatim `jsonv2` search result
#[derive(Debug, Deserialize)]
struct NominatimResult {
    place_id: u64,
    lat: Option<String>,
    lon: Option<String>,
    #[serde(default)]
    name: Option<String>,
    display_name: String,
}

impl NominatimBackend {
    /// Create a backend for the public Nominatim instance
    pub fn new() -> Result<Self> {
        Self::with_url(NOMINATIM_URL, USER_AGENT)
    }

    /// Create a backend for a specific Nominatim instance
    pub fn with_url(base_url: &str, user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| Error::Geocoding(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create a backend from the `[geocoder]` config section
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::with_url(&config.geocoder.url, &config.geocoder.user_agent)
    }

    /// Parse lat/lng strings to coordinates
    fn parse_coords(lat: &str, lng: &str) -> Result<Coordinates> {
        let lat: f64 = lat
            .parse()
            .map_err(|_| Error::Geocoding(format!("Invalid latitude: {}", lat)))?;
        let lng: f64 = lng
            .parse()
            .map_err(|_| Error::Geocoding(format!("Invalid longitude: {}", lng)))?;
        Ok(Coordinates::new(lat, lng))
    }

    fn into_place(result: NominatimResult) -> Result<Place> {
        let coordinates = match (&result.lat, &result.lon) {
            (Some(lat), Some(lon)) => Some(Self::parse_coords(lat, lon)?),
            _ => None,
        };

        // Unnamed results (plain addresses) fall back to the first address part
        let name = result
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| {
                result
                    .display_name
                    .split(',')
                    .next()
                    .unwrap_or_default()
                    .trim()
                    .to_string()
            });

        Ok(Place {
            place_id: format!("osm:{}", result.place_id),
            name,
            formatted_address: result.display_name,
            coordinates,
        })
    }
}

impl PlaceLookup for NominatimBackend {
    async fn search(&self, query: &str) -> Result<Option<Place>> {
        let url = format!(
            "{}/search?q={}&format=jsonv2&limit=1",
            self.base_url,
            urlencoding::encode(query)
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Geocoding(format!("Nominatim request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Geocoding(format!(
                "Nominatim returned status: {}",
                response.status()
            )));
        }

        let results: Vec<NominatimResult> = response
            .json()
            .await
            .map_err(|e| Error::Geocoding(format!("Failed to parse Nominatim response: {}", e)))?;

        results.into_iter().next().map(Self::into_place).transpose()
    }
}
