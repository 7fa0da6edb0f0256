// City resolution collaborator: reverse geocoding for the location filter

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::common::EngineConfig;

/// Returned when no city can be resolved. Listing stays unfiltered.
pub const UNKNOWN_CITY: &str = "Unknown";

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("geocoding request failed: {0}")]
    Request(String),

    #[error("geocoding service answered {0}")]
    Status(u16),

    #[error("no usable locality in geocoding response")]
    NoCity,
}

/// External city-resolution boundary. Failure always degrades to
/// `UNKNOWN_CITY`; core operations never block on this collaborator.
#[async_trait]
pub trait CityResolver: Send + Sync {
    async fn resolve_city(&self, lat: f64, lon: f64) -> String;
}

/// Reverse geocoding against the Nominatim endpoint.
pub struct NominatimResolver {
    http: Client,
    endpoint: String,
    user_agent: String,
}

impl NominatimResolver {
    pub fn new(http: Client, config: &EngineConfig) -> Self {
        Self {
            http,
            endpoint: config.geocode_url.clone(),
            user_agent: config.user_agent.clone(),
        }
    }

    async fn lookup(&self, lat: f64, lon: f64) -> Result<String, GeocodeError> {
        let url = format!(
            "{}?format=json&lat={}&lon={}&zoom=10",
            self.endpoint, lat, lon
        );
        let response = self
            .http
            .get(&url)
            .header("Accept-Language", "en-US,en;q=0.9")
            .header("User-Agent", &self.user_agent)
            .send()
            .await
            .map_err(|e| GeocodeError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::Status(status.as_u16()));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| GeocodeError::Request(e.to_string()))?;
        city_from_address(&body).ok_or(GeocodeError::NoCity)
    }
}

#[async_trait]
impl CityResolver for NominatimResolver {
    async fn resolve_city(&self, lat: f64, lon: f64) -> String {
        match self.lookup(lat, lon).await {
            Ok(city) => {
                debug!(lat, lon, city = %city, "city resolved");
                city
            }
            Err(e) => {
                warn!(lat, lon, error = %e, "city resolution failed, degrading to unfiltered");
                UNKNOWN_CITY.to_string()
            }
        }
    }
}

/// Locality extraction with the fallback chain used across the platform:
/// city, then progressively coarser divisions.
fn city_from_address(body: &Value) -> Option<String> {
    let address = body.get("address")?;
    for key in [
        "city",
        "town",
        "village",
        "municipality",
        "state_district",
        "county",
    ] {
        if let Some(name) = address.get(key).and_then(|v| v.as_str()) {
            if !name.is_empty() {
                return Some(name.to_string());
            }
        }
    }
    None
}
