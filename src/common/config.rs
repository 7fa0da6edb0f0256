// Engine configuration, sourced from the environment

use std::env;
use std::time::Duration;

/// Connection settings shared by every component that talks to the backend.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Base URL of the backend REST API, without a trailing slash.
    pub api_base_url: String,
    /// Reverse-geocoding endpoint used for city resolution.
    pub geocode_url: String,
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl EngineConfig {
    /// Reads configuration from the environment, loading `.env` when present.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        let api_base_url = env::var("API_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8000/api".to_string());
        let geocode_url = env::var("GEOCODE_URL")
            .unwrap_or_else(|_| "https://nominatim.openstreetmap.org/reverse".to_string());
        let timeout_secs = env::var("REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);

        Self {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            geocode_url,
            request_timeout: Duration::from_secs(timeout_secs),
            user_agent: "DonationApp/1.0".to_string(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000/api".to_string(),
            geocode_url: "https://nominatim.openstreetmap.org/reverse".to_string(),
            request_timeout: Duration::from_secs(30),
            user_agent: "DonationApp/1.0".to_string(),
        }
    }
}
