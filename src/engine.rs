// Engine wiring: one shared session, one shared state, one store per entity

use reqwest::Client;
use std::sync::Arc;

use crate::common::{EngineConfig, EngineState};
use crate::donations::DonationStore;
use crate::ratings::RatingLedger;
use crate::requests::RequestStore;
use crate::services::{ApiBlobStore, CityResolver, NominatimResolver};
use crate::session::{ReqwestTransport, SessionManager};

/// Fully wired engine. UI actions call the stores; every mutating call
/// flows through the shared [`SessionManager`], and every confirmed result
/// lands in the shared [`EngineState`].
pub struct DonationEngine {
    pub session: Arc<SessionManager>,
    pub state: Arc<EngineState>,
    pub donations: DonationStore,
    pub requests: RequestStore,
    pub ratings: RatingLedger,
    pub location: Arc<dyn CityResolver>,
}

impl DonationEngine {
    pub fn new(config: EngineConfig) -> Self {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        let transport = Arc::new(ReqwestTransport::new(client.clone()));
        let session = Arc::new(SessionManager::new(config.api_base_url.clone(), transport));
        let state = Arc::new(EngineState::new());
        let blobs = Arc::new(ApiBlobStore::new(
            client.clone(),
            &config.api_base_url,
            session.clone(),
        ));
        let location = Arc::new(NominatimResolver::new(client, &config));

        Self {
            donations: DonationStore::new(session.clone(), state.clone(), blobs),
            requests: RequestStore::new(session.clone(), state.clone()),
            ratings: RatingLedger::new(session.clone(), state.clone()),
            session,
            state,
            location,
        }
    }

    /// Engine configured from the environment.
    pub fn from_env() -> Self {
        Self::new(EngineConfig::from_env())
    }
}
