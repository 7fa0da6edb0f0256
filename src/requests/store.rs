// Request store: claims against donations and their status transitions

use reqwest::Method;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use super::models::{DonationRequest, RequestDraft, RequestScope, RequestStatus};
use super::validators::RequestValidator;
use crate::common::{EngineError, EngineState, Validator};
use crate::donations::models::DonationStatus;
use crate::session::SessionManager;

/// Per-donation and per-donee caps mirrored from the backend for the
/// advisory pre-checks.
const REQUESTS_PER_DONATION_CAP: usize = 4;
const MONTHLY_REQUEST_CAP: usize = 3;

pub struct RequestStore {
    session: Arc<SessionManager>,
    state: Arc<EngineState>,
}

impl RequestStore {
    pub fn new(session: Arc<SessionManager>, state: Arc<EngineState>) -> Self {
        Self { session, state }
    }

    /// Submits a claim against a donation.
    ///
    /// Refused locally when the caller already holds a non-rejected request
    /// on the same donation, when the donation is no longer requestable, or
    /// when the caller is its donor. The backend re-validates all of this
    /// authoritatively.
    pub async fn submit(
        &self,
        donation_id: Uuid,
        draft: RequestDraft,
    ) -> Result<DonationRequest, EngineError> {
        RequestValidator.validate(&draft).check()?;
        let donee_id = self.session.user_id().await?;

        if let Some(claim) = self.state.active_claim(donation_id, donee_id).await {
            return Err(EngineError::Conflict(format!(
                "you already have an active request ({:?}) on this donation",
                claim.status
            )));
        }

        if let Some(donation) = self.state.donation(donation_id).await {
            if donation.donor_id == donee_id {
                return Err(EngineError::Forbidden(
                    "you cannot request your own donation".to_string(),
                ));
            }
            if !matches!(
                donation.status,
                DonationStatus::Live | DonationStatus::Requested
            ) {
                return Err(EngineError::InvalidStateTransition(format!(
                    "donation is {:?} and no longer accepts requests",
                    donation.status
                )));
            }
        }

        if self.state.requests_for_donation(donation_id).await.len() >= REQUESTS_PER_DONATION_CAP {
            return Err(EngineError::Validation(
                "This donation has already received the maximum of 4 requests".to_string(),
            ));
        }
        if self.state.requests_this_month(donee_id).await >= MONTHLY_REQUEST_CAP {
            return Err(EngineError::Validation(
                "You can only request 3 donations per month".to_string(),
            ));
        }

        let body = serde_json::to_value(&draft).map_err(|e| EngineError::Api {
            status: 0,
            message: format!("failed to serialize request draft: {}", e),
        })?;
        let response = self
            .session
            .send(
                Method::POST,
                &format!("/donations/{}/request/", donation_id),
                Some(body),
            )
            .await?;

        let request: DonationRequest = response.json()?;
        info!(request_id = %request.id, donation_id = %donation_id, "donation request submitted");
        self.state.upsert_request(request.clone()).await;

        // A live donation with at least one pending claim is `requested`.
        if let Some(donation) = self.state.donation(donation_id).await {
            if donation.status == DonationStatus::Live {
                self.state
                    .set_donation_status(donation_id, DonationStatus::Requested)
                    .await;
            }
        }
        Ok(request)
    }

    /// Edits a request. Permitted only while `pending`.
    pub async fn update(
        &self,
        id: Uuid,
        draft: RequestDraft,
    ) -> Result<DonationRequest, EngineError> {
        RequestValidator.validate(&draft).check()?;
        self.own_pending_request(id).await?;

        let body = serde_json::to_value(&draft).map_err(|e| EngineError::Api {
            status: 0,
            message: format!("failed to serialize request draft: {}", e),
        })?;
        let response = self
            .session
            .send(
                Method::PUT,
                &format!("/donations/requests/{}/update/", id),
                Some(body),
            )
            .await?;

        let request: DonationRequest = response.json()?;
        info!(request_id = %id, "donation request updated");
        self.state.upsert_request(request.clone()).await;
        Ok(request)
    }

    /// Withdraws a request. Permitted only while `pending`.
    pub async fn delete(&self, id: Uuid) -> Result<(), EngineError> {
        self.own_pending_request(id).await?;

        self.session
            .send(
                Method::DELETE,
                &format!("/donations/requests/{}/delete/", id),
                None,
            )
            .await?;
        info!(request_id = %id, "donation request withdrawn");
        self.state.remove_request(id).await;
        Ok(())
    }

    /// Donor accepts a request: the request flips to `approved`, the parent
    /// donation flips to `approved`, siblings stay untouched. Repeating the
    /// call on the already-approved request is a no-op; approving while a
    /// sibling holds the approval fails with `Conflict`.
    pub async fn approve(&self, id: Uuid) -> Result<(), EngineError> {
        if let Some(request) = self.state.request(id).await {
            if request.status == RequestStatus::Approved {
                debug!(request_id = %id, "approval repeated, no-op");
                return Ok(());
            }
            if let Some(sibling) = self.state.approved_sibling(request.donation_id, id).await {
                return Err(EngineError::Conflict(format!(
                    "request {} already holds the approval for this donation",
                    sibling.id
                )));
            }
        }

        self.session
            .send(
                Method::POST,
                &format!("/donations/requests/{}/approve/", id),
                None,
            )
            .await?;
        info!(request_id = %id, "donation request approved");
        self.state.apply_approval(id).await;
        Ok(())
    }

    /// Donor declines a request. Does not affect the donation's status.
    pub async fn reject(&self, id: Uuid, reason: &str) -> Result<(), EngineError> {
        self.session
            .send(
                Method::POST,
                &format!("/donations/requests/{}/reject/", id),
                Some(json!({ "reason": reason })),
            )
            .await?;
        info!(request_id = %id, reason, "donation request rejected");
        self.state
            .set_request_status(id, RequestStatus::Rejected)
            .await;
        Ok(())
    }

    /// Donee confirms the handover of an approved match: the request flips
    /// to `full_filled` and the donation to `completed`, opening rating
    /// eligibility in both directions.
    pub async fn mark_fulfilled(&self, id: Uuid) -> Result<(), EngineError> {
        if let Some(request) = self.state.request(id).await {
            if request.status != RequestStatus::Approved {
                return Err(EngineError::InvalidStateTransition(format!(
                    "only approved requests can be fulfilled, this one is {:?}",
                    request.status
                )));
            }
        }

        self.session
            .send(
                Method::POST,
                &format!("/donations/requests/{}/fulfilled/", id),
                None,
            )
            .await?;
        info!(request_id = %id, "donation request fulfilled");
        self.state.apply_fulfillment(id).await;
        Ok(())
    }

    /// Times out a still-pending request.
    pub async fn expire(&self, id: Uuid) -> Result<(), EngineError> {
        self.session
            .send(
                Method::PUT,
                &format!("/donations/requests/{}/expire", id),
                None,
            )
            .await?;
        info!(request_id = %id, "donation request expired");
        self.state
            .set_request_status(id, RequestStatus::Expired)
            .await;
        Ok(())
    }

    /// Lists requests in the given scope and replaces the cached collection
    /// with the server-confirmed result.
    pub async fn list(&self, scope: RequestScope) -> Result<Vec<DonationRequest>, EngineError> {
        let path = match scope {
            RequestScope::AsDonor => "/donations/requests/donor/",
            RequestScope::AsDonee => "/donations/requests/user/",
        };
        let response = self.session.send(Method::GET, path, None).await?;
        let requests: Vec<DonationRequest> = response.json()?;
        debug!(count = requests.len(), ?scope, "request list fetched");
        self.state.replace_requests(requests.clone()).await;
        Ok(requests)
    }

    /// Resolves the caller's own request and checks it is still `pending`.
    async fn own_pending_request(&self, id: Uuid) -> Result<DonationRequest, EngineError> {
        let donee_id = self.session.user_id().await?;
        let request = self
            .state
            .request(id)
            .await
            .ok_or_else(|| EngineError::NotFound(format!("request {} not known locally", id)))?;
        if request.donee_id != donee_id {
            return Err(EngineError::Forbidden(
                "only the requester may modify this request".to_string(),
            ));
        }
        if request.status != RequestStatus::Pending {
            return Err(EngineError::InvalidStateTransition(format!(
                "request is {:?}, only pending requests can be changed",
                request.status
            )));
        }
        Ok(request)
    }
}
