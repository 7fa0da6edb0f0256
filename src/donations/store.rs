// Donation store: CRUD and status transitions for listings

use reqwest::Method;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::models::{
    Donation, DonationDraft, DonationFilter, DonationStatus, ImageFile, ImageSource,
};
use super::validators::DonationValidator;
use crate::common::{EngineError, EngineState, Validator};
use crate::requests::models::RequestStatus;
use crate::services::blob::BlobStore;
use crate::session::SessionManager;

/// Donors may list at most this many items per rolling month. Enforced
/// authoritatively server-side; checked here against the cache to fail fast.
const MONTHLY_DONATION_CAP: usize = 3;

/// Requested status flip targets. Approval and completion are keyed to the
/// accepted request because the backend treats the pair as one causally
/// ordered unit.
#[derive(Debug, Clone, Copy)]
pub enum TransitionTarget {
    Approved { accepted_request: Uuid },
    Completed { fulfilled_request: Uuid },
    Expired,
}

pub struct DonationStore {
    session: Arc<SessionManager>,
    state: Arc<EngineState>,
    blobs: Arc<dyn BlobStore>,
}

impl DonationStore {
    pub fn new(
        session: Arc<SessionManager>,
        state: Arc<EngineState>,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        Self {
            session,
            state,
            blobs,
        }
    }

    /// Creates a listing with status `live`. Image upload strictly precedes
    /// the record mutation; an upload failure aborts the whole operation.
    pub async fn create(
        &self,
        draft: DonationDraft,
        images: Vec<ImageFile>,
    ) -> Result<Donation, EngineError> {
        DonationValidator.validate(&draft).check()?;

        let donor_id = self.session.user_id().await?;
        if self.state.donations_this_month(donor_id).await >= MONTHLY_DONATION_CAP {
            return Err(EngineError::Validation(
                "You can only donate 3 items per month".to_string(),
            ));
        }

        let urls = if images.is_empty() {
            Vec::new()
        } else {
            self.blobs.upload(&images).await?
        };

        let body = Self::payload(&draft, urls)?;
        let response = self
            .session
            .send(Method::POST, "/donations/create/", Some(body))
            .await?;

        let donation: Donation = response.json()?;
        info!(donation_id = %donation.id, "donation created");
        self.state.upsert_donation(donation.clone()).await;
        Ok(donation)
    }

    /// Edits a listing. Permitted only while the caller owns it and it is
    /// still `live`. Already-uploaded URLs are preserved in order; only new
    /// files go to the blob store, appended after the existing ones.
    pub async fn update(
        &self,
        id: Uuid,
        draft: DonationDraft,
        images: Vec<ImageSource>,
    ) -> Result<Donation, EngineError> {
        DonationValidator.validate(&draft).check()?;
        let existing = self.owned_donation(id).await?;
        if existing.status != DonationStatus::Live {
            return Err(EngineError::InvalidStateTransition(
                "only live donations can be edited".to_string(),
            ));
        }

        let mut kept: Vec<String> = Vec::new();
        let mut new_files: Vec<ImageFile> = Vec::new();
        for image in images {
            match image {
                ImageSource::Url(url) => kept.push(url),
                ImageSource::File(file) => new_files.push(file),
            }
        }
        if !new_files.is_empty() {
            kept.extend(self.blobs.upload(&new_files).await?);
        }

        let body = Self::payload(&draft, kept)?;
        let response = self
            .session
            .send(
                Method::PUT,
                &format!("/donations/{}/update/", id),
                Some(body),
            )
            .await?;

        let donation: Donation = response.json()?;
        info!(donation_id = %donation.id, "donation updated");
        self.state.upsert_donation(donation.clone()).await;
        Ok(donation)
    }

    /// Removes a listing. Permitted only while `live`.
    pub async fn delete(&self, id: Uuid) -> Result<(), EngineError> {
        let existing = self.owned_donation(id).await?;
        if existing.status != DonationStatus::Live {
            return Err(EngineError::InvalidStateTransition(
                "only live donations can be deleted".to_string(),
            ));
        }

        self.session
            .send(Method::DELETE, &format!("/donations/{}/delete/", id), None)
            .await?;

        info!(donation_id = %id, "donation deleted");
        self.state.remove_donation(id).await;
        Ok(())
    }

    /// Fetches one listing and reconciles it into the shared state.
    pub async fn details(&self, id: Uuid) -> Result<Donation, EngineError> {
        let response = self
            .session
            .send(Method::GET, &format!("/donations/{}/", id), None)
            .await?;
        let donation: Donation = response.json()?;
        self.state.upsert_donation(donation.clone()).await;
        Ok(donation)
    }

    /// Lists donations, optionally filtered by city and/or restricted to the
    /// caller's own. Replaces the cached collection with the
    /// server-confirmed result.
    pub async fn list(&self, filter: DonationFilter) -> Result<Vec<Donation>, EngineError> {
        let mut query: Vec<String> = Vec::new();
        if let Some(city) = &filter.city {
            if !city.is_empty() {
                query.push(format!("city={}", urlencoding::encode(city)));
            }
        }
        if filter.mine {
            query.push("my_donations=true".to_string());
        }
        let path = if query.is_empty() {
            "/donations/".to_string()
        } else {
            format!("/donations/?{}", query.join("&"))
        };

        let response = self.session.send(Method::GET, &path, None).await?;
        let donations: Vec<Donation> = response.json()?;
        debug!(count = donations.len(), "donation list fetched");
        self.state.replace_donations(donations.clone()).await;
        Ok(donations)
    }

    /// Issues a status flip and reconciles local state only on success.
    ///
    /// Approval is keyed to the accepted request: the backend rejects a
    /// second approval while one is already held (409), which surfaces here
    /// as `Conflict`; the advisory check fails the same way without a round
    /// trip when the cache already knows about the sibling. Repeating an
    /// approval of the already-accepted request is a no-op.
    pub async fn transition_status(
        &self,
        id: Uuid,
        target: TransitionTarget,
    ) -> Result<(), EngineError> {
        match target {
            TransitionTarget::Approved { accepted_request } => {
                if let Some(request) = self.state.request(accepted_request).await {
                    if request.status == RequestStatus::Approved {
                        debug!(request_id = %accepted_request, "approval repeated, no-op");
                        return Ok(());
                    }
                }
                if let Some(sibling) = self.state.approved_sibling(id, accepted_request).await {
                    return Err(EngineError::Conflict(format!(
                        "request {} already holds the approval for this donation",
                        sibling.id
                    )));
                }
                self.session
                    .send(
                        Method::POST,
                        &format!("/donations/requests/{}/approve/", accepted_request),
                        None,
                    )
                    .await?;
                info!(donation_id = %id, request_id = %accepted_request, "donation approved");
                self.state.apply_approval(accepted_request).await;
            }
            TransitionTarget::Completed { fulfilled_request } => {
                self.session
                    .send(
                        Method::POST,
                        &format!("/donations/requests/{}/fulfilled/", fulfilled_request),
                        None,
                    )
                    .await?;
                info!(donation_id = %id, request_id = %fulfilled_request, "donation completed");
                self.state.apply_fulfillment(fulfilled_request).await;
            }
            TransitionTarget::Expired => {
                self.expire(id).await?;
            }
        }
        Ok(())
    }

    /// Expires a listing and cascades `expired` to every still-pending
    /// request against it. Each cascade call is confirmed individually; a
    /// request's cached status only flips once its own call succeeded.
    pub async fn expire(&self, id: Uuid) -> Result<(), EngineError> {
        self.session
            .send(Method::PUT, &format!("/donations/{}/expire", id), None)
            .await?;
        info!(donation_id = %id, "donation expired");
        self.state
            .set_donation_status(id, DonationStatus::Expired)
            .await;

        let pending: Vec<Uuid> = self
            .state
            .requests_for_donation(id)
            .await
            .into_iter()
            .filter(|r| r.status == RequestStatus::Pending)
            .map(|r| r.id)
            .collect();

        for request_id in pending {
            self.session
                .send(
                    Method::PUT,
                    &format!("/donations/requests/{}/expire", request_id),
                    None,
                )
                .await?;
            self.state
                .set_request_status(request_id, RequestStatus::Expired)
                .await;
            debug!(request_id = %request_id, "pending request expired with donation");
        }
        Ok(())
    }

    /// Listing moderation: marks the listing itself approved for display.
    pub async fn approve_listing(&self, id: Uuid) -> Result<Donation, EngineError> {
        let response = self
            .session
            .send(Method::PUT, &format!("/donations/{}/approve", id), None)
            .await?;
        let donation: Donation = response.json()?;
        self.state.upsert_donation(donation.clone()).await;
        Ok(donation)
    }

    /// Listing moderation: rejects the listing with a reason.
    pub async fn reject_listing(&self, id: Uuid, reason: &str) -> Result<Donation, EngineError> {
        let response = self
            .session
            .send(
                Method::PUT,
                &format!("/donations/{}/reject", id),
                Some(json!({ "reason": reason })),
            )
            .await?;
        let donation: Donation = response.json()?;
        warn!(donation_id = %id, reason, "donation listing rejected");
        self.state.upsert_donation(donation.clone()).await;
        Ok(donation)
    }

    /// Resolves the donation from the cache (or the backend) and checks
    /// ownership.
    async fn owned_donation(&self, id: Uuid) -> Result<Donation, EngineError> {
        let user_id = self.session.user_id().await?;
        let donation = match self.state.donation(id).await {
            Some(d) => d,
            None => self.details(id).await?,
        };
        if donation.donor_id != user_id {
            return Err(EngineError::Forbidden(
                "only the donor may modify this donation".to_string(),
            ));
        }
        Ok(donation)
    }

    fn payload(draft: &DonationDraft, images: Vec<String>) -> Result<Value, EngineError> {
        let mut body = serde_json::to_value(draft).map_err(|e| EngineError::Api {
            status: 0,
            message: format!("failed to serialize donation draft: {}", e),
        })?;
        body["images"] = json!(images);
        Ok(body)
    }
}
