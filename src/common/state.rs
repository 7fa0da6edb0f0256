// Shared engine state: one authoritative copy per entity collection

use chrono::{Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::donations::models::{Donation, DonationStatus};
use crate::ratings::models::Rating;
use crate::requests::models::{DonationRequest, RequestStatus};

/// In-memory mirror of the backend collections.
///
/// The stores mutate this container only from server-confirmed payloads;
/// status fields in here always reflect the last confirmed value, never an
/// optimistic guess. It is injected into every store so the whole engine can
/// be exercised without a UI harness.
#[derive(Debug, Default)]
pub struct EngineState {
    pub donations: RwLock<Vec<Donation>>,
    pub requests: RwLock<Vec<DonationRequest>>,
    pub ratings: RwLock<Vec<Rating>>,
}

impl EngineState {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- donations ----

    pub async fn donation(&self, id: Uuid) -> Option<Donation> {
        self.donations
            .read()
            .await
            .iter()
            .find(|d| d.id == id)
            .cloned()
    }

    pub async fn replace_donations(&self, list: Vec<Donation>) {
        *self.donations.write().await = list;
    }

    pub async fn upsert_donation(&self, donation: Donation) {
        let mut donations = self.donations.write().await;
        match donations.iter_mut().find(|d| d.id == donation.id) {
            Some(existing) => *existing = donation,
            None => donations.push(donation),
        }
    }

    pub async fn remove_donation(&self, id: Uuid) {
        self.donations.write().await.retain(|d| d.id != id);
    }

    pub async fn set_donation_status(&self, id: Uuid, status: DonationStatus) {
        if let Some(d) = self.donations.write().await.iter_mut().find(|d| d.id == id) {
            d.status = status;
        }
    }

    /// Donations owned by `donor_id` that were created within the last
    /// rolling month. The backend caps these at three; the stores use this
    /// for the advisory pre-check.
    pub async fn donations_this_month(&self, donor_id: Uuid) -> usize {
        let one_month_ago = Utc::now() - Duration::days(30);
        self.donations
            .read()
            .await
            .iter()
            .filter(|d| d.donor_id == donor_id && d.created_at >= one_month_ago)
            .count()
    }

    // ---- requests ----

    pub async fn request(&self, id: Uuid) -> Option<DonationRequest> {
        self.requests
            .read()
            .await
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }

    pub async fn replace_requests(&self, list: Vec<DonationRequest>) {
        *self.requests.write().await = list;
    }

    pub async fn upsert_request(&self, request: DonationRequest) {
        let mut requests = self.requests.write().await;
        match requests.iter_mut().find(|r| r.id == request.id) {
            Some(existing) => *existing = request,
            None => requests.push(request),
        }
    }

    pub async fn remove_request(&self, id: Uuid) {
        self.requests.write().await.retain(|r| r.id != id);
    }

    pub async fn set_request_status(&self, id: Uuid, status: RequestStatus) {
        if let Some(r) = self.requests.write().await.iter_mut().find(|r| r.id == id) {
            r.status = status;
        }
    }

    pub async fn requests_for_donation(&self, donation_id: Uuid) -> Vec<DonationRequest> {
        self.requests
            .read()
            .await
            .iter()
            .filter(|r| r.donation_id == donation_id)
            .cloned()
            .collect()
    }

    /// The approved sibling of `request_id` on the same donation, if one
    /// exists. At most one request per donation may hold `approved`, so a
    /// `Some` here means a second approval must be refused.
    pub async fn approved_sibling(
        &self,
        donation_id: Uuid,
        request_id: Uuid,
    ) -> Option<DonationRequest> {
        self.requests
            .read()
            .await
            .iter()
            .find(|r| {
                r.donation_id == donation_id
                    && r.id != request_id
                    && r.status == RequestStatus::Approved
            })
            .cloned()
    }

    /// The caller's non-rejected claim on a donation, if any. A donee may
    /// hold at most one active request per donation.
    pub async fn active_claim(&self, donation_id: Uuid, donee_id: Uuid) -> Option<DonationRequest> {
        self.requests
            .read()
            .await
            .iter()
            .find(|r| {
                r.donation_id == donation_id
                    && r.donee_id == donee_id
                    && r.status != RequestStatus::Rejected
            })
            .cloned()
    }

    pub async fn requests_this_month(&self, donee_id: Uuid) -> usize {
        let one_month_ago = Utc::now() - Duration::days(30);
        self.requests
            .read()
            .await
            .iter()
            .filter(|r| r.donee_id == donee_id && r.created_at >= one_month_ago)
            .count()
    }

    /// Server-confirmed approval: the request flips to `approved`, its
    /// donation flips to `approved`, siblings stay untouched.
    pub async fn apply_approval(&self, request_id: Uuid) {
        let donation_id = {
            let mut requests = self.requests.write().await;
            match requests.iter_mut().find(|r| r.id == request_id) {
                Some(r) => {
                    r.status = RequestStatus::Approved;
                    Some(r.donation_id)
                }
                None => None,
            }
        };
        if let Some(donation_id) = donation_id {
            self.set_donation_status(donation_id, DonationStatus::Approved)
                .await;
        }
    }

    /// Server-confirmed fulfillment: the accepted request flips to
    /// `full_filled`, its donation to `completed`. This opens rating
    /// eligibility in both directions.
    pub async fn apply_fulfillment(&self, request_id: Uuid) {
        let donation_id = {
            let mut requests = self.requests.write().await;
            match requests.iter_mut().find(|r| r.id == request_id) {
                Some(r) => {
                    r.status = RequestStatus::FullFilled;
                    Some(r.donation_id)
                }
                None => None,
            }
        };
        if let Some(donation_id) = donation_id {
            self.set_donation_status(donation_id, DonationStatus::Completed)
                .await;
        }
    }

    // ---- ratings ----

    pub async fn upsert_rating(&self, rating: Rating) {
        let mut ratings = self.ratings.write().await;
        match ratings.iter_mut().find(|r| r.id == rating.id) {
            Some(existing) => *existing = rating,
            None => ratings.push(rating),
        }
    }

    /// Whether a rating already exists for this (subject, reviewer,
    /// donation) triple.
    pub async fn has_rating(&self, subject_id: Uuid, reviewer_id: Uuid, donation_id: Uuid) -> bool {
        self.ratings.read().await.iter().any(|r| {
            r.subject_id == subject_id
                && r.reviewer_id == reviewer_id
                && r.donation_id == donation_id
        })
    }
}
