// Rating ledger: one rating per fulfilled match per direction

use reqwest::Method;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use super::models::{RatedRole, Rating, RatingDirection, RatingDraft, RatingSummary};
use crate::common::{EngineError, EngineState};
use crate::donations::models::DonationStatus;
use crate::requests::models::RequestStatus;
use crate::session::SessionManager;

pub struct RatingLedger {
    session: Arc<SessionManager>,
    state: Arc<EngineState>,
}

impl RatingLedger {
    pub fn new(session: Arc<SessionManager>, state: Arc<EngineState>) -> Self {
        Self { session, state }
    }

    /// Donor rates the donee of a fulfilled match.
    pub async fn rate_donee(
        &self,
        donee_id: Uuid,
        draft: RatingDraft,
        donation_id: Uuid,
    ) -> Result<Rating, EngineError> {
        self.submit(
            donee_id,
            draft,
            donation_id,
            RatingDirection::DonorRatesDonee,
        )
        .await
    }

    /// Donee rates the donor of a fulfilled match.
    pub async fn rate_donor(
        &self,
        donor_id: Uuid,
        draft: RatingDraft,
        donation_id: Uuid,
    ) -> Result<Rating, EngineError> {
        self.submit(
            donor_id,
            draft,
            donation_id,
            RatingDirection::DoneeRatesDonor,
        )
        .await
    }

    async fn submit(
        &self,
        subject_id: Uuid,
        draft: RatingDraft,
        donation_id: Uuid,
        direction: RatingDirection,
    ) -> Result<Rating, EngineError> {
        if !(1..=5).contains(&draft.score) {
            return Err(EngineError::Validation(
                "Score must be between 1 and 5".to_string(),
            ));
        }

        let reviewer_id = self.session.user_id().await?;
        if self
            .state
            .has_rating(subject_id, reviewer_id, donation_id)
            .await
        {
            return Err(EngineError::DuplicateRating);
        }
        self.check_eligibility(subject_id, reviewer_id, donation_id, direction)
            .await?;

        let path = match direction {
            RatingDirection::DonorRatesDonee => {
                format!("/donations/ratings/donee/{}/", subject_id)
            }
            RatingDirection::DoneeRatesDonor => format!("/ratings/donor/{}", subject_id),
        };
        let body = json!({
            "score": draft.score,
            "comment": draft.comment,
            "donation": donation_id,
        });

        let response = self
            .session
            .send(Method::POST, &path, Some(body))
            .await
            .map_err(|e| match e {
                // The backend answers 409 for the unique-triple violation
                // and 403 when the match never reached fulfillment.
                EngineError::Conflict(_) => EngineError::DuplicateRating,
                EngineError::Forbidden(message) => EngineError::NotEligible(message),
                other => other,
            })?;

        let rating: Rating = response.json()?;
        info!(rating_id = %rating.id, subject_id = %subject_id, score = rating.score, "rating recorded");
        self.state.upsert_rating(rating.clone()).await;
        Ok(rating)
    }

    /// Ratings received by a user in the given role, with their average.
    pub async fn ratings_for(
        &self,
        user_id: Uuid,
        role: RatedRole,
    ) -> Result<RatingSummary, EngineError> {
        let path = format!(
            "/donations/ratings/{}/{}/list/",
            role.as_path_segment(),
            user_id
        );
        let response = self.session.send(Method::GET, &path, None).await?;
        let ratings: Vec<Rating> = response.json()?;
        debug!(user_id = %user_id, count = ratings.len(), "ratings fetched");
        for rating in &ratings {
            self.state.upsert_rating(rating.clone()).await;
        }
        Ok(RatingSummary::from_ratings(ratings))
    }

    /// A rating is only permitted once the match reached fulfillment: the
    /// accepted request is `full_filled` (equivalently, the donation is
    /// `completed`). This check is advisory and refuses only on positive
    /// cached evidence of ineligibility; whenever the cache lacks the
    /// relevant record the call goes through and the backend, which stays
    /// authoritative, decides.
    async fn check_eligibility(
        &self,
        subject_id: Uuid,
        reviewer_id: Uuid,
        donation_id: Uuid,
        direction: RatingDirection,
    ) -> Result<(), EngineError> {
        let donation = self.state.donation(donation_id).await;
        let (donor_id, donee_id) = match direction {
            RatingDirection::DonorRatesDonee => (reviewer_id, subject_id),
            RatingDirection::DoneeRatesDonor => (subject_id, reviewer_id),
        };

        if let Some(donation) = &donation {
            if donation.donor_id != donor_id {
                return Err(EngineError::NotEligible(
                    "rating parties do not match this donation".to_string(),
                ));
            }
        }

        let claim = self
            .state
            .requests_for_donation(donation_id)
            .await
            .into_iter()
            .find(|r| r.donee_id == donee_id);

        let not_fulfilled = Err(EngineError::NotEligible(
            "the match has not been fulfilled yet".to_string(),
        ));
        match claim {
            Some(request) => match request.status {
                RequestStatus::FullFilled => Ok(()),
                RequestStatus::Approved => match &donation {
                    Some(d) if d.status == DonationStatus::Completed => Ok(()),
                    // Approved claim, donation cached short of completion.
                    Some(_) => not_fulfilled,
                    // Handover state unknown locally; defer.
                    None => Ok(()),
                },
                _ => not_fulfilled,
            },
            // No cached claim for this donee. A donation cached short of
            // `completed` is positive evidence that no handover happened;
            // anything else is a cache gap, not a refusal.
            None => match donation {
                Some(d) if d.status != DonationStatus::Completed => not_fulfilled,
                _ => Ok(()),
            },
        }
    }
}
