// Rating models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which way the rating points within a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatingDirection {
    DonorRatesDonee,
    DoneeRatesDonor,
}

/// One-directional rating tied to the specific donation that produced the
/// match. At most one rating may exist per (subject, reviewer, donation).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rating {
    pub id: Uuid,
    #[serde(rename = "subject")]
    pub subject_id: Uuid,
    #[serde(rename = "reviewer")]
    pub reviewer_id: Uuid,
    #[serde(rename = "donation")]
    pub donation_id: Uuid,
    pub score: u8,
    #[serde(default)]
    pub comment: Option<String>,
    pub direction: RatingDirection,
    pub created_at: DateTime<Utc>,
}

/// Reviewer-supplied fields.
#[derive(Debug, Clone)]
pub struct RatingDraft {
    /// 1 through 5.
    pub score: u8,
    pub comment: Option<String>,
}

/// Role of the user whose ratings are being listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatedRole {
    Donor,
    Donee,
}

impl RatedRole {
    pub fn as_path_segment(&self) -> &'static str {
        match self {
            RatedRole::Donor => "donor",
            RatedRole::Donee => "donee",
        }
    }
}

/// Ratings for one subject plus their arithmetic mean. An empty list yields
/// an average of 0.0; distinguishing "no ratings" visually is the UI's
/// concern.
#[derive(Debug, Clone)]
pub struct RatingSummary {
    pub ratings: Vec<Rating>,
    pub average: f64,
}

impl RatingSummary {
    pub fn from_ratings(ratings: Vec<Rating>) -> Self {
        let average = if ratings.is_empty() {
            0.0
        } else {
            ratings.iter().map(|r| r.score as f64).sum::<f64>() / ratings.len() as f64
        };
        Self { ratings, average }
    }
}
