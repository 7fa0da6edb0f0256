// Donation listing models and wire shapes

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle of a donation listing. Owned exclusively by its donor while
/// `live` or `requested`; effectively read-only once `completed` or
/// `expired`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DonationStatus {
    Live,
    Requested,
    Approved,
    Completed,
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClothCondition {
    NewWithTag,
    LikeNew,
    Good,
    Fair,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Universal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Shirts,
    Pants,
    Jackets,
    Shoes,
    Accessories,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClothSize {
    Small,
    Medium,
    Large,
    Xl,
    Xxl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    Summer,
    Winter,
    AllSeasons,
}

/// A donation listing as confirmed by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Donation {
    pub id: Uuid,
    #[serde(rename = "donor")]
    pub donor_id: Uuid,
    pub full_name: String,
    pub username: String,
    pub email: String,
    pub city: String,
    pub phone_no: String,
    pub cloth_type: String,
    pub condition: ClothCondition,
    pub gender: Gender,
    pub category: Category,
    /// Opaque URLs handed back by the blob store.
    pub images: Vec<String>,
    pub quantity: u32,
    pub size: ClothSize,
    pub seasonal_clothing: Season,
    pub pick_up_address: String,
    pub anonymous: bool,
    pub status: DonationStatus,
    pub created_at: DateTime<Utc>,
}

impl Donation {
    /// Donor name as it may be shown to other users. Anonymity lifts only
    /// once the donation reaches `approved`: the matched donee needs the
    /// contact identity, browsers do not.
    pub fn display_name(&self) -> &str {
        if self.anonymous && !self.anonymity_lifted() {
            "Anonymous"
        } else {
            &self.full_name
        }
    }

    fn anonymity_lifted(&self) -> bool {
        matches!(
            self.status,
            DonationStatus::Approved | DonationStatus::Completed
        )
    }
}

/// Donor-supplied fields for creating or editing a listing. Images travel
/// separately because new files have to reach the blob store first.
#[derive(Debug, Clone, Serialize)]
pub struct DonationDraft {
    pub full_name: String,
    pub username: String,
    pub email: String,
    pub city: String,
    pub phone_no: String,
    pub cloth_type: String,
    pub condition: ClothCondition,
    pub gender: Gender,
    pub category: Category,
    pub quantity: u32,
    pub size: ClothSize,
    pub seasonal_clothing: Season,
    pub pick_up_address: String,
    pub anonymous: bool,
}

/// A raw image file headed for the blob store.
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

/// An image attached to an edit: either an already-uploaded URL to keep, or
/// a new file that still needs uploading.
#[derive(Debug, Clone)]
pub enum ImageSource {
    Url(String),
    File(ImageFile),
}

#[derive(Debug, Clone, Default)]
pub struct DonationFilter {
    /// Exact city match, case-normalized server-side.
    pub city: Option<String>,
    /// Restrict to the caller's own listings.
    pub mine: bool,
}

/// Case-normalized city filter over an already-fetched list.
pub fn filter_by_city<'a>(donations: &'a [Donation], city: &str) -> Vec<&'a Donation> {
    if city.is_empty() {
        return donations.iter().collect();
    }
    donations
        .iter()
        .filter(|d| d.city.eq_ignore_ascii_case(city))
        .collect()
}
