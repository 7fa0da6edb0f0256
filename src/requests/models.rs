// Donation request models and wire shapes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle of a request against a donation. Editable only while
/// `pending`; `expired` is the cascaded terminal state when the parent
/// donation times out before the request is decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
    FullFilled,
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestReason {
    PersonalNeed,
    FamilyNeed,
    CommunityProgram,
    HomelessShelter,
    DisasterRelief,
    Others,
}

/// A request against a donation, foreign-keyed to exactly one donation and
/// one requester.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DonationRequest {
    pub id: Uuid,
    #[serde(rename = "donation")]
    pub donation_id: Uuid,
    #[serde(rename = "donee")]
    pub donee_id: Uuid,
    pub full_name: String,
    pub email: String,
    pub request_reason: RequestReason,
    pub additional_info: String,
    pub phone_no: String,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
}

/// Donee-supplied fields for submitting or editing a request.
#[derive(Debug, Clone, Serialize)]
pub struct RequestDraft {
    pub full_name: String,
    pub email: String,
    pub request_reason: RequestReason,
    pub additional_info: String,
    pub phone_no: String,
}

/// Which side of the match a request listing is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestScope {
    /// Requests made against the caller's donations.
    AsDonor,
    /// Requests the caller submitted.
    AsDonee,
}
