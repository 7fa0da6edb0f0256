// Status aggregation - the single badge derived from a user's activity
//
// Pure functions over already-fetched collections. The priority orders
// below define the badge: first match wins, and the branch order must
// not be rearranged.

use std::fmt;

use crate::donations::models::{Donation, DonationStatus};
use crate::requests::models::{DonationRequest, RequestStatus};


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DonorStatus {
    NoActivity,
    Approved,
    Completed,
    Requested,
    Live,
    Expired,
}

impl DonorStatus {
    pub fn label(&self) -> &'static str {
        match self {
            DonorStatus::NoActivity => "No Activity",
            DonorStatus::Approved => "Approved",
            DonorStatus::Completed => "Completed",
            DonorStatus::Requested => "Requested",
            DonorStatus::Live => "Live",
            DonorStatus::Expired => "Expired",
        }
    }
}

impl fmt::Display for DonorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoneeStatus {
    NoRequests,
    Fulfilled,
    Approved,
    Pending,
    Rejected,
}

impl DoneeStatus {
    pub fn label(&self) -> &'static str {
        match self {
            DoneeStatus::NoRequests => "No Requests",
            DoneeStatus::Fulfilled => "Fulfilled",
            DoneeStatus::Approved => "Approved",
            DoneeStatus::Pending => "Pending",
            DoneeStatus::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for DoneeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Donor badge over the donor's own donations and the requests made
/// against them.
pub fn donor_status(donations: &[Donation], requests: &[DonationRequest]) -> DonorStatus {
    if donations.is_empty() && requests.is_empty() {
        return DonorStatus::NoActivity;
    }
    if requests.iter().any(|r| r.status == RequestStatus::Approved) {
        return DonorStatus::Approved;
    }
    if donations
        .iter()
        .any(|d| d.status == DonationStatus::Completed)
    {
        return DonorStatus::Completed;
    }
    if requests.iter().any(|r| r.status == RequestStatus::Pending) {
        return DonorStatus::Requested;
    }
    if donations.iter().any(|d| d.status == DonationStatus::Live) {
        return DonorStatus::Live;
    }
    if donations
        .iter()
        .all(|d| d.status == DonationStatus::Expired)
    {
        return DonorStatus::Expired;
    }
    DonorStatus::NoActivity
}

/// Donee badge over the donee's own submitted requests.
pub fn donee_status(requests: &[DonationRequest]) -> DoneeStatus {
    if requests.is_empty() {
        return DoneeStatus::NoRequests;
    }
    if requests
        .iter()
        .any(|r| r.status == RequestStatus::FullFilled)
    {
        return DoneeStatus::Fulfilled;
    }
    if requests.iter().any(|r| r.status == RequestStatus::Approved) {
        return DoneeStatus::Approved;
    }
    if requests.iter().any(|r| r.status == RequestStatus::Pending) {
        return DoneeStatus::Pending;
    }
    if requests
        .iter()
        .all(|r| r.status == RequestStatus::Rejected)
    {
        return DoneeStatus::Rejected;
    }
    DoneeStatus::NoRequests
}
