// Requests module - claims against donations

pub mod models;
pub mod store;
pub mod validators;

#[cfg(test)]
mod tests;

pub use models::{DonationRequest, RequestDraft, RequestReason, RequestScope, RequestStatus};
pub use store::RequestStore;
