// Donations module - listing lifecycle owned by the donor

pub mod models;
pub mod store;
pub mod validators;


pub use models::{Donation, DonationDraft, DonationFilter, DonationStatus, ImageFile, ImageSource};
pub use store::{DonationStore, TransitionTarget};
