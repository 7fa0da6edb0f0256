// Ratings module - bidirectional match ratings

pub mod ledger;
pub mod models;


pub use ledger::RatingLedger;
pub use models::{RatedRole, Rating, RatingDirection, RatingDraft, RatingSummary};
