// Donation draft validation

use super::models::DonationDraft;
use crate::common::{is_valid_phone, ValidationResult, Validator};

pub struct DonationValidator;

impl Validator<DonationDraft> for DonationValidator {
    fn validate(&self, data: &DonationDraft) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.cloth_type.trim().is_empty() {
            result.add_error("cloth_type", "Cloth type is required");
        }

        if data.quantity < 1 {
            result.add_error("quantity", "Quantity must be at least 1");
        }

        if !is_valid_phone(&data.phone_no) {
            result.add_error(
                "phone_no",
                "Please enter a valid 11-digit phone number (e.g., 12345678901)",
            );
        }

        if data.pick_up_address.trim().is_empty() {
            result.add_error("pick_up_address", "Pickup address is required");
        }

        if data.city.trim().is_empty() {
            result.add_error("city", "City is required");
        }

        if data.full_name.trim().is_empty() {
            result.add_error("full_name", "Full name is required");
        }

        result
    }
}
