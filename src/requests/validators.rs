// Request draft validation

use super::models::RequestDraft;
use crate::common::{is_valid_phone, ValidationResult, Validator};

pub struct RequestValidator;

impl Validator<RequestDraft> for RequestValidator {
    fn validate(&self, data: &RequestDraft) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.additional_info.trim().is_empty() {
            result.add_error("additional_info", "Please provide additional information");
        }

        if !is_valid_phone(&data.phone_no) {
            result.add_error("phone_no", "Please enter a valid 11-digit phone number");
        }

        result
    }
}
