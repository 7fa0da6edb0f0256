// Field-level validation types shared by the donation and request stores

use regex::Regex;

#[derive(Debug)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

#[derive(Debug)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
        }
    }

    pub fn add_error(&mut self, field: &str, message: &str) {
        self.is_valid = false;
        self.errors.push(ValidationError {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    pub fn merge(&mut self, other: ValidationResult) {
        if !other.is_valid {
            self.is_valid = false;
            self.errors.extend(other.errors);
        }
    }

    /// Converts into `Ok(())` or the merged field errors, so store methods
    /// can gate on `check()?` before touching the network.
    pub fn check(self) -> Result<(), crate::common::EngineError> {
        if self.is_valid {
            Ok(())
        } else {
            Err(self.into())
        }
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

pub trait Validator<T> {
    fn validate(&self, data: &T) -> ValidationResult;
}

/// Contact numbers on the platform are exactly 11 digits, no separators.
pub fn is_valid_phone(phone: &str) -> bool {
    Regex::new(r"^\d{11}$")
        .map(|re| re.is_match(phone))
        .unwrap_or(false)
}
