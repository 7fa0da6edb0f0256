// Common module - shared types and utilities across all modules

pub mod config;
pub mod error;
pub mod state;
pub mod validation;

#[cfg(test)]
pub mod testing;

// Re-export commonly used types for convenience
pub use config::EngineConfig;
pub use error::EngineError;
pub use state::EngineState;
pub use validation::{is_valid_phone, ValidationError, ValidationResult, Validator};
