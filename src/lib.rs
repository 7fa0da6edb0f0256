//! Client engine for the donation lifecycle and matching flow.
//!
//! The engine owns everything with real state on the client side of the
//! donation platform: the authenticated session (with reactive token
//! refresh), the donation and request state machines, the rating ledger,
//! and the pure status badge derivation. Rendering, routing and form
//! plumbing live elsewhere and talk to this crate through the store
//! command methods.

pub mod common;
pub mod donations;
pub mod engine;
pub mod ratings;
pub mod requests;
pub mod services;
pub mod session;
pub mod status;

pub use common::{EngineConfig, EngineError, EngineState};
pub use engine::DonationEngine;
pub use session::SessionManager;
