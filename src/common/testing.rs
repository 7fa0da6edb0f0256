// Test doubles and fixtures shared across module tests

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use crate::common::EngineError;
use crate::donations::models::{
    Category, ClothCondition, ClothSize, Donation, DonationStatus, Gender, Season,
};
use crate::requests::models::{DonationRequest, RequestReason, RequestStatus};
use crate::session::models::{Session, UserInfo};
use crate::session::transport::{HttpTransport, TransportRequest, TransportResponse};
use crate::session::SessionManager;

/// Scripted transport: pops queued responses in order and records every
/// request it was asked to send, so tests can assert call counts, ordering
/// and bearer tokens directly.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<TransportResponse, EngineError>>>,
    pub sent: Mutex<Vec<TransportRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_response(&self, status: u16, body: Value) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(TransportResponse { status, body }));
    }

    pub fn push_error(&self, message: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(EngineError::Network(message.to_string())));
    }

    pub fn sent_requests(&self) -> Vec<TransportRequest> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, EngineError> {
        self.sent.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("mock transport exhausted: unexpected extra request"))
    }
}

pub fn test_user(id: Uuid) -> UserInfo {
    UserInfo {
        id,
        name: "Test User".to_string(),
        email: "test@example.com".to_string(),
        username: "test".to_string(),
        is_admin: false,
    }
}

/// A session manager already signed in as `user_id`, backed by `transport`.
pub async fn signed_in_session(
    user_id: Uuid,
    transport: Arc<MockTransport>,
) -> Arc<SessionManager> {
    let session = SessionManager::new("http://api.test/api", transport);
    session
        .install_session(Session {
            access: "access-token".to_string(),
            refresh: "refresh-token".to_string(),
            user: test_user(user_id),
        })
        .await;
    Arc::new(session)
}

pub fn donation_fixture(donor_id: Uuid, status: DonationStatus) -> Donation {
    Donation {
        id: Uuid::new_v4(),
        donor_id,
        full_name: "Donor Person".to_string(),
        username: "donor".to_string(),
        email: "donor@example.com".to_string(),
        city: "Karachi".to_string(),
        phone_no: "12345678901".to_string(),
        cloth_type: "Hoodie".to_string(),
        condition: ClothCondition::Good,
        gender: Gender::Universal,
        category: Category::Jackets,
        images: vec![],
        quantity: 2,
        size: ClothSize::Medium,
        seasonal_clothing: Season::Summer,
        pick_up_address: "12 Example Street".to_string(),
        anonymous: false,
        status,
        created_at: Utc::now(),
    }
}

pub fn request_fixture(
    donation_id: Uuid,
    donee_id: Uuid,
    status: RequestStatus,
) -> DonationRequest {
    DonationRequest {
        id: Uuid::new_v4(),
        donation_id,
        donee_id,
        full_name: "Donee Person".to_string(),
        email: "donee@example.com".to_string(),
        request_reason: RequestReason::FamilyNeed,
        additional_info: "Two growing kids".to_string(),
        phone_no: "10987654321".to_string(),
        status,
        created_at: Utc::now(),
    }
}

/// Serializes an entity to the wire shape the backend would echo.
pub fn wire<T: serde::Serialize>(entity: &T) -> Value {
    serde_json::to_value(entity).expect("fixture serializes")
}
