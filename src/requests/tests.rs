//! Tests for the request store
//!
//! Exercises the submit pre-checks, the pending-only edit window, the
//! single-approval rule, and the approved-to-fulfilled handover.

use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use super::models::*;
use super::store::RequestStore;
use crate::common::testing::{
    donation_fixture, request_fixture, signed_in_session, wire, MockTransport,
};
use crate::common::{EngineError, EngineState};
use crate::donations::models::DonationStatus;

fn draft_fixture() -> RequestDraft {
    RequestDraft {
        full_name: "Donee Person".to_string(),
        email: "donee@example.com".to_string(),
        request_reason: RequestReason::FamilyNeed,
        additional_info: "Two growing kids".to_string(),
        phone_no: "10987654321".to_string(),
    }
}

struct Harness {
    transport: Arc<MockTransport>,
    state: Arc<EngineState>,
    store: RequestStore,
    user_id: Uuid,
}

async fn harness() -> Harness {
    let transport = Arc::new(MockTransport::new());
    let user_id = Uuid::new_v4();
    let session = signed_in_session(user_id, transport.clone()).await;
    let state = Arc::new(EngineState::new());
    let store = RequestStore::new(session, state.clone());
    Harness {
        transport,
        state,
        store,
        user_id,
    }
}

#[tokio::test]
async fn submit_rejects_invalid_drafts_locally() {
    let h = harness().await;
    let mut draft = draft_fixture();
    draft.additional_info = String::new();
    draft.phone_no = "nope".to_string();

    let result = h.store.submit(Uuid::new_v4(), draft).await;

    assert!(matches!(result, Err(EngineError::Validation(_))));
    assert!(h.transport.sent_requests().is_empty());
}

#[tokio::test]
async fn submit_flips_a_live_donation_to_requested() {
    let h = harness().await;
    let donation = donation_fixture(Uuid::new_v4(), DonationStatus::Live);
    h.state.upsert_donation(donation.clone()).await;

    let confirmed = request_fixture(donation.id, h.user_id, RequestStatus::Pending);
    h.transport.push_response(201, wire(&confirmed));

    let request = h
        .store
        .submit(donation.id, draft_fixture())
        .await
        .expect("submit succeeds");

    assert_eq!(request.status, RequestStatus::Pending);
    let sent = h.transport.sent_requests();
    assert_eq!(
        sent[0].url,
        format!("http://api.test/api/donations/{}/request/", donation.id)
    );
    assert_eq!(
        h.state.donation(donation.id).await.unwrap().status,
        DonationStatus::Requested
    );
}

#[tokio::test]
async fn second_claim_on_the_same_donation_conflicts() {
    let h = harness().await;
    let donation = donation_fixture(Uuid::new_v4(), DonationStatus::Requested);
    h.state.upsert_donation(donation.clone()).await;
    h.state
        .upsert_request(request_fixture(donation.id, h.user_id, RequestStatus::Pending))
        .await;

    let result = h.store.submit(donation.id, draft_fixture()).await;

    assert!(matches!(result, Err(EngineError::Conflict(_))));
    assert!(h.transport.sent_requests().is_empty());
}

#[tokio::test]
async fn rejection_frees_the_donee_to_request_again() {
    let h = harness().await;
    let donation = donation_fixture(Uuid::new_v4(), DonationStatus::Requested);
    h.state.upsert_donation(donation.clone()).await;
    h.state
        .upsert_request(request_fixture(donation.id, h.user_id, RequestStatus::Rejected))
        .await;

    let confirmed = request_fixture(donation.id, h.user_id, RequestStatus::Pending);
    h.transport.push_response(201, wire(&confirmed));

    assert!(h.store.submit(donation.id, draft_fixture()).await.is_ok());
}

#[tokio::test]
async fn donor_cannot_request_their_own_donation() {
    let h = harness().await;
    let donation = donation_fixture(h.user_id, DonationStatus::Live);
    h.state.upsert_donation(donation.clone()).await;

    let result = h.store.submit(donation.id, draft_fixture()).await;

    assert!(matches!(result, Err(EngineError::Forbidden(_))));
    assert!(h.transport.sent_requests().is_empty());
}

#[tokio::test]
async fn closed_donations_no_longer_accept_requests() {
    let h = harness().await;
    for status in [
        DonationStatus::Approved,
        DonationStatus::Completed,
        DonationStatus::Expired,
    ] {
        let donation = donation_fixture(Uuid::new_v4(), status);
        h.state.upsert_donation(donation.clone()).await;

        let result = h.store.submit(donation.id, draft_fixture()).await;
        assert!(
            matches!(result, Err(EngineError::InvalidStateTransition(_))),
            "{:?} should refuse new requests",
            status
        );
    }
    assert!(h.transport.sent_requests().is_empty());
}

#[tokio::test]
async fn per_donation_cap_is_enforced_against_the_cache() {
    let h = harness().await;
    let donation = donation_fixture(Uuid::new_v4(), DonationStatus::Requested);
    h.state.upsert_donation(donation.clone()).await;
    for _ in 0..4 {
        h.state
            .upsert_request(request_fixture(
                donation.id,
                Uuid::new_v4(),
                RequestStatus::Pending,
            ))
            .await;
    }

    let result = h.store.submit(donation.id, draft_fixture()).await;

    assert!(matches!(result, Err(EngineError::Validation(_))));
    assert!(h.transport.sent_requests().is_empty());
}

#[tokio::test]
async fn monthly_cap_is_enforced_against_the_cache() {
    let h = harness().await;
    for _ in 0..3 {
        h.state
            .upsert_request(request_fixture(
                Uuid::new_v4(),
                h.user_id,
                RequestStatus::Pending,
            ))
            .await;
    }
    let donation = donation_fixture(Uuid::new_v4(), DonationStatus::Live);
    h.state.upsert_donation(donation.clone()).await;

    let result = h.store.submit(donation.id, draft_fixture()).await;

    assert!(matches!(result, Err(EngineError::Validation(_))));
    assert!(h.transport.sent_requests().is_empty());
}

#[tokio::test]
async fn update_and_delete_are_pending_only() {
    let h = harness().await;
    let approved = request_fixture(Uuid::new_v4(), h.user_id, RequestStatus::Approved);
    h.state.upsert_request(approved.clone()).await;

    let update = h.store.update(approved.id, draft_fixture()).await;
    assert!(matches!(update, Err(EngineError::InvalidStateTransition(_))));

    let delete = h.store.delete(approved.id).await;
    assert!(matches!(delete, Err(EngineError::InvalidStateTransition(_))));

    assert!(h.transport.sent_requests().is_empty());
    assert_eq!(
        h.state.request(approved.id).await.unwrap().status,
        RequestStatus::Approved,
        "refused mutations leave the record untouched"
    );
}

#[tokio::test]
async fn update_refused_for_someone_elses_request() {
    let h = harness().await;
    let other = request_fixture(Uuid::new_v4(), Uuid::new_v4(), RequestStatus::Pending);
    h.state.upsert_request(other.clone()).await;

    let result = h.store.update(other.id, draft_fixture()).await;

    assert!(matches!(result, Err(EngineError::Forbidden(_))));
}

#[tokio::test]
async fn delete_withdraws_a_pending_request() {
    let h = harness().await;
    let pending = request_fixture(Uuid::new_v4(), h.user_id, RequestStatus::Pending);
    h.state.upsert_request(pending.clone()).await;
    h.transport.push_response(204, json!(null));

    h.store.delete(pending.id).await.expect("delete succeeds");

    let sent = h.transport.sent_requests();
    assert_eq!(
        sent[0].url,
        format!("http://api.test/api/donations/requests/{}/delete/", pending.id)
    );
    assert!(h.state.request(pending.id).await.is_none());
}

#[tokio::test]
async fn approval_flips_request_and_donation_but_not_siblings() {
    let h = harness().await;
    let donation = donation_fixture(h.user_id, DonationStatus::Requested);
    let chosen = request_fixture(donation.id, Uuid::new_v4(), RequestStatus::Pending);
    let sibling = request_fixture(donation.id, Uuid::new_v4(), RequestStatus::Pending);
    h.state.upsert_donation(donation.clone()).await;
    h.state.upsert_request(chosen.clone()).await;
    h.state.upsert_request(sibling.clone()).await;

    h.transport.push_response(200, json!({ "message": "approved" }));
    h.store.approve(chosen.id).await.expect("approve succeeds");

    let sent = h.transport.sent_requests();
    assert_eq!(
        sent[0].url,
        format!("http://api.test/api/donations/requests/{}/approve/", chosen.id)
    );
    assert_eq!(
        h.state.request(chosen.id).await.unwrap().status,
        RequestStatus::Approved
    );
    assert_eq!(
        h.state.donation(donation.id).await.unwrap().status,
        DonationStatus::Approved
    );
    assert_eq!(
        h.state.request(sibling.id).await.unwrap().status,
        RequestStatus::Pending,
        "siblings keep their status until rejected or expired"
    );
}

#[tokio::test]
async fn repeated_approval_is_a_no_op() {
    let h = harness().await;
    let approved = request_fixture(Uuid::new_v4(), Uuid::new_v4(), RequestStatus::Approved);
    h.state.upsert_request(approved.clone()).await;

    h.store.approve(approved.id).await.expect("no-op succeeds");

    assert!(h.transport.sent_requests().is_empty());
}

#[tokio::test]
async fn approving_while_a_sibling_holds_the_approval_conflicts() {
    let h = harness().await;
    let donation_id = Uuid::new_v4();
    let winner = request_fixture(donation_id, Uuid::new_v4(), RequestStatus::Approved);
    let loser = request_fixture(donation_id, Uuid::new_v4(), RequestStatus::Pending);
    h.state.upsert_request(winner.clone()).await;
    h.state.upsert_request(loser.clone()).await;

    let result = h.store.approve(loser.id).await;

    assert!(matches!(result, Err(EngineError::Conflict(_))));
    assert!(h.transport.sent_requests().is_empty());
    assert_eq!(
        h.state.request(loser.id).await.unwrap().status,
        RequestStatus::Pending
    );
}

#[tokio::test]
async fn rejection_does_not_touch_the_donation() {
    let h = harness().await;
    let donation = donation_fixture(h.user_id, DonationStatus::Approved);
    let pending = request_fixture(donation.id, Uuid::new_v4(), RequestStatus::Pending);
    h.state.upsert_donation(donation.clone()).await;
    h.state.upsert_request(pending.clone()).await;

    h.transport.push_response(200, json!({ "message": "rejected" }));
    h.store
        .reject(pending.id, "already matched")
        .await
        .expect("reject succeeds");

    let sent = h.transport.sent_requests();
    assert_eq!(
        sent[0].body.as_ref().unwrap()["reason"],
        json!("already matched")
    );
    assert_eq!(
        h.state.request(pending.id).await.unwrap().status,
        RequestStatus::Rejected
    );
    assert_eq!(
        h.state.donation(donation.id).await.unwrap().status,
        DonationStatus::Approved
    );
}

#[tokio::test]
async fn fulfillment_completes_the_donation() {
    let h = harness().await;
    let donation = donation_fixture(Uuid::new_v4(), DonationStatus::Approved);
    let approved = request_fixture(donation.id, h.user_id, RequestStatus::Approved);
    h.state.upsert_donation(donation.clone()).await;
    h.state.upsert_request(approved.clone()).await;

    h.transport.push_response(200, json!({ "message": "fulfilled" }));
    h.store
        .mark_fulfilled(approved.id)
        .await
        .expect("fulfillment succeeds");

    assert_eq!(
        h.state.request(approved.id).await.unwrap().status,
        RequestStatus::FullFilled
    );
    assert_eq!(
        h.state.donation(donation.id).await.unwrap().status,
        DonationStatus::Completed
    );
}

#[tokio::test]
async fn only_approved_requests_can_be_fulfilled() {
    let h = harness().await;
    let pending = request_fixture(Uuid::new_v4(), h.user_id, RequestStatus::Pending);
    h.state.upsert_request(pending.clone()).await;

    let result = h.store.mark_fulfilled(pending.id).await;

    assert!(matches!(result, Err(EngineError::InvalidStateTransition(_))));
    assert!(h.transport.sent_requests().is_empty());
}

#[tokio::test]
async fn list_targets_the_endpoint_for_the_scope() {
    let h = harness().await;
    let fetched = request_fixture(Uuid::new_v4(), h.user_id, RequestStatus::Pending);
    h.transport.push_response(200, json!([wire(&fetched)]));
    h.transport.push_response(200, json!([]));

    let mine = h.store.list(RequestScope::AsDonee).await.expect("list succeeds");
    assert_eq!(mine.len(), 1);
    assert!(h.state.request(fetched.id).await.is_some());

    let incoming = h.store.list(RequestScope::AsDonor).await.expect("list succeeds");
    assert!(incoming.is_empty());
    assert!(
        h.state.request(fetched.id).await.is_none(),
        "the cache mirrors the latest confirmed listing"
    );

    let sent = h.transport.sent_requests();
    assert_eq!(sent[0].url, "http://api.test/api/donations/requests/user/");
    assert_eq!(sent[1].url, "http://api.test/api/donations/requests/donor/");
}
