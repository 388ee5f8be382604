//! Delivery handshake driven through the coordinator held in `AppState`.
//!
//! Users and cars are seeded through the store; the offer is accepted over
//! HTTP so the delivery flow is opened the same way production opens it.

mod common;

use assert_matches::assert_matches;
use axum::http::StatusCode;
use common::{
    body_json, build_test_app, delete_auth, post_json_auth, proposal_body, put_json_auth,
    seed_car, seed_user, token_for, TestApp,
};
use kree_api::error::AppError;
use kree_api::ws::protocol::DeliveryPayload;
use kree_core::error::CoreError;
use kree_core::roles::{Caller, Role};
use kree_core::status::NotificationKind;
use kree_core::types::DbId;
use serde_json::json;

struct Accepted {
    t: TestApp,
    client_id: DbId,
    agency_id: DbId,
    client_token: String,
    offer_id: DbId,
    reservation_id: DbId,
}

async fn accepted_offer() -> Accepted {
    let t = build_test_app();
    let client = seed_user(t.store(), "Sara", Role::Client).await;
    let atlas = seed_user(t.store(), "Atlas Cars", Role::Agency).await;
    let car = seed_car(t.store(), atlas.id, "Clio", "Renault").await;
    let client_token = token_for(&client);

    let response =
        post_json_auth(t.router(), "/api/v1/proposals", proposal_body(None), &client_token).await;
    let proposal_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = post_json_auth(
        t.router(),
        "/api/v1/offers",
        json!({
            "carId": car.id,
            "proposalId": proposal_id,
            "price": 450.0,
            "message": "Available tomorrow morning",
        }),
        &token_for(&atlas),
    )
    .await;
    let offer_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = put_json_auth(
        t.router(),
        "/api/v1/offers/answer",
        json!({ "offerId": offer_id, "status": "accepted" }),
        &client_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let reservation_id = body_json(response).await["data"]["reservation"]["id"]
        .as_i64()
        .unwrap();

    Accepted {
        t,
        client_id: client.id,
        agency_id: atlas.id,
        client_token,
        offer_id,
        reservation_id,
    }
}

fn payload(a: &Accepted) -> DeliveryPayload {
    DeliveryPayload {
        client_id: a.client_id,
        offer_id: a.offer_id,
        car_model: None,
        message: None,
    }
}

async fn client_records(a: &Accepted, kind: NotificationKind) -> usize {
    a.t.store()
        .list_notifications(a.client_id, false, 100, 0)
        .await
        .unwrap()
        .into_iter()
        .filter(|n| n.kind == kind)
        .count()
}

// ---------------------------------------------------------------------------
// Test: racing arrivals persist a single final notification
// ---------------------------------------------------------------------------

#[tokio::test]
async fn concurrent_arrivals_record_one_final_notification() {
    let a = accepted_offer().await;
    let agency = Caller::agency(a.agency_id);
    let deliveries = a.t.state.deliveries.clone();

    deliveries.send_update(agency, payload(&a)).await.unwrap();

    let results = futures::future::join_all(
        (0..16).map(|_| deliveries.confirm_arrival(agency, payload(&a))),
    )
    .await;

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    for err in results.into_iter().filter_map(Result::err) {
        assert_matches!(err, AppError::Core(CoreError::Conflict(_)));
    }
    assert_eq!(client_records(&a, NotificationKind::DeliveryFinal).await, 1);
    assert_eq!(client_records(&a, NotificationKind::Delivery).await, 1);
}

// ---------------------------------------------------------------------------
// Test: deleting the reservation closes its delivery flow
// ---------------------------------------------------------------------------

#[tokio::test]
async fn deleted_reservation_closes_the_delivery_flow() {
    let a = accepted_offer().await;
    let agency = Caller::agency(a.agency_id);

    let uri = format!("/api/v1/reservations/{}", a.reservation_id);
    let response = delete_auth(a.t.router(), &uri, &a.client_token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let result = a.t.state.deliveries.send_update(agency, payload(&a)).await;

    assert_matches!(result, Err(AppError::Core(CoreError::Conflict(_))));
    assert_eq!(client_records(&a, NotificationKind::Delivery).await, 0);
}
