//! Behavioural tests for `MemoryStore` through the `MarketStore` trait.
//!
//! Covers the guarded offer insert, both settlement paths, the reject
//! compare-and-set and the notification inbox.

use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::{Duration, NaiveDate, Utc};
use kree_core::roles::Role;
use kree_core::status::{
    NotificationKind, OfferStatus, PaymentStatus, ProposalStatus, ReservationStatus,
};
use kree_db::models::car::{Car, CreateCar};
use kree_db::models::notification::NewNotification;
use kree_db::models::offer::NewOffer;
use kree_db::models::price_proposal::{NewPriceProposal, PriceProposal};
use kree_db::models::reservation::{NewReservation, UpdateReservation};
use kree_db::models::user::{CreateUser, User};
use kree_db::store::{MarketStore, MemoryStore, Settlement};
use kree_db::DbError;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn user(store: &MemoryStore, name: &str, role: Role) -> User {
    store
        .create_user(&CreateUser {
            name: name.to_string(),
            email: format!("{}@kree.test", name.to_lowercase()),
            role,
            phone_number: None,
            city: Some("Rabat".to_string()),
        })
        .await
        .unwrap()
}

async fn car(store: &MemoryStore, agency_id: i64) -> Car {
    store
        .create_car(&CreateCar {
            agency_id,
            model: "Clio".to_string(),
            brand: "Renault".to_string(),
            color: "white".to_string(),
            fuel_type: "diesel".to_string(),
            gearbox: "manuelle".to_string(),
            seats: 5,
            km: 42_000,
            image_url: None,
        })
        .await
        .unwrap()
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 7, d).unwrap()
}

async fn proposal(store: &MemoryStore, client_id: i64, car_id: Option<i64>) -> PriceProposal {
    store
        .create_proposal(&NewPriceProposal {
            user_id: client_id,
            car_id,
            model: Some("Clio".to_string()),
            color: None,
            gearbox: None,
            fuel_type: None,
            seats: Some(5),
            features: vec!["gps".to_string()],
            price_min: 300.0,
            price_max: 500.0,
            start_date: day(1),
            end_date: day(5),
            pickup_location: "Rabat".to_string(),
            return_location: "Casablanca".to_string(),
            identity_document_url: None,
            portrait_url: None,
            expires_at: Utc::now() + Duration::minutes(5),
        })
        .await
        .unwrap()
}

fn reservation_for(p: &PriceProposal, car: &Car, total_price: f64) -> NewReservation {
    NewReservation {
        user_id: p.user_id,
        car_id: car.id,
        agency_id: car.agency_id,
        proposal_id: p.id,
        start_date: p.start_date,
        end_date: p.end_date,
        pickup_location: p.pickup_location.clone(),
        return_location: p.return_location.clone(),
        total_price,
        status: ReservationStatus::Accepted,
        payment_status: PaymentStatus::Pending,
    }
}

fn new_offer(agency_id: i64, car_id: i64, proposal_id: i64, price: f64) -> NewOffer {
    NewOffer {
        agency_id,
        car_id,
        proposal_id,
        price,
        message: "Available tomorrow".to_string(),
    }
}

struct Fixture {
    store: MemoryStore,
    client: User,
    agency: User,
    car: Car,
}

async fn fixture() -> Fixture {
    let store = MemoryStore::new();
    let client = user(&store, "Sara", Role::Client).await;
    let agency = user(&store, "Atlas", Role::Agency).await;
    let car = car(&store, agency.id).await;
    Fixture {
        store,
        client,
        agency,
        car,
    }
}

// ---------------------------------------------------------------------------
// Proposals
// ---------------------------------------------------------------------------

#[tokio::test]
async fn proposal_reads_back_identically() {
    let f = fixture().await;
    let created = proposal(&f.store, f.client.id, Some(f.car.id)).await;

    assert_eq!(created.status, ProposalStatus::Pending);
    let found = f.store.find_proposal(created.id).await.unwrap().unwrap();
    assert_eq!(found, created);
    assert_eq!(found.features, vec!["gps".to_string()]);
}

#[tokio::test]
async fn proposals_filter_by_client_and_car_set() {
    let f = fixture().await;
    let other_agency = user(&f.store, "Other", Role::Agency).await;
    let other_car = car(&f.store, other_agency.id).await;

    let p1 = proposal(&f.store, f.client.id, Some(f.car.id)).await;
    let p2 = proposal(&f.store, f.client.id, Some(other_car.id)).await;
    let _p3 = proposal(&f.store, f.client.id, None).await;

    let mine = f.store.proposals_for_client(f.client.id).await.unwrap();
    assert_eq!(mine.len(), 3);

    let car_ids = f.store.car_ids_for_agency(f.agency.id).await.unwrap();
    assert_eq!(car_ids, vec![f.car.id]);
    let for_cars = f.store.proposals_for_cars(&car_ids).await.unwrap();
    assert_eq!(for_cars.iter().map(|p| p.id).collect::<Vec<_>>(), vec![p1.id]);

    let both = f
        .store
        .proposals_for_cars(&[f.car.id, other_car.id])
        .await
        .unwrap();
    assert_eq!(both.len(), 2);
    assert!(both.iter().any(|p| p.id == p2.id));

    assert!(f.store.proposals_for_cars(&[]).await.unwrap().is_empty());
}

#[tokio::test]
async fn proposal_for_unknown_client_is_a_missing_reference() {
    let store = MemoryStore::new();
    let err = store
        .create_proposal(&NewPriceProposal {
            user_id: 99,
            car_id: None,
            model: None,
            color: None,
            gearbox: None,
            fuel_type: None,
            seats: None,
            features: vec![],
            price_min: 1.0,
            price_max: 2.0,
            start_date: day(1),
            end_date: day(2),
            pickup_location: "A".to_string(),
            return_location: "B".to_string(),
            identity_document_url: None,
            portrait_url: None,
            expires_at: Utc::now(),
        })
        .await
        .unwrap_err();
    assert_matches!(err, DbError::MissingReference { entity: "user", id: 99 });
}

// ---------------------------------------------------------------------------
// Offers
// ---------------------------------------------------------------------------

#[tokio::test]
async fn offer_is_created_only_while_proposal_is_pending() {
    let f = fixture().await;
    let p = proposal(&f.store, f.client.id, Some(f.car.id)).await;

    let offer = f
        .store
        .create_offer(&new_offer(f.agency.id, f.car.id, p.id, 450.0))
        .await
        .unwrap()
        .expect("proposal is pending");
    assert_eq!(offer.status, OfferStatus::Pending);

    let settled = f
        .store
        .settle_proposal(&reservation_for(&p, &f.car, p.price_max))
        .await
        .unwrap();
    assert_matches!(settled, Settlement::Settled(_));

    let late = f
        .store
        .create_offer(&new_offer(f.agency.id, f.car.id, p.id, 400.0))
        .await
        .unwrap();
    assert!(late.is_none());

    let missing = f
        .store
        .create_offer(&new_offer(f.agency.id, f.car.id, 12345, 400.0))
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn offers_are_listed_for_agency_and_client() {
    let f = fixture().await;
    let other_client = user(&f.store, "Omar", Role::Client).await;
    let p_mine = proposal(&f.store, f.client.id, None).await;
    let p_other = proposal(&f.store, other_client.id, None).await;

    f.store
        .create_offer(&new_offer(f.agency.id, f.car.id, p_mine.id, 450.0))
        .await
        .unwrap();
    f.store
        .create_offer(&new_offer(f.agency.id, f.car.id, p_other.id, 480.0))
        .await
        .unwrap();

    assert_eq!(f.store.offers_for_agency(f.agency.id).await.unwrap().len(), 2);
    let for_client = f.store.offers_for_client(f.client.id).await.unwrap();
    assert_eq!(for_client.len(), 1);
    assert_eq!(for_client[0].proposal_id, p_mine.id);
}

#[tokio::test]
async fn reject_is_a_compare_and_set() {
    let f = fixture().await;
    let p = proposal(&f.store, f.client.id, None).await;
    let offer = f
        .store
        .create_offer(&new_offer(f.agency.id, f.car.id, p.id, 450.0))
        .await
        .unwrap()
        .unwrap();

    let rejected = f.store.reject_offer(offer.id).await.unwrap().unwrap();
    assert_eq!(rejected.status, OfferStatus::Rejected);
    assert!(f.store.reject_offer(offer.id).await.unwrap().is_none());
    assert!(f.store.list_reservations().await.unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Settlement
// ---------------------------------------------------------------------------

#[tokio::test]
async fn settling_an_offer_accepts_both_and_snapshots_the_proposal() {
    let f = fixture().await;
    let p = proposal(&f.store, f.client.id, None).await;
    let offer = f
        .store
        .create_offer(&new_offer(f.agency.id, f.car.id, p.id, 450.0))
        .await
        .unwrap()
        .unwrap();

    let settlement = f
        .store
        .settle_offer(offer.id, &reservation_for(&p, &f.car, offer.price))
        .await
        .unwrap();
    let reservation = assert_matches!(settlement, Settlement::Settled(r) => r);

    assert_eq!(reservation.offer_id, Some(offer.id));
    assert_eq!(reservation.total_price, 450.0);
    assert_eq!(reservation.start_date, day(1));
    assert_eq!(reservation.pickup_location, "Rabat");
    assert_eq!(reservation.status, ReservationStatus::Accepted);
    assert_eq!(reservation.payment_status, PaymentStatus::Pending);

    let p = f.store.find_proposal(p.id).await.unwrap().unwrap();
    assert_eq!(p.status, ProposalStatus::Accepted);
    let offer = f.store.find_offer(offer.id).await.unwrap().unwrap();
    assert_eq!(offer.status, OfferStatus::Accepted);
}

#[tokio::test]
async fn second_settlement_on_the_same_proposal_is_closed() {
    let f = fixture().await;
    let p = proposal(&f.store, f.client.id, Some(f.car.id)).await;
    let first = f
        .store
        .create_offer(&new_offer(f.agency.id, f.car.id, p.id, 450.0))
        .await
        .unwrap()
        .unwrap();
    let second = f
        .store
        .create_offer(&new_offer(f.agency.id, f.car.id, p.id, 470.0))
        .await
        .unwrap()
        .unwrap();

    let r = reservation_for(&p, &f.car, 450.0);
    assert_matches!(
        f.store.settle_offer(first.id, &r).await.unwrap(),
        Settlement::Settled(_)
    );
    assert_eq!(
        f.store.settle_offer(second.id, &r).await.unwrap(),
        Settlement::ProposalClosed
    );
    assert_eq!(
        f.store.settle_proposal(&r).await.unwrap(),
        Settlement::ProposalClosed
    );

    // The losing offer is untouched.
    let second = f.store.find_offer(second.id).await.unwrap().unwrap();
    assert_eq!(second.status, OfferStatus::Pending);
    assert_eq!(f.store.list_reservations().await.unwrap().len(), 1);
}

#[tokio::test]
async fn settling_a_rejected_offer_leaves_the_proposal_pending() {
    let f = fixture().await;
    let p = proposal(&f.store, f.client.id, None).await;
    let offer = f
        .store
        .create_offer(&new_offer(f.agency.id, f.car.id, p.id, 450.0))
        .await
        .unwrap()
        .unwrap();
    f.store.reject_offer(offer.id).await.unwrap();

    let outcome = f
        .store
        .settle_offer(offer.id, &reservation_for(&p, &f.car, 450.0))
        .await
        .unwrap();
    assert_eq!(outcome, Settlement::OfferClosed);

    let p = f.store.find_proposal(p.id).await.unwrap().unwrap();
    assert_eq!(p.status, ProposalStatus::Pending);
    assert!(f.store.list_reservations().await.unwrap().is_empty());
}

#[tokio::test]
async fn concurrent_settlements_produce_exactly_one_reservation() {
    let f = fixture().await;
    let p = proposal(&f.store, f.client.id, Some(f.car.id)).await;
    let store = Arc::new(f.store);

    let mut offers = Vec::new();
    for price in [410.0, 420.0, 430.0, 440.0] {
        let offer = store
            .create_offer(&new_offer(f.agency.id, f.car.id, p.id, price))
            .await
            .unwrap()
            .unwrap();
        offers.push(offer);
    }

    let mut handles = Vec::new();
    for offer in offers {
        let store = Arc::clone(&store);
        let r = reservation_for(&p, &f.car, offer.price);
        handles.push(tokio::spawn(async move {
            store.settle_offer(offer.id, &r).await.unwrap()
        }));
    }
    {
        let store = Arc::clone(&store);
        let r = reservation_for(&p, &f.car, p.price_max);
        handles.push(tokio::spawn(async move {
            store.settle_proposal(&r).await.unwrap()
        }));
    }

    let mut settled = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Settlement::Settled(_) => settled += 1,
            other => assert_eq!(other, Settlement::ProposalClosed),
        }
    }
    assert_eq!(settled, 1);
    assert_eq!(store.list_reservations().await.unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// Reservations
// ---------------------------------------------------------------------------

#[tokio::test]
async fn reservation_update_and_delete() {
    let f = fixture().await;
    let p = proposal(&f.store, f.client.id, Some(f.car.id)).await;
    let reservation = assert_matches!(
        f.store
            .settle_proposal(&reservation_for(&p, &f.car, 500.0))
            .await
            .unwrap(),
        Settlement::Settled(r) => r
    );

    let updated = f
        .store
        .update_reservation(
            reservation.id,
            &UpdateReservation {
                payment_status: Some(PaymentStatus::Paid),
                return_location: Some("Tangier".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.payment_status, PaymentStatus::Paid);
    assert_eq!(updated.return_location, "Tangier");
    assert_eq!(updated.pickup_location, reservation.pickup_location);

    assert!(f
        .store
        .update_reservation(999, &UpdateReservation::default())
        .await
        .unwrap()
        .is_none());

    let deleted = f.store.delete_reservation(reservation.id).await.unwrap();
    assert_eq!(deleted.map(|r| r.id), Some(reservation.id));
    assert!(f.store.find_reservation(reservation.id).await.unwrap().is_none());
    assert!(f.store.delete_reservation(reservation.id).await.unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

fn note(user_id: i64, title: &str) -> NewNotification {
    NewNotification {
        user_id,
        title: title.to_string(),
        message: "body".to_string(),
        kind: NotificationKind::Offre,
        related_entity_id: None,
    }
}

#[tokio::test]
async fn inbox_counts_and_marks_read() {
    let f = fixture().await;
    let a = f.store.create_notification(&note(f.client.id, "a")).await.unwrap();
    f.store.create_notification(&note(f.client.id, "b")).await.unwrap();
    f.store.create_notification(&note(f.agency.id, "c")).await.unwrap();

    assert!(!a.is_read);
    assert_eq!(f.store.unread_count(f.client.id).await.unwrap(), 2);

    // Another user's notification cannot be marked.
    assert!(!f.store.mark_notification_read(a.id, f.agency.id).await.unwrap());
    assert!(f.store.mark_notification_read(a.id, f.client.id).await.unwrap());
    assert_eq!(f.store.unread_count(f.client.id).await.unwrap(), 1);

    let unread = f
        .store
        .list_notifications(f.client.id, true, 50, 0)
        .await
        .unwrap();
    assert_eq!(unread.len(), 1);
    assert_eq!(unread[0].title, "b");

    assert_eq!(f.store.mark_all_notifications_read(f.client.id).await.unwrap(), 1);
    assert_eq!(f.store.unread_count(f.client.id).await.unwrap(), 0);
    assert_eq!(f.store.unread_count(f.agency.id).await.unwrap(), 1);
}

#[tokio::test]
async fn inbox_is_paginated_newest_first() {
    let f = fixture().await;
    for title in ["1", "2", "3"] {
        f.store
            .create_notification(&note(f.client.id, title))
            .await
            .unwrap();
    }

    let page = f
        .store
        .list_notifications(f.client.id, false, 2, 0)
        .await
        .unwrap();
    assert_eq!(
        page.iter().map(|n| n.title.as_str()).collect::<Vec<_>>(),
        vec!["3", "2"]
    );
    let rest = f
        .store
        .list_notifications(f.client.id, false, 2, 2)
        .await
        .unwrap();
    assert_eq!(rest.len(), 1);
    assert_eq!(rest[0].title, "1");
}
