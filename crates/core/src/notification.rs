//! Notification wording for every negotiation event.
//!
//! Titles are constants so tests and clients can match on them; messages are
//! built from the populated entity names.

use crate::types::Amount;

pub const TITLE_OFFER_RECEIVED: &str = "New offer received!";
pub const TITLE_OFFER_ACCEPTED: &str = "Offer Accepted and Reservation Created";
pub const TITLE_OFFER_REJECTED: &str = "Offer Rejected";
pub const TITLE_PROPOSAL_ACCEPTED: &str = "Your Price Was Accepted";

/// Render an amount without a trailing `.0` when it is whole.
pub fn format_amount(amount: Amount) -> String {
    if amount.fract() == 0.0 && amount.abs() < 1e15 {
        format!("{}", amount as i64)
    } else {
        format!("{amount:.2}")
    }
}

/// Sent to the client when an agency makes an offer.
pub fn offer_received_message(agency_name: &str, price: Amount) -> String {
    format!(
        "The agency {agency_name} offers you {} MAD for your trip.",
        format_amount(price)
    )
}

/// Sent to the agency when the client accepts its offer.
pub fn offer_accepted_message(client_name: &str, price: Amount, car_model: &str) -> String {
    format!(
        "The client {client_name} has accepted your offer of {} DHS for the {car_model}. \
         A reservation has been created.",
        format_amount(price)
    )
}

/// Sent to the agency when the client refuses its offer.
pub fn offer_rejected_message(car_brand: &str) -> String {
    format!("Your offer for {car_brand} has been REFUSED by the client.")
}

/// Sent to the client when an agency accepts the proposal as-is.
pub fn proposal_accepted_message(agency_name: &str, price: Amount, car_model: &str) -> String {
    format!(
        "The agency {agency_name} accepted your price of {} MAD for the {car_model}. \
         A reservation has been created.",
        format_amount(price)
    )
}
