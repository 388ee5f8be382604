//! Status enumerations stored as lowercase text.
//!
//! Each enum serializes to the same string it is stored under, parses back
//! through [`FromStr`](std::str::FromStr), and converts from `String` so the
//! db layer can decode rows with `#[sqlx(try_from = "String")]`.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A string that is not one of an enumeration's known values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid {kind} '{value}'. Must be one of: {expected}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
    pub expected: String,
}

impl ParseEnumError {
    fn new(kind: &'static str, value: &str, expected: &[&str]) -> Self {
        Self {
            kind,
            value: value.to_string(),
            expected: expected.join(", "),
        }
    }
}

impl From<ParseEnumError> for CoreError {
    fn from(err: ParseEnumError) -> Self {
        CoreError::Validation(err.to_string())
    }
}

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident ($kind:literal) {
            $( $(#[$vmeta:meta])* $variant:ident = $val:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "&'static str")]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Every variant in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Return the stored string form.
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $val),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($val => Ok($name::$variant),)+
                    other => Err(ParseEnumError::new($kind, other, &[$($val),+])),
                }
            }
        }

        impl From<$name> for &'static str {
            fn from(value: $name) -> Self {
                value.as_str()
            }
        }

        impl TryFrom<String> for $name {
            type Error = ParseEnumError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }
    };
}

define_status_enum! {
    /// Lifecycle of a client's price proposal.
    ProposalStatus("proposal status") {
        Pending = "pending",
        Accepted = "accepted",
        Rejected = "rejected",
    }
}

define_status_enum! {
    /// Lifecycle of a single agency offer.
    OfferStatus("offer status") {
        Pending = "pending",
        Accepted = "accepted",
        Rejected = "rejected",
    }
}

define_status_enum! {
    /// The answer a client may give to an offer.
    OfferAnswer("offer answer") {
        Accepted = "accepted",
        Rejected = "rejected",
    }
}

define_status_enum! {
    /// Agency-managed reservation status.
    ReservationStatus("reservation status") {
        Pending = "pending",
        Accepted = "accepted",
        Rejected = "rejected",
    }
}

define_status_enum! {
    /// Payment label on a reservation. No payment is processed.
    PaymentStatus("payment status") {
        Pending = "pending",
        Paid = "paid",
        Refused = "refused",
    }
}

define_status_enum! {
    /// Free-form category tag on an inbox notification.
    NotificationKind("notification type") {
        Info = "info",
        Offre = "offre",
        Reservation = "reservation",
        Delivery = "delivery",
        DeliveryFinal = "delivery-final",
    }
}

impl ProposalStatus {
    /// Only pending proposals accept offers or settlement.
    pub fn is_open(self) -> bool {
        self == ProposalStatus::Pending
    }
}

impl OfferStatus {
    pub fn is_pending(self) -> bool {
        self == OfferStatus::Pending
    }
}

impl From<OfferAnswer> for OfferStatus {
    fn from(answer: OfferAnswer) -> Self {
        match answer {
            OfferAnswer::Accepted => OfferStatus::Accepted,
            OfferAnswer::Rejected => OfferStatus::Rejected,
        }
    }
}

impl ReservationStatus {
    /// Agencies may revise a reservation status in any direction.
    pub fn can_transition_to(self, _next: ReservationStatus) -> bool {
        true
    }
}

impl PaymentStatus {
    /// `paid` is terminal; every other label may change freely.
    pub fn can_transition_to(self, next: PaymentStatus) -> bool {
        match self {
            PaymentStatus::Paid => next == PaymentStatus::Paid,
            PaymentStatus::Pending | PaymentStatus::Refused => true,
        }
    }
}

/// Check a reservation status change against the transition table.
pub fn check_reservation_transition(
    from: ReservationStatus,
    to: ReservationStatus,
) -> Result<(), CoreError> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(CoreError::Conflict(format!(
            "Reservation status cannot change from '{from}' to '{to}'"
        )))
    }
}

/// Check a payment status change against the transition table.
pub fn check_payment_transition(from: PaymentStatus, to: PaymentStatus) -> Result<(), CoreError> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(CoreError::Conflict(format!(
            "Payment status cannot change from '{from}' to '{to}'"
        )))
    }
}
