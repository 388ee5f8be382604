//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that accept
//! `&PgPool` (or an open transaction) as the first argument.

pub mod car_repo;
pub mod notification_repo;
pub mod offer_repo;
pub mod price_proposal_repo;
pub mod reservation_repo;
pub mod user_repo;

pub use car_repo::CarRepo;
pub use notification_repo::NotificationRepo;
pub use offer_repo::OfferRepo;
pub use price_proposal_repo::PriceProposalRepo;
pub use reservation_repo::ReservationRepo;
pub use user_repo::UserRepo;
