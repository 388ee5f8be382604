pub mod notification;
pub mod offer;
pub mod proposal;
pub mod reservation;
