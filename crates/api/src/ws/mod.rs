//! WebSocket infrastructure for real-time communication.
//!
//! Provides connection management with presence and broadcast groups, the
//! JSON event protocol, heartbeat monitoring, and the HTTP upgrade handler.

pub mod groups;
mod handler;
mod heartbeat;
pub mod manager;
pub mod presence;
pub mod protocol;

pub use groups::Group;
pub use handler::{ws_handler, WsCaller};
pub use heartbeat::start_heartbeat;
pub use manager::WsManager;
