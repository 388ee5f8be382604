//! Durable notifications with best-effort real-time push.

mod dispatcher;

pub use dispatcher::NotificationDispatcher;
