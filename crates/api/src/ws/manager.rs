use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::ws::Message;
use kree_core::roles::Caller;
use kree_core::types::{DbId, Timestamp};
use tokio::sync::{mpsc, RwLock};

use crate::ws::groups::{Group, Groups};
use crate::ws::presence::Presence;
use crate::ws::protocol::Outbound;

/// Channel sender half for pushing messages to a WebSocket connection.
pub type WsSender = mpsc::UnboundedSender<Message>;

/// Metadata for a single WebSocket connection.
pub struct WsConnection {
    /// Identity taken from the access token presented at upgrade.
    pub caller: Caller,
    /// Channel sender for outbound messages to this connection.
    pub sender: WsSender,
    /// When this connection was established.
    pub connected_at: Timestamp,
}

#[derive(Default)]
struct Registry {
    connections: HashMap<String, WsConnection>,
    presence: Presence,
    groups: Groups,
}

impl Registry {
    fn send(&self, conn_id: &str, message: Message) -> bool {
        self.connections
            .get(conn_id)
            .is_some_and(|conn| conn.sender.send(message).is_ok())
    }
}

/// Manages all active WebSocket connections, user presence, and groups.
///
/// Everything lives behind one `RwLock`, so registering, unregistering, and
/// group changes are atomic with respect to each other. Designed to be
/// wrapped in `Arc` and shared across the application.
pub struct WsManager {
    registry: RwLock<Registry>,
}

impl WsManager {
    /// Create a new, empty connection manager.
    pub fn new() -> Self {
        Self {
            registry: RwLock::new(Registry::default()),
        }
    }

    /// Register a new connection.
    ///
    /// Returns the receiver half of the message channel so the caller can
    /// forward messages to the WebSocket sink.
    pub async fn add(&self, conn_id: String, caller: Caller) -> mpsc::UnboundedReceiver<Message> {
        let (tx, rx) = mpsc::unbounded_channel();
        let conn = WsConnection {
            caller,
            sender: tx,
            connected_at: chrono::Utc::now(),
        };
        self.registry.write().await.connections.insert(conn_id, conn);
        rx
    }

    /// Remove a connection, its presence entry, and its group memberships.
    pub async fn remove(&self, conn_id: &str) {
        let mut registry = self.registry.write().await;
        if let Some(conn) = registry.connections.remove(conn_id) {
            let alive_secs = (chrono::Utc::now() - conn.connected_at).num_seconds();
            tracing::debug!(conn_id, user_id = conn.caller.user_id, alive_secs, "Connection removed");
        }
        if let Some(user_id) = registry.presence.unregister_conn(conn_id) {
            tracing::debug!(conn_id, user_id, "Presence cleared");
        }
        registry.groups.leave_all(conn_id);
    }

    /// Map `user_id` to `conn_id` and join its private group.
    ///
    /// Returns the connection's groups after registering.
    pub async fn register_client(&self, conn_id: &str, user_id: DbId) -> Vec<Group> {
        self.register(conn_id, user_id, &[Group::User(user_id)]).await
    }

    /// As [`register_client`](Self::register_client), plus the `agencies` group.
    pub async fn register_agency(&self, conn_id: &str, agency_id: DbId) -> Vec<Group> {
        self.register(conn_id, agency_id, &[Group::User(agency_id), Group::Agencies])
            .await
    }

    async fn register(&self, conn_id: &str, user_id: DbId, groups: &[Group]) -> Vec<Group> {
        let mut registry = self.registry.write().await;
        if let Some(previous) = registry.presence.register(user_id, conn_id) {
            if previous != conn_id {
                // The stale connection stops receiving this user's pushes.
                registry.groups.leave(Group::User(user_id), &previous);
                tracing::debug!(user_id, previous = %previous, conn_id, "Replaced stale presence");
            }
        }
        for group in groups {
            registry.groups.join(*group, conn_id);
        }
        registry.groups.groups_of(conn_id)
    }

    /// The connection currently representing `user_id`, if any.
    pub async fn lookup(&self, user_id: DbId) -> Option<String> {
        self.registry
            .read()
            .await
            .presence
            .lookup(user_id)
            .map(str::to_string)
    }

    /// Connection ids in `group`.
    pub async fn group_members(&self, group: Group) -> Vec<String> {
        self.registry.read().await.groups.members(group)
    }

    /// Send a raw message to every member of `group`.
    ///
    /// Returns the number of connections the message was queued for. Closed
    /// channels are skipped; their connections are cleaned up on disconnect.
    pub async fn send_to_group(&self, group: Group, message: Message) -> usize {
        let registry = self.registry.read().await;
        registry
            .groups
            .members(group)
            .iter()
            .filter(|conn_id| registry.send(conn_id, message.clone()))
            .count()
    }

    /// Send a raw message to one connection.
    pub async fn send_to_conn(&self, conn_id: &str, message: Message) -> bool {
        self.registry.read().await.send(conn_id, message)
    }

    /// Encode `event` and send it to every member of `group`.
    pub async fn push(&self, group: Group, event: &Outbound) -> usize {
        match event.to_message() {
            Ok(message) => {
                let sent = self.send_to_group(group, message).await;
                tracing::debug!(event = event.name(), group = %group, sent, "Pushed event");
                sent
            }
            Err(e) => {
                tracing::error!(event = event.name(), error = %e, "Failed to encode event");
                0
            }
        }
    }

    /// Encode `event` and send it to one connection.
    pub async fn push_to_conn(&self, conn_id: &str, event: &Outbound) -> bool {
        match event.to_message() {
            Ok(message) => self.send_to_conn(conn_id, message).await,
            Err(e) => {
                tracing::error!(event = event.name(), error = %e, "Failed to encode event");
                false
            }
        }
    }

    /// Return the current number of active connections.
    pub async fn connection_count(&self) -> usize {
        self.registry.read().await.connections.len()
    }

    /// Return the number of users with a live registration.
    pub async fn present_count(&self) -> usize {
        self.registry.read().await.presence.len()
    }

    /// Send a Close frame to every connection, then clear all state.
    ///
    /// Used during graceful shutdown to notify all clients before the
    /// server stops.
    pub async fn shutdown_all(&self) {
        let mut registry = self.registry.write().await;
        let count = registry.connections.len();
        for conn in registry.connections.values() {
            let _ = conn.sender.send(Message::Close(None));
        }
        *registry = Registry::default();
        tracing::info!(count, "Closed all WebSocket connections");
    }

    /// Send a Ping frame to every connected client.
    pub async fn ping_all(&self) {
        let registry = self.registry.read().await;
        for conn in registry.connections.values() {
            let _ = conn.sender.send(Message::Ping(Bytes::new()));
        }
    }
}

impl Default for WsManager {
    fn default() -> Self {
        Self::new()
    }
}
