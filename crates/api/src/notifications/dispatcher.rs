use std::sync::Arc;

use kree_core::error::CoreError;
use kree_core::status::NotificationKind;
use kree_core::types::DbId;
use kree_db::models::notification::{NewNotification, Notification};
use kree_db::store::MarketStore;

use crate::ws::protocol::Outbound;
use crate::ws::{Group, WsManager};

/// Persists notifications and pushes them to recipients who are online.
///
/// The record is always written first. Delivery over the socket is
/// at-most-once and never retried; an offline recipient finds the record in
/// their inbox.
pub struct NotificationDispatcher {
    store: Arc<dyn MarketStore>,
    ws_manager: Arc<WsManager>,
}

impl NotificationDispatcher {
    pub fn new(store: Arc<dyn MarketStore>, ws_manager: Arc<WsManager>) -> Self {
        Self { store, ws_manager }
    }

    /// Persist a notification for `recipient_id`, then push it if they are present.
    pub async fn notify(
        &self,
        recipient_id: DbId,
        title: &str,
        message: String,
        kind: NotificationKind,
        related_entity_id: Option<DbId>,
    ) -> Result<Notification, CoreError> {
        let record = self
            .store
            .create_notification(&NewNotification {
                user_id: recipient_id,
                title: title.to_string(),
                message,
                kind,
                related_entity_id,
            })
            .await
            .map_err(|e| {
                tracing::error!(recipient_id, kind = %kind, error = %e, "Failed to persist notification");
                CoreError::Internal(format!("Failed to persist notification: {e}"))
            })?;

        let pushed = self
            .push_to_user(recipient_id, &Outbound::Notification(record.clone()))
            .await;
        tracing::debug!(
            notification_id = record.id,
            recipient_id,
            kind = %kind,
            pushed,
            "Notification dispatched"
        );
        Ok(record)
    }

    /// Push `event` to the private group of `user_id` if they are present.
    ///
    /// Returns whether any connection received it.
    pub async fn push_to_user(&self, user_id: DbId, event: &Outbound) -> bool {
        if self.ws_manager.lookup(user_id).await.is_none() {
            return false;
        }
        self.ws_manager.push(Group::User(user_id), event).await > 0
    }

    /// Push `event` to every registered agency connection.
    pub async fn broadcast_agencies(&self, event: &Outbound) -> usize {
        self.ws_manager.push(Group::Agencies, event).await
    }
}
