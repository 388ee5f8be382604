//! Notification entity models and DTOs.

use kree_core::status::NotificationKind;
use kree_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `notifications` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: DbId,
    /// Recipient.
    pub user_id: DbId,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    #[sqlx(try_from = "String")]
    pub kind: NotificationKind,
    pub is_read: bool,
    pub related_entity_id: Option<DbId>,
    pub created_at: Timestamp,
}

/// DTO for inserting a notification.
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: DbId,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub related_entity_id: Option<DbId>,
}
