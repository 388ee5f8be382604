use std::collections::HashMap;

use kree_core::types::DbId;

/// Which connection currently represents each registered user.
///
/// One entry per user; registering again replaces the previous connection.
#[derive(Debug, Default)]
pub struct Presence {
    entries: HashMap<DbId, String>,
}

impl Presence {
    /// Map `user_id` to `conn_id`, returning the connection it replaced.
    pub fn register(&mut self, user_id: DbId, conn_id: &str) -> Option<String> {
        self.entries.insert(user_id, conn_id.to_string())
    }

    /// Remove the entry whose value is `conn_id`, if any.
    ///
    /// A connection that was superseded by a newer registration owns no
    /// entry, so its disconnect leaves the newer mapping untouched.
    pub fn unregister_conn(&mut self, conn_id: &str) -> Option<DbId> {
        let user_id = self
            .entries
            .iter()
            .find(|(_, c)| c.as_str() == conn_id)
            .map(|(user_id, _)| *user_id)?;
        self.entries.remove(&user_id);
        Some(user_id)
    }

    pub fn lookup(&self, user_id: DbId) -> Option<&str> {
        self.entries.get(&user_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_replaces_stale_connection() {
        let mut presence = Presence::default();
        assert_eq!(presence.register(7, "old"), None);
        assert_eq!(presence.register(7, "new"), Some("old".to_string()));

        assert_eq!(presence.lookup(7), Some("new"));
        assert_eq!(presence.len(), 1);
    }

    #[test]
    fn superseded_disconnect_keeps_newer_mapping() {
        let mut presence = Presence::default();
        presence.register(7, "old");
        presence.register(7, "new");

        assert_eq!(presence.unregister_conn("old"), None);
        assert_eq!(presence.lookup(7), Some("new"));

        assert_eq!(presence.unregister_conn("new"), Some(7));
        assert!(presence.is_empty());
    }

    #[test]
    fn unregister_removes_exactly_one_entry() {
        let mut presence = Presence::default();
        presence.register(1, "a");
        presence.register(2, "b");

        presence.unregister_conn("a");

        assert_eq!(presence.lookup(1), None);
        assert_eq!(presence.lookup(2), Some("b"));
    }
}
