use std::collections::{BTreeSet, HashMap};
use std::fmt;

use kree_core::types::DbId;

/// A named broadcast group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Group {
    /// Every connection registered as an agency.
    Agencies,
    /// The private group of one user.
    User(DbId),
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Group::Agencies => f.write_str("agencies"),
            Group::User(id) => write!(f, "user:{id}"),
        }
    }
}

/// Group membership keyed by connection id.
#[derive(Debug, Default)]
pub struct Groups {
    members: HashMap<Group, BTreeSet<String>>,
}

impl Groups {
    /// Add `conn_id` to `group`. Joining twice is a no-op.
    pub fn join(&mut self, group: Group, conn_id: &str) {
        self.members
            .entry(group)
            .or_default()
            .insert(conn_id.to_string());
    }

    /// Remove `conn_id` from `group`.
    pub fn leave(&mut self, group: Group, conn_id: &str) {
        if let Some(conns) = self.members.get_mut(&group) {
            conns.remove(conn_id);
            if conns.is_empty() {
                self.members.remove(&group);
            }
        }
    }

    /// Remove `conn_id` from every group, dropping groups that become empty.
    pub fn leave_all(&mut self, conn_id: &str) {
        self.members.retain(|_, conns| {
            conns.remove(conn_id);
            !conns.is_empty()
        });
    }

    /// Connection ids currently in `group`.
    pub fn members(&self, group: Group) -> Vec<String> {
        self.members
            .get(&group)
            .map(|conns| conns.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Groups `conn_id` belongs to, in a stable order.
    pub fn groups_of(&self, conn_id: &str) -> Vec<Group> {
        let mut groups: Vec<Group> = self
            .members
            .iter()
            .filter(|(_, conns)| conns.contains(conn_id))
            .map(|(group, _)| *group)
            .collect();
        groups.sort();
        groups
    }
}
