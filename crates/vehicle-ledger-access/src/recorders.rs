use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use vehicle_ledger_types::Identity;

/// The set of identities currently allowed to append records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecorderSet {
    members: HashSet<Identity>,
}

impl RecorderSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if `id` was not already a member.
    pub fn grant(&mut self, id: Identity) -> bool {
        self.members.insert(id)
    }

    /// Returns `true` if `id` was a member.
    pub fn revoke(&mut self, id: &Identity) -> bool {
        self.members.remove(id)
    }

    pub fn contains(&self, id: &Identity) -> bool {
        self.members.contains(id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Members in a stable (sorted) order.
    pub fn to_sorted_vec(&self) -> Vec<Identity> {
        let mut members: Vec<Identity> = self.members.iter().cloned().collect();
        members.sort();
        members
    }
}

impl FromIterator<Identity> for RecorderSet {
    fn from_iter<I: IntoIterator<Item = Identity>>(iter: I) -> Self {
        Self {
            members: iter.into_iter().collect(),
        }
    }
}
