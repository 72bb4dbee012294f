//! User-controlled expansion of collapsed clusters.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::dose::EventId;

/// Identity of a cluster: its member ids, sorted and de-duplicated.
///
/// Two clusters with the same members have the same key regardless of scan
/// order, so expansion survives a re-render that rebuilds the groups.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClusterKey(Vec<EventId>);

impl ClusterKey {
    pub fn from_members<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = EventId>,
    {
        let mut ids: Vec<EventId> = ids.into_iter().collect();
        ids.sort();
        ids.dedup();
        Self(ids)
    }

    pub fn ids(&self) -> &[EventId] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, id: &EventId) -> bool {
        self.0.binary_search(id).is_ok()
    }
}

/// Set of clusters the user has expanded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpansionState {
    expanded: BTreeSet<ClusterKey>,
}

impl ExpansionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_expanded(&self, key: &ClusterKey) -> bool {
        self.expanded.contains(key)
    }

    pub fn expand(&mut self, key: ClusterKey) {
        self.expanded.insert(key);
    }

    pub fn collapse(&mut self, key: &ClusterKey) {
        self.expanded.remove(key);
    }

    /// Flip a cluster's state. Returns whether it is now expanded.
    pub fn toggle(&mut self, key: ClusterKey) -> bool {
        if self.expanded.remove(&key) {
            false
        } else {
            self.expanded.insert(key);
            true
        }
    }

    pub fn clear(&mut self) {
        self.expanded.clear();
    }

    /// Forget keys of clusters that no longer exist.
    pub fn retain_present<'a, I>(&mut self, present: I)
    where
        I: IntoIterator<Item = &'a ClusterKey>,
    {
        let present: BTreeSet<&ClusterKey> = present.into_iter().collect();
        self.expanded.retain(|key| present.contains(key));
    }

    pub fn len(&self) -> usize {
        self.expanded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expanded.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClusterKey> {
        self.expanded.iter()
    }
}

impl FromIterator<ClusterKey> for ExpansionState {
    fn from_iter<I: IntoIterator<Item = ClusterKey>>(iter: I) -> Self {
        Self {
            expanded: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(ids: &[&str]) -> ClusterKey {
        ClusterKey::from_members(ids.iter().map(|s| EventId::from(*s)))
    }

    #[test]
    fn key_is_order_independent() {
        assert_eq!(key(&["b", "a", "c"]), key(&["c", "b", "a"]));
        assert_eq!(key(&["a", "a", "b"]).len(), 2);
        assert!(key(&["x", "y"]).contains(&EventId::from("y")));
    }

    #[test]
    fn toggle_round_trip() {
        let mut state = ExpansionState::new();
        assert!(state.toggle(key(&["a", "b"])));
        assert!(state.is_expanded(&key(&["b", "a"])));
        assert!(!state.toggle(key(&["a", "b"])));
        assert!(state.is_empty());
    }

    #[test]
    fn retain_present_drops_stale_keys() {
        let mut state: ExpansionState = [key(&["a", "b"]), key(&["c", "d"])].into_iter().collect();
        let still_there = [key(&["c", "d"])];
        state.retain_present(still_there.iter());
        assert_eq!(state.len(), 1);
        assert!(state.is_expanded(&key(&["c", "d"])));
    }
}
