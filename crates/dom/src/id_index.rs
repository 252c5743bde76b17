//! `id` value to connected element mapping.
//!
//! An element is listed under `v` exactly while it is connected and its `id`
//! attribute equals `v`. When several connected elements share a value they
//! are all kept, in the order they claimed it; lookups answer with the most
//! recent claimant. Empty values are never indexed.

use std::collections::HashMap;

use indextree::NodeId;
use log::trace;
use smallvec::SmallVec;

#[derive(Clone, Debug, Default)]
/// `id` value to the connected elements claiming it, in claim order.
pub struct IdIndex {
    entries: HashMap<String, SmallVec<[NodeId; 1]>>,
}

impl IdIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `node` as a claimant of `id`.
    pub fn insert(&mut self, id: &str, node: NodeId) {
        if id.is_empty() {
            return;
        }
        trace!("id index: insert '{id}' -> {node:?}");
        let claimants = self.entries.entry(id.to_owned()).or_default();
        claimants.retain(|claimant| *claimant != node);
        claimants.push(node);
    }

    /// Drop `node` as a claimant of `id`. Returns whether it was listed.
    pub fn remove(&mut self, id: &str, node: NodeId) -> bool {
        let Some(claimants) = self.entries.get_mut(id) else {
            return false;
        };
        let before = claimants.len();
        claimants.retain(|claimant| *claimant != node);
        let removed = claimants.len() != before;
        if claimants.is_empty() {
            self.entries.remove(id);
        }
        if removed {
            trace!("id index: remove '{id}' -> {node:?}");
        }
        removed
    }

    /// Move `node` from `old` to `new`. Either side may be empty.
    pub fn update(&mut self, old: &str, new: &str, node: NodeId) {
        if !old.is_empty() {
            self.remove(old, node);
        }
        if !new.is_empty() {
            self.insert(new, node);
        }
    }

    /// The element currently answering for `id`.
    pub fn lookup(&self, id: &str) -> Option<NodeId> {
        self.entries
            .get(id)
            .and_then(|claimants| claimants.last().copied())
    }

    /// Every connected element claiming `id`, oldest first.
    pub fn claimants(&self, id: &str) -> &[NodeId] {
        self.entries
            .get(id)
            .map(SmallVec::as_slice)
            .unwrap_or_default()
    }

    /// Number of distinct indexed values.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
