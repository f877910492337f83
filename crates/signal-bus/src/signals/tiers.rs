//! Priority tiers of a binding.

use std::collections::BTreeMap;

use crate::signals::receiver::ReceiverId;
use crate::signals::types::Priority;

/// A subscriber entry inside a tier
#[derive(Clone)]
pub(crate) struct Entry<C> {
    pub(crate) id: ReceiverId,
    pub(crate) callback: C,
}

/// Ordered mapping from priority to the entries registered at that priority.
///
/// Tiers exist only while they hold at least one entry.
pub(crate) struct Tiers<C> {
    tiers: BTreeMap<Priority, Vec<Entry<C>>>,
}

impl<C: Clone> Tiers<C> {
    pub(crate) fn new() -> Self {
        Self {
            tiers: BTreeMap::new(),
        }
    }

    /// Append an entry to the tier for `priority`, creating the tier if needed
    pub(crate) fn insert(&mut self, priority: Priority, id: ReceiverId, callback: C) {
        self.tiers
            .entry(priority)
            .or_default()
            .push(Entry { id, callback });
    }

    /// Remove the first entry with `id` from the tier for `priority`
    pub(crate) fn remove(&mut self, priority: Priority, id: ReceiverId) -> bool {
        let Some(entries) = self.tiers.get_mut(&priority) else {
            return false;
        };

        let removed = match entries.iter().position(|entry| entry.id == id) {
            Some(idx) => {
                entries.remove(idx);
                true
            }
            None => false,
        };

        if entries.is_empty() {
            self.tiers.remove(&priority);
        }
        removed
    }

    /// Callbacks in dispatch order: descending priority, insertion order within a tier
    pub(crate) fn snapshot(&self) -> Vec<C> {
        self.tiers
            .values()
            .rev()
            .flat_map(|entries| entries.iter().map(|entry| entry.callback.clone()))
            .collect()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    /// Total number of entries across all tiers
    pub(crate) fn len(&self) -> usize {
        self.tiers.values().map(Vec::len).sum()
    }

    /// Priorities that currently have a tier, highest first
    pub(crate) fn priorities(&self) -> Vec<Priority> {
        self.tiers.keys().rev().copied().collect()
    }
}
