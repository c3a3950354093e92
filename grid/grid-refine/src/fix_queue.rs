//! Pending splits keyed by cell.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use grid_types::CellId;

use crate::params::RefinementFactor;

/// Cells waiting to be split, each with its refinement factor.
///
/// Holds at most one entry per cell. When a second request arrives for a
/// queued cell the entry becomes the element-wise maximum of both factors,
/// so a pending split is never weakened. Iteration is in ascending id order.
///
/// # Example
///
/// ```
/// use grid_refine::{FixQueue, RefinementFactor};
/// use grid_types::CellId;
///
/// let id = CellId::new(7);
/// let mut queue = FixQueue::new();
/// queue.push(id, RefinementFactor::new(2, 3));
/// queue.push(id, RefinementFactor::new(4, 1));
///
/// assert_eq!(queue.len(), 1);
/// assert_eq!(queue.get(id), Some(RefinementFactor::new(4, 3)));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixQueue {
    entries: BTreeMap<CellId, RefinementFactor>,
}

impl FixQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue every id with the same factor.
    #[must_use]
    pub fn with_uniform(ids: &[CellId], factor: RefinementFactor) -> Self {
        let mut queue = Self::new();
        for &id in ids {
            queue.push(id, factor);
        }
        queue
    }

    /// Request a split of `id`, max-merging with any pending request.
    pub fn push(&mut self, id: CellId, factor: RefinementFactor) {
        match self.entries.entry(id) {
            Entry::Vacant(slot) => {
                slot.insert(factor);
            }
            Entry::Occupied(mut slot) => {
                let merged = (*slot.get()).max(factor);
                slot.insert(merged);
            }
        }
    }

    /// Merge another queue into this one.
    pub fn merge(&mut self, other: &Self) {
        for (&id, &factor) in &other.entries {
            self.push(id, factor);
        }
    }

    /// Pending factor for `id`.
    #[must_use]
    pub fn get(&self, id: CellId) -> Option<RefinementFactor> {
        self.entries.get(&id).copied()
    }

    /// Whether `id` is queued.
    #[must_use]
    pub fn contains(&self, id: CellId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Number of queued cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Queued ids in ascending order.
    #[must_use]
    pub fn ids(&self) -> Vec<CellId> {
        self.entries.keys().copied().collect()
    }

    /// Iterate over `(id, factor)` in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (CellId, RefinementFactor)> + '_ {
        self.entries.iter().map(|(&id, &factor)| (id, factor))
    }
}

impl Extend<(CellId, RefinementFactor)> for FixQueue {
    fn extend<I: IntoIterator<Item = (CellId, RefinementFactor)>>(&mut self, iter: I) {
        for (id, factor) in iter {
            self.push(id, factor);
        }
    }
}

impl FromIterator<(CellId, RefinementFactor)> for FixQueue {
    fn from_iter<I: IntoIterator<Item = (CellId, RefinementFactor)>>(iter: I) -> Self {
        let mut queue = Self::new();
        queue.extend(iter);
        queue
    }
}

impl IntoIterator for FixQueue {
    type Item = (CellId, RefinementFactor);
    type IntoIter = std::collections::btree_map::IntoIter<CellId, RefinementFactor>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
