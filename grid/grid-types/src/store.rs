//! Arena of live grid cells.

use std::fmt;

use crate::bounds::Rect;
use crate::cell::Cell;
use crate::error::{GridError, GridResult};

/// Stable identifier of a cell inside a [`CellStore`].
///
/// Ids are handed out in increasing order and never reused by the same store.
/// A cell that is split disappears together with its id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellId(usize);

impl CellId {
    /// Wrap a raw index.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// The raw index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Owner of the current set of live cells.
///
/// Cells live in slots indexed by [`CellId`]; deleting a cell empties its
/// slot. Iteration is always in ascending id order, which keeps refinement
/// deterministic.
///
/// The store is `Clone`, so callers that want undo can snapshot it before a
/// refinement.
///
/// # Example
///
/// ```
/// use grid_types::{Cell, CellStore};
///
/// let mut store = CellStore::new();
/// let a = store.insert(Cell::from_extents(0.0, 0.0, 1.0, 1.0)?);
/// let b = store.insert(Cell::from_extents(1.0, 0.0, 2.0, 1.0)?);
/// assert_eq!(store.len(), 2);
///
/// let removed = store.delete(&[a])?;
/// assert_eq!(removed.len(), 1);
/// assert!(!store.contains(a));
/// assert!(store.get(b).is_some());
/// # Ok::<(), grid_types::GridError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct CellStore {
    slots: Vec<Option<Cell>>,
    live: usize,
}

impl CellStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a cell and return its new id.
    pub fn insert(&mut self, cell: Cell) -> CellId {
        let id = CellId(self.slots.len());
        self.slots.push(Some(cell));
        self.live += 1;
        id
    }

    /// Insert several cells, returning their ids in input order.
    pub fn insert_many(&mut self, cells: impl IntoIterator<Item = Cell>) -> Vec<CellId> {
        cells.into_iter().map(|cell| self.insert(cell)).collect()
    }

    /// Remove cells and return them in the order of `ids`.
    ///
    /// The whole batch is checked before anything is removed, so on error the
    /// store is unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::UnknownCell`] if an id is not live, including an
    /// id listed twice.
    pub fn delete(&mut self, ids: &[CellId]) -> GridResult<Vec<Cell>> {
        let mut seen = vec![false; self.slots.len()];
        for &id in ids {
            match seen.get_mut(id.0) {
                Some(flag) if !*flag && self.contains(id) => *flag = true,
                _ => return Err(GridError::UnknownCell(id)),
            }
        }

        let mut removed = Vec::with_capacity(ids.len());
        for &id in ids {
            if let Some(cell) = self.slots[id.0].take() {
                removed.push(cell);
            }
        }
        self.live -= removed.len();
        Ok(removed)
    }

    /// Look up a live cell.
    #[must_use]
    pub fn get(&self, id: CellId) -> Option<&Cell> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    /// Mutable access to a live cell's attributes and geometry.
    #[must_use]
    pub fn get_mut(&mut self, id: CellId) -> Option<&mut Cell> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Whether `id` refers to a live cell.
    #[must_use]
    pub fn contains(&self, id: CellId) -> bool {
        self.get(id).is_some()
    }

    /// Number of live cells.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.live
    }

    /// Whether the store holds no live cells.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Iterate over live cells in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (CellId, &Cell)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|cell| (CellId(i), cell)))
    }

    /// Ids of all live cells in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = CellId> + '_ {
        self.iter().map(|(id, _)| id)
    }

    /// Bounding rectangle of every live cell, or `None` when empty.
    #[must_use]
    pub fn bounds(&self) -> Option<Rect> {
        self.iter()
            .map(|(_, cell)| cell.bounds())
            .reduce(|acc, b| acc.union(&b))
    }
}

impl FromIterator<Cell> for CellStore {
    fn from_iter<I: IntoIterator<Item = Cell>>(iter: I) -> Self {
        let mut store = Self::new();
        store.insert_many(iter);
        store
    }
}
