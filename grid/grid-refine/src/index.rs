//! Bounding-box index over the live cells of a store.
//!
//! The index is a bulk-loaded R-tree snapshot. It is rebuilt from scratch
//! after every refinement iteration rather than updated in place, so ids it
//! returns are only meaningful until the store is next mutated.

use grid_types::{CellId, CellStore, Rect};
use rstar::primitives::{GeomWithData, Rectangle};
use rstar::{AABB, RTree};

type IndexedCell = GeomWithData<Rectangle<[f64; 2]>, CellId>;

/// Read-only spatial index of cell bounding boxes.
///
/// # Example
///
/// ```
/// use grid_refine::SpatialIndex;
/// use grid_types::{Cell, CellStore, Rect};
///
/// let mut store = CellStore::new();
/// let a = store.insert(Cell::from_extents(0.0, 0.0, 1.0, 1.0)?);
/// let b = store.insert(Cell::from_extents(1.0, 0.0, 2.0, 1.0)?);
/// store.insert(Cell::from_extents(5.0, 0.0, 6.0, 1.0)?);
///
/// let index = SpatialIndex::build(&store);
/// let hits = index.intersecting(&Rect::from_extents(0.0, 0.0, 1.0, 1.0));
/// assert_eq!(hits, vec![a, b]);
/// # Ok::<(), grid_types::GridError>(())
/// ```
#[derive(Debug)]
pub struct SpatialIndex {
    tree: RTree<IndexedCell>,
}

impl SpatialIndex {
    /// Bulk-load an index over every live cell of `store`.
    #[must_use]
    pub fn build(store: &CellStore) -> Self {
        let entries: Vec<IndexedCell> = store
            .iter()
            .map(|(id, cell)| {
                let bounds = cell.bounds();
                GeomWithData::new(
                    Rectangle::from_corners(
                        [bounds.min.x, bounds.min.y],
                        [bounds.max.x, bounds.max.y],
                    ),
                    id,
                )
            })
            .collect();

        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// Ids of every cell whose bounding box intersects `query`.
    ///
    /// Boxes that only touch `query` along an edge or at a corner are
    /// included. Results are sorted by id.
    #[must_use]
    pub fn intersecting(&self, query: &Rect) -> Vec<CellId> {
        let envelope = AABB::from_corners([query.min.x, query.min.y], [query.max.x, query.max.y]);
        let mut ids: Vec<CellId> = self
            .tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|entry| entry.data)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Number of indexed cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Whether the index is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use grid_types::Cell;

    fn grid_3x3() -> CellStore {
        let mut store = CellStore::new();
        for row in 0..3 {
            for col in 0..3 {
                let x = f64::from(col);
                let y = f64::from(row);
                store.insert(Cell::from_extents(x, y, x + 1.0, y + 1.0).unwrap());
            }
        }
        store
    }

    #[test]
    fn test_center_query_hits_all_touching() {
        let store = grid_3x3();
        let index = SpatialIndex::build(&store);
        assert_eq!(index.len(), 9);

        let hits = index.intersecting(&Rect::from_extents(1.0, 1.0, 2.0, 2.0));
        assert_eq!(hits.len(), 9);
    }

    #[test]
    fn test_corner_query() {
        let store = grid_3x3();
        let index = SpatialIndex::build(&store);
        let hits = index.intersecting(&Rect::from_extents(0.0, 0.0, 1.0, 1.0));
        // Itself, east, north and the north-east diagonal
        assert_eq!(hits.len(), 4);
    }

    #[test]
    fn test_disjoint_query() {
        let store = grid_3x3();
        let index = SpatialIndex::build(&store);
        assert!(index.intersecting(&Rect::from_extents(10.0, 10.0, 11.0, 11.0)).is_empty());
    }

    #[test]
    fn test_rebuild_reflects_deletions() {
        let mut store = grid_3x3();
        store.delete(&[CellId::new(4)]).unwrap();
        let index = SpatialIndex::build(&store);
        let hits = index.intersecting(&Rect::from_extents(1.2, 1.2, 1.8, 1.8));
        assert!(hits.is_empty());
        assert_eq!(index.len(), 8);
    }

    #[test]
    fn test_empty_store() {
        let index = SpatialIndex::build(&CellStore::new());
        assert!(index.is_empty());
        assert!(index.intersecting(&Rect::from_extents(0.0, 0.0, 1.0, 1.0)).is_empty());
    }
}
