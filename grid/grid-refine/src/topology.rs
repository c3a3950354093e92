//! Neighbor-size rule checks across cell boundaries.

use std::fmt;

use grid_types::{Cell, CellId, CellStore, Tolerance};
use hashbrown::HashSet;
use tracing::{trace, warn};

use crate::error::{ConsistencyError, RefineResult};
use crate::fix_queue::FixQueue;
use crate::index::SpatialIndex;
use crate::neighbors::{DirectionCode, find_neighbors};
use crate::params::{RefinementFactor, TopologyRule};

/// Size of `neighbor` relative to `cell` along their shared boundary.
///
/// East/West neighbors share a vertical edge, so heights are compared;
/// North/South neighbors compare widths. `None` for non-orthogonal directions.
#[must_use]
pub fn boundary_ratio(cell: &Cell, neighbor: &Cell, direction: DirectionCode) -> Option<f64> {
    if direction.is_horizontal() {
        Some(neighbor.height() / cell.height())
    } else if direction.is_vertical() {
        Some(neighbor.width() / cell.width())
    } else {
        None
    }
}

/// Whether the boundary between `cell` and `neighbor` satisfies `rule`.
///
/// Only the case where `neighbor` is the larger cell can fail: the boundary
/// is valid when the size ratio is at most 1 or at most the rule's maximum
/// ratio, both up to tolerance. [`TopologyRule::None`] accepts everything.
/// Non-orthogonal directions are not boundaries and return `false`.
///
/// # Example
///
/// ```
/// use grid_refine::{DirectionCode, TopologyRule, is_valid_boundary};
/// use grid_types::{Cell, Tolerance};
///
/// let tol = Tolerance::default();
/// let small = Cell::from_extents(0.0, 0.0, 1.0, 1.0)?;
/// let tall = Cell::from_extents(1.0, 0.0, 3.0, 2.0)?;
///
/// assert!(!is_valid_boundary(&small, &tall, DirectionCode::East, TopologyRule::Modflow, &tol));
/// assert!(is_valid_boundary(&small, &tall, DirectionCode::East, TopologyRule::Nested, &tol));
/// assert!(is_valid_boundary(&tall, &small, DirectionCode::West, TopologyRule::Modflow, &tol));
/// # Ok::<(), grid_types::GridError>(())
/// ```
#[must_use]
pub fn is_valid_boundary(
    cell: &Cell,
    neighbor: &Cell,
    direction: DirectionCode,
    rule: TopologyRule,
    tol: &Tolerance,
) -> bool {
    let Some(max_ratio) = rule.max_ratio() else {
        return true;
    };
    boundary_ratio(cell, neighbor, direction)
        .is_some_and(|ratio| tol.le(ratio, 1.0) || tol.le(ratio, max_ratio))
}

/// Factor used to repair a violation across a boundary in `direction`.
///
/// Nested grids always use a 2x2 split. Otherwise the caller's factor is
/// kept along the shared boundary and set to 1 across it, so an East/West
/// repair only adds rows and a North/South repair only adds columns.
#[must_use]
pub fn repair_factor(
    direction: DirectionCode,
    factor: RefinementFactor,
    rule: TopologyRule,
) -> RefinementFactor {
    match rule {
        TopologyRule::Nested => RefinementFactor::uniform(2),
        _ if direction.is_horizontal() => factor.with_cols(1),
        _ if direction.is_vertical() => factor.with_rows(1),
        _ => factor,
    }
}

/// Check every orthogonal boundary of cell `id` and collect the repairs.
///
/// Both sides of each boundary are checked: a neighbor that is too large is
/// queued, and so is `id` itself if it is too large for the neighbor.
/// Diagonal and non-adjacent candidates are ignored, and so is a different
/// cell whose corners all coincide with this one under the tolerance. That
/// happens with cells small relative to their coordinates, e.g. metre cells
/// at UTM northings.
///
/// # Errors
///
/// Returns [`ConsistencyError::MissingCell`] if `id` or an indexed neighbor
/// is not in the store.
pub fn check_topology(
    id: CellId,
    factor: RefinementFactor,
    rule: TopologyRule,
    store: &CellStore,
    index: &SpatialIndex,
    tol: &Tolerance,
) -> RefineResult<FixQueue> {
    let mut fixes = FixQueue::new();
    if !rule.is_checked() {
        return Ok(fixes);
    }

    let cell = store.get(id).ok_or(ConsistencyError::MissingCell(id))?;
    for neighbor in find_neighbors(cell, store, index, tol)? {
        let direction = neighbor.direction;
        if direction == DirectionCode::Overlap && neighbor.id != id {
            warn!(
                cell = %id,
                neighbor = %neighbor.id,
                "Cells coincide under tolerance, boundary skipped"
            );
            continue;
        }
        if !direction.is_orthogonal() {
            continue;
        }

        let repair = repair_factor(direction, factor, rule);
        if !is_valid_boundary(cell, neighbor.cell, direction, rule, tol) {
            trace!(cell = %id, neighbor = %neighbor.id, %direction, %repair, "Neighbor too large");
            fixes.push(neighbor.id, repair);
        }
        if !is_valid_boundary(neighbor.cell, cell, direction.opposite(), rule, tol) {
            trace!(cell = %id, neighbor = %neighbor.id, %direction, %repair, "Cell too large for neighbor");
            fixes.push(id, repair);
        }
    }
    Ok(fixes)
}

/// A boundary that breaks the topology rule.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Violation {
    /// The smaller cell.
    pub cell: CellId,
    /// The neighbor that is too large.
    pub neighbor: CellId,
    /// Position of the neighbor relative to the smaller cell.
    pub direction: DirectionCode,
    /// Neighbor size over cell size along the shared boundary.
    pub ratio: f64,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) of {} is {:.3}x larger along the shared edge",
            self.neighbor, self.direction, self.cell, self.ratio
        )
    }
}

/// Scan the whole store for boundaries that break `rule`.
///
/// Each unordered pair of orthogonal neighbors is checked once, in both
/// directions. Pairs that coincide under the tolerance are skipped as in
/// [`check_topology`]. An empty result means the grid satisfies the rule.
/// Results are ordered by cell id, then neighbor id.
///
/// # Errors
///
/// Returns [`ConsistencyError::MissingCell`] if the freshly built index
/// disagrees with the store.
///
/// # Example
///
/// ```
/// use grid_refine::{TopologyRule, find_violations};
/// use grid_types::{Cell, CellStore, Tolerance};
///
/// let mut store = CellStore::new();
/// let small = store.insert(Cell::from_extents(0.0, 0.0, 1.0, 1.0)?);
/// let large = store.insert(Cell::from_extents(1.0, 0.0, 3.0, 2.0)?);
///
/// let tol = Tolerance::default();
/// let violations = find_violations(&store, TopologyRule::Modflow, &tol)?;
/// assert_eq!(violations.len(), 1);
/// assert_eq!((violations[0].cell, violations[0].neighbor), (small, large));
///
/// assert!(find_violations(&store, TopologyRule::Nested, &tol)?.is_empty());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn find_violations(
    store: &CellStore,
    rule: TopologyRule,
    tol: &Tolerance,
) -> RefineResult<Vec<Violation>> {
    if !rule.is_checked() {
        return Ok(Vec::new());
    }

    let index = SpatialIndex::build(store);
    let mut visited: HashSet<(CellId, CellId)> = HashSet::new();
    let mut violations = Vec::new();

    for (id, cell) in store.iter() {
        for neighbor in find_neighbors(cell, store, &index, tol)? {
            let direction = neighbor.direction;
            if !direction.is_orthogonal() {
                continue;
            }
            if !visited.insert((id.min(neighbor.id), id.max(neighbor.id))) {
                continue;
            }

            let sides = [
                (id, cell, neighbor.id, neighbor.cell, direction),
                (neighbor.id, neighbor.cell, id, cell, direction.opposite()),
            ];
            for (small_id, small, large_id, large, dir) in sides {
                if is_valid_boundary(small, large, dir, rule, tol) {
                    continue;
                }
                if let Some(ratio) = boundary_ratio(small, large, dir) {
                    violations.push(Violation {
                        cell: small_id,
                        neighbor: large_id,
                        direction: dir,
                        ratio,
                    });
                }
            }
        }
    }

    violations.sort_by_key(|v| (v.cell, v.neighbor));
    Ok(violations)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::neighbors::classify;
    use approx::assert_relative_eq;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Cell {
        Cell::from_extents(x0, y0, x1, y1).unwrap()
    }

    #[test]
    fn test_boundary_ratio_axes() {
        let cell = rect(0.0, 0.0, 1.0, 2.0);
        let east = rect(1.0, 0.0, 4.0, 1.0);
        assert_relative_eq!(boundary_ratio(&cell, &east, DirectionCode::East).unwrap(), 0.5);
        assert_relative_eq!(boundary_ratio(&cell, &east, DirectionCode::North).unwrap(), 3.0);
        assert!(boundary_ratio(&cell, &east, DirectionCode::NorthEast).is_none());
    }

    #[test]
    fn test_valid_boundary_per_rule() {
        let tol = Tolerance::default();
        let small = rect(0.0, 0.0, 1.0, 1.0);
        let double = rect(1.0, 0.0, 3.0, 2.0);
        let quadruple = rect(1.0, 0.0, 5.0, 4.0);
        let east = DirectionCode::East;

        assert!(is_valid_boundary(&small, &small, east, TopologyRule::Modflow, &tol));
        assert!(!is_valid_boundary(&small, &double, east, TopologyRule::Modflow, &tol));
        assert!(is_valid_boundary(&small, &double, east, TopologyRule::Nested, &tol));
        assert!(!is_valid_boundary(&small, &quadruple, east, TopologyRule::Nested, &tol));
        assert!(is_valid_boundary(&small, &quadruple, east, TopologyRule::None, &tol));
        // Smaller neighbors are always fine
        assert!(is_valid_boundary(&quadruple, &small, DirectionCode::West, TopologyRule::Modflow, &tol));
    }

    #[test]
    fn test_valid_boundary_within_tolerance() {
        let tol = Tolerance::default();
        let a = rect(0.0, 0.0, 0.1 + 0.2, 1.0);
        let b = rect(0.0, 1.0, 0.3, 2.0);
        assert!(is_valid_boundary(&b, &a, DirectionCode::South, TopologyRule::Modflow, &tol));
        assert!(is_valid_boundary(&a, &b, DirectionCode::North, TopologyRule::Modflow, &tol));
    }

    #[test]
    fn test_diagonal_is_not_a_boundary() {
        let tol = Tolerance::default();
        let a = rect(0.0, 0.0, 1.0, 1.0);
        let b = rect(1.0, 1.0, 2.0, 2.0);
        assert!(!is_valid_boundary(&a, &b, DirectionCode::NorthEast, TopologyRule::Modflow, &tol));
    }

    #[test]
    fn test_repair_factor() {
        let factor = RefinementFactor::new(3, 2);
        assert_eq!(
            repair_factor(DirectionCode::East, factor, TopologyRule::Modflow),
            RefinementFactor::new(3, 1)
        );
        assert_eq!(
            repair_factor(DirectionCode::South, factor, TopologyRule::Modflow),
            RefinementFactor::new(1, 2)
        );
        assert_eq!(
            repair_factor(DirectionCode::West, RefinementFactor::uniform(4), TopologyRule::Nested),
            RefinementFactor::uniform(2)
        );
    }

    /// Top-left quarter of a 2x2 grid of 2x2 cells already split into four.
    fn modflow_after_first_split() -> (CellStore, Vec<CellId>, [CellId; 3]) {
        let mut store = CellStore::new();
        let east = store.insert(rect(2.0, 2.0, 4.0, 4.0));
        let south = store.insert(rect(0.0, 0.0, 2.0, 2.0));
        let diagonal = store.insert(rect(2.0, 0.0, 4.0, 2.0));
        let children = store.insert_many([
            rect(0.0, 3.0, 1.0, 4.0),
            rect(1.0, 3.0, 2.0, 4.0),
            rect(0.0, 2.0, 1.0, 3.0),
            rect(1.0, 2.0, 2.0, 3.0),
        ]);
        (store, children, [east, south, diagonal])
    }

    #[test]
    fn test_check_topology_queues_larger_neighbors() {
        let (store, children, [east, south, _]) = modflow_after_first_split();
        let index = SpatialIndex::build(&store);
        let tol = Tolerance::default();
        let factor = RefinementFactor::uniform(2);

        // Bottom-right child touches both the east and south cells
        let fixes =
            check_topology(children[3], factor, TopologyRule::Modflow, &store, &index, &tol)
                .unwrap();
        assert_eq!(fixes.len(), 2);
        assert_eq!(fixes.get(east), Some(RefinementFactor::new(2, 1)));
        assert_eq!(fixes.get(south), Some(RefinementFactor::new(1, 2)));

        // Top-left child only touches its siblings
        let fixes =
            check_topology(children[0], factor, TopologyRule::Modflow, &store, &index, &tol)
                .unwrap();
        assert!(fixes.is_empty());
    }

    #[test]
    fn test_check_topology_queues_self_when_too_large() {
        let mut store = CellStore::new();
        let large = store.insert(rect(0.0, 0.0, 2.0, 2.0));
        store.insert(rect(2.0, 0.0, 3.0, 1.0));
        let index = SpatialIndex::build(&store);

        let fixes = check_topology(
            large,
            RefinementFactor::uniform(2),
            TopologyRule::Modflow,
            &store,
            &index,
            &Tolerance::default(),
        )
        .unwrap();
        assert_eq!(fixes.ids(), vec![large]);
        assert_eq!(fixes.get(large), Some(RefinementFactor::new(2, 1)));
    }

    #[test]
    fn test_check_topology_unchecked_rule() {
        let (store, children, _) = modflow_after_first_split();
        let index = SpatialIndex::build(&store);
        let fixes = check_topology(
            children[3],
            RefinementFactor::uniform(2),
            TopologyRule::None,
            &store,
            &index,
            &Tolerance::default(),
        )
        .unwrap();
        assert!(fixes.is_empty());
    }

    #[test]
    fn test_check_topology_skips_coinciding_cells() {
        // At y ~ 4e6 the tolerance is ~4 m, so stacked 1 m cells coincide
        let mut store = CellStore::new();
        let upper = store.insert(rect(500_000.0, 4_000_001.0, 500_002.0, 4_000_002.0));
        let lower = store.insert(rect(500_000.0, 4_000_000.0, 500_002.0, 4_000_001.0));
        let east = store.insert(rect(500_002.0, 4_000_000.0, 500_004.0, 4_000_002.0));
        let index = SpatialIndex::build(&store);
        let tol = Tolerance::default();
        let factor = RefinementFactor::new(2, 1);

        assert_eq!(
            classify(store.get(upper).unwrap(), store.get(lower).unwrap(), &tol),
            DirectionCode::Overlap
        );
        for id in [upper, lower] {
            let fixes =
                check_topology(id, factor, TopologyRule::Modflow, &store, &index, &tol).unwrap();
            assert_eq!(fixes.ids(), vec![east]);
            assert_eq!(fixes.get(east), Some(RefinementFactor::new(2, 1)));
        }

        let violations = find_violations(&store, TopologyRule::Modflow, &tol).unwrap();
        let pairs: Vec<_> = violations.iter().map(|v| (v.cell, v.neighbor)).collect();
        assert_eq!(pairs, vec![(upper, east), (lower, east)]);
    }

    #[test]
    fn test_check_topology_duplicate_cell_skipped() {
        let mut store = CellStore::new();
        let a = store.insert(rect(0.0, 0.0, 1.0, 1.0));
        store.insert(rect(0.0, 0.0, 1.0, 1.0));
        let index = SpatialIndex::build(&store);
        let fixes = check_topology(
            a,
            RefinementFactor::uniform(2),
            TopologyRule::Modflow,
            &store,
            &index,
            &Tolerance::default(),
        )
        .unwrap();
        assert!(fixes.is_empty());
    }

    #[test]
    fn test_check_topology_missing_cell() {
        let store = CellStore::new();
        let index = SpatialIndex::build(&store);
        let err = check_topology(
            CellId::new(3),
            RefinementFactor::uniform(2),
            TopologyRule::Nested,
            &store,
            &index,
            &Tolerance::default(),
        )
        .unwrap_err();
        assert_eq!(err, ConsistencyError::MissingCell(CellId::new(3)));
    }

    #[test]
    fn test_find_violations() {
        let (store, children, [east, south, _]) = modflow_after_first_split();
        let tol = Tolerance::default();

        let violations = find_violations(&store, TopologyRule::Modflow, &tol).unwrap();
        let pairs: Vec<_> = violations.iter().map(|v| (v.cell, v.neighbor)).collect();
        assert_eq!(
            pairs,
            vec![
                (children[1], east),
                (children[2], south),
                (children[3], east),
                (children[3], south),
            ]
        );
        assert!(violations.iter().all(|v| v.ratio == 2.0));

        assert!(find_violations(&store, TopologyRule::Nested, &tol).unwrap().is_empty());
        assert!(find_violations(&store, TopologyRule::None, &tol).unwrap().is_empty());
    }

    #[test]
    fn test_violation_display() {
        let violation = Violation {
            cell: CellId::new(1),
            neighbor: CellId::new(2),
            direction: DirectionCode::East,
            ratio: 2.0,
        };
        assert_eq!(
            violation.to_string(),
            "#2 (E) of #1 is 2.000x larger along the shared edge"
        );
    }
}
