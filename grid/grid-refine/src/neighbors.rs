//! Neighbor discovery and directional classification.
//!
//! Candidates come from the spatial index (every cell whose bounding box
//! touches the reference cell), then each candidate is classified by comparing
//! corners. The classification rules are evaluated in a fixed priority order:
//!
//! 1. all four corners coincide: [`DirectionCode::Overlap`]
//! 2. a full shared edge (two corner pairs): North, East, South, West
//! 3. a single shared corner: the four diagonal codes
//! 4. partial shared edge (colinear displacement vectors): North, East,
//!    South, West
//! 5. anything else: [`DirectionCode::NotAdjacent`]
//!
//! Step 4 exists because after uneven refinement a small cell's edge lies
//! strictly inside its larger neighbor's edge, so no corner pair matches.
//! The colinearity test thresholds the raw cross product, so with large
//! coordinates and accumulated drift a partial-edge neighbor can fall through
//! to `NotAdjacent`. That gap is left as is.
//!
//! ```text
//! | NW | N  | NE |
//! | W  | 0  | E  |
//! | SW | S  | SE |
//! ```

use std::fmt;

use grid_types::{Cell, CellId, CellStore, Point2, Tolerance, Vector2, vector_between};

use crate::error::{ConsistencyError, RefineResult};
use crate::index::SpatialIndex;

/// Position of a candidate cell relative to a reference cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DirectionCode {
    /// Same four corners (the reference cell itself, or a duplicate).
    Overlap,
    /// Above, sharing (part of) the top edge.
    North,
    /// Right, sharing (part of) the right edge.
    East,
    /// Below, sharing (part of) the bottom edge.
    South,
    /// Left, sharing (part of) the left edge.
    West,
    /// Touching only at the top-right corner.
    NorthEast,
    /// Touching only at the bottom-right corner.
    SouthEast,
    /// Touching only at the bottom-left corner.
    SouthWest,
    /// Touching only at the top-left corner.
    NorthWest,
    /// No recognizable adjacency.
    NotAdjacent,
}

impl DirectionCode {
    /// North, East, South or West.
    #[must_use]
    pub const fn is_orthogonal(&self) -> bool {
        matches!(self, Self::North | Self::East | Self::South | Self::West)
    }

    /// One of the four corner codes.
    #[must_use]
    pub const fn is_diagonal(&self) -> bool {
        matches!(
            self,
            Self::NorthEast | Self::SouthEast | Self::SouthWest | Self::NorthWest
        )
    }

    /// East or West: the shared boundary is vertical, so heights are compared.
    #[must_use]
    pub const fn is_horizontal(&self) -> bool {
        matches!(self, Self::East | Self::West)
    }

    /// North or South: the shared boundary is horizontal, so widths are compared.
    #[must_use]
    pub const fn is_vertical(&self) -> bool {
        matches!(self, Self::North | Self::South)
    }

    /// Direction of the reference cell as seen from the neighbor.
    #[must_use]
    pub const fn opposite(&self) -> Self {
        match self {
            Self::North => Self::South,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::West => Self::East,
            Self::NorthEast => Self::SouthWest,
            Self::SouthEast => Self::NorthWest,
            Self::SouthWest => Self::NorthEast,
            Self::NorthWest => Self::SouthEast,
            Self::Overlap => Self::Overlap,
            Self::NotAdjacent => Self::NotAdjacent,
        }
    }
}

impl fmt::Display for DirectionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Overlap => "overlap",
            Self::North => "N",
            Self::East => "E",
            Self::South => "S",
            Self::West => "W",
            Self::NorthEast => "NE",
            Self::SouthEast => "SE",
            Self::SouthWest => "SW",
            Self::NorthWest => "NW",
            Self::NotAdjacent => "not adjacent",
        };
        f.write_str(name)
    }
}

type Corners = [Point2<f64>; 4];

/// One entry of the classification table.
struct ClassificationRule {
    code: DirectionCode,
    matches: fn(&Corners, &Corners, &Tolerance) -> bool,
}

const TL: usize = 0;
const TR: usize = 1;
const BR: usize = 2;
const BL: usize = 3;

/// Classification rules in priority order. The first match wins, so exact
/// corner matches must stay ahead of the colinearity fallback.
const CLASSIFICATION_RULES: [ClassificationRule; 13] = [
    ClassificationRule {
        code: DirectionCode::Overlap,
        matches: |p, q, tol| (0..4).all(|i| tol.points_coincide(&p[i], &q[i])),
    },
    ClassificationRule {
        code: DirectionCode::North,
        matches: |p, q, tol| {
            tol.points_coincide(&p[TL], &q[BL]) && tol.points_coincide(&p[TR], &q[BR])
        },
    },
    ClassificationRule {
        code: DirectionCode::East,
        matches: |p, q, tol| {
            tol.points_coincide(&p[TR], &q[TL]) && tol.points_coincide(&p[BR], &q[BL])
        },
    },
    ClassificationRule {
        code: DirectionCode::South,
        matches: |p, q, tol| {
            tol.points_coincide(&p[BR], &q[TR]) && tol.points_coincide(&p[BL], &q[TL])
        },
    },
    ClassificationRule {
        code: DirectionCode::West,
        matches: |p, q, tol| {
            tol.points_coincide(&p[BL], &q[BR]) && tol.points_coincide(&p[TL], &q[TR])
        },
    },
    ClassificationRule {
        code: DirectionCode::NorthEast,
        matches: |p, q, tol| tol.points_coincide(&p[TR], &q[BL]),
    },
    ClassificationRule {
        code: DirectionCode::SouthEast,
        matches: |p, q, tol| tol.points_coincide(&p[BR], &q[TL]),
    },
    ClassificationRule {
        code: DirectionCode::SouthWest,
        matches: |p, q, tol| tol.points_coincide(&p[BL], &q[TR]),
    },
    ClassificationRule {
        code: DirectionCode::NorthWest,
        matches: |p, q, tol| tol.points_coincide(&p[TL], &q[BR]),
    },
    ClassificationRule {
        code: DirectionCode::North,
        matches: |p, q, tol| partial_edge(&q[BL], &p[TL], &p[TR], &q[BR], &Vector2::x(), tol),
    },
    ClassificationRule {
        code: DirectionCode::East,
        matches: |p, q, tol| partial_edge(&q[BL], &p[BR], &p[TR], &q[TL], &Vector2::y(), tol),
    },
    ClassificationRule {
        code: DirectionCode::South,
        matches: |p, q, tol| partial_edge(&q[TL], &p[BL], &p[BR], &q[TR], &Vector2::x(), tol),
    },
    ClassificationRule {
        code: DirectionCode::West,
        matches: |p, q, tol| partial_edge(&q[BR], &p[BL], &p[TL], &q[TR], &Vector2::y(), tol),
    },
];

/// Whether the displacements `a0 -> a1` and `b0 -> b1` are colinear with each
/// other and with `axis`.
fn partial_edge(
    a0: &Point2<f64>,
    a1: &Point2<f64>,
    b0: &Point2<f64>,
    b1: &Point2<f64>,
    axis: &Vector2<f64>,
    tol: &Tolerance,
) -> bool {
    let u = vector_between(a0, a1);
    let v = vector_between(b0, b1);
    tol.colinear(&u, &v) && tol.colinear(&u, axis) && tol.colinear(&v, axis)
}

/// Classify `candidate` relative to `reference`.
///
/// # Example
///
/// ```
/// use grid_refine::{DirectionCode, classify};
/// use grid_types::{Cell, Tolerance};
///
/// let tol = Tolerance::default();
/// let cell = Cell::from_extents(0.0, 0.0, 1.0, 1.0)?;
/// let east = Cell::from_extents(1.0, 0.0, 2.0, 1.0)?;
/// let far = Cell::from_extents(5.0, 5.0, 6.0, 6.0)?;
///
/// assert_eq!(classify(&cell, &east, &tol), DirectionCode::East);
/// assert_eq!(classify(&east, &cell, &tol), DirectionCode::West);
/// assert_eq!(classify(&cell, &cell, &tol), DirectionCode::Overlap);
/// assert_eq!(classify(&cell, &far, &tol), DirectionCode::NotAdjacent);
/// # Ok::<(), grid_types::GridError>(())
/// ```
#[must_use]
pub fn classify(reference: &Cell, candidate: &Cell, tol: &Tolerance) -> DirectionCode {
    let p = reference.corners();
    let q = candidate.corners();
    CLASSIFICATION_RULES
        .iter()
        .find(|rule| (rule.matches)(p, q, tol))
        .map_or(DirectionCode::NotAdjacent, |rule| rule.code)
}

/// A classified neighbor of a reference cell.
#[derive(Debug, Clone, Copy)]
pub struct Neighbor<'a> {
    /// Id of the neighbor in the store.
    pub id: CellId,
    /// Position relative to the reference cell.
    pub direction: DirectionCode,
    /// The neighbor itself.
    pub cell: &'a Cell,
}

/// Find and classify every cell whose bounding box touches `cell`.
///
/// The query box is padded by the tolerance so cells separated only by
/// floating-point drift are still found. The result includes the reference
/// cell itself (as [`DirectionCode::Overlap`]) when it is in the store, and
/// candidates classified as [`DirectionCode::NotAdjacent`].
///
/// # Errors
///
/// Returns [`ConsistencyError::MissingCell`] if the index refers to a cell the
/// store no longer holds, which means the index is stale.
pub fn find_neighbors<'a>(
    cell: &Cell,
    store: &'a CellStore,
    index: &SpatialIndex,
    tol: &Tolerance,
) -> RefineResult<Vec<Neighbor<'a>>> {
    let bounds = cell.bounds();
    let scale = [bounds.min.x, bounds.min.y, bounds.max.x, bounds.max.y]
        .iter()
        .fold(bounds.width().max(bounds.height()), |acc, v| acc.max(v.abs()));
    let query = bounds.padded(tol.relative() * scale);

    index
        .intersecting(&query)
        .into_iter()
        .map(|id| {
            let candidate = store.get(id).ok_or(ConsistencyError::MissingCell(id))?;
            Ok(Neighbor {
                id,
                direction: classify(cell, candidate, tol),
                cell: candidate,
            })
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::generate::split_cell;
    use crate::params::RefinementFactor;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Cell {
        Cell::from_extents(x0, y0, x1, y1).unwrap()
    }

    #[test]
    fn test_nine_way_classification() {
        let tol = Tolerance::default();
        let center = rect(1.0, 1.0, 2.0, 2.0);
        let cases = [
            (rect(1.0, 2.0, 2.0, 3.0), DirectionCode::North),
            (rect(2.0, 1.0, 3.0, 2.0), DirectionCode::East),
            (rect(1.0, 0.0, 2.0, 1.0), DirectionCode::South),
            (rect(0.0, 1.0, 1.0, 2.0), DirectionCode::West),
            (rect(2.0, 2.0, 3.0, 3.0), DirectionCode::NorthEast),
            (rect(2.0, 0.0, 3.0, 1.0), DirectionCode::SouthEast),
            (rect(0.0, 0.0, 1.0, 1.0), DirectionCode::SouthWest),
            (rect(0.0, 2.0, 1.0, 3.0), DirectionCode::NorthWest),
            (rect(1.0, 1.0, 2.0, 2.0), DirectionCode::Overlap),
        ];
        for (candidate, expected) in cases {
            assert_eq!(classify(&center, &candidate, &tol), expected);
            assert_eq!(
                classify(&candidate, &center, &tol),
                expected.opposite(),
                "reverse of {expected}"
            );
        }
    }

    #[test]
    fn test_partial_edge_east_and_west() {
        let tol = Tolerance::default();
        // Small cells on the left of a tall neighbor
        let big = rect(2.0, 0.0, 4.0, 2.0);
        let upper = rect(1.0, 1.0, 2.0, 2.0);
        let lower = rect(1.0, 0.0, 2.0, 1.0);
        assert_eq!(classify(&upper, &big, &tol), DirectionCode::East);
        assert_eq!(classify(&lower, &big, &tol), DirectionCode::East);
        assert_eq!(classify(&big, &upper, &tol), DirectionCode::West);
        assert_eq!(classify(&big, &lower, &tol), DirectionCode::West);
    }

    #[test]
    fn test_partial_edge_north_and_south() {
        let tol = Tolerance::default();
        let wide = rect(0.0, 0.0, 2.0, 2.0);
        let left = rect(0.0, 2.0, 1.0, 3.0);
        let right = rect(1.0, 2.0, 2.0, 3.0);
        assert_eq!(classify(&wide, &left, &tol), DirectionCode::North);
        assert_eq!(classify(&wide, &right, &tol), DirectionCode::North);
        assert_eq!(classify(&left, &wide, &tol), DirectionCode::South);
        assert_eq!(classify(&right, &wide, &tol), DirectionCode::South);
    }

    #[test]
    fn test_partial_edge_middle_of_long_edge() {
        let tol = Tolerance::default();
        let big = rect(0.0, 0.0, 3.0, 3.0);
        let middle = rect(3.0, 1.0, 4.0, 2.0);
        assert_eq!(classify(&middle, &big, &tol), DirectionCode::West);
        assert_eq!(classify(&big, &middle, &tol), DirectionCode::East);
    }

    #[test]
    fn test_partial_edge_missed_with_drift_at_large_coordinates() {
        let tol = Tolerance::default();
        let small = rect(500_000.0, 4_000_000.0, 500_100.0, 4_000_100.0);
        let exact = rect(500_100.0, 3_999_900.0, 500_300.0, 4_000_100.0);
        let drifted = rect(500_100.000_000_1, 3_999_900.0, 500_300.0, 4_000_100.0);

        assert_eq!(classify(&small, &exact, &tol), DirectionCode::East);
        assert_eq!(classify(&small, &drifted, &tol), DirectionCode::NotAdjacent);
    }

    #[test]
    fn test_drift_tolerated() {
        let tol = Tolerance::default();
        let a = rect(0.0, 0.0, 0.1 + 0.2, 1.0);
        let b = rect(0.3, 0.0, 0.6, 1.0);
        assert_eq!(classify(&a, &b, &tol), DirectionCode::East);
    }

    #[test]
    fn test_siblings_are_adjacent() {
        let tol = Tolerance::default();
        let parent = rect(0.0, 0.0, 3.0, 2.0);
        let children = split_cell(&parent, RefinementFactor::new(2, 3)).unwrap();
        assert_eq!(classify(&children[0], &children[1], &tol), DirectionCode::East);
        assert_eq!(classify(&children[0], &children[3], &tol), DirectionCode::South);
        assert_eq!(classify(&children[0], &children[4], &tol), DirectionCode::SouthEast);
        assert_eq!(classify(&children[4], &children[2], &tol), DirectionCode::NorthEast);
    }

    #[test]
    fn test_find_neighbors() {
        let tol = Tolerance::default();
        let mut store = CellStore::new();
        let center = store.insert(rect(1.0, 1.0, 2.0, 2.0));
        let east = store.insert(rect(2.0, 1.0, 3.0, 2.0));
        let corner = store.insert(rect(2.0, 2.0, 3.0, 3.0));
        store.insert(rect(5.0, 5.0, 6.0, 6.0));

        let index = SpatialIndex::build(&store);
        let cell = store.get(center).unwrap();
        let neighbors = find_neighbors(cell, &store, &index, &tol).unwrap();

        let found: Vec<_> = neighbors.iter().map(|n| (n.id, n.direction)).collect();
        assert_eq!(
            found,
            vec![
                (center, DirectionCode::Overlap),
                (east, DirectionCode::East),
                (corner, DirectionCode::NorthEast),
            ]
        );
    }

    #[test]
    fn test_find_neighbors_stale_index() {
        let tol = Tolerance::default();
        let mut store = CellStore::new();
        let a = store.insert(rect(0.0, 0.0, 1.0, 1.0));
        let index = SpatialIndex::build(&store);
        let cell = store.get(a).unwrap().clone();
        store.delete(&[a]).unwrap();

        let err = find_neighbors(&cell, &store, &index, &tol).unwrap_err();
        assert_eq!(err, ConsistencyError::MissingCell(a));
    }

    #[test]
    fn test_direction_predicates() {
        assert!(DirectionCode::East.is_horizontal());
        assert!(DirectionCode::North.is_vertical());
        assert!(DirectionCode::West.is_orthogonal());
        assert!(!DirectionCode::NorthWest.is_orthogonal());
        assert!(DirectionCode::SouthEast.is_diagonal());
        assert!(!DirectionCode::Overlap.is_diagonal());
        assert_eq!(DirectionCode::NotAdjacent.opposite(), DirectionCode::NotAdjacent);
        assert_eq!(DirectionCode::NorthEast.to_string(), "NE");
    }
}
