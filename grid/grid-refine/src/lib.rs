//! Local refinement of rectangular model grids.
//!
//! Selected cells are split into regular sub-grids, then splits propagate to
//! neighbors until every shared boundary satisfies a topology rule:
//!
//! - **None**: only the selected cells are split
//! - **Modflow**: neighbors along a shared edge must have the same size
//!   (ratio 1), so refinement propagates along whole rows and columns
//! - **Nested**: a neighbor may be at most twice as large (ratio 2);
//!   violations are repaired with 2x2 splits
//!
//! The engine is built from small pieces that can also be used directly:
//!
//! - [`split_cell`] / [`regular_grid`] - regular sub-grid generation
//! - [`SpatialIndex`] - R-tree over cell bounding boxes
//! - [`classify`] / [`find_neighbors`] - nine-way neighbor classification
//! - [`check_topology`] / [`find_violations`] - boundary rule checks
//! - [`FixQueue`] - pending splits with max-merge
//! - [`refine`] - the iterative driver
//!
//! # Examples
//!
//! Refining one cell of a MODFLOW grid:
//!
//! ```
//! use grid_refine::{RefineParams, RefinementFactor, find_violations, refine, regular_grid};
//! use grid_types::{Attributes, CellId, Rect};
//!
//! // 2x2 grid of 2x2 cells
//! let mut store = regular_grid(
//!     &Rect::from_extents(0.0, 0.0, 4.0, 4.0),
//!     RefinementFactor::new(2, 2),
//!     &Attributes::new(),
//! )?;
//!
//! let params = RefineParams::modflow(RefinementFactor::new(2, 2));
//! let report = refine(&mut store, &[CellId::new(0)], &params)?;
//!
//! // Top-left split in four, east and south neighbors split in two
//! assert_eq!(store.len(), 9);
//! assert_eq!(report.cells_removed, 3);
//! assert!(find_violations(&store, params.rule, &params.tolerance)?.is_empty());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Malformed requests are reported, not raised:
//!
//! ```
//! use grid_refine::{InputError, RefineParams, RefinementFactor, RefinementStatus, refine};
//! use grid_types::{Cell, CellStore};
//!
//! let mut store = CellStore::new();
//! let id = store.insert(Cell::from_extents(0.0, 0.0, 1.0, 1.0)?);
//!
//! let params = RefineParams::nested(2).with_factor(RefinementFactor::new(3, 5));
//! let report = refine(&mut store, &[id], &params)?;
//!
//! assert!(matches!(
//!     report.status,
//!     RefinementStatus::Rejected(InputError::AsymmetricNestedFactor(_))
//! ));
//! assert_eq!(store.len(), 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod error;
mod fix_queue;
mod generate;
mod index;
mod neighbors;
mod params;
mod refine;
mod result;
mod topology;

pub use error::{ConsistencyError, InputError, RefineResult};
pub use fix_queue::FixQueue;
pub use generate::{regular_grid, split_cell};
pub use index::SpatialIndex;
pub use neighbors::{DirectionCode, Neighbor, classify, find_neighbors};
pub use params::{RefineParams, RefinementFactor, TopologyRule};
pub use refine::{NoopObserver, RefineObserver, refine, refine_with_observer};
pub use result::{IterationProgress, RefinementReport, RefinementStatus};
pub use topology::{
    Violation, boundary_ratio, check_topology, find_violations, is_valid_boundary, repair_factor,
};
