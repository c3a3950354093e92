//! Core grid types for rectangular model grids.
//!
//! This crate provides the data side of local grid refinement:
//!
//! - [`Cell`] - An axis-aligned rectangle with clockwise corners and attributes
//! - [`Attributes`] - Opaque attribute payload copied to child cells on split
//! - [`CellStore`] - Arena owning the live cells, addressed by [`CellId`]
//! - [`Rect`] - Axis-aligned 2D bounding rectangle
//! - [`Tolerance`] - Relative-tolerance comparisons used by every predicate
//!
//! # Layer 0 Crate
//!
//! This crate has no dependency on the refinement engine and can be used on
//! its own to hold grids imported from GIS layers or model input files.
//!
//! # Coordinate System
//!
//! Cells live in a 2D plane with x to the right and y up. "Top" is the larger
//! y value. Corners are always stored clockwise starting at the top-left:
//!
//! ```text
//! 0 (top-left) ---- 1 (top-right)
//!      |                 |
//! 3 (bottom-left) - 2 (bottom-right)
//! ```
//!
//! # Example
//!
//! ```
//! use grid_types::{Cell, CellStore, Tolerance};
//!
//! let mut store = CellStore::new();
//! let id = store.insert(Cell::from_extents(0.0, 0.0, 100.0, 50.0)?);
//!
//! let cell = store.get(id).ok_or(grid_types::GridError::UnknownCell(id))?;
//! assert!(Tolerance::default().eq(cell.width(), 100.0));
//! # Ok::<(), grid_types::GridError>(())
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod bounds;
mod cell;
mod error;
mod store;
mod tolerance;

pub use bounds::Rect;
pub use cell::{AttributeValue, Attributes, Cell, Corner};
pub use error::{GridError, GridResult};
pub use store::{CellId, CellStore};
pub use tolerance::{DEFAULT_RELATIVE_TOLERANCE, Tolerance, approx_eq, vector_between};

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Vector2};
