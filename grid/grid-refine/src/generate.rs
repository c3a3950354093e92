//! Regular sub-grid generation.
//!
//! Both splitting a single cell and building a fresh grid over an extent go
//! through [`grid_lines`], so neighboring cells produced by the same call
//! share bit-identical corner coordinates.

use grid_types::{Attributes, Cell, CellStore, GridError, GridResult, Point2, Rect};

use crate::params::RefinementFactor;

/// `divisions + 1` evenly spaced values from `start` to `end`.
///
/// The first and last values are exactly `start` and `end`.
fn grid_lines(start: f64, end: f64, divisions: u32) -> Vec<f64> {
    let step = (end - start) / f64::from(divisions);
    (0..=divisions)
        .map(|i| {
            if i == divisions {
                end
            } else {
                step.mul_add(f64::from(i), start)
            }
        })
        .collect()
}

/// Cells of a `factor.rows` x `factor.cols` grid covering `bounds`.
///
/// Row-major order, top row first, left to right.
fn grid_cells(
    bounds: &Rect,
    factor: RefinementFactor,
    attributes: &Attributes,
) -> GridResult<Vec<Cell>> {
    if !factor.is_valid() {
        return Err(GridError::ZeroFactor {
            rows: factor.rows,
            cols: factor.cols,
        });
    }

    let xs = grid_lines(bounds.min.x, bounds.max.x, factor.cols);
    let ys = grid_lines(bounds.max.y, bounds.min.y, factor.rows);

    let mut cells = Vec::with_capacity(factor.cell_count());
    for (top, bottom) in ys.iter().zip(ys.iter().skip(1)) {
        for (left, right) in xs.iter().zip(xs.iter().skip(1)) {
            let cell = Cell::new([
                Point2::new(*left, *top),
                Point2::new(*right, *top),
                Point2::new(*right, *bottom),
                Point2::new(*left, *bottom),
            ])?;
            cells.push(cell.with_attributes(attributes.clone()));
        }
    }
    Ok(cells)
}

/// Split one cell into a regular sub-grid.
///
/// The children cover the parent's bounding box exactly, come back in
/// row-major order (top row first, left to right) and each carry a copy of
/// the parent's attributes.
///
/// # Errors
///
/// Returns [`GridError::ZeroFactor`] if the factor has zero rows or columns,
/// or a degenerate-cell error if the parent is too small to split in floating
/// point.
///
/// # Example
///
/// ```
/// use grid_refine::{RefinementFactor, split_cell};
/// use grid_types::Cell;
///
/// let cell = Cell::from_extents(0.0, 0.0, 4.0, 4.0)?;
/// let children = split_cell(&cell, RefinementFactor::new(2, 2))?;
///
/// assert_eq!(children.len(), 4);
/// assert_eq!(children[0].bounds().min.y, 2.0); // top-left child first
/// assert_eq!(children[0].width(), 2.0);
/// # Ok::<(), grid_types::GridError>(())
/// ```
pub fn split_cell(cell: &Cell, factor: RefinementFactor) -> GridResult<Vec<Cell>> {
    grid_cells(&cell.bounds(), factor, &cell.attributes)
}

/// Build a uniform grid of `factor.rows` x `factor.cols` cells over `bounds`.
///
/// Every cell receives a copy of `attributes`. Ids are assigned in row-major
/// order, top row first.
///
/// # Errors
///
/// Returns an error if the factor is zero or the extent is degenerate.
///
/// # Example
///
/// ```
/// use grid_refine::{RefinementFactor, regular_grid};
/// use grid_types::{Attributes, Rect};
///
/// let store = regular_grid(
///     &Rect::from_extents(0.0, 0.0, 1000.0, 500.0),
///     RefinementFactor::new(5, 10),
///     &Attributes::new(),
/// )?;
/// assert_eq!(store.len(), 50);
/// # Ok::<(), grid_types::GridError>(())
/// ```
pub fn regular_grid(
    bounds: &Rect,
    factor: RefinementFactor,
    attributes: &Attributes,
) -> GridResult<CellStore> {
    // Validates the extent itself before generating anything
    Cell::from_rect(bounds)?;
    Ok(grid_cells(bounds, factor, attributes)?.into_iter().collect())
}
