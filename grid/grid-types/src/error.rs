//! Error types for grid cell operations.

use crate::store::CellId;

/// Errors that can occur when building cells or manipulating a cell store.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum GridError {
    /// A rectangle has zero (or negative) width or height.
    #[error("degenerate rectangle: width {width}, height {height}")]
    DegenerateCell {
        /// Width of the rejected rectangle.
        width: f64,
        /// Height of the rejected rectangle.
        height: f64,
    },

    /// A corner coordinate is NaN or infinite.
    #[error("non-finite coordinate ({x}, {y})")]
    NonFiniteCoordinate {
        /// X coordinate.
        x: f64,
        /// Y coordinate.
        y: f64,
    },

    /// The four corners do not describe an axis-aligned rectangle.
    #[error("corners do not form an axis-aligned rectangle")]
    NotAxisAligned,

    /// A cell id is not present in the store.
    #[error("cell {0} is not in the store")]
    UnknownCell(CellId),

    /// A refinement factor of zero rows or columns was requested.
    #[error("refinement factor must be at least 1x1, got {rows}x{cols}")]
    ZeroFactor {
        /// Requested rows.
        rows: u32,
        /// Requested columns.
        cols: u32,
    },
}

/// Result type for grid cell operations.
pub type GridResult<T> = std::result::Result<T, GridError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GridError::DegenerateCell {
            width: 0.0,
            height: 2.5,
        };
        let display = format!("{err}");
        assert!(display.contains("width 0"));
        assert!(display.contains("2.5"));

        let err = GridError::UnknownCell(CellId::new(42));
        assert!(format!("{err}").contains("42"));

        let err = GridError::ZeroFactor { rows: 0, cols: 3 };
        assert!(format!("{err}").contains("0x3"));
    }
}
