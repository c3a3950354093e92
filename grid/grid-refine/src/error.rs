//! Error types for grid refinement.

use grid_types::{CellId, GridError};
use thiserror::Error;

use crate::params::{RefinementFactor, TopologyRule};

/// Malformed refinement requests.
///
/// These are detected before the store is touched and surface as
/// [`RefinementStatus::Rejected`](crate::RefinementStatus::Rejected).
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum InputError {
    /// A refinement factor has zero rows or columns.
    #[error("Invalid refinement factor {0} (rows and columns must be >= 1)")]
    ZeroFactor(RefinementFactor),

    /// No cells were selected for refinement.
    #[error("No cells selected for refinement")]
    EmptySelection,

    /// A selected cell is not in the store.
    #[error("Selected cell {0} is not in the store")]
    UnknownCell(CellId),

    /// The topology rule name is not recognized.
    #[error("Unknown topology rule '{0}' (expected none, modflow or nested)")]
    UnknownRule(String),

    /// Nested grids only allow square refinement factors.
    #[error("Nested grids require equal rows and columns, got {0}")]
    AsymmetricNestedFactor(RefinementFactor),

    /// Nested grids only allow dividing by 1, 2 or 4.
    #[error("Nested grids can only divide cells by 1, 2 or 4, got {0}")]
    UnsupportedNestedFactor(RefinementFactor),

    /// The relative tolerance is not finite and positive.
    #[error("Invalid tolerance {0} (must be finite and > 0)")]
    InvalidTolerance(f64),

    /// The iteration limit is zero.
    #[error("Iteration limit must be >= 1")]
    ZeroIterationLimit,
}

/// Fatal internal-consistency failures during refinement.
///
/// The store keeps the state of the last committed iteration.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum ConsistencyError {
    /// A queued cell vanished before it could be split.
    #[error("Queued cell {0} is missing from the store")]
    MissingCell(CellId),

    /// The grid generator produced the wrong number of children.
    #[error("Split of cell {cell} produced {actual} cells, expected {expected}")]
    SplitCount {
        /// Parent cell.
        cell: CellId,
        /// Expected child count (rows * columns).
        expected: usize,
        /// Actual child count.
        actual: usize,
    },

    /// A propagated factor is not admissible for the active rule.
    #[error("Factor {factor} queued for cell {cell} is not admissible under {rule:?}")]
    InadmissibleFactor {
        /// Queued cell.
        cell: CellId,
        /// Offending factor.
        factor: RefinementFactor,
        /// Active rule.
        rule: TopologyRule,
    },

    /// The fixed point was not reached within the configured iteration limit.
    #[error("Refinement did not converge after {iterations} iterations ({pending} cells still queued)")]
    IterationLimit {
        /// Iterations executed.
        iterations: u32,
        /// Queue entries left unresolved.
        pending: usize,
    },

    /// A cell-store or geometry operation failed.
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Result type for refinement operations.
pub type RefineResult<T> = std::result::Result<T, ConsistencyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_error_display() {
        let err = InputError::AsymmetricNestedFactor(RefinementFactor::new(3, 5));
        let display = format!("{err}");
        assert!(display.contains("3x5"));

        let err = InputError::UnknownRule("hex".into());
        assert!(format!("{err}").contains("'hex'"));

        assert_eq!(
            format!("{}", InputError::EmptySelection),
            "No cells selected for refinement"
        );
    }

    #[test]
    fn test_consistency_error_display() {
        let err = ConsistencyError::SplitCount {
            cell: CellId::new(4),
            expected: 6,
            actual: 5,
        };
        let display = format!("{err}");
        assert!(display.contains("#4"));
        assert!(display.contains('6'));
        assert!(display.contains('5'));

        let err = ConsistencyError::IterationLimit {
            iterations: 10,
            pending: 3,
        };
        assert!(format!("{err}").contains("10 iterations"));
    }

    #[test]
    fn test_grid_error_is_transparent() {
        let err: ConsistencyError = GridError::UnknownCell(CellId::new(2)).into();
        assert_eq!(format!("{err}"), "cell #2 is not in the store");
    }
}
