//! Result types for refinement runs.

use std::fmt;

use crate::error::InputError;

/// How a refinement run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RefinementStatus {
    /// The fix queue emptied: the grid satisfies the topology rule.
    Converged,

    /// The observer stopped the run between iterations. Committed
    /// iterations are kept.
    Cancelled {
        /// Queue entries that were still waiting.
        pending: usize,
    },

    /// The request was malformed. The store was not touched.
    Rejected(InputError),
}

impl RefinementStatus {
    /// Whether the run reached the fixed point.
    #[must_use]
    pub const fn is_converged(&self) -> bool {
        matches!(self, Self::Converged)
    }
}

impl fmt::Display for RefinementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Converged => f.write_str("converged"),
            Self::Cancelled { pending } => write!(f, "cancelled ({pending} pending)"),
            Self::Rejected(err) => write!(f, "rejected: {err}"),
        }
    }
}

/// Summary of a refinement run.
#[derive(Debug, Clone, PartialEq)]
pub struct RefinementReport {
    /// Iterations committed to the store.
    pub iterations: u32,

    /// Cells inserted (children of every split).
    pub cells_created: usize,

    /// Cells deleted (every split parent).
    pub cells_removed: usize,

    /// How the run ended.
    pub status: RefinementStatus,
}

impl RefinementReport {
    /// Report for a request rejected before any mutation.
    #[must_use]
    pub const fn rejected(err: InputError) -> Self {
        Self {
            iterations: 0,
            cells_created: 0,
            cells_removed: 0,
            status: RefinementStatus::Rejected(err),
        }
    }

    /// Change in the number of live cells.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)] // cell counts stay far below isize::MAX
    pub const fn net_cells(&self) -> isize {
        self.cells_created as isize - self.cells_removed as isize
    }
}

impl fmt::Display for RefinementReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Refinement {}: {} iterations, {} cells split into {} ({:+} net)",
            self.status,
            self.iterations,
            self.cells_removed,
            self.cells_created,
            self.net_cells()
        )
    }
}

/// Progress handed to a [`RefineObserver`](crate::RefineObserver) after
/// each committed iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IterationProgress {
    /// 1-based number of the iteration just committed.
    pub iteration: u32,

    /// Queue entries resolved so far, across all iterations.
    pub resolved: usize,

    /// Queue entries waiting for the next iteration.
    pub pending: usize,

    /// Live cells in the store.
    pub live_cells: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_net_cells() {
        let report = RefinementReport {
            iterations: 2,
            cells_created: 8,
            cells_removed: 3,
            status: RefinementStatus::Converged,
        };
        assert_eq!(report.net_cells(), 5);
        assert!(report.status.is_converged());
    }

    #[test]
    fn test_rejected() {
        let report = RefinementReport::rejected(InputError::EmptySelection);
        assert_eq!(report.iterations, 0);
        assert_eq!(report.status, RefinementStatus::Rejected(InputError::EmptySelection));
    }

    #[test]
    fn test_display() {
        let report = RefinementReport {
            iterations: 1,
            cells_created: 4,
            cells_removed: 1,
            status: RefinementStatus::Converged,
        };
        let display = format!("{report}");
        assert!(display.contains("converged"));
        assert!(display.contains("1 iterations"));
        assert!(display.contains("+3 net"));

        let cancelled = RefinementStatus::Cancelled { pending: 6 };
        assert_eq!(cancelled.to_string(), "cancelled (6 pending)");
    }
}
