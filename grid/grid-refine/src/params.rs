//! Refinement parameters.

use std::fmt;
use std::str::FromStr;

use grid_types::Tolerance;

use crate::error::InputError;

/// Number of rows and columns a cell is split into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RefinementFactor {
    /// Rows (splits along y).
    pub rows: u32,
    /// Columns (splits along x).
    pub cols: u32,
}

impl RefinementFactor {
    /// The identity factor: a 1x1 split.
    pub const ONE: Self = Self::new(1, 1);

    /// Create a factor of `rows` x `cols`.
    #[must_use]
    pub const fn new(rows: u32, cols: u32) -> Self {
        Self { rows, cols }
    }

    /// Create a square factor.
    #[must_use]
    pub const fn uniform(n: u32) -> Self {
        Self::new(n, n)
    }

    /// Whether both components are at least 1.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.rows >= 1 && self.cols >= 1
    }

    /// Whether rows equal columns.
    #[must_use]
    pub const fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Number of cells produced by a split.
    #[must_use]
    pub const fn cell_count(&self) -> usize {
        self.rows as usize * self.cols as usize
    }

    /// Element-wise maximum of two factors.
    #[must_use]
    pub fn max(self, other: Self) -> Self {
        Self::new(self.rows.max(other.rows), self.cols.max(other.cols))
    }

    /// Same factor with a single row.
    #[must_use]
    pub const fn with_rows(self, rows: u32) -> Self {
        Self::new(rows, self.cols)
    }

    /// Same factor with a single column.
    #[must_use]
    pub const fn with_cols(self, cols: u32) -> Self {
        Self::new(self.rows, cols)
    }
}

impl Default for RefinementFactor {
    fn default() -> Self {
        Self::uniform(2)
    }
}

impl fmt::Display for RefinementFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

/// Neighbor-size rule enforced across every cell boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TopologyRule {
    /// No topology check; only the selected cells are split.
    #[default]
    None,

    /// MODFLOW-style grids: a neighbor may never be larger along the shared
    /// boundary (maximum ratio 1).
    Modflow,

    /// Nested grids: a neighbor may be at most twice as large along the
    /// shared boundary. Refinement factors must be square and one of 1, 2
    /// or 4, and violations are fixed with a 2x2 split.
    Nested,
}

impl TopologyRule {
    /// Largest admissible neighbor/self size ratio, or `None` when unchecked.
    #[must_use]
    pub const fn max_ratio(&self) -> Option<f64> {
        match self {
            Self::None => None,
            Self::Modflow => Some(1.0),
            Self::Nested => Some(2.0),
        }
    }

    /// Whether boundaries are checked at all.
    #[must_use]
    pub const fn is_checked(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Check that a refinement factor is allowed under this rule.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::ZeroFactor`] for an empty factor, and for
    /// [`TopologyRule::Nested`] rejects non-square factors and sizes other
    /// than 1, 2 or 4.
    pub fn admits(&self, factor: RefinementFactor) -> Result<(), InputError> {
        if !factor.is_valid() {
            return Err(InputError::ZeroFactor(factor));
        }
        if matches!(self, Self::Nested) {
            if !factor.is_square() {
                return Err(InputError::AsymmetricNestedFactor(factor));
            }
            if !matches!(factor.rows, 1 | 2 | 4) {
                return Err(InputError::UnsupportedNestedFactor(factor));
            }
        }
        Ok(())
    }

    /// Short lowercase name, accepted back by [`FromStr`].
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Modflow => "modflow",
            Self::Nested => "nested",
        }
    }
}

impl fmt::Display for TopologyRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TopologyRule {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "modflow" => Ok(Self::Modflow),
            // "newsam" is the historical name of the nested grid model
            "nested" | "newsam" => Ok(Self::Nested),
            _ => Err(InputError::UnknownRule(s.to_owned())),
        }
    }
}

/// Parameters for a refinement request.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RefineParams {
    /// Factor applied to every selected cell, and reused for propagated
    /// splits under [`TopologyRule::Modflow`].
    pub factor: RefinementFactor,

    /// Topology rule to enforce.
    pub rule: TopologyRule,

    /// Relative tolerance for geometric comparisons.
    pub tolerance: Tolerance,

    /// Upper bound on driver iterations before giving up.
    pub max_iterations: u32,
}

impl Default for RefineParams {
    fn default() -> Self {
        Self {
            factor: RefinementFactor::default(),
            rule: TopologyRule::default(),
            tolerance: Tolerance::default(),
            max_iterations: 10_000,
        }
    }
}

impl RefineParams {
    /// Create new parameters with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parameters for a MODFLOW grid with the given factor.
    #[must_use]
    pub fn modflow(factor: RefinementFactor) -> Self {
        Self {
            factor,
            rule: TopologyRule::Modflow,
            ..Self::default()
        }
    }

    /// Parameters for a nested grid dividing cells by `n` in both directions.
    #[must_use]
    pub fn nested(n: u32) -> Self {
        Self {
            factor: RefinementFactor::uniform(n),
            rule: TopologyRule::Nested,
            ..Self::default()
        }
    }

    /// Set the refinement factor.
    #[must_use]
    pub const fn with_factor(mut self, factor: RefinementFactor) -> Self {
        self.factor = factor;
        self
    }

    /// Set the topology rule.
    #[must_use]
    pub const fn with_rule(mut self, rule: TopologyRule) -> Self {
        self.rule = rule;
        self
    }

    /// Set the relative tolerance.
    #[must_use]
    pub const fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the iteration limit.
    #[must_use]
    pub const fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Check the parameters without looking at any grid.
    ///
    /// # Errors
    ///
    /// Returns the first [`InputError`] found.
    pub fn validate(&self) -> Result<(), InputError> {
        self.rule.admits(self.factor)?;
        if !self.tolerance.is_valid() {
            return Err(InputError::InvalidTolerance(self.tolerance.relative()));
        }
        if self.max_iterations == 0 {
            return Err(InputError::ZeroIterationLimit);
        }
        Ok(())
    }
}
