//! Tolerance-based numeric comparison.
//!
//! Cell coordinates accumulate floating-point drift across repeated splits, so
//! every geometric predicate in the grid crates goes through a relative
//! tolerance instead of exact equality.
//!
//! # Example
//!
//! ```
//! use grid_types::{Tolerance, approx_eq};
//! use nalgebra::{Point2, Vector2};
//!
//! assert!(approx_eq(1.0, 1.0 + 1e-9, 1e-6));
//! assert!(!approx_eq(1.0, 1.001, 1e-6));
//!
//! let tol = Tolerance::default();
//! assert!(tol.points_coincide(&Point2::new(0.1 + 0.2, 1.0), &Point2::new(0.3, 1.0)));
//! assert!(tol.colinear(&Vector2::new(2.0, 0.0), &Vector2::new(-1.0, 0.0)));
//! ```

use nalgebra::{Point2, Vector2};

/// Default relative tolerance used by all grid predicates.
pub const DEFAULT_RELATIVE_TOLERANCE: f64 = 1e-6;

/// Check whether two values are equal within a relative tolerance.
///
/// Returns `true` if `|a - b| < rel * max(|a|, |b|)`, or if both magnitudes
/// are below `rel` (values near zero are compared absolutely).
#[inline]
#[must_use]
pub fn approx_eq(a: f64, b: f64, rel: f64) -> bool {
    let norm = a.abs().max(b.abs());
    norm < rel || (a - b).abs() < rel * norm
}

/// Displacement vector from `p` to `q`.
#[inline]
#[must_use]
pub fn vector_between(p: &Point2<f64>, q: &Point2<f64>) -> Vector2<f64> {
    q - p
}

/// A relative tolerance for geometric comparisons.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tolerance {
    relative: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            relative: DEFAULT_RELATIVE_TOLERANCE,
        }
    }
}

impl Tolerance {
    /// Create a tolerance with the given relative error.
    ///
    /// Use [`Tolerance::is_valid`] to check the value before relying on it;
    /// zero, negative or non-finite tolerances make every comparison fail.
    #[must_use]
    pub const fn new(relative: f64) -> Self {
        Self { relative }
    }

    /// The relative error bound.
    #[must_use]
    pub const fn relative(&self) -> f64 {
        self.relative
    }

    /// Whether this tolerance is finite and strictly positive.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.relative.is_finite() && self.relative > 0.0
    }

    /// Tolerance-aware equality.
    #[inline]
    #[must_use]
    pub fn eq(&self, a: f64, b: f64) -> bool {
        approx_eq(a, b, self.relative)
    }

    /// Equality with the error bound scaled by `scale` instead of by the
    /// magnitude of the operands.
    ///
    /// Use this when the values are large but their differences should be
    /// judged against a local length, e.g. a cell's own size.
    #[inline]
    #[must_use]
    pub fn eq_scaled(&self, a: f64, b: f64, scale: f64) -> bool {
        (a - b).abs() <= self.relative * scale.abs()
    }

    /// `a <= b` up to tolerance.
    #[inline]
    #[must_use]
    pub fn le(&self, a: f64, b: f64) -> bool {
        a < b || self.eq(a, b)
    }

    /// Whether two points coincide, comparing x and y independently.
    #[inline]
    #[must_use]
    pub fn points_coincide(&self, p: &Point2<f64>, q: &Point2<f64>) -> bool {
        self.eq(p.x, q.x) && self.eq(p.y, q.y)
    }

    /// Whether two vectors are colinear (vanishing cross product).
    ///
    /// A zero-length vector is colinear with everything.
    #[inline]
    #[must_use]
    pub fn colinear(&self, v1: &Vector2<f64>, v2: &Vector2<f64>) -> bool {
        self.eq(v1.y.mul_add(v2.x, -(v1.x * v2.y)), 0.0)
    }
}
