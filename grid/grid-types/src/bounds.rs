//! Axis-aligned 2D bounding rectangle.

use nalgebra::{Point2, Vector2};

/// An axis-aligned rectangle in model coordinates.
///
/// Intervals are closed: two rectangles sharing only an edge or a corner
/// intersect.
///
/// # Example
///
/// ```
/// use grid_types::Rect;
/// use nalgebra::Point2;
///
/// // Corners can be specified in any order
/// let rect = Rect::new(Point2::new(4.0, 4.0), Point2::new(0.0, 0.0));
/// assert_eq!(rect.min, Point2::new(0.0, 0.0));
/// assert_eq!(rect.width(), 4.0);
///
/// let east = Rect::new(Point2::new(4.0, 0.0), Point2::new(8.0, 4.0));
/// assert!(rect.intersects(&east));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    /// Minimum corner (smallest x and y).
    pub min: Point2<f64>,
    /// Maximum corner (largest x and y).
    pub max: Point2<f64>,
}

impl Rect {
    /// Create a rectangle from two opposite corners, reordering as needed.
    #[must_use]
    pub fn new(a: Point2<f64>, b: Point2<f64>) -> Self {
        Self {
            min: Point2::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point2::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Create a rectangle from its extents.
    #[must_use]
    pub fn from_extents(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Self {
        Self::new(Point2::new(x_min, y_min), Point2::new(x_max, y_max))
    }

    /// Smallest rectangle containing both.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: Point2::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Point2::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    /// Extent along x.
    #[inline]
    #[must_use]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// Extent along y.
    #[inline]
    #[must_use]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Width and height as a vector.
    #[must_use]
    pub fn size(&self) -> Vector2<f64> {
        self.max - self.min
    }

    /// Center point.
    #[must_use]
    pub fn center(&self) -> Point2<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Whether the closed rectangles share at least one point.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }

    /// Whether `other` lies entirely inside this rectangle.
    #[must_use]
    pub fn contains_rect(&self, other: &Self) -> bool {
        self.min.x <= other.min.x
            && self.min.y <= other.min.y
            && other.max.x <= self.max.x
            && other.max.y <= self.max.y
    }

    /// Pad the rectangle by `padding` on every side.
    #[must_use]
    pub fn padded(&self, padding: f64) -> Self {
        Self {
            min: Point2::new(self.min.x - padding, self.min.y - padding),
            max: Point2::new(self.max.x + padding, self.max.y + padding),
        }
    }
}
