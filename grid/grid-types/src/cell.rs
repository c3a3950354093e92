//! Rectangular grid cells and their attribute payload.

use std::collections::BTreeMap;
use std::fmt;

use nalgebra::{Point2, Vector2};

use crate::bounds::Rect;
use crate::error::{GridError, GridResult};
use crate::tolerance::Tolerance;

/// Position of a corner in a cell's clockwise corner list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Corner {
    /// Top-left corner (index 0).
    TopLeft = 0,
    /// Top-right corner (index 1).
    TopRight = 1,
    /// Bottom-right corner (index 2).
    BottomRight = 2,
    /// Bottom-left corner (index 3).
    BottomLeft = 3,
}

impl Corner {
    /// All corners in clockwise order starting at the top-left.
    pub const CLOCKWISE: [Self; 4] = [
        Self::TopLeft,
        Self::TopRight,
        Self::BottomRight,
        Self::BottomLeft,
    ];

    /// Index of this corner in [`Cell::corners`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// A single attribute value carried by a cell.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttributeValue {
    /// Integer attribute (ids, row/column indices, zone numbers).
    Integer(i64),
    /// Floating-point attribute (conductivity, elevation, ...).
    Real(f64),
    /// Free-form text.
    Text(String),
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{v}"),
            Self::Real(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
        }
    }
}

impl From<i64> for AttributeValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<f64> for AttributeValue {
    fn from(v: f64) -> Self {
        Self::Real(v)
    }
}

impl From<&str> for AttributeValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

impl From<String> for AttributeValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

/// Opaque, ordered attribute set attached to a cell.
///
/// The refinement engine copies attributes from a parent to each of its
/// children but never reads them.
///
/// # Example
///
/// ```
/// use grid_types::{Attributes, AttributeValue};
///
/// let mut attrs = Attributes::new();
/// attrs.insert("zone", 3_i64);
/// attrs.insert("name", "aquifer");
///
/// assert_eq!(attrs.get("zone"), Some(&AttributeValue::Integer(3)));
/// assert_eq!(attrs.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Attributes(BTreeMap<String, AttributeValue>);

impl Attributes {
    /// Create an empty attribute set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an attribute, returning the previous value if any.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> Option<AttributeValue> {
        self.0.insert(key.into(), value.into())
    }

    /// Look up an attribute.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.0.get(key)
    }

    /// Remove an attribute.
    pub fn remove(&mut self, key: &str) -> Option<AttributeValue> {
        self.0.remove(key)
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<AttributeValue>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// One rectangular element of a grid.
///
/// Corners are stored clockwise starting at the top-left: top-left,
/// top-right, bottom-right, bottom-left. The y axis points up, so "top"
/// is the larger y.
///
/// # Example
///
/// ```
/// use grid_types::{Cell, Corner};
/// use nalgebra::Point2;
///
/// let cell = Cell::from_extents(0.0, 0.0, 4.0, 2.0)?;
///
/// assert_eq!(cell.corner(Corner::TopLeft), Point2::new(0.0, 2.0));
/// assert_eq!(cell.corner(Corner::BottomRight), Point2::new(4.0, 0.0));
/// assert_eq!(cell.width(), 4.0);
/// assert_eq!(cell.height(), 2.0);
/// # Ok::<(), grid_types::GridError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    corners: [Point2<f64>; 4],
    /// Opaque attributes inherited on split.
    pub attributes: Attributes,
}

impl Cell {
    /// Create a cell from four clockwise corners (top-left first).
    ///
    /// # Errors
    ///
    /// Returns an error if a coordinate is not finite, if the corners are not
    /// an axis-aligned rectangle in clockwise order, or if the rectangle is
    /// degenerate.
    pub fn new(corners: [Point2<f64>; 4]) -> GridResult<Self> {
        for p in &corners {
            if !(p.x.is_finite() && p.y.is_finite()) {
                return Err(GridError::NonFiniteCoordinate { x: p.x, y: p.y });
            }
        }

        let [tl, tr, br, bl] = corners;
        let width = tr.x - tl.x;
        let height = tl.y - bl.y;
        if width <= 0.0 || height <= 0.0 {
            return Err(GridError::DegenerateCell { width, height });
        }

        // Judged against the cell size, not the coordinates
        let tol = Tolerance::default();
        let scale = width.max(height);
        let aligned = tol.eq_scaled(tl.y, tr.y, scale)
            && tol.eq_scaled(bl.y, br.y, scale)
            && tol.eq_scaled(tl.x, bl.x, scale)
            && tol.eq_scaled(tr.x, br.x, scale);
        if !aligned {
            return Err(GridError::NotAxisAligned);
        }

        Ok(Self {
            corners,
            attributes: Attributes::new(),
        })
    }

    /// Create a cell from its extents.
    ///
    /// # Errors
    ///
    /// Returns an error if the extents are not finite or describe an empty
    /// rectangle (`x_max <= x_min` or `y_max <= y_min`).
    pub fn from_extents(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> GridResult<Self> {
        Self::new([
            Point2::new(x_min, y_max),
            Point2::new(x_max, y_max),
            Point2::new(x_max, y_min),
            Point2::new(x_min, y_min),
        ])
    }

    /// Create a cell covering a bounding rectangle.
    ///
    /// # Errors
    ///
    /// Returns an error if the rectangle is degenerate or not finite.
    pub fn from_rect(rect: &Rect) -> GridResult<Self> {
        Self::from_extents(rect.min.x, rect.min.y, rect.max.x, rect.max.y)
    }

    /// Replace the attribute set.
    #[must_use]
    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// The four corners in clockwise order.
    #[inline]
    #[must_use]
    pub const fn corners(&self) -> &[Point2<f64>; 4] {
        &self.corners
    }

    /// A single corner.
    #[inline]
    #[must_use]
    pub const fn corner(&self, corner: Corner) -> Point2<f64> {
        self.corners[corner as usize]
    }

    /// Horizontal size, measured along the top edge.
    #[inline]
    #[must_use]
    pub fn width(&self) -> f64 {
        (self.corners[1].x - self.corners[0].x).abs()
    }

    /// Vertical size, measured along the left edge.
    #[inline]
    #[must_use]
    pub fn height(&self) -> f64 {
        (self.corners[0].y - self.corners[3].y).abs()
    }

    /// Width and height as a vector.
    #[must_use]
    pub fn size(&self) -> Vector2<f64> {
        Vector2::new(self.width(), self.height())
    }

    /// Bounding rectangle.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::new(self.corners[3], self.corners[1])
    }

    /// Center point.
    #[must_use]
    pub fn center(&self) -> Point2<f64> {
        self.bounds().center()
    }
}
