//! Core geometry types for typesetting and page composition
//!
//! All units are printer points (1/72 inch) unless otherwise noted. The
//! coordinate system has its origin at the top-left corner of a page:
//! positive X extends to the right, positive Y extends downward.

use std::fmt;

/// A 2D point in page space
///
/// # Examples
///
/// ```
/// use galley::geometry::Point;
///
/// let p = Point::new(10.0, 20.0);
/// assert_eq!(p.x, 10.0);
/// assert_eq!(Point::ZERO, Point::new(0.0, 0.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
  /// X coordinate (increases to the right)
  pub x: f64,
  /// Y coordinate (increases downward)
  pub y: f64,
}

impl Point {
  /// The origin (0, 0)
  pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

  /// Creates a new point at the given coordinates
  pub const fn new(x: f64, y: f64) -> Self {
    Self { x, y }
  }

  /// Returns this point translated by the given deltas
  pub fn translate(self, dx: f64, dy: f64) -> Self {
    Self {
      x: self.x + dx,
      y: self.y + dy,
    }
  }
}

impl fmt::Display for Point {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "({}, {})", self.x, self.y)
  }
}

/// A width/height pair
///
/// # Examples
///
/// ```
/// use galley::geometry::Size;
///
/// let size = Size::new(595.0, 842.0); // A4 in points
/// assert_eq!(size.width, 595.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
  /// Horizontal extent
  pub width: f64,
  /// Vertical extent
  pub height: f64,
}

impl Size {
  /// A zero-area size
  pub const ZERO: Self = Self {
    width: 0.0,
    height: 0.0,
  };

  /// Creates a new size
  pub const fn new(width: f64, height: f64) -> Self {
    Self { width, height }
  }

  /// Width divided by height
  pub fn aspect_ratio(&self) -> f64 {
    self.width / self.height
  }
}

impl fmt::Display for Size {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}x{}", self.width, self.height)
  }
}

/// Edge offsets from the four sides of a rectangle
///
/// Used for page insets and paragraph margins/paddings.
///
/// # Examples
///
/// ```
/// use galley::geometry::Insets;
///
/// let insets = Insets::uniform(50.0);
/// assert_eq!(insets.left, 50.0);
/// assert_eq!(Insets::new(1.0, 2.0, 3.0, 4.0).horizontal(), 6.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Insets {
  /// Offset from the top edge
  pub top: f64,
  /// Offset from the right edge
  pub right: f64,
  /// Offset from the bottom edge
  pub bottom: f64,
  /// Offset from the left edge
  pub left: f64,
}

impl Insets {
  /// All-zero insets
  pub const ZERO: Self = Self {
    top: 0.0,
    right: 0.0,
    bottom: 0.0,
    left: 0.0,
  };

  /// Creates insets from the four edge offsets (top, right, bottom, left)
  pub const fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
    Self {
      top,
      right,
      bottom,
      left,
    }
  }

  /// Creates insets with the same offset on every edge
  pub const fn uniform(value: f64) -> Self {
    Self::new(value, value, value, value)
  }

  /// Sum of the left and right offsets
  pub fn horizontal(&self) -> f64 {
    self.left + self.right
  }

  /// Sum of the top and bottom offsets
  pub fn vertical(&self) -> f64 {
    self.top + self.bottom
  }
}
