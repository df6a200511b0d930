//! Pages of positioned output elements
//!
//! The engine's output: an ordered list of pages, each holding positioned
//! elements a rendering back-end maps to drawing operations. Elements carry
//! a [`NodeId`] back-reference into the source document for style lookup;
//! the reference is an arena index, never ownership.

use crate::document::NodeId;
use crate::geometry::{Insets, Point, Size};

/// A positioned run of text sharing one style
#[derive(Debug, Clone, PartialEq)]
pub struct TextElement {
  /// The text as drawn (hyphen glyphs included)
  pub text: String,
  /// Originating document node
  pub node: NodeId,
  /// Top-left corner of the run's box
  pub position: Point,
  /// Size of the run's box (width = measured text, height = line height)
  pub size: Size,
  /// Baseline offset from the top of the box
  pub baseline: f64,
}

/// A positioned image
#[derive(Debug, Clone, PartialEq)]
pub struct ImageElement {
  /// Originating image node (the renderer resolves the source from it)
  pub node: NodeId,
  /// Top-left corner
  pub position: Point,
  /// Size after scaling to the paragraph width
  pub size: Size,
}

/// A horizontal rule, e.g. the footnote separator
#[derive(Debug, Clone, PartialEq)]
pub struct LineElement {
  /// Left end of the rule
  pub position: Point,
  /// Length (width) and extent (height) of the rule
  pub size: Size,
  /// Stroke thickness
  pub thickness: f64,
}

/// A filled rectangle, e.g. a paragraph background
#[derive(Debug, Clone, PartialEq)]
pub struct RectangleElement {
  /// Node whose style supplies fill and border values
  pub node: NodeId,
  /// Top-left corner
  pub position: Point,
  /// Extent of the rectangle
  pub size: Size,
}

/// A positioned math expression
#[derive(Debug, Clone, PartialEq)]
pub struct MathExpressionElement {
  /// Source of the expression, for the math renderer
  pub source: String,
  /// Originating math node
  pub node: NodeId,
  /// Top-left corner
  pub position: Point,
  /// Pre-measured size
  pub size: Size,
  /// Baseline offset from the top of the box
  pub baseline: f64,
}

/// One positioned element on a page
///
/// A closed set consumed by rendering back-ends.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
  /// Text run
  Text(TextElement),
  /// Image
  Image(ImageElement),
  /// Horizontal rule
  Line(LineElement),
  /// Filled rectangle
  Rectangle(RectangleElement),
  /// Math expression
  Math(MathExpressionElement),
}

impl Element {
  /// Top-left corner of the element
  pub fn position(&self) -> Point {
    match self {
      Element::Text(e) => e.position,
      Element::Image(e) => e.position,
      Element::Line(e) => e.position,
      Element::Rectangle(e) => e.position,
      Element::Math(e) => e.position,
    }
  }

  /// Extent of the element
  pub fn size(&self) -> Size {
    match self {
      Element::Text(e) => e.size,
      Element::Image(e) => e.size,
      Element::Line(e) => e.size,
      Element::Rectangle(e) => e.size,
      Element::Math(e) => e.size,
    }
  }

  /// Originating document node, if the element has one
  pub fn node(&self) -> Option<NodeId> {
    match self {
      Element::Text(e) => Some(e.node),
      Element::Image(e) => Some(e.node),
      Element::Line(_) => None,
      Element::Rectangle(e) => Some(e.node),
      Element::Math(e) => Some(e.node),
    }
  }

  /// Y coordinate of the element's bottom edge
  pub fn bottom(&self) -> f64 {
    self.position().y + self.size().height
  }

  /// Moves the element by the given deltas
  pub fn translate(&mut self, dx: f64, dy: f64) {
    let moved = self.position().translate(dx, dy);
    match self {
      Element::Text(e) => e.position = moved,
      Element::Image(e) => e.position = moved,
      Element::Line(e) => e.position = moved,
      Element::Rectangle(e) => e.position = moved,
      Element::Math(e) => e.position = moved,
    }
  }
}

/// A ready-to-render page
#[derive(Debug, Clone)]
pub struct Page {
  number: usize,
  size: Size,
  insets: Insets,
  elements: Vec<Element>,
}

impl Page {
  /// Creates a page from its accumulated elements
  pub fn new(number: usize, size: Size, insets: Insets, elements: Vec<Element>) -> Self {
    Self {
      number,
      size,
      insets,
      elements,
    }
  }

  /// 1-based page number
  pub fn number(&self) -> usize {
    self.number
  }

  /// Physical page size
  pub fn size(&self) -> Size {
    self.size
  }

  /// Content-area insets
  pub fn insets(&self) -> Insets {
    self.insets
  }

  /// Elements in paint order
  pub fn elements(&self) -> &[Element] {
    &self.elements
  }
}
