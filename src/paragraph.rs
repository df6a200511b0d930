//! Paragraphs: ordered item sequences with per-line target widths
//!
//! A paragraph owns the item sequence the breakpoint search partitions, plus
//! a target-width function over 1-based line numbers. The width function
//! supports hanging indents (enumerations) and float-narrowed lines: widths
//! are composed by stacking reductions on top of the default width.
//!
//! Paragraphs are mutable only while the converter (and, for float
//! narrowing, the composer) builds them; the breakpoint search treats them
//! as immutable.

use crate::document::NodeId;
use crate::geometry::Size;
use crate::item::Item;
use crate::style::HorizontalAlignment;
use std::sync::Arc;

type WidthFn = Arc<dyn Fn(u32) -> f64 + Send + Sync>;

/// A paragraph of text items to be broken into lines
///
/// # Examples
///
/// ```
/// use galley::paragraph::TextParagraph;
/// use galley::item::Item;
/// use galley::document::{Document, NodeKind};
/// use galley::style::ResolvedStyle;
///
/// let mut doc = Document::new(ResolvedStyle::default());
/// let node = doc.push(doc.root(), NodeKind::Block, None);
/// let mut par = TextParagraph::new(200.0, node);
/// par.push(Item::empty_box(0.0));
/// par.push(Item::fill_glue());
/// par.push(Item::forced_break());
/// assert_eq!(par.line_width(1), 200.0);
/// ```
pub struct TextParagraph {
  node: NodeId,
  default_line_width: f64,
  items: Vec<Item>,
  width_fn: Option<WidthFn>,
  left_indent: f64,
}

impl TextParagraph {
  /// Creates an empty paragraph with the given default line width
  pub fn new(default_line_width: f64, node: NodeId) -> Self {
    Self {
      node,
      default_line_width,
      items: Vec::new(),
      width_fn: None,
      left_indent: 0.0,
    }
  }

  /// Extra left offset applied to every line, e.g. an enumeration indent
  pub fn left_indent(&self) -> f64 {
    self.left_indent
  }

  /// Sets the per-line left offset without touching line widths
  pub fn set_left_indent(&mut self, indent: f64) {
    self.left_indent = indent;
  }

  /// The node this paragraph was converted from
  pub fn node(&self) -> NodeId {
    self.node
  }

  /// Appends an item
  pub fn push(&mut self, item: Item) {
    self.items.push(item);
  }

  /// The item sequence in order
  pub fn items(&self) -> &[Item] {
    &self.items
  }

  /// Whether no items have been added yet
  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  /// Whether the paragraph contains at least one box
  pub fn has_box(&self) -> bool {
    self.items.iter().any(Item::is_box)
  }

  /// Default width before any per-line adjustment
  pub fn default_line_width(&self) -> f64 {
    self.default_line_width
  }

  /// Target width of the given 1-based line number
  pub fn line_width(&self, line_number: u32) -> f64 {
    match &self.width_fn {
      Some(f) => f(line_number),
      None => self.default_line_width,
    }
  }

  /// Installs a width function, replacing any existing one
  pub fn set_line_width_fn(&mut self, f: impl Fn(u32) -> f64 + Send + Sync + 'static) {
    self.width_fn = Some(Arc::new(f));
  }

  /// Reduces every line's width by `by`, stacking on the current widths
  pub fn reduce_all_lines(&mut self, by: f64) {
    if by == 0.0 {
      return;
    }
    let old = self.width_fn.take();
    let default = self.default_line_width;
    self.width_fn = Some(Arc::new(move |line| {
      let base = match &old {
        Some(f) => f(line),
        None => default,
      };
      base - by
    }));
  }

  /// Splits off the items from `from` onward into a fresh paragraph at the
  /// default measure, dropping any per-line width adjustments
  ///
  /// Used when a paragraph spills onto a new page: lines beside a float were
  /// broken at a narrowed width, and the remainder is re-broken at the full
  /// width of the new page.
  pub fn tail(&self, from: usize) -> TextParagraph {
    TextParagraph {
      node: self.node,
      default_line_width: self.default_line_width,
      items: self.items[from..].to_vec(),
      width_fn: None,
      left_indent: self.left_indent,
    }
  }

  /// Reduces the width of lines 1..=`count` by `by`, stacking on the
  /// current widths (used while a float is active)
  pub fn reduce_first_lines(&mut self, count: u32, by: f64) {
    if by == 0.0 || count == 0 {
      return;
    }
    let old = self.width_fn.take();
    let default = self.default_line_width;
    self.width_fn = Some(Arc::new(move |line| {
      let base = match &old {
        Some(f) => f(line),
        None => default,
      };
      if line <= count {
        base - by
      } else {
        base
      }
    }));
  }
}

impl std::fmt::Debug for TextParagraph {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("TextParagraph")
      .field("node", &self.node)
      .field("default_line_width", &self.default_line_width)
      .field("items", &self.items.len())
      .field("has_width_fn", &self.width_fn.is_some())
      .finish()
  }
}

/// A block image paragraph, optionally floating, with an optional caption
#[derive(Debug)]
pub struct ImageParagraph {
  node: NodeId,
  /// Width available to the image's paragraph box
  pub default_line_width: f64,
  /// Intrinsic size of the image in points
  pub size: Size,
  /// Horizontal placement of the image
  pub alignment: HorizontalAlignment,
  /// Whether following lines flow alongside the image
  pub floating: bool,
  /// Caption paragraphs, pre-converted at the image's content width
  pub caption: Vec<TextParagraph>,
}

impl ImageParagraph {
  /// Creates an image paragraph
  pub fn new(
    node: NodeId,
    default_line_width: f64,
    size: Size,
    alignment: HorizontalAlignment,
    floating: bool,
  ) -> Self {
    Self {
      node,
      default_line_width,
      size,
      alignment,
      floating,
      caption: Vec::new(),
    }
  }

  /// The node this paragraph was converted from
  pub fn node(&self) -> NodeId {
    self.node
  }

  /// A centered image never floats: there is no side to flow text along
  pub fn floats(&self) -> bool {
    self.floating && self.alignment != HorizontalAlignment::Center
  }
}

/// One paragraph of any kind, in document order
#[derive(Debug)]
pub enum Paragraph {
  /// Ordinary text paragraph
  Text(TextParagraph),
  /// Block image with optional caption
  Image(ImageParagraph),
}

impl Paragraph {
  /// The node this paragraph was converted from
  pub fn node(&self) -> NodeId {
    match self {
      Paragraph::Text(p) => p.node(),
      Paragraph::Image(p) => p.node(),
    }
  }
}
