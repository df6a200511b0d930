//! Arena-based styled document tree
//!
//! The input boundary of the engine: an ordered tree of nodes whose style
//! values have already been resolved by an external cascade. Nodes live in a
//! single arena and reference each other by [`NodeId`] (a plain index), so
//! positioned output elements can carry weak back-references to their
//! originating node without ownership cycles.
//!
//! # Example
//!
//! ```
//! use galley::document::{Document, NodeKind};
//! use galley::style::ResolvedStyle;
//!
//! let mut doc = Document::new(ResolvedStyle::default());
//! let para = doc.push(doc.root(), NodeKind::Block, None);
//! doc.push(para, NodeKind::text("Hello world"), None);
//! assert_eq!(doc.children(doc.root()).len(), 1);
//! ```

use crate::geometry::Size;
use crate::style::{HorizontalAlignment, ResolvedStyle};
use std::fmt;
use std::sync::Arc;

/// Index of a node in a [`Document`] arena
///
/// Ids are only meaningful for the document that issued them. They are the
/// weak back-reference currency of the whole engine: page elements and items
/// carry `NodeId`s, never owned nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
  /// Raw arena index
  pub fn index(self) -> usize {
    self.0 as usize
  }
}

impl fmt::Display for NodeId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "#{}", self.0)
  }
}

/// Line/column position in the original markup source
///
/// Used to attribute typesetting errors to a place the author can find.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourcePosition {
  /// 1-based source line
  pub line: u32,
  /// 1-based source column
  pub column: u32,
}

impl SourcePosition {
  /// Creates a source position
  pub const fn new(line: u32, column: u32) -> Self {
    Self { line, column }
  }
}

impl fmt::Display for SourcePosition {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}:{}", self.line, self.column)
  }
}

/// What a document node is
///
/// A closed set: the engine consumes this tree, it does not extend it.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
  /// Root of a paragraph; its textual children fill one item sequence
  Block,
  /// A run of text sharing one style
  Text(String),
  /// Explicit line break inside a paragraph
  LineBreak,
  /// Explicit page break between paragraphs
  PageBreak,
  /// Block image with a pre-measured size in points
  Image {
    /// Intrinsic size of the image
    size: Size,
    /// Horizontal placement of the image box
    alignment: HorizontalAlignment,
    /// Whether following lines flow alongside the image
    floating: bool,
    /// Caption text typeset below the image
    caption: Option<String>,
  },
  /// Inline math expression with a pre-measured size in points
  Math {
    /// Rendered source of the expression, for the back-end
    source: String,
    /// Pre-measured size of the expression
    size: Size,
  },
  /// Container of enumeration items at a nesting level (1-based)
  Enumeration {
    /// Nesting depth; each level adds one indent step
    level: u32,
  },
  /// One enumeration item; becomes its own hanging-indent paragraph
  EnumerationItem,
  /// Footnote reference; the node's children are the footnote content
  Footnote,
}

impl NodeKind {
  /// Convenience constructor for text runs
  pub fn text(value: impl Into<String>) -> Self {
    NodeKind::Text(value.into())
  }
}

/// One node in the arena
#[derive(Debug, Clone)]
pub struct Node {
  kind: NodeKind,
  style: Arc<ResolvedStyle>,
  source: SourcePosition,
  children: Vec<NodeId>,
  parent: Option<NodeId>,
}

impl Node {
  /// The node's kind
  pub fn kind(&self) -> &NodeKind {
    &self.kind
  }

  /// The node's resolved style
  pub fn style(&self) -> &ResolvedStyle {
    &self.style
  }

  /// Shared handle to the node's resolved style
  pub fn style_arc(&self) -> Arc<ResolvedStyle> {
    Arc::clone(&self.style)
  }

  /// Position of the node in the markup source
  pub fn source(&self) -> SourcePosition {
    self.source
  }

  /// Child ids in document order
  pub fn children(&self) -> &[NodeId] {
    &self.children
  }

  /// Parent id, `None` for the root
  pub fn parent(&self) -> Option<NodeId> {
    self.parent
  }
}

/// A styled document tree held in a flat arena
#[derive(Debug, Clone)]
pub struct Document {
  nodes: Vec<Node>,
  root: NodeId,
}

impl Document {
  /// Creates a document whose root is a [`NodeKind::Block`] with `style`
  pub fn new(style: ResolvedStyle) -> Self {
    let root = Node {
      kind: NodeKind::Block,
      style: Arc::new(style),
      source: SourcePosition::default(),
      children: Vec::new(),
      parent: None,
    };
    Self {
      nodes: vec![root],
      root: NodeId(0),
    }
  }

  /// Id of the root node
  pub fn root(&self) -> NodeId {
    self.root
  }

  /// Appends a child node inheriting the parent's style
  ///
  /// A node with its own style is added with [`Document::push_styled`].
  pub fn push(&mut self, parent: NodeId, kind: NodeKind, source: Option<SourcePosition>) -> NodeId {
    let style = self.nodes[parent.index()].style_arc();
    self.push_with(parent, kind, style, source)
  }

  /// Appends a child node carrying its own resolved style
  pub fn push_styled(
    &mut self,
    parent: NodeId,
    kind: NodeKind,
    style: ResolvedStyle,
    source: Option<SourcePosition>,
  ) -> NodeId {
    self.push_with(parent, kind, Arc::new(style), source)
  }

  fn push_with(
    &mut self,
    parent: NodeId,
    kind: NodeKind,
    style: Arc<ResolvedStyle>,
    source: Option<SourcePosition>,
  ) -> NodeId {
    let id = NodeId(self.nodes.len() as u32);
    let source = source
      .or_else(|| Some(self.nodes[parent.index()].source))
      .unwrap_or_default();
    self.nodes.push(Node {
      kind,
      style,
      source,
      children: Vec::new(),
      parent: Some(parent),
    });
    self.nodes[parent.index()].children.push(id);
    id
  }

  /// The node behind `id`
  ///
  /// Panics if `id` comes from a different document.
  pub fn node(&self, id: NodeId) -> &Node {
    &self.nodes[id.index()]
  }

  /// Child ids of `id` in document order
  pub fn children(&self, id: NodeId) -> &[NodeId] {
    &self.nodes[id.index()].children
  }

  /// Number of nodes in the arena (including the root)
  pub fn len(&self) -> usize {
    self.nodes.len()
  }

  /// Whether the document holds only its root
  pub fn is_empty(&self) -> bool {
    self.nodes.len() <= 1
  }
}
