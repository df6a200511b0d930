//! The atomic measured units a paragraph is built from
//!
//! Knuth-Plass line breaking operates on a linear sequence of three item
//! kinds: boxes (fixed-width, unbreakable content), glue (elastic space) and
//! penalties (potential break positions with an aesthetic cost). The set is
//! closed, so the model is a sum type rather than a trait hierarchy.
//!
//! Items are immutable once built; construction is the only mutation point.
//!
//! # Breakability
//!
//! A line may break
//! - at a penalty whose cost is below [`MAX_PENALTY`] (costs at or above it
//!   forbid the break, costs at or below [`MIN_PENALTY`] force it), or
//! - at a glue immediately preceded by a box or a penalty, unless a forced
//!   break follows the glue directly (the forced break already provides the
//!   same break position).

use crate::document::NodeId;

/// Costs at or above this value forbid a break at the penalty
pub const MAX_PENALTY: f64 = 1000.0;

/// Costs at or below this value force a break at the penalty
pub const MIN_PENALTY: f64 = -1000.0;

/// Content carried by a box item
///
/// The breakpoint search only looks at widths; content is what the page
/// composer turns into positioned elements after breaking.
#[derive(Debug, Clone, PartialEq)]
pub enum BoxContent {
  /// A run of text from one document node
  Text {
    /// The text of the run
    text: String,
    /// Originating node (style and error attribution)
    node: NodeId,
  },
  /// Invisible spacer, e.g. the first-line indent box
  Empty,
  /// Pre-measured inline math expression
  Math {
    /// Originating math node
    node: NodeId,
  },
  /// Bullet or number starting an enumeration item
  EnumerationMark {
    /// The mark as drawn, e.g. `"\u{2022} "`
    symbol: String,
    /// Originating enumeration item node
    node: NodeId,
    /// Hanging indent the mark imposes on its paragraph
    indent: f64,
  },
  /// Visible footnote reference marker
  FootnoteMark {
    /// Marker text, e.g. `"[1]"`
    text: String,
    /// The footnote node whose children hold the footnote content
    node: NodeId,
  },
}

/// One atomic measured unit of a paragraph
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
  /// Fixed width, never split, never stretched
  Box {
    /// Measured width
    width: f64,
    /// What the box renders as
    content: BoxContent,
  },
  /// Elastic blank space
  Glue {
    /// Nominal width
    width: f64,
    /// Maximum additional width when the line is stretched
    stretch: f64,
    /// Maximum width reduction when the line is shrunk
    shrink: f64,
  },
  /// A potential break position carrying an aesthetic cost
  Penalty {
    /// Cost of breaking here; clamped to `[MIN_PENALTY, MAX_PENALTY]`
    cost: f64,
    /// Width consumed only if the break is taken (e.g. a hyphen glyph)
    width: f64,
    /// Marks an undesirable break; consecutive flagged breaks are penalized
    flagged: bool,
    /// Node supplying the style of the break glyph, if one is drawn
    node: Option<NodeId>,
  },
}

impl Item {
  /// Creates a text box
  pub fn text_box(text: impl Into<String>, width: f64, node: NodeId) -> Self {
    Item::Box {
      width,
      content: BoxContent::Text {
        text: text.into(),
        node,
      },
    }
  }

  /// Creates an invisible spacer box
  pub fn empty_box(width: f64) -> Self {
    Item::Box {
      width,
      content: BoxContent::Empty,
    }
  }

  /// Creates a glue item
  pub fn glue(width: f64, stretch: f64, shrink: f64) -> Self {
    Item::Glue {
      width,
      stretch,
      shrink,
    }
  }

  /// Creates a penalty item; infinite costs clamp to the ±1000 bounds
  pub fn penalty(cost: f64, width: f64, flagged: bool) -> Self {
    Item::Penalty {
      cost: cost.clamp(MIN_PENALTY, MAX_PENALTY),
      width,
      flagged,
      node: None,
    }
  }

  /// Creates a hyphenation penalty drawing a break glyph from `node`'s style
  pub fn hyphen_penalty(cost: f64, width: f64, node: NodeId) -> Self {
    Item::Penalty {
      cost: cost.clamp(MIN_PENALTY, MAX_PENALTY),
      width,
      flagged: true,
      node: Some(node),
    }
  }

  /// Creates the forced break terminating a paragraph or line
  ///
  /// Not flagged: a forced break is structural, so it never pairs with a
  /// preceding hyphen break for consecutive-flagged demerits.
  pub fn forced_break() -> Self {
    Item::penalty(MIN_PENALTY, 0.0, false)
  }

  /// Width of the item (a penalty's width counts only when its break is taken)
  pub fn width(&self) -> f64 {
    match *self {
      Item::Box { width, .. } => width,
      Item::Glue { width, .. } => width,
      Item::Penalty { .. } => 0.0,
    }
  }

  /// Stretchability; zero for boxes and penalties
  pub fn stretch(&self) -> f64 {
    match *self {
      Item::Glue { stretch, .. } => stretch,
      _ => 0.0,
    }
  }

  /// Shrinkability; zero for boxes and penalties
  pub fn shrink(&self) -> f64 {
    match *self {
      Item::Glue { shrink, .. } => shrink,
      _ => 0.0,
    }
  }

  /// Whether this is a box
  pub fn is_box(&self) -> bool {
    matches!(self, Item::Box { .. })
  }

  /// Whether this is glue
  pub fn is_glue(&self) -> bool {
    matches!(self, Item::Glue { .. })
  }

  /// Whether this is a penalty
  pub fn is_penalty(&self) -> bool {
    matches!(self, Item::Penalty { .. })
  }

  /// Whether a break here is mandatory
  pub fn is_forced_break(&self) -> bool {
    matches!(self, Item::Penalty { cost, .. } if *cost <= MIN_PENALTY)
  }

  /// Whether a break here is forbidden
  pub fn is_forbidden_break(&self) -> bool {
    matches!(self, Item::Penalty { cost, .. } if *cost >= MAX_PENALTY)
  }

  /// Whether the item vanishes at the start of a line after a break
  ///
  /// Glue and untaken penalties are discarded when a line begins; boxes and
  /// forced breaks are not.
  pub fn is_discardable(&self) -> bool {
    match self {
      Item::Glue { .. } => true,
      Item::Penalty { .. } => !self.is_forced_break(),
      Item::Box { .. } => false,
    }
  }

  /// Glue that stretches without limit, used to fill a paragraph's last line
  pub fn fill_glue() -> Self {
    Item::glue(0.0, f64::INFINITY, 0.0)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::document::{Document, NodeKind};
  use crate::style::ResolvedStyle;

  fn any_node() -> NodeId {
    let mut doc = Document::new(ResolvedStyle::default());
    doc.push(doc.root(), NodeKind::text("x"), None)
  }

  // =========================================================================
  // Width / elasticity accessors
  // =========================================================================

  #[test]
  fn box_has_no_elasticity() {
    let item = Item::text_box("word", 30.0, any_node());
    assert_eq!(item.width(), 30.0);
    assert_eq!(item.stretch(), 0.0);
    assert_eq!(item.shrink(), 0.0);
  }

  #[test]
  fn glue_reports_elasticity() {
    let item = Item::glue(10.0, 5.0, 3.0);
    assert_eq!(item.width(), 10.0);
    assert_eq!(item.stretch(), 5.0);
    assert_eq!(item.shrink(), 3.0);
  }

  #[test]
  fn penalty_width_is_conditional() {
    // The hyphen width is consumed only when the break is taken, so the
    // item's unconditional width is zero.
    let item = Item::penalty(50.0, 4.0, true);
    assert_eq!(item.width(), 0.0);
  }

  // =========================================================================
  // Forced / forbidden break classification
  // =========================================================================

  #[test]
  fn infinite_costs_clamp() {
    assert!(Item::penalty(f64::NEG_INFINITY, 0.0, false).is_forced_break());
    assert!(Item::penalty(f64::INFINITY, 0.0, false).is_forbidden_break());
  }

  #[test]
  fn finite_penalty_is_neither_forced_nor_forbidden() {
    let item = Item::penalty(50.0, 0.0, false);
    assert!(!item.is_forced_break());
    assert!(!item.is_forbidden_break());
  }

  #[test]
  fn forced_break_constructor() {
    let item = Item::forced_break();
    assert!(item.is_forced_break());
    assert!(item.is_penalty());
    assert!(matches!(item, Item::Penalty { flagged: false, .. }));
  }

  // =========================================================================
  // Discardability
  // =========================================================================

  #[test]
  fn glue_and_untaken_penalties_are_discardable() {
    assert!(Item::glue(10.0, 0.0, 0.0).is_discardable());
    assert!(Item::penalty(50.0, 0.0, false).is_discardable());
    assert!(!Item::forced_break().is_discardable());
    assert!(!Item::empty_box(0.0).is_discardable());
  }

  #[test]
  fn fill_glue_stretches_without_limit() {
    let item = Item::fill_glue();
    assert_eq!(item.width(), 0.0);
    assert!(item.stretch().is_infinite());
  }
}
