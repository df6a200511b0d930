//! Resolved style values consumed by the engine
//!
//! The style cascade itself is an external collaborator: selectors have
//! already been matched and every value resolved to absolute printer points
//! by the time a node reaches this crate. `ResolvedStyle` is therefore a
//! plain bag of numbers, not a cascade participant.

use crate::geometry::Insets;

/// Horizontal alignment of a paragraph's lines or a block element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HorizontalAlignment {
  /// Flush left (the default)
  #[default]
  Left,
  /// Centered between the margins
  Center,
  /// Flush right
  Right,
}

/// Fully resolved style values for one document node
///
/// Margins and paddings are absolute edge offsets; `line_height` and
/// `first_line_indent` are absolute distances. Relative units (em,
/// percentages) must be resolved by the cascade before construction.
///
/// # Examples
///
/// ```
/// use galley::style::ResolvedStyle;
///
/// let style = ResolvedStyle {
///     font_size: 11.0,
///     line_height: 14.0,
///     ..ResolvedStyle::default()
/// };
/// assert!(style.justify);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStyle {
  /// Font size in points; collaborators use this to measure text
  pub font_size: f64,
  /// Distance between successive baselines
  pub line_height: f64,
  /// Indent of a paragraph's first line
  pub first_line_indent: f64,
  /// Margin around the paragraph box
  pub margin: Insets,
  /// Padding inside the paragraph box
  pub padding: Insets,
  /// Alignment of lines that are not justified
  pub alignment: HorizontalAlignment,
  /// Whether interior lines are stretched/shrunk to the full line width
  pub justify: bool,
  /// Whether to emit a background rectangle behind the paragraph
  pub background: bool,
}

impl Default for ResolvedStyle {
  fn default() -> Self {
    Self {
      font_size: 12.0,
      line_height: 14.4,
      first_line_indent: 0.0,
      margin: Insets::ZERO,
      padding: Insets::ZERO,
      alignment: HorizontalAlignment::Left,
      justify: true,
      background: false,
    }
  }
}

impl ResolvedStyle {
  /// Combined left margin and padding (the paragraph's content indent)
  pub fn indent_left(&self) -> f64 {
    self.margin.left + self.padding.left
  }

  /// Combined horizontal margin and padding on both sides
  pub fn horizontal_extra(&self) -> f64 {
    self.margin.horizontal() + self.padding.horizontal()
  }
}
