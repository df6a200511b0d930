//! Typesetting configuration and collaborator interfaces
//!
//! The engine never performs I/O: font metrics, hyphenation candidates and
//! inter-word elasticity are supplied as pure, pre-resolved collaborators on
//! the [`TypesetConfig`]. The config is built once per run through
//! [`TypesetConfigBuilder`] and shared immutably afterwards.

use crate::error::{CollaboratorError, ComposeError};
use crate::geometry::{Insets, Size};
use crate::style::ResolvedStyle;
use std::sync::Arc;

/// Result type for collaborator calls
pub type CollabResult<T> = std::result::Result<T, CollaboratorError>;

/// Width and height of a measured string
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
  /// Advance width of the string
  pub width: f64,
  /// Height of the string's ink box
  pub height: f64,
}

/// Supplies measured text dimensions
///
/// Implementations must be pure: the same style and text always measure the
/// same. Expensive backends should cache internally.
pub trait FontMetrics: Send + Sync {
  /// Measures a string rendered in the given style
  fn measure_str(&self, style: &ResolvedStyle, text: &str) -> CollabResult<TextMetrics>;

  /// Width of the inter-word space in the given style
  fn space_width(&self, style: &ResolvedStyle) -> CollabResult<f64>;

  /// Width of a single character, e.g. the hyphen glyph
  fn char_width(&self, style: &ResolvedStyle, ch: char) -> CollabResult<f64> {
    let mut buf = [0u8; 4];
    Ok(self.measure_str(style, ch.encode_utf8(&mut buf))?.width)
  }
}

/// One part of a hyphenated word together with the cost of breaking after it
#[derive(Debug, Clone, PartialEq)]
pub struct HyphenatedPart {
  /// The syllable text
  pub text: String,
  /// Penalty for hyphenating after this part
  pub penalty: f64,
}

/// A word split into hyphenatable parts
///
/// A word that cannot be hyphenated is returned as a single part.
#[derive(Debug, Clone, PartialEq)]
pub struct HyphenatedWord {
  /// Parts in order; the last part's penalty is unused
  pub parts: Vec<HyphenatedPart>,
}

impl HyphenatedWord {
  /// Wraps a word that offers no split points
  pub fn unsplit(word: &str) -> Self {
    Self {
      parts: vec![HyphenatedPart {
        text: word.to_string(),
        penalty: 0.0,
      }],
    }
  }
}

/// Supplies hyphenation split points
pub trait Hyphenator: Send + Sync {
  /// Splits a word into parts with inter-part penalties
  fn hyphenate(&self, word: &str) -> HyphenatedWord;

  /// Penalty for breaking after an explicit hyphen already in the text
  fn explicit_hyphen_penalty(&self) -> f64 {
    50.0
  }
}

/// Supplies inter-word glue elasticity
pub trait GluePolicy: Send + Sync {
  /// Maximum growth of the space after `preceding`
  fn inter_word_stretch(&self, style: &ResolvedStyle, preceding: char) -> f64;

  /// Maximum shrink of the space after `preceding`
  fn inter_word_shrink(&self, style: &ResolvedStyle, preceding: char) -> f64;
}

// ===========================================================================
// Reference collaborator implementations
// ===========================================================================

/// Fixed-advance font metrics
///
/// Every character measures `advance` points wide and `style.font_size`
/// tall. Deterministic and allocation-free; the reference collaborator for
/// tests and examples.
///
/// ```
/// use galley::config::{FixedFontMetrics, FontMetrics};
/// use galley::style::ResolvedStyle;
///
/// let metrics = FixedFontMetrics::new(6.0);
/// let style = ResolvedStyle::default();
/// assert_eq!(metrics.measure_str(&style, "abcd").unwrap().width, 24.0);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FixedFontMetrics {
  advance: f64,
}

impl FixedFontMetrics {
  /// Creates metrics with the given per-character advance
  pub fn new(advance: f64) -> Self {
    Self { advance }
  }
}

impl FontMetrics for FixedFontMetrics {
  fn measure_str(&self, style: &ResolvedStyle, text: &str) -> CollabResult<TextMetrics> {
    Ok(TextMetrics {
      width: text.chars().count() as f64 * self.advance,
      height: style.font_size,
    })
  }

  fn space_width(&self, _style: &ResolvedStyle) -> CollabResult<f64> {
    Ok(self.advance)
  }
}

/// Hyphenator that never splits words
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHyphenation;

impl Hyphenator for NoHyphenation {
  fn hyphenate(&self, word: &str) -> HyphenatedWord {
    HyphenatedWord::unsplit(word)
  }
}

/// Em-fraction glue policy
///
/// Spaces stretch by 1/6 em and shrink by 1/9 em; a space following
/// sentence-ending punctuation may stretch twice as far.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardGluePolicy;

impl GluePolicy for StandardGluePolicy {
  fn inter_word_stretch(&self, style: &ResolvedStyle, preceding: char) -> f64 {
    let base = style.font_size / 6.0;
    if matches!(preceding, '.' | '!' | '?') {
      base * 2.0
    } else {
      base
    }
  }

  fn inter_word_shrink(&self, style: &ResolvedStyle, _preceding: char) -> f64 {
    style.font_size / 9.0
  }
}

// ===========================================================================
// Configuration
// ===========================================================================

/// Immutable configuration of one typesetting run
#[derive(Clone)]
pub struct TypesetConfig {
  /// Physical page size in points
  pub page_size: Size,
  /// Content-area insets of every page
  pub page_insets: Insets,
  /// Indent step per enumeration nesting level
  pub enumeration_indent: f64,
  /// Worst looseness level the breakpoint search may retry up to
  pub worst_quality: u32,
  /// Prefix of numbered figure captions
  pub caption_prefix: String,
  /// Thickness of the footnote separator rule
  pub footnote_rule_thickness: f64,
  font_metrics: Arc<dyn FontMetrics>,
  hyphenator: Arc<dyn Hyphenator>,
  glue_policy: Arc<dyn GluePolicy>,
}

impl TypesetConfig {
  /// Starts building a configuration; only font metrics are mandatory
  pub fn builder(font_metrics: impl FontMetrics + 'static) -> TypesetConfigBuilder {
    TypesetConfigBuilder::new(font_metrics)
  }

  /// The font metrics collaborator
  pub fn font_metrics(&self) -> &dyn FontMetrics {
    self.font_metrics.as_ref()
  }

  /// The hyphenation collaborator
  pub fn hyphenator(&self) -> &dyn Hyphenator {
    self.hyphenator.as_ref()
  }

  /// The glue policy collaborator
  pub fn glue_policy(&self) -> &dyn GluePolicy {
    self.glue_policy.as_ref()
  }

  /// Width of the content area between the horizontal insets
  pub fn content_width(&self) -> f64 {
    self.page_size.width - self.page_insets.horizontal()
  }
}

impl std::fmt::Debug for TypesetConfig {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("TypesetConfig")
      .field("page_size", &self.page_size)
      .field("page_insets", &self.page_insets)
      .field("enumeration_indent", &self.enumeration_indent)
      .field("worst_quality", &self.worst_quality)
      .finish_non_exhaustive()
  }
}

/// Builder for [`TypesetConfig`]
///
/// ```
/// use galley::config::{FixedFontMetrics, TypesetConfig};
/// use galley::geometry::{Insets, Size};
///
/// let config = TypesetConfig::builder(FixedFontMetrics::new(6.0))
///     .page_size(Size::new(595.0, 842.0))
///     .page_insets(Insets::uniform(50.0))
///     .build()
///     .unwrap();
/// assert_eq!(config.content_width(), 495.0);
/// ```
pub struct TypesetConfigBuilder {
  page_size: Size,
  page_insets: Insets,
  enumeration_indent: f64,
  worst_quality: u32,
  caption_prefix: String,
  footnote_rule_thickness: f64,
  font_metrics: Arc<dyn FontMetrics>,
  hyphenator: Arc<dyn Hyphenator>,
  glue_policy: Arc<dyn GluePolicy>,
}

impl TypesetConfigBuilder {
  /// Creates a builder with A4 pages, 50pt insets and default collaborators
  pub fn new(font_metrics: impl FontMetrics + 'static) -> Self {
    Self {
      page_size: Size::new(595.0, 842.0),
      page_insets: Insets::uniform(50.0),
      enumeration_indent: 20.0,
      worst_quality: 5,
      caption_prefix: "Figure".to_string(),
      footnote_rule_thickness: 0.5,
      font_metrics: Arc::new(font_metrics),
      hyphenator: Arc::new(NoHyphenation),
      glue_policy: Arc::new(StandardGluePolicy),
    }
  }

  /// Sets the physical page size
  pub fn page_size(mut self, size: Size) -> Self {
    self.page_size = size;
    self
  }

  /// Sets the content-area insets
  pub fn page_insets(mut self, insets: Insets) -> Self {
    self.page_insets = insets;
    self
  }

  /// Sets the indent step per enumeration level
  pub fn enumeration_indent(mut self, indent: f64) -> Self {
    self.enumeration_indent = indent;
    self
  }

  /// Sets the worst looseness level the search may retry up to
  pub fn worst_quality(mut self, quality: u32) -> Self {
    self.worst_quality = quality;
    self
  }

  /// Sets the numbered-caption prefix
  pub fn caption_prefix(mut self, prefix: impl Into<String>) -> Self {
    self.caption_prefix = prefix.into();
    self
  }

  /// Replaces the hyphenation collaborator
  pub fn hyphenator(mut self, hyphenator: impl Hyphenator + 'static) -> Self {
    self.hyphenator = Arc::new(hyphenator);
    self
  }

  /// Replaces the glue policy collaborator
  pub fn glue_policy(mut self, glue_policy: impl GluePolicy + 'static) -> Self {
    self.glue_policy = Arc::new(glue_policy);
    self
  }

  /// Validates and builds the configuration
  pub fn build(self) -> crate::Result<TypesetConfig> {
    if self.page_size.width - self.page_insets.horizontal() <= 0.0
      || self.page_size.height - self.page_insets.vertical() <= 0.0
    {
      return Err(
        ComposeError::DegenerateContentArea {
          page_size: self.page_size,
          insets: self.page_insets,
        }
        .into(),
      );
    }
    Ok(TypesetConfig {
      page_size: self.page_size,
      page_insets: self.page_insets,
      enumeration_indent: self.enumeration_indent,
      worst_quality: self.worst_quality,
      caption_prefix: self.caption_prefix,
      footnote_rule_thickness: self.footnote_rule_thickness,
      font_metrics: self.font_metrics,
      hyphenator: self.hyphenator,
      glue_policy: self.glue_policy,
    })
  }
}
