//! Top-level typesetting entry point
//!
//! Ties the pipeline together: the converter turns the styled document tree
//! into paragraph item sequences, then the composer breaks them into lines
//! and assembles pages. Most callers only ever touch this module and the
//! builders it needs.

use crate::compose::compose;
use crate::config::TypesetConfig;
use crate::convert::convert;
use crate::document::Document;
use crate::error::Result;
use crate::page::Page;
use log::debug;

/// Runs documents through the conversion and composition pipeline
///
/// # Examples
///
/// ```
/// use galley::config::{FixedFontMetrics, TypesetConfig};
/// use galley::document::{Document, NodeKind};
/// use galley::style::ResolvedStyle;
/// use galley::Typesetter;
///
/// let config = TypesetConfig::builder(FixedFontMetrics::new(6.0))
///     .build()
///     .unwrap();
/// let mut doc = Document::new(ResolvedStyle::default());
/// let para = doc.push(doc.root(), NodeKind::Block, None);
/// doc.push(para, NodeKind::text("Hello, world."), None);
///
/// let pages = Typesetter::new(config).typeset(&doc).unwrap();
/// assert_eq!(pages.len(), 1);
/// ```
pub struct Typesetter {
  config: TypesetConfig,
}

impl Typesetter {
  /// Creates a typesetter with the given configuration
  pub fn new(config: TypesetConfig) -> Self {
    Self { config }
  }

  /// The active configuration
  pub fn config(&self) -> &TypesetConfig {
    &self.config
  }

  /// Typesets a whole document into pages
  pub fn typeset(&self, document: &Document) -> Result<Vec<Page>> {
    let converted = convert(document, &self.config)?;
    let pages = compose(document, &self.config, converted)?;
    debug!("typeset {} nodes onto {} pages", document.len(), pages.len());
    Ok(pages)
  }
}
