//! Conversion of the styled document tree into paragraph item sequences
//!
//! The converter walks the top-level children of the document root and turns
//! each into a [`Paragraph`]: text blocks become box/glue/penalty sequences,
//! images become image paragraphs with pre-typeset captions, enumerations
//! become one hanging-indent paragraph per item. Explicit page breaks split
//! the output into consecutive paragraph lists; the composer starts a fresh
//! page between lists.
//!
//! All text measurement happens here, through the configured collaborators.
//! The breakpoint search and the composer only ever see widths.

use crate::config::TypesetConfig;
use crate::document::{Document, Node, NodeId, NodeKind};
use crate::error::{ConversionError, Result};
use crate::geometry::Size;
use crate::item::{BoxContent, Item};
use crate::paragraph::{ImageParagraph, Paragraph, TextParagraph};
use crate::style::ResolvedStyle;
use rustc_hash::FxHashMap;

/// The converter's output: paragraph lists separated by explicit page breaks
#[derive(Debug)]
pub struct ConvertedDocument {
  /// Consecutive paragraph runs; each run starts on a fresh page
  pub lists: Vec<Vec<Paragraph>>,
  /// Footnote content, keyed by the referencing footnote node
  pub footnotes: FxHashMap<NodeId, Vec<TextParagraph>>,
}

/// Converts a document into paragraph item sequences
pub fn convert(document: &Document, config: &TypesetConfig) -> Result<ConvertedDocument> {
  Converter {
    document,
    config,
    footnotes: FxHashMap::default(),
    footnote_counter: 0,
    figure_counter: 0,
  }
  .run()
}

/// Inline accumulation state of one paragraph under construction
#[derive(Debug, Clone, Copy)]
struct InlineState {
  /// Whether any visible content has been emitted yet
  has_content: bool,
  /// Whether a space separates the next word from prior content
  needs_glue: bool,
  /// Last character emitted, for space elasticity after punctuation
  last_char: char,
}

impl InlineState {
  fn new() -> Self {
    Self {
      has_content: false,
      needs_glue: false,
      last_char: ' ',
    }
  }
}

struct Converter<'a> {
  document: &'a Document,
  config: &'a TypesetConfig,
  footnotes: FxHashMap<NodeId, Vec<TextParagraph>>,
  footnote_counter: u32,
  figure_counter: u32,
}

impl Converter<'_> {
  fn run(mut self) -> Result<ConvertedDocument> {
    let mut lists = Vec::new();
    let mut current = Vec::new();
    for &child in self.document.children(self.document.root()) {
      let node = self.document.node(child);
      match node.kind() {
        NodeKind::Block => {
          current.push(Paragraph::Text(self.convert_block(child)?));
        }
        NodeKind::PageBreak => {
          if !current.is_empty() {
            lists.push(std::mem::take(&mut current));
          }
        }
        NodeKind::Image {
          size,
          alignment,
          floating,
          caption,
        } => {
          let image =
            self.convert_image(child, *size, *alignment, *floating, caption.as_deref())?;
          current.push(Paragraph::Image(image));
        }
        NodeKind::Enumeration { level } => {
          self.convert_enumeration(child, *level, &mut current)?;
        }
        other => {
          return Err(
            ConversionError::UnsupportedNode {
              position: node.source(),
              message: format!("{other:?} is not a top-level paragraph"),
            }
            .into(),
          );
        }
      }
    }
    if !current.is_empty() {
      lists.push(current);
    }
    Ok(ConvertedDocument {
      lists,
      footnotes: self.footnotes,
    })
  }

  /// Width available to a top-level paragraph of the given style
  fn paragraph_width(&self, style: &ResolvedStyle) -> f64 {
    self.config.content_width() - style.horizontal_extra()
  }

  fn convert_block(&mut self, id: NodeId) -> Result<TextParagraph> {
    let node = self.document.node(id);
    let style = node.style();
    let mut par = TextParagraph::new(self.paragraph_width(style), id);
    // Anchor box: zero width, or the first-line indent. Keeps the first
    // real break legal even when the paragraph opens with glue.
    par.push(Item::empty_box(style.first_line_indent.max(0.0)));
    let mut state = InlineState::new();
    self.fill_inline(&mut par, &mut state, id)?;
    finalize(&mut par);
    Ok(par)
  }

  /// Appends the inline children of `parent` to a paragraph
  fn fill_inline(
    &mut self,
    par: &mut TextParagraph,
    state: &mut InlineState,
    parent: NodeId,
  ) -> Result<()> {
    for &child in self.document.children(parent) {
      let node = self.document.node(child);
      match node.kind() {
        NodeKind::Text(text) => {
          let text = text.clone();
          self.append_text(par, state, child, &text)?;
        }
        NodeKind::LineBreak => {
          // A line the search must end here, filled to width like a last line.
          par.push(Item::fill_glue());
          par.push(Item::forced_break());
          *state = InlineState::new();
        }
        NodeKind::Math { size, .. } => {
          self.push_word_glue(par, state, node)?;
          par.push(Item::Box {
            width: size.width,
            content: BoxContent::Math { node: child },
          });
          state.has_content = true;
          state.needs_glue = false;
        }
        NodeKind::Footnote => {
          self.footnote_counter += 1;
          let number = self.footnote_counter;
          let marker = format!("[{number}]");
          let width = self.measure(node, &marker)?.width;
          par.push(Item::Box {
            width,
            content: BoxContent::FootnoteMark {
              text: marker,
              node: child,
            },
          });
          state.has_content = true;
          state.needs_glue = false;
          self.register_footnote(child, number)?;
        }
        other => {
          return Err(
            ConversionError::UnsupportedNode {
              position: node.source(),
              message: format!("{other:?} cannot appear inside a paragraph"),
            }
            .into(),
          );
        }
      }
    }
    Ok(())
  }

  /// Splits a text run into word boxes, inter-word glue and hyphen penalties
  fn append_text(
    &mut self,
    par: &mut TextParagraph,
    state: &mut InlineState,
    id: NodeId,
    text: &str,
  ) -> Result<()> {
    let node = self.document.node(id);
    if text.starts_with(char::is_whitespace) {
      state.needs_glue = state.has_content;
    }
    let words: Vec<&str> = text.split_whitespace().collect();
    let count = words.len();
    for (wi, word) in words.into_iter().enumerate() {
      self.push_word_glue(par, state, node)?;
      self.append_word(par, node, id, word)?;
      state.has_content = true;
      state.last_char = word.chars().last().unwrap_or(state.last_char);
      state.needs_glue = wi + 1 < count || text.ends_with(char::is_whitespace);
    }
    Ok(())
  }

  /// Emits the pending inter-word glue, if any
  fn push_word_glue(
    &self,
    par: &mut TextParagraph,
    state: &mut InlineState,
    node: &Node,
  ) -> Result<()> {
    if !(state.has_content && state.needs_glue) {
      return Ok(());
    }
    let style = node.style();
    let width = self
      .config
      .font_metrics()
      .space_width(style)
      .map_err(|source| ConversionError::Collaborator {
        position: node.source(),
        source,
      })?;
    let stretch = self.config.glue_policy().inter_word_stretch(style, state.last_char);
    let shrink = self.config.glue_policy().inter_word_shrink(style, state.last_char);
    par.push(Item::glue(width, stretch, shrink));
    state.needs_glue = false;
    Ok(())
  }

  /// Emits one word as boxes, with explicit-hyphen or hyphenator penalties
  fn append_word(
    &mut self,
    par: &mut TextParagraph,
    node: &Node,
    id: NodeId,
    word: &str,
  ) -> Result<()> {
    // A compound like "well-known" may break after its hyphens; the glyph
    // is already part of the box text, so the penalty adds no width.
    if word.len() > 1 && word.contains('-') {
      let segments: Vec<&str> = word.split_inclusive('-').collect();
      let count = segments.len();
      for (si, segment) in segments.into_iter().enumerate() {
        let width = self.measure(node, segment)?.width;
        par.push(Item::text_box(segment, width, id));
        if si + 1 < count {
          par.push(Item::penalty(
            self.config.hyphenator().explicit_hyphen_penalty(),
            0.0,
            true,
          ));
        }
      }
      return Ok(());
    }

    let hyphenated = self.config.hyphenator().hyphenate(word);
    if hyphenated.parts.len() <= 1 {
      let width = self.measure(node, word)?.width;
      par.push(Item::text_box(word, width, id));
      return Ok(());
    }
    let hyphen_width = self
      .config
      .font_metrics()
      .char_width(node.style(), '-')
      .map_err(|source| ConversionError::Collaborator {
        position: node.source(),
        source,
      })?;
    let count = hyphenated.parts.len();
    for (pi, part) in hyphenated.parts.into_iter().enumerate() {
      let width = self.measure(node, &part.text)?.width;
      par.push(Item::text_box(part.text, width, id));
      if pi + 1 < count {
        par.push(Item::hyphen_penalty(part.penalty, hyphen_width, id));
      }
    }
    Ok(())
  }

  fn convert_image(
    &mut self,
    id: NodeId,
    size: Size,
    alignment: crate::style::HorizontalAlignment,
    floating: bool,
    caption: Option<&str>,
  ) -> Result<ImageParagraph> {
    let node = self.document.node(id);
    let style = node.style();
    let available = self.paragraph_width(style);
    // Oversized images scale down to the paragraph width, keeping aspect.
    let scale = if size.width > available && size.width > 0.0 {
      available / size.width
    } else {
      1.0
    };
    let display = Size::new(size.width * scale, size.height * scale);
    let mut image = ImageParagraph::new(id, available, display, alignment, floating);
    if let Some(caption) = caption {
      self.figure_counter += 1;
      let text = format!("{} {}: {}", self.config.caption_prefix, self.figure_counter, caption);
      let mut par = TextParagraph::new(display.width, id);
      let mut state = InlineState::new();
      self.append_text(&mut par, &mut state, id, &text)?;
      finalize(&mut par);
      image.caption.push(par);
    }
    Ok(image)
  }

  fn convert_enumeration(
    &mut self,
    id: NodeId,
    level: u32,
    out: &mut Vec<Paragraph>,
  ) -> Result<()> {
    for &child in self.document.children(id) {
      let node = self.document.node(child);
      match node.kind() {
        NodeKind::EnumerationItem => {
          out.push(Paragraph::Text(self.convert_enumeration_item(child, level)?));
        }
        NodeKind::Enumeration { level: nested } => {
          self.convert_enumeration(child, *nested, out)?;
        }
        other => {
          return Err(
            ConversionError::UnsupportedNode {
              position: node.source(),
              message: format!("{other:?} cannot appear inside an enumeration"),
            }
            .into(),
          );
        }
      }
    }
    Ok(())
  }

  fn convert_enumeration_item(&mut self, id: NodeId, level: u32) -> Result<TextParagraph> {
    let node = self.document.node(id);
    let style = node.style();
    let indent = level.max(1) as f64 * self.config.enumeration_indent;
    let mut par = TextParagraph::new(self.paragraph_width(style) - indent, id);
    par.set_left_indent(indent);
    let symbol = match level {
      0 | 1 => "\u{2022} ", // •
      2 => "\u{2013} ",     // –
      _ => "\u{25e6} ",     // ◦
    };
    let width = self.measure(node, symbol)?.width;
    par.push(Item::Box {
      width,
      content: BoxContent::EnumerationMark {
        symbol: symbol.to_string(),
        node: id,
        indent,
      },
    });
    let mut state = InlineState {
      has_content: true,
      needs_glue: false,
      last_char: ' ',
    };
    self.fill_inline(&mut par, &mut state, id)?;
    finalize(&mut par);
    Ok(par)
  }

  /// Typesets footnote content paragraphs at full content width
  fn register_footnote(&mut self, id: NodeId, number: u32) -> Result<()> {
    let node = self.document.node(id);
    let label = format!("{number} ");
    let width = self.measure(node, &label)?.width;
    let mut par = TextParagraph::new(self.config.content_width(), id);
    par.push(Item::text_box(label, width, id));
    let mut state = InlineState {
      has_content: true,
      needs_glue: false,
      last_char: ' ',
    };
    let mut paragraphs = Vec::new();
    let children: Vec<NodeId> = self.document.children(id).to_vec();
    for child in children {
      let child_node = self.document.node(child);
      if matches!(child_node.kind(), NodeKind::Block) {
        // Multi-paragraph footnote: each block is its own paragraph.
        if par.has_box() {
          finalize(&mut par);
          paragraphs.push(std::mem::replace(
            &mut par,
            TextParagraph::new(self.config.content_width(), id),
          ));
          state = InlineState::new();
        }
        paragraphs.push(self.convert_block(child)?);
      } else {
        self.fill_inline_single(&mut par, &mut state, child)?;
      }
    }
    if par.has_box() {
      finalize(&mut par);
      paragraphs.push(par);
    }
    self.footnotes.insert(id, paragraphs);
    Ok(())
  }

  /// Appends one inline child node (used where children are visited manually)
  fn fill_inline_single(
    &mut self,
    par: &mut TextParagraph,
    state: &mut InlineState,
    child: NodeId,
  ) -> Result<()> {
    let node = self.document.node(child);
    match node.kind() {
      NodeKind::Text(text) => {
        let text = text.clone();
        self.append_text(par, state, child, &text)
      }
      NodeKind::Math { size, .. } => {
        self.push_word_glue(par, state, node)?;
        par.push(Item::Box {
          width: size.width,
          content: BoxContent::Math { node: child },
        });
        state.has_content = true;
        state.needs_glue = false;
        Ok(())
      }
      other => Err(
        ConversionError::UnsupportedNode {
          position: node.source(),
          message: format!("{other:?} cannot appear inside a footnote"),
        }
        .into(),
      ),
    }
  }

  fn measure(&self, node: &Node, text: &str) -> Result<crate::config::TextMetrics> {
    self
      .config
      .font_metrics()
      .measure_str(node.style(), text)
      .map_err(|source| {
        ConversionError::Collaborator {
          position: node.source(),
          source,
        }
        .into()
      })
  }
}

/// Terminates a paragraph with the fill glue and forced break the breakpoint
/// search requires
fn finalize(par: &mut TextParagraph) {
  par.push(Item::fill_glue());
  par.push(Item::forced_break());
}
