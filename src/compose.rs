//! Page composition: from broken paragraphs to positioned elements
//!
//! The composer owns the vertical cursor. It runs the breakpoint search on
//! each text paragraph, turns the chosen lines into positioned elements,
//! opens a new page whenever the next line or block would cross the bottom
//! of the content area, and handles the block-level concerns the search
//! knows nothing about: justification, alignment offsets, floating images
//! with narrowed line widths, captions, paragraph backgrounds, and footnotes
//! reserved at the bottom of the page they are referenced on. A paragraph
//! that spills past its float's page has its remainder re-broken at the
//! full measure, since the float does not carry over.
//!
//! Coordinates are absolute page coordinates, origin at the top-left corner.

use crate::config::TypesetConfig;
use crate::document::{Document, NodeId, NodeKind};
use crate::error::{ComposeError, Result};
use crate::geometry::{Point, Size};
use crate::item::{BoxContent, Item};
use crate::linebreak::break_into_lines;
use crate::page::{
  Element, ImageElement, LineElement, MathExpressionElement, Page, RectangleElement, TextElement,
};
use crate::paragraph::{ImageParagraph, Paragraph, TextParagraph};
use crate::style::{HorizontalAlignment, ResolvedStyle};
use rustc_hash::FxHashMap;

/// Horizontal gap between a floating image and the text beside it
const FLOAT_GUTTER: f64 = 10.0;

/// Vertical space taken by the footnote separator band
const FOOTNOTE_SEPARATOR_HEIGHT: f64 = 8.0;

/// Composes converted paragraphs into pages
pub fn compose(
  document: &Document,
  config: &TypesetConfig,
  converted: crate::convert::ConvertedDocument,
) -> Result<Vec<Page>> {
  let mut composer = Composer {
    document,
    config,
    footnotes: converted.footnotes,
    pages: Vec::new(),
    elements: Vec::new(),
    cursor_y: config.page_insets.top,
    float: None,
    footnote_elements: Vec::new(),
    footnote_height: 0.0,
  };
  for (li, list) in converted.lists.into_iter().enumerate() {
    if li > 0 {
      composer.flush_page();
    }
    for paragraph in list {
      match paragraph {
        Paragraph::Text(par) => composer.compose_text(par)?,
        Paragraph::Image(par) => composer.compose_image(par)?,
      }
    }
  }
  composer.flush_page();
  Ok(composer.pages)
}

/// Region beside a floating image that narrows following lines
#[derive(Debug, Clone, Copy)]
struct Float {
  /// Lines starting above this y coordinate flow beside the image
  until_y: f64,
  /// Left offset added to narrowed lines (zero for right floats)
  indent: f64,
  /// Width taken from narrowed lines (image width plus gutter)
  reduction: f64,
}

/// One laid-out line, positioned relative to its own top-left corner
struct LaidLine {
  elements: Vec<Element>,
  /// Footnotes referenced on this line, in order
  footnotes: Vec<NodeId>,
  /// Index of the line's first item in its paragraph
  start: usize,
}

struct Composer<'a> {
  document: &'a Document,
  config: &'a TypesetConfig,
  footnotes: FxHashMap<NodeId, Vec<TextParagraph>>,
  pages: Vec<Page>,
  elements: Vec<Element>,
  cursor_y: f64,
  float: Option<Float>,
  /// Elements of footnotes committed to the open page, relative to the
  /// footnote block's top-left corner
  footnote_elements: Vec<Element>,
  footnote_height: f64,
}

impl Composer<'_> {
  /// Lowest y the open page's main content may reach
  fn bottom_limit(&self) -> f64 {
    let mut limit =
      self.config.page_size.height - self.config.page_insets.bottom - self.footnote_height;
    if self.footnote_height > 0.0 {
      limit -= FOOTNOTE_SEPARATOR_HEIGHT;
    }
    limit
  }

  /// Closes the open page and starts a fresh one
  fn flush_page(&mut self) {
    self.place_footnotes();
    let elements = std::mem::take(&mut self.elements);
    let number = self.pages.len() + 1;
    self.pages.push(Page::new(
      number,
      self.config.page_size,
      self.config.page_insets,
      elements,
    ));
    self.cursor_y = self.config.page_insets.top;
    self.float = None;
  }

  /// Anchors the reserved footnote block to the page bottom
  fn place_footnotes(&mut self) {
    if self.footnote_height <= 0.0 {
      return;
    }
    let insets = self.config.page_insets;
    let top = self.config.page_size.height - insets.bottom - self.footnote_height;
    self.elements.push(Element::Line(LineElement {
      position: Point::new(insets.left, top - FOOTNOTE_SEPARATOR_HEIGHT / 2.0),
      size: Size::new(self.config.content_width() / 3.0, 0.0),
      thickness: self.config.footnote_rule_thickness,
    }));
    for mut el in std::mem::take(&mut self.footnote_elements) {
      el.translate(insets.left, top);
      self.elements.push(el);
    }
    self.footnote_height = 0.0;
  }

  fn compose_text(&mut self, mut par: TextParagraph) -> Result<()> {
    if !par.has_box() {
      return Ok(());
    }
    let style = self.document.node(par.node()).style();
    self.cursor_y += style.margin.top + style.padding.top;

    // Narrow the lines that will sit beside an active float.
    let mut float_lines = 0u32;
    let mut float_indent = 0.0;
    if let Some(f) = self.float {
      if f.until_y > self.cursor_y {
        float_lines = ((f.until_y - self.cursor_y) / style.line_height).ceil() as u32;
        float_indent = f.indent;
        par.reduce_first_lines(float_lines, f.reduction);
      } else {
        self.float = None;
      }
    }

    let mut narrowed = float_lines > 0;
    let mut lines = self.lay_lines(&par)?;
    let mut bg_top = self.cursor_y - style.padding.top;
    let mut bg_index = self.elements.len();

    let mut j = 0;
    while j < lines.len() {
      let line_number = j as u32 + 1;

      // Footnotes referenced on this line reserve space at the page bottom;
      // the line and its footnotes must share a page.
      let mut additions: Vec<(Vec<Element>, f64)> = Vec::new();
      let mut added_height = 0.0;
      for &fid in &lines[j].footnotes {
        let (els, h) = self.layout_footnote(fid)?;
        added_height += h;
        additions.push((els, h));
      }
      let separator = if self.footnote_height == 0.0 && added_height > 0.0 {
        FOOTNOTE_SEPARATOR_HEIGHT
      } else {
        0.0
      };

      let overflows =
        self.cursor_y + style.line_height > self.bottom_limit() - added_height - separator;
      if overflows && self.cursor_y > self.config.page_insets.top {
        if style.background {
          self.push_background(&par, style, bg_top, self.cursor_y, bg_index);
        }
        self.flush_page();
        bg_top = self.cursor_y;
        bg_index = self.elements.len();
        // The float does not carry over; stop indenting beside it.
        float_lines = 0;
        if narrowed {
          // The remaining lines were broken at the narrowed measure; the
          // new page has no float, so re-break them at the full width.
          narrowed = false;
          par = par.tail(lines[j].start);
          lines = self.lay_lines(&par)?;
          j = 0;
          continue;
        }
      }

      for (els, h) in additions {
        for mut el in els {
          el.translate(0.0, self.footnote_height);
          self.footnote_elements.push(el);
        }
        self.footnote_height += h;
      }

      let mut x = self.config.page_insets.left + style.indent_left() + par.left_indent();
      if line_number <= float_lines {
        x += float_indent;
      }
      for mut el in std::mem::take(&mut lines[j].elements) {
        el.translate(x, self.cursor_y);
        self.elements.push(el);
      }
      self.cursor_y += style.line_height;
      j += 1;
    }

    if style.background {
      self.push_background(&par, style, bg_top, self.cursor_y + style.padding.bottom, bg_index);
    }
    self.cursor_y += style.padding.bottom + style.margin.bottom;
    Ok(())
  }

  /// Inserts the paragraph background rectangle behind its lines
  fn push_background(
    &mut self,
    par: &TextParagraph,
    style: &ResolvedStyle,
    top: f64,
    bottom: f64,
    index: usize,
  ) {
    if bottom <= top {
      return;
    }
    let x = self.config.page_insets.left + style.margin.left + par.left_indent();
    let width = par.default_line_width() + style.padding.horizontal();
    self.elements.insert(
      index.min(self.elements.len()),
      Element::Rectangle(RectangleElement {
        node: par.node(),
        position: Point::new(x, top),
        size: Size::new(width, bottom - top),
      }),
    );
  }

  fn compose_image(&mut self, par: ImageParagraph) -> Result<()> {
    let style = self.document.node(par.node()).style();
    let insets = self.config.page_insets;
    self.cursor_y += style.margin.top + style.padding.top;

    if self.cursor_y + par.size.height > self.bottom_limit() && self.cursor_y > insets.top {
      self.flush_page();
    }
    let x = match par.alignment {
      HorizontalAlignment::Left => insets.left + style.indent_left(),
      HorizontalAlignment::Center => {
        insets.left + (self.config.content_width() - par.size.width) / 2.0
      }
      HorizontalAlignment::Right => {
        self.config.page_size.width - insets.right - par.size.width
      }
    };
    let top = self.cursor_y;
    let top_page = self.pages.len();
    self.elements.push(Element::Image(ImageElement {
      node: par.node(),
      position: Point::new(x, self.cursor_y),
      size: par.size,
    }));
    self.cursor_y += par.size.height;

    // Caption lines go below the image, re-anchored one at a time so a
    // non-fitting line moves to the next page on its own.
    for caption in &par.caption {
      let caption_style = self.document.node(caption.node()).style();
      for line in self.lay_lines(caption)? {
        if self.cursor_y + caption_style.line_height > self.bottom_limit()
          && self.cursor_y > insets.top
        {
          self.flush_page();
        }
        for mut el in line.elements {
          el.translate(x, self.cursor_y);
          self.elements.push(el);
        }
        self.cursor_y += caption_style.line_height;
      }
    }

    if par.floats() && self.pages.len() == top_page {
      let reduction = par.size.width + FLOAT_GUTTER;
      self.float = Some(Float {
        until_y: self.cursor_y,
        indent: if par.alignment == HorizontalAlignment::Left {
          reduction
        } else {
          0.0
        },
        reduction,
      });
      // Following text flows beside the image, starting level with its top.
      self.cursor_y = top;
    } else {
      self.cursor_y += style.padding.bottom + style.margin.bottom;
    }
    Ok(())
  }

  /// Runs one footnote's pre-converted paragraphs through line layout
  ///
  /// Elements come back relative to the footnote's own top-left corner; the
  /// block is anchored to the page bottom when the page is flushed.
  fn layout_footnote(&self, id: NodeId) -> Result<(Vec<Element>, f64)> {
    let paragraphs = self.footnotes.get(&id).ok_or_else(|| ComposeError::UnknownFootnote {
      position: self.document.node(id).source(),
    })?;
    let mut elements = Vec::new();
    let mut y = 0.0;
    for par in paragraphs {
      let style = self.document.node(par.node()).style();
      for line in self.lay_lines(par)? {
        for mut el in line.elements {
          el.translate(0.0, y);
          elements.push(el);
        }
        y += style.line_height;
      }
    }
    Ok((elements, y))
  }

  /// Breaks a paragraph and lays out each line relative to its own origin
  ///
  /// Justification and alignment offsets are applied here; the caller only
  /// translates whole lines to their page position.
  fn lay_lines(&self, par: &TextParagraph) -> Result<Vec<LaidLine>> {
    let result = break_into_lines(par, self.config.worst_quality);
    let style = self.document.node(par.node()).style();
    let items = par.items();
    let mut lines = Vec::with_capacity(result.breaks.len());
    let mut start = 0usize;

    for (li, &b) in result.breaks.iter().enumerate() {
      let line_number = li as u32 + 1;
      // Glue and untaken penalties vanish at the start of a line.
      let mut s = start;
      while s < b && items[s].is_discardable() {
        s += 1;
      }
      let slice = &items[s..b];
      let break_item = &items[b];
      let (break_width, break_glyph) = match break_item {
        Item::Penalty { width, node, .. } if !break_item.is_forced_break() && *width > 0.0 => {
          (*width, node.map(|n| ("-", n)))
        }
        _ => (0.0, None),
      };

      // First pass: natural width and elasticity of the line.
      let mut natural = break_width;
      let mut total_stretch = 0.0;
      let mut infinite_glues = 0usize;
      let mut total_shrink = 0.0;
      for item in slice {
        natural += item.width();
        if item.is_glue() {
          if item.stretch().is_infinite() {
            infinite_glues += 1;
          } else {
            total_stretch += item.stretch();
          }
          total_shrink += item.shrink();
        }
      }

      let target = par.line_width(line_number);
      let extra = target - natural;
      let justify = style.justify && !break_item.is_forced_break();
      let offset = if justify {
        0.0
      } else {
        match style.alignment {
          HorizontalAlignment::Left => 0.0,
          HorizontalAlignment::Center => (extra / 2.0).max(0.0),
          HorizontalAlignment::Right => extra.max(0.0),
        }
      };

      // Second pass: emit elements, widening or narrowing each glue by its
      // share of the leftover.
      let glue_share = |item: &Item| -> f64 {
        if !justify {
          return 0.0;
        }
        if extra > 0.0 {
          if infinite_glues > 0 {
            if item.stretch().is_infinite() {
              extra / infinite_glues as f64
            } else {
              0.0
            }
          } else if total_stretch > 0.0 {
            extra * item.stretch() / total_stretch
          } else {
            0.0
          }
        } else if extra < 0.0 && total_shrink > 0.0 {
          extra * item.shrink() / total_shrink
        } else {
          0.0
        }
      };

      let mut line = LineBuilder::new(offset, style.line_height);
      for item in slice {
        match item {
          Item::Box { width, content } => {
            self.emit_box(&mut line, *width, content);
          }
          Item::Glue { width, .. } => {
            line.flush_run();
            line.x += width + glue_share(item);
          }
          Item::Penalty { .. } => {
            // An untaken penalty is invisible and keeps adjacent boxes of
            // the same word mergeable.
          }
        }
      }
      if let Some((glyph, node)) = break_glyph {
        let node_style = self.document.node(node).style();
        line.push_text(glyph, break_width, node, node_style.font_size);
      }
      line.flush_run();

      lines.push(LaidLine {
        elements: line.elements,
        footnotes: line.footnotes,
        start,
      });
      start = b + 1;
    }
    Ok(lines)
  }

  fn emit_box(&self, line: &mut LineBuilder, width: f64, content: &BoxContent) {
    match content {
      BoxContent::Empty => {
        line.flush_run();
        line.x += width;
      }
      BoxContent::Text { text, node } => {
        let font_size = self.document.node(*node).style().font_size;
        line.push_text(text, width, *node, font_size);
      }
      BoxContent::EnumerationMark { symbol, node, .. } => {
        let font_size = self.document.node(*node).style().font_size;
        line.push_text(symbol, width, *node, font_size);
      }
      BoxContent::FootnoteMark { text, node } => {
        let font_size = self.document.node(*node).style().font_size;
        line.push_text(text, width, *node, font_size);
        line.footnotes.push(*node);
      }
      BoxContent::Math { node } => {
        line.flush_run();
        let (source, size) = match self.document.node(*node).kind() {
          NodeKind::Math { source, size } => (source.clone(), *size),
          _ => (String::new(), Size::new(width, line.line_height)),
        };
        line.elements.push(Element::Math(MathExpressionElement {
          source,
          node: *node,
          position: Point::new(line.x, 0.0),
          size,
          baseline: size.height,
        }));
        line.x += width;
      }
    }
  }
}

/// Accumulates one line's elements, merging adjacent same-node text boxes
struct LineBuilder {
  elements: Vec<Element>,
  footnotes: Vec<NodeId>,
  x: f64,
  line_height: f64,
  run_text: String,
  run_node: Option<NodeId>,
  run_start: f64,
  run_width: f64,
  run_font_size: f64,
}

impl LineBuilder {
  fn new(offset: f64, line_height: f64) -> Self {
    Self {
      elements: Vec::new(),
      footnotes: Vec::new(),
      x: offset,
      line_height,
      run_text: String::new(),
      run_node: None,
      run_start: 0.0,
      run_width: 0.0,
      run_font_size: 0.0,
    }
  }

  fn push_text(&mut self, text: &str, width: f64, node: NodeId, font_size: f64) {
    if self.run_node != Some(node) {
      self.flush_run();
      self.run_node = Some(node);
      self.run_start = self.x;
      self.run_font_size = font_size;
    }
    self.run_text.push_str(text);
    self.run_width += width;
    self.x += width;
  }

  fn flush_run(&mut self) {
    if let Some(node) = self.run_node.take() {
      self.elements.push(Element::Text(TextElement {
        text: std::mem::take(&mut self.run_text),
        node,
        position: Point::new(self.run_start, 0.0),
        size: Size::new(self.run_width, self.line_height),
        baseline: self.run_font_size,
      }));
      self.run_width = 0.0;
    }
  }
}
