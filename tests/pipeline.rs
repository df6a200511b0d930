//! End-to-end pipeline tests: styled document tree in, positioned pages out.

use galley::config::{FixedFontMetrics, TypesetConfig};
use galley::document::{Document, NodeKind};
use galley::geometry::{Insets, Size};
use galley::page::{Element, Page, TextElement};
use galley::style::{HorizontalAlignment, ResolvedStyle};
use galley::Typesetter;

fn config(page: Size, inset: f64) -> TypesetConfig {
  TypesetConfig::builder(FixedFontMetrics::new(6.0))
    .page_size(page)
    .page_insets(Insets::uniform(inset))
    .build()
    .unwrap()
}

fn texts(page: &Page) -> Vec<&TextElement> {
  page
    .elements()
    .iter()
    .filter_map(|el| match el {
      Element::Text(t) => Some(t),
      _ => None,
    })
    .collect()
}

fn paragraph(doc: &mut Document, text: &str) {
  let block = doc.push(doc.root(), NodeKind::Block, None);
  doc.push(block, NodeKind::text(text), None);
}

#[test]
fn multi_page_document_numbers_pages_sequentially() {
  let _ = env_logger::builder().is_test(true).try_init();
  let cfg = config(Size::new(200.0, 120.0), 10.0);
  let mut doc = Document::new(ResolvedStyle::default());
  for _ in 0..20 {
    paragraph(&mut doc, "a line of body text");
  }
  let pages = Typesetter::new(cfg).typeset(&doc).unwrap();
  assert!(pages.len() >= 3);
  for (i, page) in pages.iter().enumerate() {
    assert_eq!(page.number(), i + 1);
    let bottom = page.size().height - page.insets().bottom;
    for el in page.elements() {
      assert!(el.bottom() <= bottom + 1e-9);
      assert!(el.position().y >= page.insets().top - 1e-9);
    }
  }
}

#[test]
fn typesetting_is_deterministic() {
  let cfg = config(Size::new(300.0, 300.0), 20.0);
  let mut doc = Document::new(ResolvedStyle::default());
  for _ in 0..6 {
    paragraph(&mut doc, "repeatable words flow into repeatable lines every run");
  }
  let typesetter = Typesetter::new(cfg);
  let first = typesetter.typeset(&doc).unwrap();
  let second = typesetter.typeset(&doc).unwrap();
  assert_eq!(first.len(), second.len());
  for (a, b) in first.iter().zip(&second) {
    assert_eq!(a.elements(), b.elements());
  }
}

#[test]
fn text_flows_beside_a_left_float_then_returns_to_the_margin() {
  let cfg = config(Size::new(300.0, 300.0), 20.0);
  let mut doc = Document::new(ResolvedStyle::default());
  doc.push(
    doc.root(),
    NodeKind::Image {
      size: Size::new(80.0, 60.0),
      alignment: HorizontalAlignment::Left,
      floating: true,
      caption: None,
    },
    None,
  );
  let words = vec!["words"; 40].join(" ");
  paragraph(&mut doc, &words);
  let pages = Typesetter::new(cfg).typeset(&doc).unwrap();
  let page = &pages[0];

  let image = page
    .elements()
    .iter()
    .find_map(|el| match el {
      Element::Image(i) => Some(i),
      _ => None,
    })
    .unwrap();
  assert_eq!(image.position.x, 20.0);
  assert_eq!(image.position.y, 20.0);

  // Text starts level with the image top, shifted past it plus the gutter.
  let beside: Vec<_> = texts(page)
    .into_iter()
    .filter(|t| t.position.y < image.position.y + image.size.height)
    .collect();
  assert!(!beside.is_empty());
  for t in &beside {
    assert!(t.position.x >= 20.0 + 80.0, "line overlaps the float");
  }
  assert!(beside.iter().any(|t| t.position.x == 20.0 + 80.0 + 10.0));

  // Below the image the measure opens back up to the left margin.
  let below: Vec<_> = texts(page)
    .into_iter()
    .filter(|t| t.position.y >= image.position.y + image.size.height)
    .collect();
  assert!(below.iter().any(|t| t.position.x == 20.0));
}

#[test]
fn paragraph_spilling_past_a_float_rebreaks_at_full_width() {
  let cfg = config(Size::new(200.0, 120.0), 10.0);
  let mut doc = Document::new(ResolvedStyle::default());
  // A float tall enough that its narrowed region outlasts the first page.
  doc.push(
    doc.root(),
    NodeKind::Image {
      size: Size::new(80.0, 95.0),
      alignment: HorizontalAlignment::Left,
      floating: true,
      caption: None,
    },
    None,
  );
  let words = vec!["words"; 30].join(" ");
  paragraph(&mut doc, &words);
  let pages = Typesetter::new(cfg).typeset(&doc).unwrap();
  assert!(pages.len() >= 2);

  // Page one: every line sits beside the float on the narrowed measure.
  for t in texts(&pages[0]) {
    assert!(t.position.x >= 100.0, "line overlaps the float");
  }

  // Page two: the float is gone, so the remainder starts at the left
  // margin and is justified to the full 180pt measure, not the 90pt one.
  let second = texts(&pages[1]);
  assert!(!second.is_empty());
  assert_eq!(second[0].position.x, 10.0);
  let right = second
    .iter()
    .map(|t| t.position.x + t.size.width)
    .fold(0.0, f64::max);
  assert!(right > 150.0, "remainder kept the narrowed measure");
}

#[test]
fn footnote_content_sits_at_the_page_bottom_behind_a_rule() {
  let cfg = config(Size::new(200.0, 200.0), 10.0);
  let mut doc = Document::new(ResolvedStyle::default());
  let block = doc.push(doc.root(), NodeKind::Block, None);
  doc.push(block, NodeKind::text("body"), None);
  let foot = doc.push(block, NodeKind::Footnote, None);
  doc.push(foot, NodeKind::text("the note"), None);
  let pages = Typesetter::new(cfg).typeset(&doc).unwrap();
  let page = &pages[0];

  let rule = page
    .elements()
    .iter()
    .find_map(|el| match el {
      Element::Line(l) => Some(l),
      _ => None,
    })
    .expect("footnote separator rule");
  let label = texts(page)
    .into_iter()
    .find(|t| t.text == "1 ")
    .expect("footnote label");

  // Body at the top, label anchored to the bottom, rule in between.
  let body = texts(page).into_iter().find(|t| t.text == "body").unwrap();
  assert_eq!(body.position.y, 10.0);
  assert!(label.position.y > 150.0);
  assert!(rule.position.y < label.position.y);
  assert!(rule.position.y > body.position.y);
  assert!((label.position.y + 14.4 - (200.0 - 10.0)).abs() < 1e-9);

  // The marker appears inline in the body text.
  assert!(texts(page).iter().any(|t| t.text == "[1]"));
}

#[test]
fn captions_follow_their_image() {
  let cfg = config(Size::new(200.0, 200.0), 10.0);
  let mut doc = Document::new(ResolvedStyle::default());
  doc.push(
    doc.root(),
    NodeKind::Image {
      size: Size::new(100.0, 50.0),
      alignment: HorizontalAlignment::Center,
      floating: false,
      caption: Some("A cat".to_string()),
    },
    None,
  );
  let pages = Typesetter::new(cfg).typeset(&doc).unwrap();
  let page = &pages[0];
  let image = page
    .elements()
    .iter()
    .find_map(|el| match el {
      Element::Image(i) => Some(i),
      _ => None,
    })
    .unwrap();
  // 180pt measure, 100pt image: centered at 40pt in.
  assert_eq!(image.position.x, 50.0);

  let figure = texts(page)
    .into_iter()
    .find(|t| t.text == "Figure")
    .expect("caption prefix");
  assert_eq!(figure.position.y, image.position.y + image.size.height);
  assert_eq!(figure.position.x, image.position.x);
}

#[test]
fn explicit_line_break_starts_a_new_line_without_justification() {
  let cfg = config(Size::new(300.0, 300.0), 10.0);
  let mut doc = Document::new(ResolvedStyle::default());
  let block = doc.push(doc.root(), NodeKind::Block, None);
  doc.push(block, NodeKind::text("above"), None);
  doc.push(block, NodeKind::LineBreak, None);
  doc.push(block, NodeKind::text("below"), None);
  let pages = Typesetter::new(cfg).typeset(&doc).unwrap();
  let t = texts(&pages[0]);
  assert_eq!(t.len(), 2);
  assert_eq!(t[0].text, "above");
  assert_eq!(t[1].text, "below");
  assert_eq!(t[0].position.x, t[1].position.x);
  assert!((t[1].position.y - t[0].position.y - 14.4).abs() < 1e-9);
}

#[test]
fn enumeration_items_are_marked_and_indented() {
  let cfg = config(Size::new(300.0, 300.0), 10.0);
  let mut doc = Document::new(ResolvedStyle::default());
  let en = doc.push(doc.root(), NodeKind::Enumeration { level: 1 }, None);
  for entry in ["first", "second"] {
    let item = doc.push(en, NodeKind::EnumerationItem, None);
    doc.push(item, NodeKind::text(entry), None);
  }
  let pages = Typesetter::new(cfg).typeset(&doc).unwrap();
  let t = texts(&pages[0]);
  let marks: Vec<_> = t.iter().filter(|e| e.text.starts_with('\u{2022}')).collect();
  assert_eq!(marks.len(), 2);
  for mark in &marks {
    // One indent step of 20pt past the left inset.
    assert_eq!(mark.position.x, 10.0 + 20.0);
  }
  assert!(t.iter().any(|e| e.text == "first"));
  assert!(t.iter().any(|e| e.text == "second"));
}

#[test]
fn page_break_resets_the_cursor_to_the_top() {
  let cfg = config(Size::new(300.0, 300.0), 10.0);
  let mut doc = Document::new(ResolvedStyle::default());
  paragraph(&mut doc, "page one");
  doc.push(doc.root(), NodeKind::PageBreak, None);
  paragraph(&mut doc, "page two");
  let pages = Typesetter::new(cfg).typeset(&doc).unwrap();
  assert_eq!(pages.len(), 2);
  assert_eq!(texts(&pages[1])[0].position.y, 10.0);
}
