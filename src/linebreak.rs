//! Total-fit breakpoint search over a paragraph's item sequence
//!
//! Implements the Knuth-Plass shortest-path search: every legal breakpoint
//! becomes a graph node, edges are candidate lines scored by demerits, and
//! the chosen break sequence minimizes total demerits over the whole
//! paragraph rather than line by line. The active frontier is pruned to the
//! best node per fitness class, so it stays small regardless of paragraph
//! length.
//!
//! When no feasible break sequence exists at the requested elasticity, the
//! driver retries with the glue stretch doubled per quality level. If even
//! the worst quality fails, the least-bad break is accepted anyway and the
//! result is marked degraded; an infeasible paragraph is never an error.

use crate::item::Item;
use crate::paragraph::TextParagraph;
use log::warn;

/// Per-line penalty discouraging solutions with many lines
const LINE_PENALTY: f64 = 10.0;

/// Badness ceiling; also the badness assigned to unstretchable short lines
const MAX_BADNESS: f64 = 10_000.0;

/// Highest badness a non-forced break may have and still be feasible
const BADNESS_TOLERANCE: f64 = 200.0;

/// Extra demerits for two flagged breaks in a row
const FLAGGED_DEMERITS: f64 = 100.0;

/// Extra demerits when adjacent lines jump more than one fitness class
const FITNESS_DEMERITS: f64 = 100.0;

/// Visual tightness class of a line, from its adjustment ratio
///
/// Adjacent lines more than one class apart read unevenly and are charged
/// extra demerits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fitness {
  /// Shrunk noticeably (ratio below -0.5)
  Tight,
  /// Near natural width
  Normal,
  /// Stretched up to its full stretchability
  Loose,
  /// Stretched beyond its stretchability (ratio above 1)
  VeryLoose,
}

impl Fitness {
  /// Classifies an adjustment ratio
  pub fn classify(ratio: f64) -> Self {
    if ratio < -0.5 {
      Fitness::Tight
    } else if ratio <= 0.5 {
      Fitness::Normal
    } else if ratio <= 1.0 {
      Fitness::Loose
    } else {
      Fitness::VeryLoose
    }
  }

  fn index(self) -> usize {
    match self {
      Fitness::Tight => 0,
      Fitness::Normal => 1,
      Fitness::Loose => 2,
      Fitness::VeryLoose => 3,
    }
  }

  fn distance(self, other: Fitness) -> usize {
    self.index().abs_diff(other.index())
  }
}

/// The break sequence chosen for one paragraph
#[derive(Debug, Clone, PartialEq)]
pub struct LineBreakResult {
  /// Item indices broken at, in order; one entry per line
  pub breaks: Vec<usize>,
  /// Adjustment ratio of each line (may be infinite for free last lines)
  pub ratios: Vec<f64>,
  /// Quality level the accepted solution was found at (0 = tightest)
  pub quality: u32,
  /// Whether a least-bad break had to be accepted outside feasibility
  pub degraded: bool,
  /// Total demerits of the chosen sequence
  pub demerits: f64,
}

impl LineBreakResult {
  /// Number of lines in the solution
  pub fn line_count(&self) -> usize {
    self.breaks.len()
  }

  fn empty() -> Self {
    Self {
      breaks: Vec::new(),
      ratios: Vec::new(),
      quality: 0,
      degraded: false,
      demerits: 0.0,
    }
  }
}

/// One node of the breakpoint graph
#[derive(Debug, Clone, Copy)]
struct SearchNode {
  /// Item index of the break (meaningless for the start sentinel)
  index: usize,
  /// Lines completed up to this break
  line: u32,
  fitness: Fitness,
  total_demerits: f64,
  /// Arena index of the predecessor; `None` marks the start sentinel
  prev: Option<u32>,
  /// Adjustment ratio of the line ending here
  ratio: f64,
  flagged: bool,
  /// First non-discardable item of the following line
  start_index: usize,
  /// Prefix sums at the effective start of the following line
  start_width: f64,
  start_stretch: f64,
  start_shrink: f64,
}

/// Breaks a paragraph, retrying at looser quality levels until feasible
///
/// Quality level `q` scales every line's stretchability by `2^q`. The first
/// non-degraded solution wins; if all levels up to `worst_quality` degrade,
/// the last attempt is returned and a warning is logged.
pub fn break_into_lines(paragraph: &TextParagraph, worst_quality: u32) -> LineBreakResult {
  if !paragraph.has_box() {
    return LineBreakResult::empty();
  }
  let mut last = None;
  for quality in 0..=worst_quality {
    let result = attempt(paragraph, quality);
    if !result.degraded {
      return result;
    }
    last = Some(result);
  }
  // Unreachable fallback: attempt always returns a solution for a paragraph
  // that contains a box and ends in a forced break.
  let result = last.unwrap_or_else(LineBreakResult::empty);
  warn!(
    "paragraph at node {} exceeded quality {}; accepting degraded breaks",
    paragraph.node(),
    worst_quality
  );
  result
}

/// Runs one total-fit search at a fixed quality level
fn attempt(paragraph: &TextParagraph, quality: u32) -> LineBreakResult {
  let items = paragraph.items();
  let n = items.len();
  let stretch_scale = f64::powi(2.0, quality as i32);

  // Prefix sums over widths and elasticity; index i covers items[..i].
  let mut cum_width = vec![0.0; n + 1];
  let mut cum_stretch = vec![0.0; n + 1];
  let mut cum_shrink = vec![0.0; n + 1];
  for (i, item) in items.iter().enumerate() {
    cum_width[i + 1] = cum_width[i] + item.width();
    cum_stretch[i + 1] = cum_stretch[i] + item.stretch();
    cum_shrink[i + 1] = cum_shrink[i] + item.shrink();
  }

  let start_totals = |from: usize| {
    let mut j = from;
    while j < n && items[j].is_discardable() {
      j += 1;
    }
    (j, cum_width[j], cum_stretch[j], cum_shrink[j])
  };

  let mut arena: Vec<SearchNode> = Vec::new();
  let (j0, w0, y0, z0) = start_totals(0);
  arena.push(SearchNode {
    index: 0,
    line: 0,
    fitness: Fitness::Normal,
    total_demerits: 0.0,
    prev: None,
    ratio: 0.0,
    flagged: false,
    start_index: j0,
    start_width: w0,
    start_stretch: y0,
    start_shrink: z0,
  });
  let mut active: Vec<u32> = vec![0];
  let mut degraded = false;
  // Cheapest node dropped so far, kept for least-bad recovery.
  let mut fallback: Option<u32> = None;

  // Whether any box follows position i; recovery at a breakpoint with no
  // content after it would only manufacture an empty line.
  let mut box_after = vec![false; n + 1];
  for i in (0..n).rev() {
    box_after[i] = box_after[i + 1] || items[i].is_box();
  }

  for i in 0..n {
    let item = &items[i];
    let legal = match item {
      Item::Penalty { .. } => !item.is_forbidden_break(),
      // A glue directly before a forced break duplicates the forced
      // position, so it is not a breakpoint of its own.
      Item::Glue { .. } => {
        i > 0
          && !items[i - 1].is_glue()
          && items.get(i + 1).map_or(true, |next| !next.is_forced_break())
      }
      Item::Box { .. } => false,
    };
    if !legal {
      continue;
    }
    let forced = item.is_forced_break();
    // A break at a glue discards the glue but keeps its elasticity in the
    // line it ends; a break at a penalty does not reach past the penalty.
    let elastic_end = if item.is_glue() { i + 1 } else { i };
    let (cost, flagged, penalty_width) = match *item {
      Item::Penalty {
        cost,
        flagged,
        width,
        ..
      } => (cost, flagged, width),
      _ => (0.0, false, 0.0),
    };

    // Best candidate per fitness class at this breakpoint:
    // (total demerits, parent arena index, ratio).
    let mut best: [Option<(f64, u32, f64)>; 4] = [None; 4];
    let mut survivors: Vec<u32> = Vec::with_capacity(active.len());

    for &node_ix in &active {
      let node = arena[node_ix as usize];
      if i < node.start_index {
        // The candidate precedes everything this node's line would hold.
        survivors.push(node_ix);
        continue;
      }
      let target = paragraph.line_width(node.line + 1);
      let width = cum_width[i] - node.start_width + penalty_width;
      let stretch = (cum_stretch[elastic_end] - node.start_stretch) * stretch_scale;
      let shrink = cum_shrink[elastic_end] - node.start_shrink;

      let ratio = if width < target {
        if stretch > 0.0 {
          (target - width) / stretch
        } else {
          f64::INFINITY
        }
      } else if width > target {
        if shrink > 0.0 {
          (target - width) / shrink
        } else {
          f64::NEG_INFINITY
        }
      } else {
        0.0
      };

      let overfull = ratio < -1.0;
      let badness = if ratio.is_finite() && !overfull {
        (100.0 * ratio.abs().powi(3)).min(MAX_BADNESS)
      } else {
        MAX_BADNESS
      };
      let feasible = !overfull && (forced || badness <= BADNESS_TOLERANCE);

      if feasible {
        let line_demerits = line_demerits(badness, cost);
        let fitness = Fitness::classify(if ratio.is_finite() { ratio } else { 0.0 });
        let mut total = node.total_demerits + line_demerits;
        if flagged && node.flagged {
          total += FLAGGED_DEMERITS;
        }
        if fitness.distance(node.fitness) > 1 {
          total += FITNESS_DEMERITS;
        }
        let slot = &mut best[fitness.index()];
        if slot.map_or(true, |(d, _, _)| total < d) {
          *slot = Some((total, node_ix, ratio));
        }
      }

      if overfull || forced {
        let cheaper = fallback.map_or(true, |f| {
          node.total_demerits < arena[f as usize].total_demerits
        });
        if cheaper {
          fallback = Some(node_ix);
        }
      } else {
        survivors.push(node_ix);
      }
    }

    let mut created = false;
    for (fitness_ix, slot) in best.iter().enumerate().take(4) {
      if let Some((total, parent, ratio)) = *slot {
        let parent_node = arena[parent as usize];
        let (sj, sw, sy, sz) = start_totals(i + 1);
        let id = arena.len() as u32;
        arena.push(SearchNode {
          index: i,
          line: parent_node.line + 1,
          fitness: match fitness_ix {
            0 => Fitness::Tight,
            1 => Fitness::Normal,
            2 => Fitness::Loose,
            _ => Fitness::VeryLoose,
          },
          total_demerits: total,
          prev: Some(parent),
          ratio: ratio.max(-1.0),
          flagged,
          start_index: sj,
          start_width: sw,
          start_stretch: sy,
          start_shrink: sz,
        });
        survivors.push(id);
        created = true;
      }
    }

    // Least-bad recovery: every path has died without a feasible break, so
    // accept an out-of-tolerance line from the cheapest dropped node. Only
    // worth doing where content still follows (or at the forced end);
    // recovering just before the paragraph tail would manufacture an empty
    // last line.
    if survivors.is_empty() && !created && (forced || box_after[i]) {
      if let Some(parent) = fallback {
        let parent_node = arena[parent as usize];
        let target = paragraph.line_width(parent_node.line + 1);
        let width = cum_width[i] - parent_node.start_width + penalty_width;
        let shrink = cum_shrink[elastic_end] - parent_node.start_shrink;
        let ratio = if width > target && shrink > 0.0 {
          ((target - width) / shrink).max(-1.0)
        } else {
          -1.0
        };
        let (sj, sw, sy, sz) = start_totals(i + 1);
        let id = arena.len() as u32;
        arena.push(SearchNode {
          index: i,
          line: parent_node.line + 1,
          fitness: Fitness::classify(ratio),
          total_demerits: parent_node.total_demerits + line_demerits(MAX_BADNESS, cost),
          prev: Some(parent),
          ratio,
          flagged,
          start_index: sj,
          start_width: sw,
          start_stretch: sy,
          start_shrink: sz,
        });
        survivors.push(id);
        degraded = true;
      }
    }

    active = survivors;
  }

  // The converter terminates every paragraph with a forced break, so the
  // remaining active nodes all sit on the final item.
  let mut terminal: Option<u32> = None;
  for &node_ix in &active {
    let node = &arena[node_ix as usize];
    if terminal.map_or(true, |t| node.total_demerits < arena[t as usize].total_demerits) {
      terminal = Some(node_ix);
    }
  }

  let Some(terminal) = terminal else {
    return LineBreakResult::empty();
  };

  let mut breaks = Vec::new();
  let mut ratios = Vec::new();
  let mut cursor = terminal;
  let total_demerits = arena[terminal as usize].total_demerits;
  loop {
    let node = arena[cursor as usize];
    let Some(prev) = node.prev else { break };
    breaks.push(node.index);
    ratios.push(node.ratio);
    cursor = prev;
  }
  breaks.reverse();
  ratios.reverse();

  LineBreakResult {
    breaks,
    ratios,
    quality,
    degraded,
    demerits: total_demerits,
  }
}

/// Demerits of one line from its badness and break cost
fn line_demerits(badness: f64, cost: f64) -> f64 {
  let base = (LINE_PENALTY + badness).powi(2);
  if cost >= crate::item::MAX_PENALTY {
    base
  } else if cost > 0.0 {
    base + cost * cost
  } else if cost > crate::item::MIN_PENALTY && cost < 0.0 {
    base - cost * cost
  } else {
    base
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::document::{Document, NodeId, NodeKind};
  use crate::style::ResolvedStyle;

  fn node() -> NodeId {
    let mut doc = Document::new(ResolvedStyle::default());
    doc.push(doc.root(), NodeKind::Block, None)
  }

  /// Three 50pt words separated by stretchy spaces, then the fill tail.
  fn three_word_paragraph(line_width: f64) -> TextParagraph {
    let n = node();
    let mut par = TextParagraph::new(line_width, n);
    par.push(Item::text_box("one", 50.0, n));
    par.push(Item::glue(10.0, 20.0, 5.0));
    par.push(Item::text_box("two", 50.0, n));
    par.push(Item::glue(10.0, 20.0, 5.0));
    par.push(Item::text_box("six", 50.0, n));
    par.push(Item::fill_glue());
    par.push(Item::forced_break());
    par
  }

  // =========================================================================
  // Basic solutions
  // =========================================================================

  #[test]
  fn two_line_solution_picks_the_stretchable_break() {
    // At 120pt only the second glue yields a feasible first line: breaking
    // at the first glue would leave a 50pt line whose 20pt of stretch falls
    // far short of the 70pt deficit. The feasible line is 110pt wide with
    // 40pt of stretch, a quarter of which is used.
    let result = break_into_lines(&three_word_paragraph(120.0), 5);
    assert_eq!(result.breaks, vec![3, 6]);
    assert!((result.ratios[0] - 0.25).abs() < 1e-9);
    assert_eq!(result.ratios[1], 0.0);
    assert_eq!(result.quality, 0);
    assert!(!result.degraded);
  }

  #[test]
  fn break_at_glue_keeps_that_glue_elasticity() {
    // An indent anchor, three 50pt words, 10pt glues with 5pt stretch and
    // 3pt shrink, on a 120pt measure. Breaking after the first glue leaves
    // a 50pt line whose only elasticity is the break glue's 5pt of stretch
    // (ratio 14, far outside tolerance), so the search takes the 110pt
    // first line instead and stretches its two glues to fill.
    let n = node();
    let mut par = TextParagraph::new(120.0, n);
    par.push(Item::empty_box(0.0));
    par.push(Item::text_box("one", 50.0, n));
    par.push(Item::glue(10.0, 5.0, 3.0));
    par.push(Item::text_box("two", 50.0, n));
    par.push(Item::glue(10.0, 5.0, 3.0));
    par.push(Item::text_box("six", 50.0, n));
    par.push(Item::fill_glue());
    par.push(Item::forced_break());
    let result = break_into_lines(&par, 5);
    assert_eq!(result.breaks, vec![4, 7]);
    assert!((result.ratios[0] - 1.0).abs() < 1e-9);
    assert_eq!(result.ratios[1], 0.0);
    assert_eq!(result.quality, 0);
    assert!(!result.degraded);
  }

  #[test]
  fn exact_fit_line_has_zero_ratio() {
    let result = break_into_lines(&three_word_paragraph(110.0), 5);
    assert_eq!(result.breaks, vec![3, 6]);
    assert_eq!(result.ratios[0], 0.0);
    assert_eq!(Fitness::classify(result.ratios[0]), Fitness::Normal);
  }

  #[test]
  fn wide_line_takes_everything() {
    // The fill glue absorbs the slack, so one line suffices.
    let result = break_into_lines(&three_word_paragraph(600.0), 5);
    assert_eq!(result.breaks, vec![6]);
    assert_eq!(result.ratios, vec![0.0]);
  }

  #[test]
  fn empty_paragraph_produces_no_lines() {
    let n = node();
    let mut par = TextParagraph::new(100.0, n);
    par.push(Item::fill_glue());
    par.push(Item::forced_break());
    assert_eq!(break_into_lines(&par, 5), LineBreakResult::empty());
  }

  #[test]
  fn search_is_deterministic() {
    let a = break_into_lines(&three_word_paragraph(120.0), 5);
    let b = break_into_lines(&three_word_paragraph(120.0), 5);
    assert_eq!(a, b);
  }

  // =========================================================================
  // Forced breaks
  // =========================================================================

  #[test]
  fn forced_break_always_ends_a_line() {
    let n = node();
    let mut par = TextParagraph::new(400.0, n);
    par.push(Item::text_box("first", 50.0, n));
    par.push(Item::fill_glue());
    par.push(Item::forced_break());
    par.push(Item::text_box("second", 50.0, n));
    par.push(Item::fill_glue());
    par.push(Item::forced_break());
    let result = break_into_lines(&par, 5);
    assert_eq!(result.breaks, vec![2, 5]);
    assert!(!result.degraded);
  }

  #[test]
  fn forbidden_break_is_skipped() {
    let n = node();
    let mut par = TextParagraph::new(50.0, n);
    par.push(Item::text_box("a", 50.0, n));
    par.push(Item::penalty(crate::item::MAX_PENALTY, 0.0, false));
    par.push(Item::text_box("b", 50.0, n));
    par.push(Item::fill_glue());
    par.push(Item::forced_break());
    let result = break_into_lines(&par, 5);
    assert!(!result.breaks.contains(&1));
  }

  // =========================================================================
  // Quality retries and degraded fallback
  // =========================================================================

  #[test]
  fn looseness_retries_until_stretch_suffices() {
    // A 50pt word with 2pt of stretch on a 60pt line is hopeless at quality
    // 0 and 1; doubling stretch twice brings the ratio down to 1.25.
    let n = node();
    let mut par = TextParagraph::new(60.0, n);
    par.push(Item::text_box("stiff", 50.0, n));
    par.push(Item::glue(0.0, 2.0, 1.0));
    par.push(Item::text_box("words", 50.0, n));
    par.push(Item::fill_glue());
    par.push(Item::forced_break());
    let result = break_into_lines(&par, 5);
    assert_eq!(result.quality, 2);
    assert!(!result.degraded);
    assert_eq!(result.breaks, vec![1, 4]);
  }

  #[test]
  fn oversized_box_degrades_instead_of_failing() {
    let n = node();
    let mut par = TextParagraph::new(60.0, n);
    par.push(Item::text_box("unbreakablecompound", 100.0, n));
    par.push(Item::fill_glue());
    par.push(Item::forced_break());
    let result = break_into_lines(&par, 3);
    assert!(result.degraded);
    assert_eq!(result.breaks, vec![2]);
    assert_eq!(result.ratios, vec![-1.0]);
  }

  // =========================================================================
  // Demerits shaping
  // =========================================================================

  #[test]
  fn consecutive_flagged_breaks_cost_extra() {
    let n = node();
    let build = |flagged: bool| {
      let mut par = TextParagraph::new(50.0, n);
      par.push(Item::text_box("aa", 50.0, n));
      par.push(Item::penalty(0.0, 0.0, flagged));
      par.push(Item::text_box("bb", 50.0, n));
      par.push(Item::penalty(0.0, 0.0, flagged));
      par.push(Item::text_box("cc", 50.0, n));
      par.push(Item::fill_glue());
      par.push(Item::forced_break());
      break_into_lines(&par, 0)
    };
    let flagged = build(true);
    let plain = build(false);
    assert_eq!(flagged.breaks, plain.breaks);
    assert!(flagged.demerits > plain.demerits);
  }

  #[test]
  fn final_forced_break_does_not_pair_with_a_flagged_hyphen() {
    // A lone flagged break on the penultimate line must cost the same as an
    // unflagged one: the terminal forced break is not a flagged partner.
    let n = node();
    let build = |flagged: bool| {
      let mut par = TextParagraph::new(50.0, n);
      par.push(Item::text_box("aa", 50.0, n));
      par.push(Item::penalty(0.0, 0.0, flagged));
      par.push(Item::text_box("bb", 50.0, n));
      par.push(Item::fill_glue());
      par.push(Item::forced_break());
      break_into_lines(&par, 0)
    };
    let flagged = build(true);
    let plain = build(false);
    assert_eq!(flagged.breaks, vec![1, 4]);
    assert_eq!(flagged.demerits, plain.demerits);
  }

  #[test]
  fn negative_penalty_attracts_the_break() {
    let n = node();
    let mut par = TextParagraph::new(110.0, n);
    par.push(Item::text_box("one", 50.0, n));
    par.push(Item::glue(10.0, 20.0, 5.0));
    par.push(Item::text_box("two", 50.0, n));
    // A rewarded break right after the second word.
    par.push(Item::penalty(-200.0, 0.0, false));
    par.push(Item::glue(10.0, 20.0, 5.0));
    par.push(Item::text_box("six", 50.0, n));
    par.push(Item::fill_glue());
    par.push(Item::forced_break());
    let result = break_into_lines(&par, 5);
    assert_eq!(result.breaks, vec![3, 7]);
  }

  // =========================================================================
  // Fitness classification
  // =========================================================================

  #[test]
  fn fitness_classes_partition_the_ratio_axis() {
    assert_eq!(Fitness::classify(-0.9), Fitness::Tight);
    assert_eq!(Fitness::classify(-0.5), Fitness::Normal);
    assert_eq!(Fitness::classify(0.0), Fitness::Normal);
    assert_eq!(Fitness::classify(0.5), Fitness::Normal);
    assert_eq!(Fitness::classify(0.8), Fitness::Loose);
    assert_eq!(Fitness::classify(1.0), Fitness::Loose);
    assert_eq!(Fitness::classify(1.5), Fitness::VeryLoose);
  }

  #[test]
  fn hanging_indent_width_is_respected() {
    // First line 60pt, later lines 110pt: the first break must come after
    // the first word even though the full width would fit two.
    let mut par = three_word_paragraph(110.0);
    par.set_line_width_fn(|line| if line == 1 { 60.0 } else { 110.0 });
    let result = break_into_lines(&par, 5);
    assert_eq!(result.breaks, vec![1, 6]);
  }
}
