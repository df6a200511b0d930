//! galley: a paragraph and page breaking engine
//!
//! Takes a styled document tree whose fonts, sizes and styles have already
//! been resolved, breaks each paragraph into lines with the Knuth-Plass
//! total-fit algorithm, and composes the lines into pages of positioned
//! elements a rendering back-end can draw. Floating images, captions,
//! enumerations, footnotes and explicit line/page breaks are handled during
//! composition.
//!
//! The engine performs no I/O of its own: text measurement, hyphenation and
//! space elasticity come from collaborators supplied on the
//! [`config::TypesetConfig`].
//!
//! # Example
//!
//! ```
//! use galley::config::{FixedFontMetrics, TypesetConfig};
//! use galley::document::{Document, NodeKind};
//! use galley::style::ResolvedStyle;
//! use galley::Typesetter;
//!
//! let config = TypesetConfig::builder(FixedFontMetrics::new(6.0))
//!     .build()
//!     .unwrap();
//! let mut doc = Document::new(ResolvedStyle::default());
//! let para = doc.push(doc.root(), NodeKind::Block, None);
//! doc.push(para, NodeKind::text("The quick brown fox."), None);
//!
//! let pages = Typesetter::new(config).typeset(&doc).unwrap();
//! assert_eq!(pages[0].number(), 1);
//! ```
//!
//! # Pipeline
//!
//! 1. [`convert`] walks the tree and produces box/glue/penalty sequences.
//! 2. [`linebreak`] finds the minimal-demerit break sequence per paragraph.
//! 3. [`compose`] positions lines, blocks and footnotes onto [`page::Page`]s.

pub mod compose;
pub mod config;
pub mod convert;
pub mod document;
pub mod error;
pub mod geometry;
pub mod item;
pub mod linebreak;
pub mod page;
pub mod paragraph;
pub mod style;
pub mod typeset;

pub use error::{Error, Result};
pub use typeset::Typesetter;
