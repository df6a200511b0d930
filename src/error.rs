//! Error types for galley
//!
//! This module provides the error taxonomy for the typesetting engine:
//! - Conversion errors (a collaborator failed for a specific document node)
//! - Composition errors (page assembly failed)
//!
//! Infeasible paragraphs are *not* errors: the breakpoint search recovers
//! locally by accepting the least-bad overfull/underfull partition, the same
//! way TeX reports an overfull box without aborting the run. A violated item
//! sequence invariant (e.g. a paragraph without its terminal forced break) is
//! a programmer error and panics via assertion instead of surfacing here.
//!
//! All errors use the `thiserror` crate for minimal boilerplate and proper
//! error trait implementations.

use crate::document::SourcePosition;
use thiserror::Error;

/// Result type alias for galley operations
///
/// # Examples
///
/// ```
/// use galley::Result;
///
/// fn typeset_something() -> Result<()> {
///     Ok(())
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// Error type collaborator implementations may return
///
/// Collaborators (font metrics, hyphenation) are external and may fail for
/// reasons the engine cannot know about; their errors are carried as boxed
/// sources on the node-located conversion error.
pub type CollaboratorError = Box<dyn std::error::Error + Send + Sync>;

/// Top-level error type for galley
///
/// Typesetting errors abort the run and carry enough location information to
/// attribute the failure to a position in the source document; nothing is
/// silently retried or partially rendered.
#[derive(Error, Debug)]
pub enum Error {
  /// Converting the styled document tree into item sequences failed
  #[error("Conversion error: {0}")]
  Conversion(#[from] ConversionError),

  /// Assembling lines into pages failed
  #[error("Composition error: {0}")]
  Compose(#[from] ComposeError),
}

/// Errors raised while converting the styled node tree into items
///
/// These wrap collaborator failures (font metrics, hyphenation) and are
/// attributed to the document node being converted.
#[derive(Error, Debug)]
pub enum ConversionError {
  /// A collaborator raised an error while measuring or splitting text
  #[error("Collaborator failed at {position}: {source}")]
  Collaborator {
    /// Source position of the node being converted
    position: SourcePosition,
    /// Underlying collaborator error
    #[source]
    source: CollaboratorError,
  },

  /// A node kind appeared in a context its conversion does not support
  #[error("Unsupported node at {position}: {message}")]
  UnsupportedNode {
    /// Source position of the offending node
    position: SourcePosition,
    /// What was wrong
    message: String,
  },
}

/// Errors raised during page composition
#[derive(Error, Debug)]
pub enum ComposeError {
  /// A collaborator raised an error while re-measuring for layout
  #[error("Collaborator failed during composition at {position}: {source}")]
  Collaborator {
    /// Source position of the paragraph's node
    position: SourcePosition,
    /// Underlying collaborator error
    #[source]
    source: CollaboratorError,
  },

  /// A footnote reference points at a node id with no registered content
  #[error("Unknown footnote referenced at {position}")]
  UnknownFootnote {
    /// Source position of the referencing node
    position: SourcePosition,
  },

  /// The configured page content area is degenerate (zero or negative)
  #[error("Page insets leave no content area: page {page_size}, insets {insets:?}")]
  DegenerateContentArea {
    /// Configured page size
    page_size: crate::geometry::Size,
    /// Configured page insets
    insets: crate::geometry::Insets,
  },
}
