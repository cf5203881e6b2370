//! Error types for story loading and section entry actions.

use thiserror::Error;

/// Errors surfaced by the story engine.
///
/// Transient conditions (missing anchors, unknown sections, out-of-range
/// animation ordinals) are not errors and never show up here.
#[derive(Debug, Error)]
pub enum StoryError {
    /// A section's entry action names a bookmark that does not exist.
    /// This is a broken section/bookmark pairing and is fatal.
    #[error("section `{section}` refers to bookmark #{index}, but only {available} bookmark(s) exist")]
    BookmarkOutOfRange {
        section: String,
        index: usize,
        available: usize,
    },

    /// The story file could not be parsed.
    #[error("story file line {line}: {message}")]
    Parse { line: usize, message: String },

    /// The animated route layer could not be derived from its source.
    #[error("animated layer construction failed: {0}")]
    LayerBuild(#[from] tokio::task::JoinError),

    /// The story file could not be read.
    #[error("cannot read story file: {0}")]
    Io(#[from] std::io::Error),
}

impl StoryError {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }
}
