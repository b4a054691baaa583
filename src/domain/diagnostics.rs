//! Recoverable conditions met while locating, building or reloading trees.
//!
//! Every warning is logged when it is recorded and kept so callers can
//! inspect what was skipped.

use std::fmt;

use thiserror::Error;
use tracing::warn;

/// Why a page yielded no clade table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    /// Disambiguation page, "did you mean" suggestion or a list of search hits
    Disambiguation,
    /// Search page reporting no matches at all
    NoSearchMatches,
    /// Page without recognizable clade content
    Unrecognized,
}

impl fmt::Display for PageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            PageKind::Disambiguation => "disambiguation or search results page, refine the term",
            PageKind::NoSearchMatches => "search returned no matches",
            PageKind::Unrecognized => "page has no recognizable clade content",
        };
        f.write_str(text)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Warning {
    #[error("no clade table found: {0}")]
    NoContent(PageKind),

    #[error("tree #{requested} requested but the page has {available} clade table(s)")]
    IndexOutOfRange { requested: usize, available: usize },

    #[error("clade table yields {count} root nodes, expected 1")]
    MultipleRoots { count: usize },

    #[error("unexpected cell class {class:?} in row under {near:?}")]
    UnexpectedRow { near: Option<String>, class: String },

    #[error("row without cells under {near:?}")]
    MissingCell { near: Option<String> },

    #[error("label {label:?} has no leaf cell")]
    MissingLeafCell { label: String },

    #[error("label row has neither a name nor children (under {near:?})")]
    EmptyLabel { near: Option<String> },

    #[error("sister label {text:?} has no preceding node")]
    OrphanAnnotation { text: String },

    #[error("leaf {leaf:?}: kept link {kept}, discarded {}", discarded.join(", "))]
    ExtraAnchors {
        leaf: String,
        kept: String,
        discarded: Vec<String>,
    },

    #[error("leaf {leaf:?}: image {src} has no valid size")]
    ImageSize { leaf: String, src: String },

    #[error("{images} image(s) but {sizes} size(s) stored for {node:?}")]
    ImageSizeMismatch {
        node: String,
        images: usize,
        sizes: usize,
    },

    #[error("stray content in clade table: {text:?}")]
    StrayContent { text: String },

    #[error("no subtree for leaf {leaf:?} (link text {link_text:?}) in {url}")]
    UnresolvedStitch {
        leaf: String,
        link_text: String,
        url: String,
    },

    #[error("cannot fetch {url} for leaf {leaf:?}: {reason}")]
    StitchFetchFailed {
        leaf: String,
        url: String,
        reason: String,
    },
}

/// Collects warnings for one run.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log and keep a warning.
    pub fn push(&mut self, warning: Warning) {
        warn!("{}", warning);
        self.warnings.push(warning);
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }
}
