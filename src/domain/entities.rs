//! Domain entities: node payloads of a clade tree

use std::fmt;

/// Support value of an ordinary branch.
pub const SUPPORT_DEFAULT: f64 = 1.0;

/// Support value of a branch drawn with a dashed connector (disputed placement).
pub const SUPPORT_DISPUTED: f64 = 0.5;

/// Image attached to a leaf cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub url: String,
    pub width: u32,
    pub height: u32,
}

impl ImageRef {
    pub fn new(url: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            url: url.into(),
            width,
            height,
        }
    }

    /// Size token as stored in annotated Newick, e.g. `40x25`.
    pub fn size_token(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }

    /// Parse a `WxH` size token.
    pub fn parse_size(token: &str) -> Option<(u32, u32)> {
        let (w, h) = token.trim().split_once('x')?;
        Some((w.trim().parse().ok()?, h.trim().parse().ok()?))
    }
}

/// Data payload of one clade node.
#[derive(Debug, Clone, PartialEq)]
pub struct CladeData {
    /// Clade or taxon name, empty while a branch marker is unresolved
    pub name: String,
    /// 1.0, or 0.5 for a disputed branch
    pub support: f64,
    /// Free-text notes from sister-label rows (age estimates etc.)
    pub annotations: Vec<String>,
    /// Outbound reference of the leaf cell
    pub link: Option<String>,
    pub images: Vec<ImageRef>,
    /// Cross-page recursion depth at which the node was discovered
    pub depth: usize,
}

impl Default for CladeData {
    fn default() -> Self {
        Self {
            name: String::new(),
            support: SUPPORT_DEFAULT,
            annotations: Vec::new(),
            link: None,
            images: Vec::new(),
            depth: 0,
        }
    }
}

impl CladeData {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn at_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    pub fn is_disputed(&self) -> bool {
        self.support <= SUPPORT_DISPUTED
    }
}

impl fmt::Display for CladeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "(unnamed)")?;
        } else {
            write!(f, "{}", self.name)?;
        }
        if self.is_disputed() {
            write!(f, " [disputed]")?;
        }
        if !self.annotations.is_empty() {
            write!(f, " ({})", self.annotations.join("; "))?;
        }
        Ok(())
    }
}
