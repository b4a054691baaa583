//! Newick serialization with optional NHX-style annotation comments.
//!
//! Plain form: `(child1,child2)name:support;`. The annotated form appends
//! `[&&NHX:key=value:...]` to every node; list values are joined with `|`
//! and reserved characters inside values are percent-escaped.

use std::fmt::Write as _;

use generational_arena::Index;
use itertools::Itertools;
use tracing::debug;

use crate::domain::arena::CladeTree;
use crate::domain::diagnostics::{Diagnostics, Warning};
use crate::domain::entities::{CladeData, ImageRef};
use crate::domain::error::{DomainError, DomainResult};

pub const LIST_SEPARATOR: char = '|';
const NHX_PREFIX: &str = "&&NHX";

const KEY_SUPPORT: &str = "support";
const KEY_ANNOTATIONS: &str = "annotations";
const KEY_LINK: &str = "link";
const KEY_IMAGES: &str = "images";
const KEY_IMAGE_SIZES: &str = "image_sizes";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOptions {
    /// Append NHX comments carrying support, annotations, link and images
    pub annotated: bool,
}

// ============================================================
// Writing
// ============================================================

/// Serialize a tree. An empty tree becomes `;`.
pub fn write(tree: &CladeTree, options: WriteOptions) -> String {
    let mut out = String::new();
    if let Some(root) = tree.root() {
        write_node(tree, root, options, &mut out);
    }
    out.push(';');
    out
}

fn write_node(tree: &CladeTree, idx: Index, options: WriteOptions, out: &mut String) {
    let Some(node) = tree.get_node(idx) else {
        return;
    };
    if !node.children.is_empty() {
        out.push('(');
        for (i, &child) in node.children.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            write_node(tree, child, options, out);
        }
        out.push(')');
    }
    out.push_str(&quote_name(&node.data.name));
    let _ = write!(out, ":{}", node.data.support);
    if options.annotated {
        out.push_str(&nhx_comment(&node.data));
    }
}

/// Quote a name when it contains structurally significant characters.
pub fn quote_name(name: &str) -> String {
    let needs_quotes = name
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '(' | ')' | ',' | ':' | ';' | '[' | ']' | '\''));
    if needs_quotes {
        format!("'{}'", name.replace('\'', "''"))
    } else {
        name.to_string()
    }
}

fn nhx_comment(data: &CladeData) -> String {
    let mut fields = vec![(KEY_SUPPORT, data.support.to_string())];
    if !data.annotations.is_empty() {
        fields.push((KEY_ANNOTATIONS, join_list(data.annotations.iter().map(String::as_str))));
    }
    if let Some(link) = &data.link {
        fields.push((KEY_LINK, escape_value(link)));
    }
    if !data.images.is_empty() {
        fields.push((KEY_IMAGES, join_list(data.images.iter().map(|i| i.url.as_str()))));
        fields.push((
            KEY_IMAGE_SIZES,
            data.images
                .iter()
                .map(ImageRef::size_token)
                .join(&LIST_SEPARATOR.to_string()),
        ));
    }

    let body = fields
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .join(":");
    format!("[{NHX_PREFIX}:{body}]")
}

fn join_list<'a>(items: impl Iterator<Item = &'a str>) -> String {
    items.map(escape_value).join(&LIST_SEPARATOR.to_string())
}

/// Percent-escape the characters that delimit NHX fields and lists.
pub fn escape_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '%' | ':' | '=' | '[' | ']' | '|' => {
                let _ = write!(out, "%{:02X}", c as u32);
            }
            _ => out.push(c),
        }
    }
    out
}

/// Inverse of [`escape_value`]; malformed escapes are kept verbatim.
pub fn unescape_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '%' {
            let hex: String = chars.clone().take(2).collect();
            if hex.len() == 2 {
                if let Ok(code) = u8::from_str_radix(&hex, 16) {
                    out.push(code as char);
                    chars.next();
                    chars.next();
                    continue;
                }
            }
        }
        out.push(c);
    }
    out
}

// ============================================================
// Parsing
// ============================================================

/// Parse Newick text (plain or annotated) back into a tree.
///
/// Inconsistent image lists are reported through `diag` and trimmed;
/// syntax errors fail with their character position.
pub fn parse(text: &str, diag: &mut Diagnostics) -> DomainResult<CladeTree> {
    let mut parser = Parser {
        chars: text.chars().collect(),
        pos: 0,
        tree: CladeTree::new(),
        diag,
    };
    parser.parse_tree()?;
    Ok(parser.tree)
}

struct Parser<'d> {
    chars: Vec<char>,
    pos: usize,
    tree: CladeTree,
    diag: &'d mut Diagnostics,
}

impl Parser<'_> {
    fn parse_tree(&mut self) -> DomainResult<()> {
        self.skip_ws();
        if self.peek() == Some(';') {
            self.pos += 1;
        } else {
            self.parse_node(None)?;
            self.skip_ws();
            self.expect(';')?;
        }
        self.skip_ws();
        if self.pos < self.chars.len() {
            return Err(self.error("trailing content after ';'"));
        }
        Ok(())
    }

    fn parse_node(&mut self, parent: Option<Index>) -> DomainResult<Index> {
        let idx = self.tree.insert_node(CladeData::default(), parent);
        self.skip_ws();

        if self.peek() == Some('(') {
            self.pos += 1;
            loop {
                self.parse_node(Some(idx))?;
                self.skip_ws();
                match self.bump() {
                    Some(',') => continue,
                    Some(')') => break,
                    _ => return Err(self.error("expected ',' or ')'")),
                }
            }
        }

        let mut data = CladeData {
            name: self.parse_name()?,
            ..CladeData::default()
        };
        self.skip_ws();
        if self.peek() == Some(':') {
            self.pos += 1;
            data.support = self.parse_number()?;
        }
        self.skip_ws();
        if self.peek() == Some('[') {
            let comment = self.parse_comment()?;
            self.apply_comment(&comment, &mut data);
        }

        if let Some(node) = self.tree.get_node_mut(idx) {
            node.data = data;
        }
        Ok(idx)
    }

    fn parse_name(&mut self) -> DomainResult<String> {
        self.skip_ws();
        if self.peek() == Some('\'') {
            self.pos += 1;
            let mut name = String::new();
            loop {
                match self.bump() {
                    Some('\'') if self.peek() == Some('\'') => {
                        self.pos += 1;
                        name.push('\'');
                    }
                    Some('\'') => return Ok(name),
                    Some(c) => name.push(c),
                    None => return Err(self.error("unterminated quoted name")),
                }
            }
        }

        let start = self.pos;
        while let Some(c) = self.peek() {
            if matches!(c, '(' | ')' | ',' | ':' | ';' | '[' | ']') {
                break;
            }
            self.pos += 1;
        }
        let raw: String = self.chars[start..self.pos].iter().collect();
        Ok(raw.trim().to_string())
    }

    fn parse_number(&mut self) -> DomainResult<f64> {
        self.skip_ws();
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E') {
                self.pos += 1;
            } else {
                break;
            }
        }
        let raw: String = self.chars[start..self.pos].iter().collect();
        raw.parse()
            .map_err(|_| self.error(&format!("invalid number {raw:?}")))
    }

    fn parse_comment(&mut self) -> DomainResult<String> {
        self.expect('[')?;
        let start = self.pos;
        while let Some(c) = self.bump() {
            if c == ']' {
                return Ok(self.chars[start..self.pos - 1].iter().collect());
            }
        }
        Err(self.error("unterminated comment"))
    }

    fn apply_comment(&mut self, comment: &str, data: &mut CladeData) {
        let Some(body) = comment.strip_prefix(NHX_PREFIX) else {
            debug!("ignoring non-NHX comment: {comment:?}");
            return;
        };

        let mut urls: Vec<String> = Vec::new();
        let mut sizes: Vec<String> = Vec::new();
        for field in body.split(':').filter(|f| !f.is_empty()) {
            let Some((key, value)) = field.split_once('=') else {
                debug!("ignoring NHX field without value: {field:?}");
                continue;
            };
            match key {
                KEY_SUPPORT => {
                    if let Ok(support) = value.parse() {
                        data.support = support;
                    }
                }
                KEY_ANNOTATIONS => data.annotations = split_list(value),
                KEY_LINK => data.link = Some(unescape_value(value)),
                KEY_IMAGES => urls = split_list(value),
                KEY_IMAGE_SIZES => sizes = split_list(value),
                other => debug!("ignoring unknown NHX key {other:?}"),
            }
        }

        if urls.len() != sizes.len() {
            self.diag.push(Warning::ImageSizeMismatch {
                node: data.name.clone(),
                images: urls.len(),
                sizes: sizes.len(),
            });
        }
        for (url, size) in urls.into_iter().zip(sizes) {
            match ImageRef::parse_size(&size) {
                Some((width, height)) => data.images.push(ImageRef::new(url, width, height)),
                None => self.diag.push(Warning::ImageSize {
                    leaf: data.name.clone(),
                    src: url,
                }),
            }
        }
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn expect(&mut self, wanted: char) -> DomainResult<()> {
        match self.bump() {
            Some(c) if c == wanted => Ok(()),
            _ => Err(self.error(&format!("expected {wanted:?}"))),
        }
    }

    fn error(&self, message: &str) -> DomainError {
        DomainError::Newick {
            position: self.pos,
            message: message.to_string(),
        }
    }
}

fn split_list(value: &str) -> Vec<String> {
    if value.is_empty() {
        return Vec::new();
    }
    value.split(LIST_SEPARATOR).map(unescape_value).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{SUPPORT_DEFAULT, SUPPORT_DISPUTED};

    fn felidae() -> CladeTree {
        let (mut tree, root) = CladeTree::with_root(CladeData::named("Felidae"));
        let mut panther = CladeData::named("Pantherinae");
        panther.support = SUPPORT_DISPUTED;
        tree.insert_node(panther, Some(root));
        tree.insert_node(CladeData::named("Felinae"), Some(root));
        tree
    }

    #[test]
    fn given_tree_when_writing_plain_then_emits_names_and_support() {
        let text = write(&felidae(), WriteOptions::default());
        assert_eq!(text, "(Pantherinae:0.5,Felinae:1)Felidae:1;");
    }

    #[test]
    fn given_special_characters_when_quoting_then_wraps_and_doubles_quotes() {
        assert_eq!(quote_name("Homo sapiens"), "'Homo sapiens'");
        assert_eq!(quote_name("O'Brien"), "'O''Brien'");
        assert_eq!(quote_name("a,b"), "'a,b'");
        assert_eq!(quote_name("Felidae"), "Felidae");
    }

    #[test]
    fn given_reserved_characters_when_escaping_then_unescape_restores() {
        let raw = "https://x.org/a=b|c[1]%";
        let escaped = escape_value(raw);
        assert!(!escaped.contains(':'));
        assert!(!escaped.contains('|'));
        assert_eq!(unescape_value(&escaped), raw);
    }

    #[test]
    fn given_malformed_text_when_parsing_then_reports_position() {
        let mut diag = Diagnostics::new();
        let err = parse("(A,B", &mut diag).unwrap_err();
        assert!(matches!(err, DomainError::Newick { position: 4, .. }));
    }

    #[test]
    fn given_plain_newick_without_support_when_parsing_then_defaults() {
        let mut diag = Diagnostics::new();
        let tree = parse("((A,B)C,'D E');", &mut diag).unwrap();

        let root = tree.root().unwrap();
        assert_eq!(tree.child_names(root), ["C", "D E"]);
        assert!(tree
            .iter()
            .all(|(_, n)| n.data.support == SUPPORT_DEFAULT));
        assert_eq!(tree.leaf_names(), ["A", "B", "D E"]);
    }

    #[test]
    fn given_mismatched_image_lists_when_parsing_then_warns_and_trims() {
        let mut diag = Diagnostics::new();
        let text = "Felis:1[&&NHX:support=1:images=a.png|b.png:image_sizes=10x20];";

        let tree = parse(text, &mut diag).unwrap();

        let root = tree.root_node().unwrap();
        assert_eq!(root.data.images, [ImageRef::new("a.png", 10, 20)]);
        assert_eq!(diag.len(), 1);
        assert!(matches!(
            diag.warnings()[0],
            Warning::ImageSizeMismatch {
                images: 2,
                sizes: 1,
                ..
            }
        ));
    }
}
