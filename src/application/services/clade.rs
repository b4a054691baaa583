//! Clade tree service
//!
//! Converts clade tables into trees and extends leaves by following their
//! links to other pages, up to a caller-supplied depth.
//!
//! Table layout consumed:
//!
//! ```text
//! table.clade > tbody > tr
//!   td.clade-label   branch label, style may carry a dashed border
//!   td.clade-leaf    nested table.clade, or leaf text/anchors/images
//! tr
//!   td.clade-slabel  note for the preceding row (e.g. "690 Mya")
//! ```

use std::sync::Arc;

use generational_arena::Index;
use scraper::ElementRef;
use tracing::{debug, info, instrument, trace};
use url::Url;

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::diagnostics::{Diagnostics, Warning};
use crate::domain::entities::{CladeData, ImageRef, SUPPORT_DISPUTED};
use crate::domain::markup::{
    child_elements, class_list, descendant_elements, has_class, is_tagged, stray_text, text_of,
    CLADE_TABLE_CLASS, LABEL_CLASS, LEAF_CLASS, SISTER_LABEL_CLASS,
};
use crate::domain::{locator, matcher, CladeTree, TreeQuery};
use crate::infrastructure::traits::{Document, DocumentSource, PageRequest};

/// Anchor kept for a leaf cell.
#[derive(Debug, Clone)]
struct LeafLink {
    /// Absolute URL when the href resolves, the raw href otherwise
    url: String,
    text: String,
    /// Link to a page that does not exist yet (red link)
    missing_page: bool,
    /// Fragment pointing into the same page
    in_page: bool,
}

/// Content of a terminal `clade-leaf` cell.
#[derive(Debug, Clone)]
struct LeafContent {
    text: String,
    link: Option<LeafLink>,
    images: Vec<ImageRef>,
}

impl LeafContent {
    fn is_empty(&self) -> bool {
        self.text.is_empty() && self.link.is_none() && self.images.is_empty()
    }
}

/// Service building clade trees from documents.
pub struct CladeService {
    source: Arc<dyn DocumentSource>,
}

impl CladeService {
    /// Create a new clade service.
    pub fn new(source: Arc<dyn DocumentSource>) -> Self {
        Self { source }
    }

    /// Fetch the page for `query` and build every selected tree.
    ///
    /// Only the initial fetch is fatal; everything after it degrades to
    /// warnings in `diag`.
    #[instrument(level = "debug", skip(self, diag))]
    pub fn fetch_trees(
        &self,
        query: &TreeQuery,
        max_depth: usize,
        diag: &mut Diagnostics,
    ) -> ApplicationResult<Vec<CladeTree>> {
        let request = PageRequest::from_term(&query.term);
        let document = self
            .source
            .fetch(&request)
            .map_err(|source| ApplicationError::Fetch {
                request: query.term.clone(),
                source,
            })?;
        info!("fetched {}", document.url);

        let trees = self.build_document(&document, query.index, max_depth, 0, diag);
        info!("found {} phylogenetic tree(s)", trees.len());
        Ok(trees)
    }

    /// Locate the clade tables of a document and build each of them.
    pub fn build_document(
        &self,
        document: &Document,
        index: Option<usize>,
        max_depth: usize,
        depth: usize,
        diag: &mut Diagnostics,
    ) -> Vec<CladeTree> {
        locator::locate(&document.html, index, diag)
            .into_iter()
            .flat_map(|table| self.build_table(&document.url, table, max_depth, depth, diag))
            .collect()
    }

    /// Build one top-level table, flagging tables that yield several roots.
    fn build_table(
        &self,
        base: &Url,
        table: ElementRef<'_>,
        max_depth: usize,
        depth: usize,
        diag: &mut Diagnostics,
    ) -> Vec<CladeTree> {
        let roots = self.build(base, table, max_depth, depth, diag);
        if roots.len() > 1 {
            diag.push(Warning::MultipleRoots { count: roots.len() });
        }
        roots
    }

    /// Convert one clade table into trees, one per label row, in row order.
    ///
    /// `base` is the URL of the document holding the table; leaf links are
    /// resolved against it. Leaves are stitched while `depth < max_depth`.
    pub fn build(
        &self,
        base: &Url,
        table: ElementRef<'_>,
        max_depth: usize,
        depth: usize,
        diag: &mut Diagnostics,
    ) -> Vec<CladeTree> {
        let mut trees: Vec<CladeTree> = Vec::new();
        let Some(tbody) = child_elements(table, "tbody").next() else {
            return trees;
        };

        for row in child_elements(tbody, "tr") {
            let near = last_name(&trees);

            let Some(cell) = child_elements(row, "td").next() else {
                diag.push(Warning::MissingCell { near });
                continue;
            };

            if has_class(cell, LABEL_CLASS) {
                if let Some(tree) = self.build_label_row(base, cell, max_depth, depth, diag) {
                    if tree
                        .root_node()
                        .is_some_and(|n| n.data.name.is_empty() && n.is_leaf())
                    {
                        diag.push(Warning::EmptyLabel { near });
                    }
                    trees.push(tree);
                }
            } else if has_class(cell, SISTER_LABEL_CLASS) {
                let text = text_of(cell);
                if text.is_empty() {
                    continue;
                }
                match trees.last_mut().and_then(root_data_mut) {
                    Some(data) => data.annotations.push(text),
                    None => diag.push(Warning::OrphanAnnotation { text }),
                }
            } else {
                diag.push(Warning::UnexpectedRow {
                    near,
                    class: class_list(cell),
                });
            }
        }
        trees
    }

    fn build_label_row(
        &self,
        base: &Url,
        cell: ElementRef<'_>,
        max_depth: usize,
        depth: usize,
        diag: &mut Diagnostics,
    ) -> Option<CladeTree> {
        let label = text_of(cell);
        let Some(leaf_cell) = cell
            .next_siblings()
            .filter_map(ElementRef::wrap)
            .find(|el| is_tagged(*el, "td", LEAF_CLASS))
        else {
            diag.push(Warning::MissingLeafCell { label });
            return None;
        };
        trace!("label row {:?}", label);

        // any other cell in a label row is stray
        for extra in cell
            .next_siblings()
            .filter_map(ElementRef::wrap)
            .filter(|el| el.value().name().eq_ignore_ascii_case("td") && el.id() != leaf_cell.id())
        {
            report_text(text_of(extra), diag);
        }

        let mut data = CladeData::named(label).at_depth(depth);
        if is_dashed(cell) {
            data.support = SUPPORT_DISPUTED;
        }
        let (mut tree, node) = CladeTree::with_root(data);

        let nested = child_elements(leaf_cell, "table").find(|t| has_class(*t, CLADE_TABLE_CLASS));
        if let Some(nested) = nested {
            for text in stray_text(leaf_cell, nested) {
                report_text(text, diag);
            }
            for child in self.build(base, nested, max_depth, depth, diag) {
                tree.graft(node, child);
            }
        } else {
            let leaf = read_leaf(base, leaf_cell, diag);
            if !leaf.is_empty() {
                let target = attach_leaf(&mut tree, node, &leaf, depth);
                if let Some(link) = &leaf.link {
                    if depth < max_depth && !link.missing_page && !link.in_page {
                        self.stitch(&mut tree, target, &leaf.text, link, max_depth, depth, diag);
                    }
                }
            }
        }

        Some(tree)
    }

    /// Graft the children of the matching clade on the linked page under `target`.
    ///
    /// Candidate tables are built one at a time; the first tree whose
    /// breadth-first match is an inner node wins.
    #[instrument(level = "debug", skip(self, tree, target, link, diag), fields(url = %link.url))]
    #[allow(clippy::too_many_arguments)]
    fn stitch(
        &self,
        tree: &mut CladeTree,
        target: Index,
        leaf_name: &str,
        link: &LeafLink,
        max_depth: usize,
        depth: usize,
        diag: &mut Diagnostics,
    ) {
        let fetched = Url::parse(&link.url)
            .map_err(|e| e.to_string())
            .and_then(|url| {
                self.source
                    .fetch(&PageRequest::Url(url))
                    .map_err(|e| e.to_string())
            });
        let document = match fetched {
            Ok(document) => document,
            Err(reason) => {
                diag.push(Warning::StitchFetchFailed {
                    leaf: leaf_name.to_string(),
                    url: link.url.clone(),
                    reason,
                });
                return;
            }
        };

        let patterns = matcher::leaf_patterns(leaf_name, &link.text);
        debug!("matching {:?} in {}", patterns, document.url);

        for table in locator::locate(&document.html, None, diag) {
            for candidate in self.build_table(&document.url, table, max_depth, depth + 1, diag) {
                let Some(found) = matcher::find_first(&candidate, &patterns) else {
                    continue;
                };
                if candidate.is_leaf(found) {
                    continue;
                }
                info!("stitched {:?} from {}", leaf_name, document.url);
                tree.graft_children(target, candidate, found);
                return;
            }
        }

        diag.push(Warning::UnresolvedStitch {
            leaf: leaf_name.to_string(),
            link_text: link.text.clone(),
            url: link.url.clone(),
        });
    }
}

/// Put leaf content on the row node if the label was a bare branch marker,
/// otherwise on a new child. Returns the node carrying the leaf.
fn attach_leaf(tree: &mut CladeTree, node: Index, leaf: &LeafContent, depth: usize) -> Index {
    let leaf_data = CladeData {
        name: leaf.text.clone(),
        link: leaf.link.as_ref().map(|l| l.url.clone()),
        images: leaf.images.clone(),
        ..CladeData::default()
    }
    .at_depth(depth);

    let bare_marker = tree.get_node(node).is_some_and(|n| n.data.name.is_empty());
    if !bare_marker {
        return tree.insert_node(leaf_data, Some(node));
    }
    if let Some(row) = tree.get_node_mut(node) {
        row.data.name = leaf_data.name;
        row.data.link = leaf_data.link;
        row.data.images = leaf_data.images;
    }
    node
}

fn read_leaf(base: &Url, cell: ElementRef<'_>, diag: &mut Diagnostics) -> LeafContent {
    let text = text_of(cell);

    let mut anchors = descendant_elements(cell, "a")
        .filter_map(|a| a.value().attr("href").map(|href| (a, href)));
    let link = anchors.next().map(|(a, href)| LeafLink {
        url: base
            .join(href)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| href.to_string()),
        text: text_of(a),
        missing_page: has_class(a, "new") || href.contains("redlink=1"),
        in_page: href.starts_with('#'),
    });
    let discarded: Vec<String> = anchors.map(|(_, href)| href.to_string()).collect();
    if let Some(kept) = &link {
        if !discarded.is_empty() {
            diag.push(Warning::ExtraAnchors {
                leaf: text.clone(),
                kept: kept.url.clone(),
                discarded,
            });
        }
    }

    let mut images = Vec::new();
    for img in descendant_elements(cell, "img") {
        let attrs = img.value();
        let src = attrs.attr("src").unwrap_or("");
        let size = |name: &str| attrs.attr(name).and_then(|v| v.trim().parse::<u32>().ok());
        match (size("width"), size("height")) {
            (Some(width), Some(height)) if !src.is_empty() => {
                let url = base
                    .join(src)
                    .map(|u| u.to_string())
                    .unwrap_or_else(|_| src.to_string());
                images.push(ImageRef::new(url, width, height));
            }
            _ => diag.push(Warning::ImageSize {
                leaf: text.clone(),
                src: src.to_string(),
            }),
        }
    }

    LeafContent { text, link, images }
}

fn is_dashed(cell: ElementRef<'_>) -> bool {
    cell.value()
        .attr("style")
        .is_some_and(|style| style.to_ascii_lowercase().contains("dashed"))
}

fn report_text(text: String, diag: &mut Diagnostics) {
    if !text.is_empty() {
        diag.push(Warning::StrayContent { text });
    }
}

fn last_name(trees: &[CladeTree]) -> Option<String> {
    trees
        .last()
        .and_then(CladeTree::root_node)
        .map(|n| n.data.name.clone())
}

fn root_data_mut(tree: &mut CladeTree) -> Option<&mut CladeData> {
    let root = tree.root()?;
    tree.get_node_mut(root).map(|n| &mut n.data)
}
