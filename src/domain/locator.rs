//! Finds the top-level clade tables of one document.
//!
//! Clade tables nest: every child clade is a table inside its parent's leaf
//! cell. After each hit the scan resumes past the table's last descendant, so
//! nested tables are never reported as siblings.

use scraper::{ElementRef, Html};
use tracing::{debug, instrument};

use crate::domain::diagnostics::{Diagnostics, PageKind, Warning};
use crate::domain::markup::{descendant_elements, is_tagged, CLADE_TABLE_CLASS};

/// All top-level clade tables in document order.
pub fn find_tables(html: &Html) -> Vec<ElementRef<'_>> {
    let nodes: Vec<_> = html.tree.root().descendants().collect();
    let mut tables = Vec::new();
    let mut pos = 0;

    while pos < nodes.len() {
        match ElementRef::wrap(nodes[pos]) {
            Some(el) if is_tagged(el, "table", CLADE_TABLE_CLASS) => {
                tables.push(el);
                // descendants() includes the table itself
                pos += el.descendants().count();
            }
            _ => pos += 1,
        }
    }
    tables
}

/// Locate clade tables, optionally restricted to the 1-based `index`.
///
/// Empty results are explained through a warning, never an error.
#[instrument(level = "debug", skip(html, diag))]
pub fn locate<'a>(
    html: &'a Html,
    index: Option<usize>,
    diag: &mut Diagnostics,
) -> Vec<ElementRef<'a>> {
    let tables = find_tables(html);
    debug!("found {} top-level clade table(s)", tables.len());

    if tables.is_empty() {
        diag.push(Warning::NoContent(classify_page(html)));
        return tables;
    }

    match index {
        None => tables,
        Some(n) => match n.checked_sub(1).and_then(|i| tables.get(i)) {
            Some(&table) => vec![table],
            None => {
                diag.push(Warning::IndexOutOfRange {
                    requested: n,
                    available: tables.len(),
                });
                Vec::new()
            }
        },
    }
}

/// Tell apart the kinds of pages that carry no clade table.
pub fn classify_page(html: &Html) -> PageKind {
    let root = html.root_element();
    let any = |tag: &'static str, class: &'static str| {
        descendant_elements(root, tag).any(|el| is_tagged(el, tag, class))
    };
    let has_id = |id: &str| {
        root.descendants()
            .filter_map(ElementRef::wrap)
            .any(|el| el.value().id() == Some(id))
    };

    if any("p", "mw-search-nonefound") {
        PageKind::NoSearchMatches
    } else if has_id("disambigbox")
        || any("div", "searchdidyoumean")
        || any("ul", "mw-search-results")
        || any("div", "mw-search-results")
    {
        PageKind::Disambiguation
    } else {
        PageKind::Unrecognized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NESTED: &str = r#"<html><body>
        <table class="clade"><tbody>
          <tr><td class="clade-label"></td><td class="clade-leaf">
            <table class="clade"><tbody>
              <tr><td class="clade-label"></td><td class="clade-leaf">A</td></tr>
            </tbody></table>
          </td></tr>
        </tbody></table>
        <p>text</p>
        <table class="clade" id="second"><tbody>
          <tr><td class="clade-label"></td><td class="clade-leaf">B</td></tr>
        </tbody></table>
        </body></html>"#;

    #[test]
    fn given_nested_tables_when_locating_then_returns_only_top_level() {
        let html = Html::parse_document(NESTED);
        let mut diag = Diagnostics::new();

        let tables = locate(&html, None, &mut diag);

        assert_eq!(tables.len(), 2);
        assert_eq!(tables[1].value().id(), Some("second"));
        assert!(diag.is_empty());
    }

    #[test]
    fn given_index_when_locating_then_returns_that_table() {
        let html = Html::parse_document(NESTED);
        let mut diag = Diagnostics::new();

        let tables = locate(&html, Some(2), &mut diag);

        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].value().id(), Some("second"));
    }

    #[test]
    fn given_index_past_end_when_locating_then_warns() {
        let html = Html::parse_document(NESTED);
        let mut diag = Diagnostics::new();

        let tables = locate(&html, Some(3), &mut diag);

        assert!(tables.is_empty());
        assert_eq!(
            diag.warnings(),
            [Warning::IndexOutOfRange {
                requested: 3,
                available: 2
            }]
        );
    }

    #[test]
    fn given_pages_without_tables_when_classifying_then_distinguishes_kinds() {
        let none = Html::parse_document(r#"<p class="mw-search-nonefound">There were no results</p>"#);
        let hits = Html::parse_document(r#"<ul class="mw-search-results"><li>Felis</li></ul>"#);
        let disambig = Html::parse_document(r#"<table id="disambigbox"><tr><td>x</td></tr></table>"#);
        let other = Html::parse_document("<p>Just prose</p>");

        assert_eq!(classify_page(&none), PageKind::NoSearchMatches);
        assert_eq!(classify_page(&hits), PageKind::Disambiguation);
        assert_eq!(classify_page(&disambig), PageKind::Disambiguation);
        assert_eq!(classify_page(&other), PageKind::Unrecognized);
    }
}
