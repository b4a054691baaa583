//! Tests for building clade trees from table markup

use std::sync::Arc;

use scraper::Html;
use url::Url;

use wikiclade::application::services::CladeService;
use wikiclade::config::Settings;
use wikiclade::domain::locator::find_tables;
use wikiclade::domain::{CladeTree, Diagnostics, Warning, SUPPORT_DEFAULT, SUPPORT_DISPUTED};
use wikiclade::infrastructure::traits::MemoryDocumentSource;
use wikiclade::util::testing::{clade_row, clade_table, init_test_setup, page};

const BASE: &str = "https://en.wikipedia.org/wiki/Carnivora";

fn service() -> (CladeService, Arc<MemoryDocumentSource>) {
    let source = Arc::new(MemoryDocumentSource::from_settings(&Settings::default()).unwrap());
    (CladeService::new(source.clone()), source)
}

/// Build every top-level table of `body` without following links.
fn build(body: &str) -> (Vec<CladeTree>, Diagnostics) {
    init_test_setup();
    let html = Html::parse_document(&page(body));
    let base = Url::parse(BASE).unwrap();
    let (service, _) = service();
    let mut diag = Diagnostics::new();

    let trees = find_tables(&html)
        .into_iter()
        .flat_map(|table| service.build(&base, table, 0, 0, &mut diag))
        .collect();
    (trees, diag)
}

fn root_name(tree: &CladeTree) -> &str {
    &tree.root_node().unwrap().data.name
}

#[test]
fn given_single_label_row_when_building_then_yields_one_root() {
    // Arrange
    let nested = clade_table(&(clade_row("", "Felis") + &clade_row("", "Panthera")));
    let body = clade_table(&clade_row("Felidae", &nested));

    // Act
    let (trees, diag) = build(&body);

    // Assert
    assert_eq!(trees.len(), 1);
    let tree = &trees[0];
    assert_eq!(root_name(tree), "Felidae");
    assert_eq!(tree.child_names(tree.root().unwrap()), ["Felis", "Panthera"]);
    assert!(diag.is_empty(), "unexpected warnings: {:?}", diag.warnings());
}

#[test]
fn given_rows_when_building_then_children_keep_document_order() {
    // Arrange
    let rows = ["Nandiniidae", "Felidae", "Viverridae", "Hyaenidae"]
        .iter()
        .map(|name| clade_row("", name))
        .collect::<String>();
    let body = clade_table(&clade_row("Feliformia", &clade_table(&rows)));

    // Act
    let (trees, _) = build(&body);

    // Assert
    let tree = &trees[0];
    assert_eq!(
        tree.child_names(tree.root().unwrap()),
        ["Nandiniidae", "Felidae", "Viverridae", "Hyaenidae"]
    );
    assert_eq!(
        tree.leaf_names(),
        ["Nandiniidae", "Felidae", "Viverridae", "Hyaenidae"]
    );
}

#[test]
fn given_named_label_with_leaf_text_when_building_then_leaf_becomes_child() {
    // Arrange
    let body = clade_table(&clade_row("Feliformia", "Felidae"));

    // Act
    let (trees, _) = build(&body);

    // Assert
    let tree = &trees[0];
    assert_eq!(root_name(tree), "Feliformia");
    assert_eq!(tree.child_names(tree.root().unwrap()), ["Felidae"]);
    assert_eq!(tree.len(), 2);
}

#[test]
fn given_empty_label_with_leaf_text_when_building_then_leaf_names_row_node() {
    // Arrange
    let body = clade_table(&clade_row("", "Felidae"));

    // Act
    let (trees, _) = build(&body);

    // Assert
    let tree = &trees[0];
    assert_eq!(tree.len(), 1);
    assert_eq!(root_name(tree), "Felidae");
}

#[test]
fn given_dashed_label_when_building_then_support_is_disputed() {
    // Arrange
    let felidae = r#"<tr><td class="clade-label" style="border-left: 1px DASHED black; border-bottom: 1px dashed">Felidae</td><td class="clade-leaf">Felis</td></tr>"#;
    let body = clade_table(&clade_row(
        "Feliformia",
        &clade_table(&(felidae.to_string() + &clade_row("Hyaenidae", "Hyaena"))),
    ));
    let supports = |trees: &[CladeTree]| -> Vec<(String, f64)> {
        trees[0]
            .iter()
            .map(|(_, n)| (n.data.name.clone(), n.data.support))
            .collect()
    };

    // Act
    let (first, _) = build(&body);
    let (second, _) = build(&body);

    // Assert - marked once, however often the style repeats it
    let first = supports(&first);
    assert_eq!(first, supports(&second));
    assert!(first
        .iter()
        .all(|(_, s)| *s == SUPPORT_DEFAULT || *s == SUPPORT_DISPUTED));
    let disputed: Vec<_> = first
        .iter()
        .filter(|(_, s)| *s == SUPPORT_DISPUTED)
        .map(|(name, _)| name.as_str())
        .collect();
    assert_eq!(disputed, ["Felidae"]);
}

#[test]
fn given_text_beside_nested_table_when_building_then_warns_stray_content() {
    // Arrange
    let nested = clade_table(&clade_row("", "Felis"));
    let body = clade_table(&clade_row("Felidae", &format!("junk text {nested}")));

    // Act
    let (trees, diag) = build(&body);

    // Assert
    assert_eq!(trees[0].leaf_names(), ["Felis"]);
    assert_eq!(
        diag.warnings(),
        [Warning::StrayContent {
            text: "junk text".into()
        }]
    );
}

#[test]
fn given_extra_cell_in_label_row_when_building_then_warns_stray_content() {
    // Arrange
    let body = clade_table(
        r#"<tr><td class="clade-label">Felidae</td><td class="clade-leaf">Felis</td><td>see note</td><td> </td></tr>"#,
    );

    // Act
    let (trees, diag) = build(&body);

    // Assert
    assert_eq!(trees[0].leaf_names(), ["Felis"]);
    assert_eq!(
        diag.warnings(),
        [Warning::StrayContent {
            text: "see note".into()
        }]
    );
}

#[test]
fn given_whitespace_around_nested_table_when_building_then_no_warning() {
    // Arrange
    let nested = clade_table(&clade_row("", "Felis"));
    let body = clade_table(&clade_row("Felidae", &format!("\n  {nested}\n")));

    // Act
    let (_, diag) = build(&body);

    // Assert
    assert!(diag.is_empty(), "unexpected warnings: {:?}", diag.warnings());
}

#[test]
fn given_sister_label_when_building_then_annotates_preceding_node() {
    // Arrange
    let rows = clade_row("", "Felis")
        + r#"<tr><td class="clade-slabel">12 Mya</td></tr>"#
        + &clade_row("", "Lynx");
    let body = clade_table(&clade_row("Felinae", &clade_table(&rows)));

    // Act
    let (trees, diag) = build(&body);

    // Assert
    let tree = &trees[0];
    let felis = tree
        .iter()
        .find(|(_, n)| n.data.name == "Felis")
        .map(|(_, n)| n)
        .unwrap();
    assert_eq!(felis.data.annotations, ["12 Mya"]);
    assert!(diag.is_empty());
}

#[test]
fn given_sister_label_first_when_building_then_warns_orphan() {
    // Arrange
    let body = clade_table(&(r#"<tr><td class="clade-slabel">orphan</td></tr>"#.to_string()
        + &clade_row("", "Felis")));

    // Act
    let (trees, diag) = build(&body);

    // Assert
    assert_eq!(trees.len(), 1);
    assert_eq!(
        diag.warnings(),
        [Warning::OrphanAnnotation {
            text: "orphan".into()
        }]
    );
}

#[test]
fn given_unexpected_cell_when_building_then_skips_row_with_warning() {
    // Arrange
    let rows = clade_row("", "Felis") + r#"<tr><td class="bogus">??</td></tr>"#;
    let body = clade_table(&clade_row("Felinae", &clade_table(&rows)));

    // Act
    let (trees, diag) = build(&body);

    // Assert
    assert_eq!(trees[0].leaf_names(), ["Felis"]);
    assert_eq!(
        diag.warnings(),
        [Warning::UnexpectedRow {
            near: Some("Felis".into()),
            class: "bogus".into()
        }]
    );
}

#[test]
fn given_leaf_with_several_anchors_when_building_then_keeps_first_and_warns_once() {
    // Arrange
    let body = clade_table(&clade_row(
        "",
        r#"<a href="/wiki/Felis">Felis</a> / <a href="/wiki/Lynx">Lynx</a> <a href="/wiki/Puma">Puma</a>"#,
    ));

    // Act
    let (trees, diag) = build(&body);

    // Assert
    let root = trees[0].root_node().unwrap();
    assert_eq!(root.data.name, "Felis / Lynx Puma");
    assert_eq!(
        root.data.link.as_deref(),
        Some("https://en.wikipedia.org/wiki/Felis")
    );
    assert_eq!(diag.len(), 1);
    assert!(matches!(
        &diag.warnings()[0],
        Warning::ExtraAnchors { discarded, .. } if discarded == &["/wiki/Lynx", "/wiki/Puma"]
    ));
}

#[test]
fn given_leaf_images_when_building_then_resolves_urls_and_sizes() {
    // Arrange
    let body = clade_table(&clade_row(
        "",
        r#"Felis <img src="//upload.wikimedia.org/felis.png" width="40" height="30"><img src="/broken.png">"#,
    ));

    // Act
    let (trees, diag) = build(&body);

    // Assert
    let images = &trees[0].root_node().unwrap().data.images;
    assert_eq!(images.len(), 1);
    assert_eq!(images[0].url, "https://upload.wikimedia.org/felis.png");
    assert_eq!((images[0].width, images[0].height), (40, 30));
    assert_eq!(
        diag.warnings(),
        [Warning::ImageSize {
            leaf: "Felis".into(),
            src: "/broken.png".into()
        }]
    );
}

#[test]
fn given_label_without_leaf_cell_when_building_then_skips_row() {
    // Arrange
    let body = clade_table(
        &(r#"<tr><td class="clade-label">Lonely</td></tr>"#.to_string() + &clade_row("", "Felis")),
    );

    // Act
    let (trees, diag) = build(&body);

    // Assert
    assert_eq!(trees.len(), 1);
    assert_eq!(root_name(&trees[0]), "Felis");
    assert_eq!(
        diag.warnings(),
        [Warning::MissingLeafCell {
            label: "Lonely".into()
        }]
    );
}

#[test]
fn given_empty_row_when_building_then_warns_empty_label() {
    // Arrange
    let body = clade_table(&clade_row("", ""));

    // Act
    let (trees, diag) = build(&body);

    // Assert
    assert_eq!(trees.len(), 1);
    assert_eq!(diag.warnings(), [Warning::EmptyLabel { near: None }]);
}

#[test]
fn given_two_top_level_tables_when_building_then_yields_tree_per_table() {
    // Arrange
    let body = clade_table(&clade_row("Felidae", "Felis"))
        + "<p>Second cladogram:</p>"
        + &clade_table(&clade_row("Canidae", "Canis"));

    // Act
    let (trees, _) = build(&body);

    // Assert
    let roots: Vec<_> = trees.iter().map(root_name).collect();
    assert_eq!(roots, ["Felidae", "Canidae"]);
}

#[test]
fn given_red_link_when_building_with_depth_then_does_not_fetch() {
    // Arrange
    init_test_setup();
    let body = clade_table(&clade_row(
        "",
        r#"<a href="/w/index.php?title=Proailurus&amp;action=edit&amp;redlink=1" class="new">Proailurus</a>"#,
    ));
    let html = Html::parse_document(&page(&body));
    let base = Url::parse(BASE).unwrap();
    let (service, source) = service();
    let mut diag = Diagnostics::new();

    // Act
    let trees: Vec<_> = find_tables(&html)
        .into_iter()
        .flat_map(|table| service.build(&base, table, 3, 0, &mut diag))
        .collect();

    // Assert
    assert_eq!(root_name(&trees[0]), "Proailurus");
    assert!(source.requests().is_empty());
    assert!(diag.is_empty());
}
