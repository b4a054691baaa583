//! Name matching used to find the subtree a leaf link points at.

use generational_arena::Index;

use crate::domain::arena::CladeTree;

/// First node, breadth-first from the root, whose name contains any of the
/// patterns (case-insensitive). Shallower, more general clades win.
pub fn find_first<S: AsRef<str>>(tree: &CladeTree, patterns: &[S]) -> Option<Index> {
    let patterns: Vec<String> = patterns
        .iter()
        .map(|p| p.as_ref().trim().to_lowercase())
        .filter(|p| !p.is_empty())
        .collect();
    if patterns.is_empty() {
        return None;
    }

    tree.iter_bfs()
        .find(|(_, node)| {
            let name = node.data.name.to_lowercase();
            patterns.iter().any(|p| name.contains(p.as_str()))
        })
        .map(|(idx, _)| idx)
}

/// Patterns for a leaf: its link text, then every `/`-separated token of its name.
pub fn leaf_patterns(name: &str, link_text: &str) -> Vec<String> {
    std::iter::once(link_text)
        .chain(name.split('/'))
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}
