/*
Text rendering of clade trees through termtree, used when no output file is given.
 */
use generational_arena::Index;
use termtree::Tree;

use crate::domain::arena::CladeTree;

pub trait TextTreeConvert {
    fn to_text_tree(&self) -> Tree<String>;
}

impl TextTreeConvert for CladeTree {
    fn to_text_tree(&self) -> Tree<String> {
        let Some(root_idx) = self.root() else {
            return Tree::new("Empty tree".to_string());
        };

        fn build_tree(tree: &CladeTree, node_idx: Index) -> Tree<String> {
            let Some(node) = tree.get_node(node_idx) else {
                return Tree::new(String::new());
            };
            let leaves: Vec<_> = node
                .children
                .iter()
                .map(|&child| build_tree(tree, child))
                .collect();
            Tree::new(node.data.to_string()).with_leaves(leaves)
        }

        build_tree(self, root_idx)
    }
}
