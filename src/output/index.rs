use termtree::Tree;

use crate::index::IndexSummary;
use crate::output::tree_label;

/// Print the index build summary in a tree structure.
pub fn print_index_tree(summary: &IndexSummary) {
    let mut root = Tree::new(format!(
        "Index {} (elapsed: {:?})",
        summary.index_path.display(),
        summary.elapsed
    ));
    root.push(Tree::new(tree_label(format!("files: {}", summary.files))));
    root.push(Tree::new(tree_label(format!("rows: {}", summary.rows))));
    if !summary.unparsable.is_empty() {
        let mut node = Tree::new(tree_label(format!("unparsable: {}", summary.unparsable.len())));
        for path in &summary.unparsable {
            node.push(Tree::new(path.display().to_string()));
        }
        root.push(node);
    }
    println!("{}", root);
}
