//! Directory-tree-formatted diagnostics for ambiguous route layouts.
//!
//! Every resolution anomaly is non-fatal: it is rendered as a small tree of
//! the offending directory with the problem entry marked, and handed to the
//! `log` facade. The resolver proceeds with a deterministic best-effort
//! choice.

use log::warn;

use crate::tree::{ModuleTree, NodeId};

/// Render a directory with its children, marking one entry.
///
/// ```text
/// views/home
/// ├── index.vue
/// └── Index.vue   <- redundant index component, ignored
/// ```
pub fn render_directory(
    tree: &ModuleTree,
    dir: NodeId,
    marked: NodeId,
    note: &str,
) -> String {
    let mut out = String::new();
    let label = tree.relative(dir);
    if label.is_empty() {
        out.push_str(&tree.node(dir).pathname.to_string_lossy());
    } else {
        out.push_str(&label);
    }
    out.push('\n');

    let children = tree.children(dir);
    for (i, &child) in children.iter().enumerate() {
        let last = i + 1 == children.len();
        out.push_str(if last { "└── " } else { "├── " });
        out.push_str(&tree.file_name(child));
        if child == marked {
            out.push_str("   <- ");
            out.push_str(note);
        }
        out.push('\n');
    }
    out
}

/// Log a resolution warning with its tree rendering.
pub fn warn_with_tree(tree: &ModuleTree, dir: NodeId, marked: NodeId, message: &str, note: &str) {
    warn!("{}\n{}", message, render_directory(tree, dir, marked, note));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn renders_marked_child() {
        let files = vec![
            PathBuf::from("/r/m/home/index.vue"),
            PathBuf::from("/r/m/home/Index.vue"),
        ];
        let tree = ModuleTree::from_files(&files, Some(std::path::Path::new("/r/m"))).unwrap();
        let home = tree.children(tree.root())[0];
        let redundant = tree.children(home)[1];

        let rendered = render_directory(&tree, home, redundant, "redundant, ignored");
        assert!(rendered.starts_with("home\n"));
        assert!(rendered.contains("├── index.vue"));
        assert!(rendered.contains("└── Index.vue   <- redundant, ignored"));
    }
}
