//! In-memory directory tree built from a flat file list.
//!
//! The tree is an arena of nodes addressed by index: ownership lives in the
//! arena, `parent` is a plain `Option<NodeId>` back-reference and `children`
//! a list of ids. Nothing here forms an ownership cycle.
//!
//! A node with `children == None` is a leaf (file); `Some(vec)` — possibly
//! empty — is a directory.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

// ---------------------------------------------------------------------------
// Arena
// ---------------------------------------------------------------------------

/// Index of a node within a [`ModuleTree`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// A single filesystem entry.
#[derive(Debug)]
pub struct Node {
    /// Absolute path of this entry.
    pub pathname: PathBuf,
    /// Back-reference; `None` for the tree root.
    pub parent: Option<NodeId>,
    /// `None` ⇒ file, `Some` ⇒ directory.
    pub children: Option<Vec<NodeId>>,
}

impl Node {
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }
}

/// Directory tree anchored at the configured module root.
#[derive(Debug)]
pub struct ModuleTree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl ModuleTree {
    /// Build a tree from a flat list of absolute file paths.
    ///
    /// Intermediate directory nodes are created lazily, first occurrence
    /// wins. Root selection walks down from the absolute top until it finds
    /// the node whose path equals `context`, or, when no context is given,
    /// the first node having a leaf (file) child.
    ///
    /// Returns `None` if no files are supplied or no suitable root exists —
    /// callers treat `None` as "no routed entries", not an error.
    pub fn from_files(files: &[PathBuf], context: Option<&Path>) -> Option<ModuleTree> {
        if files.is_empty() {
            return None;
        }

        let mut nodes: Vec<Node> = Vec::new();
        let mut maps: HashMap<PathBuf, usize> = HashMap::new();
        let mut top: Option<usize> = None;

        for file in files {
            let mut cumulative = PathBuf::new();
            let mut parent: Option<usize> = None;

            let components: Vec<Component> = file.components().collect();
            let last = components.len().saturating_sub(1);

            for (depth, component) in components.iter().enumerate() {
                cumulative.push(component.as_os_str());
                let is_file = depth == last;

                let id = match maps.get(&cumulative) {
                    Some(&id) => id,
                    None => {
                        let id = nodes.len();
                        nodes.push(Node {
                            pathname: cumulative.clone(),
                            parent: parent.map(NodeId),
                            children: if is_file { None } else { Some(Vec::new()) },
                        });
                        maps.insert(cumulative.clone(), id);
                        if let Some(p) = parent {
                            nodes[p]
                                .children
                                .as_mut()
                                .expect("parent is always a directory")
                                .push(NodeId(id));
                        }
                        if parent.is_none() && top.is_none() {
                            top = Some(id);
                        }
                        id
                    }
                };

                parent = Some(id);
            }
        }

        let root = match context {
            Some(context) => *maps.get(context)?,
            None => {
                // Walk down from the top until a directory owns a file.
                let mut cursor = top?;
                loop {
                    let children = nodes[cursor].children.as_ref()?;
                    if children.iter().any(|&c| nodes[c.0].is_leaf()) {
                        break cursor;
                    }
                    // Descend into the first directory child.
                    match children.iter().find(|&&c| !nodes[c.0].is_leaf()) {
                        Some(&next) => cursor = next.0,
                        None => return None,
                    }
                }
            }
        };

        if nodes[root].is_leaf() {
            return None;
        }

        // Ownership boundary: the chosen root has no parent.
        nodes[root].parent = None;

        Some(ModuleTree {
            nodes,
            root: NodeId(root),
        })
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Children of a node; empty for leaves.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes[id.0].children.as_deref().unwrap_or(&[])
    }

    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.nodes[id.0].is_leaf()
    }

    /// The final path component as UTF-8, lossy.
    pub fn file_name(&self, id: NodeId) -> String {
        self.nodes[id.0]
            .pathname
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Path relative to the tree root, `/`-separated.
    pub fn relative(&self, id: NodeId) -> String {
        let root = &self.nodes[self.root.0].pathname;
        self.nodes[id.0]
            .pathname
            .strip_prefix(root)
            .map(|p| p.to_string_lossy().replace('\\', "/"))
            .unwrap_or_else(|_| self.nodes[id.0].pathname.to_string_lossy().into_owned())
    }

    // -----------------------------------------------------------------------
    // Walker
    // -----------------------------------------------------------------------

    /// Pre-order depth-first traversal.
    ///
    /// Children are snapshotted before recursion, so a visitor always
    /// observes the child list as it was when its parent was entered.
    /// Visitors that need to compose (route + store resolution) each run
    /// as their own full pass; nothing a visitor does can hide nodes from
    /// a later pass because the tree itself is never mutated.
    pub fn walk<F>(&self, mut visitor: F)
    where
        F: FnMut(&ModuleTree, NodeId, Option<NodeId>),
    {
        let mut stack: Vec<(NodeId, Option<NodeId>)> = vec![(self.root, None)];
        while let Some((id, parent)) = stack.pop() {
            visitor(self, id, parent);
            let snapshot: Vec<NodeId> = self.children(id).to_vec();
            for &child in snapshot.iter().rev() {
                stack.push((child, Some(id)));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(items: &[&str]) -> Vec<PathBuf> {
        items.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn empty_input_yields_no_tree() {
        assert!(ModuleTree::from_files(&[], None).is_none());
    }

    #[test]
    fn root_selection_with_context() {
        let files = paths(&["/a/b/c.vue"]);
        let tree = ModuleTree::from_files(&files, Some(Path::new("/a/b"))).unwrap();
        assert_eq!(tree.node(tree.root()).pathname, PathBuf::from("/a/b"));

        let children = tree.children(tree.root());
        assert_eq!(children.len(), 1);
        assert!(tree.is_leaf(children[0]));
        assert_eq!(tree.file_name(children[0]), "c.vue");
    }

    #[test]
    fn root_selection_without_context_picks_first_branching_dir() {
        let files = paths(&["/src/views/home/index.vue", "/src/views/about.vue"]);
        let tree = ModuleTree::from_files(&files, None).unwrap();
        // `/src/views` is the first directory owning a file child.
        assert_eq!(tree.node(tree.root()).pathname, PathBuf::from("/src/views"));
    }

    #[test]
    fn missing_context_yields_no_tree() {
        let files = paths(&["/a/b/c.vue"]);
        assert!(ModuleTree::from_files(&files, Some(Path::new("/other"))).is_none());
    }

    #[test]
    fn root_parent_is_cleared() {
        let files = paths(&["/a/b/c.vue"]);
        let tree = ModuleTree::from_files(&files, Some(Path::new("/a/b"))).unwrap();
        assert!(tree.node(tree.root()).parent.is_none());
    }

    #[test]
    fn first_occurrence_wins_for_directories() {
        let files = paths(&["/r/m/a/index.vue", "/r/m/a/b.vue", "/r/m/c.vue"]);
        let tree = ModuleTree::from_files(&files, Some(Path::new("/r/m"))).unwrap();
        let root_children = tree.children(tree.root());
        // One `a` directory, one `c.vue` leaf — no duplicated dir nodes.
        assert_eq!(root_children.len(), 2);
    }

    #[test]
    fn relative_paths_are_root_anchored() {
        let files = paths(&["/r/m/home/index.vue"]);
        let tree = ModuleTree::from_files(&files, Some(Path::new("/r/m"))).unwrap();
        let home = tree.children(tree.root())[0];
        let index = tree.children(home)[0];
        assert_eq!(tree.relative(index), "home/index.vue");
    }

    #[test]
    fn walk_is_preorder() {
        let files = paths(&["/r/m/a/index.vue", "/r/m/b.vue"]);
        let tree = ModuleTree::from_files(&files, Some(Path::new("/r/m"))).unwrap();
        let mut seen = Vec::new();
        tree.walk(|t, id, _| seen.push(t.relative(id)));
        assert_eq!(seen[0], ""); // root first
        assert!(seen.contains(&"a/index.vue".to_string()));
        assert!(seen.contains(&"b.vue".to_string()));
        // Parent precedes child.
        let a = seen.iter().position(|s| s == "a").unwrap();
        let idx = seen.iter().position(|s| s == "a/index.vue").unwrap();
        assert!(a < idx);
    }
}
