//! Store resolver.
//!
//! Walks the module tree looking for per-directory store-config files and
//! assembles a nested Vuex-style module tree keyed by relative path. Every
//! injected store bundle is attached under a collision-proof property name
//! generated once per resolution pass, so the code generator can locate
//! injected bundles unambiguously even if user state carries ordinary keys.

use rand::distributions::Alphanumeric;
use rand::Rng;

use crate::config::Config;
use crate::tree::{ModuleTree, NodeId};
use crate::Bundle;

// ---------------------------------------------------------------------------
// Store tree
// ---------------------------------------------------------------------------

/// One Vuex-style module stub: `{ namespaced: true, state: {}, modules: {} }`
/// plus, where a store-config file exists, the injected bundle.
#[derive(Debug, Clone, Default)]
pub struct StoreModule {
    /// The injected store bundle for this directory, if any.
    pub entry: Option<Bundle>,
    /// Nested modules keyed by path segment, insertion order preserved so
    /// generated code always emits `modules` last.
    pub modules: Vec<(String, StoreModule)>,
}

impl StoreModule {
    fn ensure_module(&mut self, key: &str) -> &mut StoreModule {
        if let Some(pos) = self.modules.iter().position(|(k, _)| k == key) {
            return &mut self.modules[pos].1;
        }
        self.modules.push((key.to_string(), StoreModule::default()));
        &mut self.modules.last_mut().unwrap().1
    }

    pub fn is_empty(&self) -> bool {
        self.entry.is_none() && self.modules.is_empty()
    }
}

/// The resolved store tree for one pass.
#[derive(Debug, Clone)]
pub struct StoreTree {
    /// The shared collision-proof key injected bundles live under.
    pub prop_name: String,
    pub root: StoreModule,
}

impl StoreTree {
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Prop name generation
// ---------------------------------------------------------------------------

/// Generate the per-pass store property key: `<random>[Store]<random>`.
///
/// The angle brackets and square brackets make the key impossible to write
/// as an ordinary identifier, and the random halves keep it from colliding
/// with any literal string key a user would put in `state`.
pub fn generate_store_prop_name() -> String {
    let token = |len: usize| -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(len)
            .map(char::from)
            .collect()
    };
    format!("<{}>[Store]<{}>", token(8), token(8))
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Resolve the store tree. Directories with neither a store-config file nor
/// children are skipped entirely. Returns `None` when no store-config file
/// exists anywhere under the root.
pub fn resolve_store(tree: &ModuleTree, config: &Config) -> Option<StoreTree> {
    let mut store = StoreTree {
        prop_name: generate_store_prop_name(),
        root: StoreModule::default(),
    };

    tree.walk(|tree, id, _parent| {
        if tree.is_leaf(id) {
            return;
        }
        let Some(file) = store_file(tree, id, config) else {
            return;
        };
        let bundle = Bundle::new(tree.node(file).pathname.clone(), tree.relative(file));

        let relative = tree.relative(id);
        let mut cursor = &mut store.root;
        if !relative.is_empty() {
            for segment in relative.split('/') {
                cursor = cursor.ensure_module(segment);
            }
        }
        cursor.entry = Some(bundle);
    });

    (!store.is_empty()).then_some(store)
}

fn store_file(tree: &ModuleTree, dir: NodeId, config: &Config) -> Option<NodeId> {
    tree.children(dir)
        .iter()
        .copied()
        .find(|&c| tree.is_leaf(c) && tree.file_name(c) == config.store_file_name)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};

    fn tree_of(files: &[&str]) -> ModuleTree {
        let paths: Vec<PathBuf> = files.iter().map(PathBuf::from).collect();
        ModuleTree::from_files(&paths, Some(Path::new("/proj/src/views"))).unwrap()
    }

    #[test]
    fn no_store_files_yields_none() {
        let tree = tree_of(&["/proj/src/views/home/index.vue"]);
        assert!(resolve_store(&tree, &Config::default()).is_none());
    }

    #[test]
    fn root_store_attaches_at_root() {
        let tree = tree_of(&[
            "/proj/src/views/index.vue",
            "/proj/src/views/store.js",
        ]);
        let store = resolve_store(&tree, &Config::default()).unwrap();
        assert!(store.root.entry.is_some());
        assert!(store.root.modules.is_empty());
    }

    #[test]
    fn nested_store_builds_module_path() {
        let tree = tree_of(&[
            "/proj/src/views/index.vue",
            "/proj/src/views/admin/users/index.vue",
            "/proj/src/views/admin/users/store.js",
        ]);
        let store = resolve_store(&tree, &Config::default()).unwrap();
        assert!(store.root.entry.is_none());

        let (key, admin) = &store.root.modules[0];
        assert_eq!(key, "admin");
        assert!(admin.entry.is_none());

        let (key, users) = &admin.modules[0];
        assert_eq!(key, "users");
        assert!(users
            .entry
            .as_ref()
            .unwrap()
            .bundle
            .ends_with("admin/users/store.js"));
    }

    #[test]
    fn prop_name_is_not_an_identifier() {
        let name = generate_store_prop_name();
        assert!(name.contains("[Store]"));
        assert!(name.starts_with('<') && name.ends_with('>'));
        assert_ne!(generate_store_prop_name(), name);
    }
}
