//! Route resolver.
//!
//! Classifies each directory's children into: the index/default component,
//! named-view components, a single catch-all route, a custom route-config
//! file, and genuine nested-route children — then assembles the normalized
//! route tree.
//!
//! Classification is a pure function from a snapshot of a directory's
//! children to a [`Classification`]; the recursive resolver applies it.
//! Every anomaly (redundant index, redundant catch-all, invalid named-view
//! nesting) is logged and resolution proceeds first-match-wins.

use log::{debug, warn};

use crate::config::{Config, NestedRoutes};
use crate::diagnostics::{render_directory, warn_with_tree};
use crate::symbols::{
    format_path, is_index_file, is_unknown_route, kebab_case_path, match_named_view, FormatOptions,
};
use crate::tree::{ModuleTree, NodeId};
use crate::Bundle;

// ---------------------------------------------------------------------------
// Route
// ---------------------------------------------------------------------------

/// How route params/query map onto component props.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropsSpec {
    /// No props mapping.
    None,
    /// Single component: `props: true`.
    Component,
    /// Named views: a map of view name → flag.
    Views(Vec<String>),
}

/// A resolved route node.
#[derive(Debug, Clone)]
pub struct Route {
    /// Unique route identifier derived from the relative path, symbol-stripped.
    pub name: String,
    /// Route-matching pattern for this segment (`/`, `about`, `:id`, `*`).
    pub path: String,
    /// `path` concatenated with all ancestor paths.
    pub abs_route_path: String,
    /// The index/default component, when no named views exist.
    pub component: Option<Bundle>,
    /// Named-view components. When both a default component and named views
    /// exist the component is folded in under `default`.
    pub components: Vec<(String, Bundle)>,
    pub props: PropsSpec,
    /// Custom route-config bundle, spread into `children` by the generator.
    pub route_config: Option<Bundle>,
    /// Genuine nested routes. A resolved catch-all always sorts last here,
    /// with `path == "*"`.
    pub children: Vec<Route>,
    /// Path relative to the module root, for diagnostics only.
    pub file_path: String,
}

impl Route {
    /// The catch-all child, if one was honored for this directory.
    pub fn unknown(&self) -> Option<&Route> {
        self.children.last().filter(|c| c.path == "*")
    }

    /// Whether anything renderable was resolved for this route.
    pub fn has_view(&self) -> bool {
        self.component.is_some() || !self.components.is_empty() || self.route_config.is_some()
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Why a child was set aside during classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Rejection {
    RedundantIndex,
    RedundantUnknown,
    RedundantView,
    InvalidViewDirectory,
    InvalidUnknownDirectory,
    InvalidNestedUnknown,
}

/// The result of classifying one directory's children. Children recorded
/// anywhere but `keep` are *not* nested routes; `keep` holds the rest,
/// in original order.
#[derive(Debug, Default)]
pub(crate) struct Classification {
    pub index: Option<NodeId>,
    pub named_views: Vec<(String, NodeId)>,
    pub unknown: Option<NodeId>,
    pub route_config: Option<NodeId>,
    pub keep: Vec<NodeId>,
    pub ignored: Vec<(NodeId, Rejection)>,
}

/// Classify the children of `dir`. Pure: reads the tree, never mutates it.
/// Precedence when a name is ambiguous: named view, catch-all, index
/// component, `index/`-directory promotion, then ordinary nested route.
pub(crate) fn classify(tree: &ModuleTree, dir: NodeId, is_root: bool, config: &Config) -> Classification {
    let mut out = Classification::default();

    for &child in tree.children(dir) {
        let name = tree.file_name(child);
        let leaf = tree.is_leaf(child);

        if leaf && name == config.router_file_name {
            out.route_config = Some(child);
            continue;
        }
        if leaf && name == config.store_file_name {
            // The store pass owns this file.
            continue;
        }

        let view = match_named_view(&name, &config.symbols);
        if !view.is_empty() {
            if out.named_views.iter().any(|(v, _)| *v == view) {
                out.ignored.push((child, Rejection::RedundantView));
                continue;
            }
            if leaf {
                out.named_views.push((view, child));
            } else {
                // Directory-form named view: exactly one index-named file.
                match sole_index_child(tree, child) {
                    Some(index) => out.named_views.push((view, index)),
                    None => out.ignored.push((child, Rejection::InvalidViewDirectory)),
                }
            }
            continue;
        }

        if is_unknown_route(&name, &config.symbols) {
            if !is_root && config.nested_routes == NestedRoutes::None {
                out.ignored.push((child, Rejection::InvalidNestedUnknown));
                continue;
            }
            if out.unknown.is_some() {
                out.ignored.push((child, Rejection::RedundantUnknown));
                continue;
            }
            if leaf {
                out.unknown = Some(child);
            } else {
                // Directory-form catch-all resolves to its index child.
                match index_child(tree, child) {
                    Some(index) => out.unknown = Some(index),
                    None => out.ignored.push((child, Rejection::InvalidUnknownDirectory)),
                }
            }
            continue;
        }

        if leaf && is_index_file(&name) {
            if out.index.is_some() {
                out.ignored.push((child, Rejection::RedundantIndex));
            } else {
                out.index = Some(child);
            }
            continue;
        }

        // `index/index.vue` layout: a directory literally named `index`
        // holding nothing but one index file is promoted to this
        // directory's own index.
        if !leaf && name == "index" {
            if let Some(index) = sole_index_child(tree, child) {
                if out.index.is_some() {
                    out.ignored.push((child, Rejection::RedundantIndex));
                } else {
                    out.index = Some(index);
                }
                continue;
            }
        }

        if !leaf {
            let recurse = match config.nested_routes {
                NestedRoutes::Auto => true,
                NestedRoutes::Manual => has_child_file(tree, child, &config.router_file_name),
                NestedRoutes::None => false,
            };
            if recurse {
                out.keep.push(child);
            } else {
                debug!(
                    "skipping nested directory {} (nestedRoutes = {:?})",
                    tree.relative(child),
                    config.nested_routes
                );
            }
            continue;
        }

        if name.ends_with(&config.route_extension) {
            out.keep.push(child);
        } else {
            debug!("ignoring non-route file {}", tree.relative(child));
        }
    }

    out
}

/// The single index-named leaf of `dir`, only if it is the sole child.
fn sole_index_child(tree: &ModuleTree, dir: NodeId) -> Option<NodeId> {
    let children = tree.children(dir);
    if children.len() != 1 {
        return None;
    }
    let only = children[0];
    (tree.is_leaf(only) && is_index_file(&tree.file_name(only))).then_some(only)
}

/// The first index-named leaf of `dir`, regardless of siblings.
fn index_child(tree: &ModuleTree, dir: NodeId) -> Option<NodeId> {
    tree.children(dir)
        .iter()
        .copied()
        .find(|&c| tree.is_leaf(c) && is_index_file(&tree.file_name(c)))
}

fn has_child_file(tree: &ModuleTree, dir: NodeId, file_name: &str) -> bool {
    tree.children(dir)
        .iter()
        .any(|&c| tree.is_leaf(c) && tree.file_name(c) == file_name)
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Resolve the whole module tree into a route tree. The root route has
/// `path == "/"`.
pub fn resolve_routes(tree: &ModuleTree, config: &Config) -> Route {
    resolve_node(tree, tree.root(), None, config)
}

struct ParentContext<'a> {
    name: &'a str,
    abs: &'a str,
}

fn resolve_node(
    tree: &ModuleTree,
    id: NodeId,
    parent: Option<ParentContext<'_>>,
    config: &Config,
) -> Route {
    let (name, path, abs_route_path) = identity_for(tree, id, &parent, config);

    // A leaf IS a route component; terminal.
    if tree.is_leaf(id) {
        return Route {
            name,
            path,
            abs_route_path,
            component: Some(bundle_for(tree, id)),
            components: Vec::new(),
            props: PropsSpec::Component,
            route_config: None,
            children: Vec::new(),
            file_path: tree.relative(id),
        };
    }

    let classified = classify(tree, id, parent.is_none(), config);
    report_ignored(tree, id, &classified);

    let mut component = classified.index.map(|n| bundle_for(tree, n));
    let mut components: Vec<(String, Bundle)> = classified
        .named_views
        .iter()
        .map(|(view, n)| (view.clone(), bundle_for(tree, *n)))
        .collect();

    // A default component alongside named views folds into `default`.
    if let Some(default) = component.take_if(|_| !components.is_empty()) {
        components.insert(0, ("default".into(), default));
    }

    let props = if !components.is_empty() {
        PropsSpec::Views(components.iter().map(|(v, _)| v.clone()).collect())
    } else if component.is_some() {
        PropsSpec::Component
    } else {
        PropsSpec::None
    };

    let route_config = classified.route_config.map(|n| bundle_for(tree, n));

    let mut children: Vec<Route> = classified
        .keep
        .iter()
        .map(|&child| {
            resolve_node(
                tree,
                child,
                Some(ParentContext {
                    name: &name,
                    abs: &abs_route_path,
                }),
                config,
            )
        })
        .collect();

    // The honored catch-all always sorts last, renamed from its parent.
    if let Some(unknown) = classified.unknown {
        children.push(Route {
            name: format!("{name}/*"),
            path: "*".into(),
            abs_route_path: join_route(&abs_route_path, "*"),
            component: Some(bundle_for(tree, unknown)),
            components: Vec::new(),
            props: PropsSpec::Component,
            route_config: None,
            children: Vec::new(),
            file_path: tree.relative(unknown),
        });
    }

    let route = Route {
        name,
        path,
        abs_route_path,
        component,
        components,
        props,
        route_config,
        children,
        file_path: tree.relative(id),
    };

    // Nested routes with nothing to render them into is very likely a
    // missing index file. Not fatal.
    if !route.children.is_empty() && !route.has_view() {
        warn!(
            "{} declares nested routes but resolves no component, named view \
             or route config (missing index file?)\n{}",
            route.file_path.as_str().trim_start_matches('/'),
            render_directory(tree, id, id, "")
        );
    }

    route
}

/// Compute `name`/`path`/`abs_route_path` for a node.
fn identity_for(
    tree: &ModuleTree,
    id: NodeId,
    parent: &Option<ParentContext<'_>>,
    config: &Config,
) -> (String, String, String) {
    let Some(parent) = parent else {
        return (String::new(), "/".into(), "/".into());
    };

    let raw = tree.file_name(id);
    // Only filenames carry an extension to drop; `v1.2` as a directory
    // stays a literal path segment.
    let strip_extension = tree.is_leaf(id);
    let mut path = format_path(
        &raw,
        &config.symbols,
        &FormatOptions {
            strip_extension,
            ..Default::default()
        },
    );
    if config.kebab_case_path {
        path = kebab_case_path(&path);
    }

    let name_seg = format_path(
        &raw,
        &config.symbols,
        &FormatOptions {
            leading: String::new(),
            training: String::new(),
            camel_case: true,
            strip_extension,
        },
    );
    let name = if parent.name.is_empty() {
        name_seg
    } else {
        format!("{}/{}", parent.name, name_seg)
    };

    let abs = join_route(parent.abs, &path);
    (name, path, abs)
}

fn join_route(parent: &str, segment: &str) -> String {
    if parent == "/" {
        format!("/{segment}")
    } else {
        format!("{parent}/{segment}")
    }
}

fn bundle_for(tree: &ModuleTree, id: NodeId) -> Bundle {
    Bundle::new(tree.node(id).pathname.clone(), tree.relative(id))
}

fn report_ignored(tree: &ModuleTree, dir: NodeId, classified: &Classification) {
    for &(node, rejection) in &classified.ignored {
        let (message, note) = match rejection {
            Rejection::RedundantIndex => (
                "redundant index component, first match wins",
                "ignored",
            ),
            Rejection::RedundantUnknown => (
                "redundant catch-all route, first match wins",
                "ignored",
            ),
            Rejection::RedundantView => (
                "redundant named view, first match wins",
                "ignored",
            ),
            Rejection::InvalidViewDirectory => (
                "a directory-form named view must hold exactly one index file",
                "rejected",
            ),
            Rejection::InvalidUnknownDirectory => (
                "a directory-form catch-all must hold an index file",
                "rejected",
            ),
            Rejection::InvalidNestedUnknown => (
                "catch-all routes are not permitted here (nestedRoutes = none)",
                "rejected",
            ),
        };
        warn_with_tree(tree, dir, node, message, note);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
