//! Code generator.
//!
//! Turns the resolved route/store trees into the source text of a synthetic
//! JavaScript entry module. Generated values are built as a small structured
//! tree ([`JsValue`]) and rendered by a dedicated printer — component
//! references become bare identifiers or lazy `() => import()` thunks, and
//! merged route-config bundles become spreads, without any string splicing
//! into serialized JSON.
//!
//! Writes go through a content-hash cache so regeneration with identical
//! output touches nothing on disk and triggers no downstream events.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use dashmap::DashMap;
use sha2::{Digest, Sha256};

use crate::config::{Config, PropsMode};
use crate::resolver::{PropsSpec, Route, StoreModule, StoreTree};
use crate::Bundle;

// ---------------------------------------------------------------------------
// JsValue
// ---------------------------------------------------------------------------

/// A JavaScript value in generated code. Not JSON: identifiers, raw
/// expressions and spreads are first-class.
#[derive(Debug, Clone, PartialEq)]
pub enum JsValue {
    /// A quoted string literal.
    Str(String),
    /// A bare identifier reference.
    Ident(String),
    /// A raw expression emitted verbatim (arrow functions, import thunks).
    Raw(String),
    Bool(bool),
    Array(Vec<JsValue>),
    /// Key/value pairs in insertion order. Keys that are not valid
    /// identifiers are quoted.
    Object(Vec<(String, JsValue)>),
    /// `...ident`, valid inside arrays and objects.
    Spread(String),
}

impl JsValue {
    /// Render with two-space indentation at the given depth.
    pub fn render(&self, depth: usize) -> String {
        let pad = "  ".repeat(depth + 1);
        let close = "  ".repeat(depth);
        match self {
            JsValue::Str(s) => js_string(s),
            JsValue::Ident(id) => id.clone(),
            JsValue::Raw(expr) => expr.clone(),
            JsValue::Bool(b) => b.to_string(),
            JsValue::Spread(id) => format!("...{id}"),
            JsValue::Array(items) => {
                if items.is_empty() {
                    return "[]".into();
                }
                let body: Vec<String> = items
                    .iter()
                    .map(|item| format!("{pad}{}", item.render(depth + 1)))
                    .collect();
                format!("[\n{},\n{close}]", body.join(",\n"))
            }
            JsValue::Object(entries) => {
                if entries.is_empty() {
                    return "{}".into();
                }
                let body: Vec<String> = entries
                    .iter()
                    .map(|(key, value)| match value {
                        JsValue::Spread(id) => format!("{pad}...{id}"),
                        _ => format!("{pad}{}: {}", js_key(key), value.render(depth + 1)),
                    })
                    .collect();
                format!("{{\n{},\n{close}}}", body.join(",\n"))
            }
        }
    }
}

/// Quote a string for JS source. serde_json escaping is a strict subset of
/// valid JS string syntax.
pub fn js_string(value: &str) -> String {
    serde_json::to_string(value).expect("string serialization is infallible")
}

fn js_key(key: &str) -> String {
    if is_identifier(key) {
        key.to_string()
    } else {
        js_string(key)
    }
}

fn is_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

// ---------------------------------------------------------------------------
// Import table
// ---------------------------------------------------------------------------

/// Deduplicated eager imports, identifiers derived from bundle namespaces.
#[derive(Debug, Default)]
pub struct ImportTable {
    imports: Vec<(String, PathBuf)>,
    by_path: HashMap<PathBuf, usize>,
    taken: HashMap<String, usize>,
}

impl ImportTable {
    pub fn new() -> Self {
        let mut table = Self::default();
        // Identifiers the entry skeleton itself declares.
        for reserved in ["Vue", "VueRouter", "Vuex", "App", "router", "store"] {
            table.taken.insert(reserved.to_string(), 1);
        }
        table
    }

    /// Register an eager import for a bundle, returning its identifier.
    /// The same path always yields the same identifier; a repeated base
    /// name for a different path gets a numeric suffix.
    pub fn add(&mut self, bundle: &Bundle) -> String {
        if let Some(&pos) = self.by_path.get(&bundle.bundle) {
            return self.imports[pos].0.clone();
        }

        let base = ident_from_namespace(&bundle.namespace);
        let ident = match self.taken.get(&base).copied() {
            None => {
                self.taken.insert(base.clone(), 1);
                base
            }
            Some(n) => {
                self.taken.insert(base.clone(), n + 1);
                format!("{base}{}", n + 1)
            }
        };

        self.by_path.insert(bundle.bundle.clone(), self.imports.len());
        self.imports.push((ident.clone(), bundle.bundle.clone()));
        ident
    }

    /// Render all import statements, insertion order.
    pub fn render(&self) -> String {
        self.imports
            .iter()
            .map(|(ident, path)| {
                format!("import {ident} from {};", js_string(&path_str(path)))
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn is_empty(&self) -> bool {
        self.imports.is_empty()
    }
}

/// Derive a camelCase identifier from a namespace seed like
/// `admin/users/index.vue` → `adminUsersIndex`.
pub fn ident_from_namespace(namespace: &str) -> String {
    let stem = match namespace.rfind('.') {
        Some(pos) if pos > 0 => &namespace[..pos],
        _ => namespace,
    };

    let mut out = String::with_capacity(stem.len());
    let mut upper_next = false;
    for c in stem.chars() {
        if c.is_ascii_alphanumeric() {
            if c.is_ascii_digit() && out.is_empty() {
                continue;
            }
            if upper_next && !out.is_empty() {
                out.extend(c.to_uppercase());
            } else {
                out.push(c);
            }
            upper_next = false;
        } else {
            upper_next = true;
        }
    }

    if out.is_empty() {
        "bundle".into()
    } else {
        out
    }
}

fn path_str(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

// ---------------------------------------------------------------------------
// Route tree → JsValue
// ---------------------------------------------------------------------------

fn component_value(bundle: &Bundle, imports: &mut ImportTable, config: &Config) -> JsValue {
    if config.code_splitting {
        JsValue::Raw(format!(
            "() => import({})",
            js_string(&path_str(&bundle.bundle))
        ))
    } else {
        JsValue::Ident(imports.add(bundle))
    }
}

fn props_value(props: &PropsSpec, config: &Config) -> Option<JsValue> {
    let flag = || match config.props_mode {
        // `props: true` maps params only; `all` merges query on top.
        PropsMode::All => {
            JsValue::Raw("route => ({ ...route.params, ...route.query })".into())
        }
        PropsMode::Params => JsValue::Bool(true),
        PropsMode::Query => JsValue::Raw("route => route.query".into()),
        PropsMode::None => unreachable!("gated below"),
    };

    if config.props_mode == PropsMode::None {
        return None;
    }

    match props {
        PropsSpec::None => None,
        PropsSpec::Component => Some(flag()),
        PropsSpec::Views(views) => Some(JsValue::Object(
            views.iter().map(|v| (v.clone(), flag())).collect(),
        )),
    }
}

/// Convert one resolved route to its generated object literal.
pub fn route_to_js(route: &Route, imports: &mut ImportTable, config: &Config) -> JsValue {
    let mut entries: Vec<(String, JsValue)> = Vec::new();

    entries.push(("path".into(), JsValue::Str(route.path.clone())));
    if !route.name.is_empty() {
        entries.push(("name".into(), JsValue::Str(route.name.clone())));
    }

    if let Some(component) = &route.component {
        entries.push((
            "component".into(),
            component_value(component, imports, config),
        ));
    }
    if !route.components.is_empty() {
        entries.push((
            "components".into(),
            JsValue::Object(
                route
                    .components
                    .iter()
                    .map(|(view, bundle)| {
                        (view.clone(), component_value(bundle, imports, config))
                    })
                    .collect(),
            ),
        ));
    }

    if let Some(props) = props_value(&route.props, config) {
        entries.push(("props".into(), props));
    }

    if !route.children.is_empty() || route.route_config.is_some() {
        entries.push((
            "children".into(),
            JsValue::Array(children_array(route, imports, config)),
        ));
    }

    JsValue::Object(entries)
}

/// Render a route's `children` array. Custom route-config bundles are
/// always imported eagerly and spread in after the resolved children,
/// but the honored catch-all keeps its place at the very end.
fn children_array(route: &Route, imports: &mut ImportTable, config: &Config) -> Vec<JsValue> {
    let mut children: Vec<JsValue> = route
        .children
        .iter()
        .map(|child| route_to_js(child, imports, config))
        .collect();
    if let Some(route_config) = &route.route_config {
        let spread = JsValue::Spread(imports.add(route_config));
        let at = if route.unknown().is_some() {
            children.len() - 1
        } else {
            children.len()
        };
        children.insert(at, spread);
    }
    children
}

/// The top-level `routes` array: the root route itself when it renders
/// something, otherwise its children.
pub fn routes_array(root: &Route, imports: &mut ImportTable, config: &Config) -> JsValue {
    if root.component.is_some() || !root.components.is_empty() {
        JsValue::Array(vec![route_to_js(root, imports, config)])
    } else {
        JsValue::Array(children_array(root, imports, config))
    }
}

// ---------------------------------------------------------------------------
// Store tree → JsValue
// ---------------------------------------------------------------------------

fn store_module_to_js(
    module: &StoreModule,
    prop_name: &str,
    imports: &mut ImportTable,
    is_root: bool,
) -> JsValue {
    let mut entries: Vec<(String, JsValue)> = Vec::new();
    if !is_root {
        entries.push(("namespaced".into(), JsValue::Bool(true)));
    }
    entries.push(("state".into(), JsValue::Raw("{}".into())));
    if let Some(entry) = &module.entry {
        // Store bundles are always eager.
        entries.push((prop_name.to_string(), JsValue::Ident(imports.add(entry))));
    }
    // `modules` last, so injected bundles precede user modules in output.
    if !module.modules.is_empty() {
        entries.push((
            "modules".into(),
            JsValue::Object(
                module
                    .modules
                    .iter()
                    .map(|(key, nested)| {
                        (
                            key.clone(),
                            store_module_to_js(nested, prop_name, imports, false),
                        )
                    })
                    .collect(),
            ),
        ));
    }
    JsValue::Object(entries)
}

/// The Vuex store options object.
pub fn store_options(store: &StoreTree, imports: &mut ImportTable) -> JsValue {
    store_module_to_js(&store.root, &store.prop_name, imports, true)
}

// ---------------------------------------------------------------------------
// Entry source
// ---------------------------------------------------------------------------

/// Generate the full source of a synthetic entry module.
pub fn generate_entry(route: &Route, store: Option<&StoreTree>, config: &Config) -> String {
    let mut imports = ImportTable::new();

    let routes = if config.use_router {
        Some(routes_array(route, &mut imports, config))
    } else {
        None
    };
    let store = match store {
        Some(store) if config.use_vuex => Some(store_options(store, &mut imports)),
        _ => None,
    };

    let app_path = config.context.join(&config.app_file);

    let mut out = String::new();
    out.push_str("// Generated by route-forge. Do not edit.\n");
    out.push_str("import Vue from 'vue';\n");
    if routes.is_some() {
        out.push_str("import VueRouter from 'vue-router';\n");
    }
    if store.is_some() {
        out.push_str("import Vuex from 'vuex';\n");
    }
    for plugin in &config.plugins {
        out.push_str(&format!("import {};\n", js_string(plugin)));
    }
    out.push_str(&format!("import App from {};\n", js_string(&path_str(&app_path))));
    if !imports.is_empty() {
        out.push_str(&imports.render());
        out.push('\n');
    }
    out.push('\n');

    if routes.is_some() {
        out.push_str("Vue.use(VueRouter);\n");
    }
    if store.is_some() {
        out.push_str("Vue.use(Vuex);\n");
    }
    out.push('\n');

    let mut roots: Vec<&str> = Vec::new();
    if let Some(routes) = &routes {
        let options = JsValue::Object(vec![
            ("mode".into(), JsValue::Str(config.router_mode.as_str().into())),
            ("routes".into(), routes.clone()),
        ]);
        out.push_str(&format!("const router = new VueRouter({});\n\n", options.render(0)));
        roots.push("router");
    }
    if let Some(store) = &store {
        out.push_str(&format!("const store = new Vuex.Store({});\n\n", store.render(0)));
        roots.push("store");
    }

    out.push_str("new Vue({\n");
    for root in roots {
        out.push_str(&format!("  {root},\n"));
    }
    out.push_str("  render: h => h(App),\n}).$mount('#app');\n");

    out
}

// ---------------------------------------------------------------------------
// Output cache
// ---------------------------------------------------------------------------

/// Content-hash write cache keyed by output path. Owned by the Entry
/// Manager; created at construction, cleared on `destroy()`.
#[derive(Debug, Default)]
pub struct OutputCache {
    hashes: DashMap<PathBuf, [u8; 32]>,
}

impl OutputCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `content` to `path` unless the identical bytes were already
    /// written through this cache. Returns whether a write happened — the
    /// caller suppresses "entry changed" events on `false`.
    pub fn write_if_changed(&self, path: &Path, content: &str) -> io::Result<bool> {
        let digest: [u8; 32] = Sha256::digest(content.as_bytes()).into();
        if self
            .hashes
            .get(path)
            .map(|known| *known == digest)
            .unwrap_or(false)
        {
            return Ok(false);
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        self.hashes.insert(path.to_path_buf(), digest);
        Ok(true)
    }

    /// Drop the record for a path (after deleting a stale generated file).
    pub fn forget(&self, path: &Path) {
        self.hashes.remove(path);
    }

    /// Paths this cache has written so far.
    pub fn known_paths(&self) -> Vec<PathBuf> {
        self.hashes.iter().map(|e| e.key().clone()).collect()
    }

    pub fn clear(&self) {
        self.hashes.clear();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
