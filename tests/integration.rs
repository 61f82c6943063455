use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;

use route_forge::config::{PropsMode, RouterMode};
use route_forge::{Config, EntryManager};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn scaffold(files: &[&str]) -> tempfile::TempDir {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    for file in files {
        let path = dir.path().join(file);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "<template/>").unwrap();
    }
    dir
}

fn config_for(dir: &Path) -> Config {
    Config {
        context: dir.to_path_buf(),
        ..Config::default()
    }
}

fn generate(config: Config) -> String {
    let mut manager = EntryManager::new(config);
    let entries = manager.to_entry_points().expect("resolution failed");
    fs::read_to_string(&entries[0].entry).expect("generated entry missing")
}

// ---------------------------------------------------------------------------
// End-to-end SPA
// ---------------------------------------------------------------------------

#[test]
fn spa_entry_imports_the_whole_resolved_tree() {
    let dir = scaffold(&[
        "src/views/home/index.vue",
        "src/views/about.vue",
        "src/App.vue",
    ]);
    let source = generate(config_for(dir.path()));

    assert!(source.contains("import Vue from 'vue';"));
    assert!(source.contains("import VueRouter from 'vue-router';"));
    assert!(source.contains("import App from"));
    assert!(source.contains("home/index.vue"));
    assert!(source.contains("about.vue"));
    assert!(source.contains("path: \"home\""));
    assert!(source.contains("path: \"about\""));
    assert!(source.contains("mode: \"hash\""));
    assert!(source.contains("render: h => h(App)"));
    assert!(source.contains(".$mount('#app');"));
}

#[test]
fn named_views_catch_all_and_params_resolve_together() {
    let dir = scaffold(&[
        "src/views/index.vue",
        "src/views/user/index.vue",
        "src/views/user/_id.vue",
        "src/views/user/@aside.vue",
        "src/views/user/_.vue",
    ]);
    let source = generate(config_for(dir.path()));

    // index + named view fold into a components map
    assert!(source.contains("components:"));
    assert!(source.contains("default:"));
    assert!(source.contains("aside:"));

    // the param leaf and the catch-all survive as children, catch-all last
    assert!(source.contains("path: \":id\""));
    let star = source.find("path: \"*\"").expect("catch-all route");
    let id = source.find("path: \":id\"").unwrap();
    assert!(id < star, "catch-all must sort last");
    assert!(source.contains("name: \"user/*\""));
}

#[test]
fn router_mode_and_code_splitting_flags_flow_through() {
    let dir = scaffold(&["src/views/about.vue"]);
    let mut config = config_for(dir.path());
    config.router_mode = RouterMode::History;
    config.code_splitting = true;
    let source = generate(config);

    assert!(source.contains("mode: \"history\""));
    assert!(source.contains("component: () => import("));
}

#[test]
fn props_query_mode_maps_route_query() {
    let dir = scaffold(&["src/views/user/_id.vue", "src/views/user/index.vue"]);
    let mut config = config_for(dir.path());
    config.props_mode = PropsMode::Query;
    let source = generate(config);
    assert!(source.contains("props: route => route.query"));
}

#[test]
fn props_none_mode_omits_props() {
    let dir = scaffold(&["src/views/user/_id.vue", "src/views/user/index.vue"]);
    let mut config = config_for(dir.path());
    config.props_mode = PropsMode::None;
    let source = generate(config);
    assert!(!source.contains("props"));
}

// ---------------------------------------------------------------------------
// Store integration
// ---------------------------------------------------------------------------

#[test]
fn store_files_produce_a_vuex_store() {
    let dir = scaffold(&[
        "src/views/index.vue",
        "src/views/store.js",
        "src/views/admin/index.vue",
        "src/views/admin/store.js",
    ]);
    let source = generate(config_for(dir.path()));

    assert!(source.contains("import Vuex from 'vuex';"));
    assert!(source.contains("Vue.use(Vuex);"));
    assert!(source.contains("new Vuex.Store("));
    assert!(source.contains("namespaced: true"));
    // the injected bundle key is collision-proof, never a plain identifier
    assert!(source.contains("[Store]"));
    // store bundles are eager even though nothing else imports them
    assert!(source.contains("admin/store.js"));
}

#[test]
fn use_vuex_false_drops_the_store() {
    let dir = scaffold(&["src/views/index.vue", "src/views/store.js"]);
    let mut config = config_for(dir.path());
    config.use_vuex = false;
    let source = generate(config);

    assert!(!source.contains("Vuex"));
    assert!(!source.contains("store.js"));
}

#[test]
fn use_router_false_drops_the_router() {
    let dir = scaffold(&["src/views/index.vue"]);
    let mut config = config_for(dir.path());
    config.use_router = false;

    let mut manager = EntryManager::new(config);
    let entries = manager.to_entry_points().unwrap();
    let source = fs::read_to_string(&entries[0].entry).unwrap();

    assert!(!source.contains("VueRouter"));
    assert!(source.contains(".$mount('#app');"));
}

// ---------------------------------------------------------------------------
// Custom route config and plugins
// ---------------------------------------------------------------------------

#[test]
fn router_js_is_spread_into_children() {
    let dir = scaffold(&[
        "src/views/home/index.vue",
        "src/views/home/router.js",
    ]);
    let source = generate(config_for(dir.path()));

    assert!(source.contains("home/router.js"));
    assert!(source.contains("...homeRouter"));
}

#[test]
fn route_config_routes_match_before_the_catch_all() {
    let dir = scaffold(&[
        "src/views/home/index.vue",
        "src/views/home/router.js",
        "src/views/home/_.vue",
    ]);
    let source = generate(config_for(dir.path()));

    // In a definition-order router the wildcard must come after the
    // user's spread routes, or it would shadow all of them.
    let spread = source.find("...homeRouter").expect("spread emitted");
    let star = source.find("path: \"*\"").expect("catch-all emitted");
    assert!(spread < star, "catch-all must stay last in children");
}

#[test]
fn plugin_bundles_are_imported_for_side_effects() {
    let dir = scaffold(&["src/views/index.vue"]);
    let mut config = config_for(dir.path());
    config.plugins = vec!["vant/lib/index.css".into()];
    let source = generate(config);
    assert!(source.contains("import \"vant/lib/index.css\";"));
}

// ---------------------------------------------------------------------------
// MPA
// ---------------------------------------------------------------------------

#[test]
fn mpa_pages_map_has_one_page_per_module() {
    let dir = scaffold(&[
        "src/views/home/index.vue",
        "src/views/admin/index.vue",
    ]);
    let mut config = config_for(dir.path());
    config.spa = false;
    let mut manager = EntryManager::new(config);
    manager.to_entry_points().unwrap();

    let pages = manager.pages();
    let mut keys: Vec<&String> = pages.keys().collect();
    keys.sort();
    assert_eq!(keys, vec!["admin", "home"]);
    assert_eq!(pages["home"].filename, "home.html");
    assert!(pages["home"].entry.ends_with("node_modules/.code/home.js"));
}

#[test]
fn custom_symbols_change_the_grammar() {
    let dir = scaffold(&[
        "src/views/user/index.vue",
        "src/views/user/~id.vue",
        "src/views/user/+aside.vue",
    ]);
    let mut config = config_for(dir.path());
    config.symbols = route_forge::symbols::SymbolSet {
        param: '~',
        view: '+',
    };
    let source = generate(config);

    assert!(source.contains("path: \":id\""));
    assert!(source.contains("aside:"));
}
