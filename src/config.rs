//! Configuration: hard defaults, the user-supplied plugin options object,
//! and process environment variables, merged with precedence
//! env > option > default.
//!
//! Everything ends up in a fully-typed [`Config`]. Symbol and enum problems
//! in the *options object* are fatal at startup — continuing would produce
//! silently-wrong routing. An invalid *environment* value never aborts: it
//! falls back to the lower-precedence value, but every silently-defaulted
//! key logs a warning naming the key and the rejected value.

use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;

use log::warn;
use serde::Deserialize;
use thiserror::Error;

use crate::symbols::SymbolSet;

/// Prefix for every recognized environment variable.
pub const ENV_PREFIX: &str = "ROUTE_FORGE_";

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Where nested (and catch-all) routes may be declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NestedRoutes {
    Auto,
    Manual,
    None,
}

/// Client-side router history mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouterMode {
    Hash,
    History,
}

/// How route params/query are mapped to component props.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropsMode {
    All,
    Params,
    Query,
    None,
}

impl FromStr for NestedRoutes {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, ()> {
        match s {
            "auto" => Ok(Self::Auto),
            "manual" => Ok(Self::Manual),
            "none" => Ok(Self::None),
            _ => Err(()),
        }
    }
}

impl FromStr for RouterMode {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, ()> {
        match s {
            "hash" => Ok(Self::Hash),
            "history" => Ok(Self::History),
            _ => Err(()),
        }
    }
}

impl FromStr for PropsMode {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, ()> {
        match s {
            "all" => Ok(Self::All),
            "params" => Ok(Self::Params),
            "query" => Ok(Self::Query),
            "none" => Ok(Self::None),
            _ => Err(()),
        }
    }
}

impl RouterMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hash => "hash",
            Self::History => "history",
        }
    }
}

// ---------------------------------------------------------------------------
// Options (user-facing plugin options object)
// ---------------------------------------------------------------------------

/// The user-supplied plugin options object. Every field is optional;
/// unset fields take the hard default (or the env override).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct Options {
    pub context: Option<PathBuf>,
    pub entry_glob: Option<String>,
    pub module_root: Option<PathBuf>,
    pub route_extension: Option<String>,
    pub code_splitting: Option<bool>,
    pub use_router: Option<bool>,
    pub use_vuex: Option<bool>,
    pub nested_routes: Option<NestedRoutes>,
    pub router_mode: Option<RouterMode>,
    pub param_symbol: Option<char>,
    pub view_symbol: Option<char>,
    pub props_mode: Option<PropsMode>,
    pub app_file: Option<PathBuf>,
    pub router_file_name: Option<String>,
    pub store_file_name: Option<String>,
    pub kebab_case_path: Option<bool>,
    pub output_dir: Option<PathBuf>,
    pub template: Option<PathBuf>,
    pub spa: Option<bool>,
    pub watch_delay_ms: Option<u64>,
    pub plugins: Option<Vec<String>>,
    pub page_remap: Option<HashMap<String, String>>,
}

impl Options {
    /// Parse the options object from its JSON form (the shape the host
    /// plugin system hands over). A malformed object is fatal.
    pub fn from_json(json: &str) -> Result<Options, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Fatal configuration problems. These abort startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid options object: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid {name} symbol {value:?}: symbols must not be alphanumeric, '/', '.', ':' or '*'")]
    InvalidSymbol { name: &'static str, value: char },

    #[error("parameter and view symbols are both {0:?}: they must differ")]
    DuplicateSymbols(char),
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// The fully-resolved, validated configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Project root all relative paths are anchored at.
    pub context: PathBuf,
    /// Glob matching candidate entry/component files, relative to `context`.
    pub entry_glob: String,
    /// Directory under which convention scanning begins.
    pub module_root: PathBuf,
    /// Extension of route component files, including the dot.
    pub route_extension: String,
    /// Lazy `() => import()` for route components when true.
    pub code_splitting: bool,
    pub use_router: bool,
    pub use_vuex: bool,
    pub nested_routes: NestedRoutes,
    pub router_mode: RouterMode,
    pub symbols: SymbolSet,
    pub props_mode: PropsMode,
    /// The root app component (a legacy entry; never treated as a route).
    pub app_file: PathBuf,
    /// Per-directory custom route-config filename.
    pub router_file_name: String,
    /// Per-directory store-config filename.
    pub store_file_name: String,
    pub kebab_case_path: bool,
    /// Scratch directory generated entries are written under.
    pub output_dir: PathBuf,
    pub template: PathBuf,
    pub spa: bool,
    /// Watcher debounce delay.
    pub watch_delay_ms: u64,
    /// Side-effect plugin bundles imported at the top of every entry.
    pub plugins: Vec<String>,
    /// User page-name remapping, applied after generation.
    pub page_remap: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            context: PathBuf::from("."),
            entry_glob: "src/views/**/*".into(),
            module_root: PathBuf::from("src/views"),
            route_extension: ".vue".into(),
            code_splitting: false,
            use_router: true,
            use_vuex: true,
            nested_routes: NestedRoutes::Auto,
            router_mode: RouterMode::Hash,
            symbols: SymbolSet::default(),
            props_mode: PropsMode::All,
            app_file: PathBuf::from("src/App.vue"),
            router_file_name: "router.js".into(),
            store_file_name: "store.js".into(),
            kebab_case_path: false,
            output_dir: PathBuf::from("node_modules/.code"),
            template: PathBuf::from("public/index.html"),
            spa: true,
            watch_delay_ms: 100,
            plugins: Vec::new(),
            page_remap: HashMap::new(),
        }
    }
}

impl Config {
    /// Merge defaults, the options object and environment variables
    /// (env > option > default), then validate.
    pub fn resolve(options: Options) -> Result<Config, ConfigError> {
        let d = Config::default();

        let mut config = Config {
            context: options.context.unwrap_or(d.context),
            entry_glob: options.entry_glob.unwrap_or(d.entry_glob),
            module_root: options.module_root.unwrap_or(d.module_root),
            route_extension: options.route_extension.unwrap_or(d.route_extension),
            code_splitting: options.code_splitting.unwrap_or(d.code_splitting),
            use_router: options.use_router.unwrap_or(d.use_router),
            use_vuex: options.use_vuex.unwrap_or(d.use_vuex),
            nested_routes: options.nested_routes.unwrap_or(d.nested_routes),
            router_mode: options.router_mode.unwrap_or(d.router_mode),
            symbols: SymbolSet {
                param: options.param_symbol.unwrap_or(d.symbols.param),
                view: options.view_symbol.unwrap_or(d.symbols.view),
            },
            props_mode: options.props_mode.unwrap_or(d.props_mode),
            app_file: options.app_file.unwrap_or(d.app_file),
            router_file_name: options.router_file_name.unwrap_or(d.router_file_name),
            store_file_name: options.store_file_name.unwrap_or(d.store_file_name),
            kebab_case_path: options.kebab_case_path.unwrap_or(d.kebab_case_path),
            output_dir: options.output_dir.unwrap_or(d.output_dir),
            template: options.template.unwrap_or(d.template),
            spa: options.spa.unwrap_or(d.spa),
            watch_delay_ms: options.watch_delay_ms.unwrap_or(d.watch_delay_ms),
            plugins: options.plugins.unwrap_or(d.plugins),
            page_remap: options.page_remap.unwrap_or(d.page_remap),
        };

        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides. Invalid values fall back to whatever the
    /// option/default merge produced, each with a logged warning.
    fn apply_env(&mut self) {
        env_string("ENTRY_GLOB", &mut self.entry_glob);
        env_path("MODULE_ROOT", &mut self.module_root);
        env_bool("CODE_SPLITTING", &mut self.code_splitting);
        env_bool("USE_ROUTER", &mut self.use_router);
        env_bool("USE_VUEX", &mut self.use_vuex);
        env_enum("NESTED_ROUTES", &mut self.nested_routes, "auto|manual|none");
        env_enum("ROUTER_MODE", &mut self.router_mode, "hash|history");
        env_enum("PROPS_MODE", &mut self.props_mode, "all|params|query|none");
        env_bool("KEBAB_CASE_PATH", &mut self.kebab_case_path);
        env_bool("SPA", &mut self.spa);
        env_path("OUTPUT_DIR", &mut self.output_dir);
        env_string("ROUTER_FILE_NAME", &mut self.router_file_name);
        env_string("STORE_FILE_NAME", &mut self.store_file_name);
    }

    fn validate(&self) -> Result<(), ConfigError> {
        validate_symbol("parameter", self.symbols.param)?;
        validate_symbol("view", self.symbols.view)?;
        if self.symbols.param == self.symbols.view {
            return Err(ConfigError::DuplicateSymbols(self.symbols.param));
        }
        Ok(())
    }
}

fn validate_symbol(name: &'static str, value: char) -> Result<(), ConfigError> {
    if value.is_alphanumeric() || matches!(value, '/' | '.' | ':' | '*') {
        return Err(ConfigError::InvalidSymbol { name, value });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Env helpers
// ---------------------------------------------------------------------------

fn env_raw(key: &str) -> Option<String> {
    std::env::var(format!("{ENV_PREFIX}{key}")).ok()
}

fn env_string(key: &str, slot: &mut String) {
    if let Some(value) = env_raw(key) {
        *slot = value;
    }
}

fn env_path(key: &str, slot: &mut PathBuf) {
    if let Some(value) = env_raw(key) {
        *slot = PathBuf::from(value);
    }
}

fn env_bool(key: &str, slot: &mut bool) {
    if let Some(value) = env_raw(key) {
        match value.as_str() {
            "true" | "1" => *slot = true,
            "false" | "0" => *slot = false,
            other => warn!(
                "{ENV_PREFIX}{key}={other:?} is not a boolean; keeping {}",
                *slot
            ),
        }
    }
}

fn env_enum<T: FromStr + Copy + std::fmt::Debug>(key: &str, slot: &mut T, allowed: &str) {
    if let Some(value) = env_raw(key) {
        match value.parse::<T>() {
            Ok(parsed) => *slot = parsed,
            Err(_) => warn!(
                "{ENV_PREFIX}{key}={value:?} is not one of {allowed}; keeping {:?}",
                *slot
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::resolve(Options::default()).unwrap();
        assert_eq!(config.symbols.param, '_');
        assert_eq!(config.symbols.view, '@');
        assert!(config.spa);
        assert_eq!(config.router_mode, RouterMode::Hash);
    }

    #[test]
    fn options_override_defaults() {
        let options = Options {
            code_splitting: Some(true),
            router_mode: Some(RouterMode::History),
            kebab_case_path: Some(true),
            ..Default::default()
        };
        let config = Config::resolve(options).unwrap();
        assert!(config.code_splitting);
        assert_eq!(config.router_mode, RouterMode::History);
        assert!(config.kebab_case_path);
    }

    #[test]
    fn duplicate_symbols_are_fatal() {
        let options = Options {
            param_symbol: Some('@'),
            ..Default::default()
        };
        let err = Config::resolve(options).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateSymbols('@')));
    }

    #[test]
    fn alphanumeric_symbol_is_fatal() {
        let options = Options {
            param_symbol: Some('x'),
            ..Default::default()
        };
        assert!(matches!(
            Config::resolve(options).unwrap_err(),
            ConfigError::InvalidSymbol { .. }
        ));
    }

    #[test]
    fn reserved_route_chars_are_fatal_symbols() {
        for c in ['/', '.', ':', '*'] {
            let options = Options {
                view_symbol: Some(c),
                ..Default::default()
            };
            assert!(Config::resolve(options).is_err(), "symbol {c:?} must be rejected");
        }
    }

    #[test]
    fn options_parse_from_camel_case_json() {
        let options = Options::from_json(
            r#"{"codeSplitting": true, "routerMode": "history", "paramSymbol": "~"}"#,
        )
        .unwrap();
        assert_eq!(options.code_splitting, Some(true));
        assert_eq!(options.router_mode, Some(RouterMode::History));
        assert_eq!(options.param_symbol, Some('~'));
    }

    #[test]
    fn unknown_json_key_is_fatal() {
        assert!(Options::from_json(r#"{"notAKey": 1}"#).is_err());
    }

    #[test]
    fn invalid_enum_in_json_is_fatal() {
        assert!(Options::from_json(r#"{"routerMode": "sideways"}"#).is_err());
    }
}
