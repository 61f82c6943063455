//! Entry manager.
//!
//! Orchestrates the whole pipeline: discover candidate files through the
//! entry glob, split them into legacy and component entries, build the module
//! tree, run the route/store resolvers, generate synthetic entry modules and
//! write them under the scratch output directory.
//!
//! Resolution ambiguities never cross this boundary — they are logged inside
//! the resolvers. The only fatal conditions are configuration errors, zero
//! resolved entries, and a failed write of a generated file.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::PathBuf;

use log::{info, warn};

use crate::codegen::{generate_entry, OutputCache};
use crate::config::Config;
use crate::resolver::{resolve_routes, resolve_store, Route, StoreTree};
use crate::symbols::to_kebab_string;
use crate::tree::ModuleTree;
use crate::{EntryError, EntryPoint, Page};

/// Environment key the produced entry-point array is registered under, for
/// host-side diagnostics and printing.
pub const ENTRY_POINTS_ENV: &str = "ROUTE_FORGE_ENTRY_POINTS";

// ---------------------------------------------------------------------------
// Update hooks
// ---------------------------------------------------------------------------

type Hook = Box<dyn Fn() + Send + Sync>;

/// Callbacks the host compiler registers at construction time.
///
/// `before_update`/`after_update` bracket every entry rewrite so the host can
/// invalidate an in-flight compile; `restart` fires when the multi-page entry
/// *set* changes, which the host cannot absorb without restarting.
#[derive(Default)]
pub struct UpdateHooks {
    before_update: Option<Hook>,
    after_update: Option<Hook>,
    restart: Option<Hook>,
}

impl UpdateHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_before_update(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.before_update = Some(Box::new(hook));
        self
    }

    pub fn on_after_update(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.after_update = Some(Box::new(hook));
        self
    }

    pub fn on_restart(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.restart = Some(Box::new(hook));
        self
    }
}

fn fire(hook: &Option<Hook>) {
    if let Some(hook) = hook {
        hook();
    }
}

// ---------------------------------------------------------------------------
// EntryManager
// ---------------------------------------------------------------------------

/// Owns the resolved configuration, the write cache and the current entry
/// set. Single writer; the watcher callback drives it through [`Self::refresh`].
pub struct EntryManager {
    config: Config,
    cache: OutputCache,
    hooks: UpdateHooks,
    entries: Vec<EntryPoint>,
}

impl EntryManager {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            cache: OutputCache::new(),
            hooks: UpdateHooks::default(),
            entries: Vec::new(),
        }
    }

    pub fn with_hooks(mut self, hooks: UpdateHooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The current entry set, as produced by the last resolution pass.
    pub fn entries(&self) -> &[EntryPoint] {
        &self.entries
    }

    /// Run the whole pipeline: discover, resolve, generate, write.
    ///
    /// Always succeeds or fails fatally; ambiguities are logged inside the
    /// resolvers and never surface here.
    pub fn to_entry_points(&mut self) -> Result<&[EntryPoint], EntryError> {
        let files = self.discover()?;
        let (components, legacy) = self.partition(files);

        fire(&self.hooks.before_update);

        let mut entries: Vec<EntryPoint> = Vec::new();
        let mut written: HashSet<PathBuf> = HashSet::new();

        let module_root = self.config.context.join(&self.config.module_root);
        if let Some(tree) = ModuleTree::from_files(&components, Some(&module_root)) {
            let root = resolve_routes(&tree, &self.config);
            let store = resolve_store(&tree, &self.config);

            if self.config.spa {
                let entry =
                    self.generate_one("index", &root, store.as_ref(), module_root.clone(), true)?;
                written.insert(entry.entry.clone());
                entries.push(entry);
            } else {
                for child in &root.children {
                    // Each top-level module becomes its own page, mounted
                    // at that page's root path.
                    let mut page_root = child.clone();
                    page_root.path = "/".into();
                    page_root.abs_route_path = "/".into();
                    let wrapper = Route {
                        children: vec![page_root],
                        component: None,
                        components: Vec::new(),
                        route_config: None,
                        ..root.clone()
                    };
                    let module = module_root.join(&child.file_path);
                    let entry = self.generate_one(
                        &child.name,
                        &wrapper,
                        store.as_ref(),
                        module,
                        false,
                    )?;
                    written.insert(entry.entry.clone());
                    entries.push(entry);
                }
            }
        }

        let mut names: HashSet<String> =
            entries.iter().map(|e| e.module_name.clone()).collect();
        for file in legacy {
            let entry = self.legacy_entry(file);
            if !names.insert(entry.module_name.clone()) {
                warn!(
                    "legacy entry {} collides with an existing page name {:?}; \
                     the pages map will keep only one of them",
                    entry.entry.display(),
                    entry.module_name
                );
            }
            entries.push(entry);
        }

        self.cleanup_stale(&written);
        fire(&self.hooks.after_update);

        if entries.is_empty() {
            return Err(EntryError::NoEntries);
        }

        self.apply_remap(&mut entries);
        self.register_env(&entries);
        self.entries = entries;
        Ok(&self.entries)
    }

    /// Re-run the pipeline after a watched change. Returns whether the set
    /// of page keys changed; in multi-page mode that also fires `restart`,
    /// since the host cannot hot-add or hot-remove whole entries.
    pub fn refresh(&mut self) -> Result<bool, EntryError> {
        let before: HashSet<String> =
            self.entries.iter().map(|e| e.module_name.clone()).collect();
        self.to_entry_points()?;
        let after: HashSet<String> =
            self.entries.iter().map(|e| e.module_name.clone()).collect();

        let changed = before != after;
        if changed && !self.config.spa {
            info!("entry set changed, signalling restart");
            fire(&self.hooks.restart);
        }
        Ok(changed)
    }

    /// The `pages` map consumed by the host's HTML-per-page generation.
    pub fn pages(&self) -> HashMap<String, Page> {
        self.entries
            .iter()
            .map(|e| {
                (
                    e.module_name.clone(),
                    Page {
                        entry: e.entry.clone(),
                        template: e.template.clone(),
                        filename: e.filename.clone(),
                    },
                )
            })
            .collect()
    }

    /// Drop the write cache and the entry set.
    pub fn destroy(&mut self) {
        self.cache.clear();
        self.entries.clear();
    }

    // -- discovery ---------------------------------------------------------

    fn discover(&self) -> Result<Vec<PathBuf>, EntryError> {
        let pattern = self.config.context.join(&self.config.entry_glob);
        let mut files = Vec::new();
        for matched in glob::glob(&pattern.to_string_lossy())? {
            let path = matched?;
            if path.is_file() {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// Split discovered files into route-convention candidates and legacy
    /// entries used directly without generation. The root app component is
    /// neither: it is imported by every generated entry.
    fn partition(&self, files: Vec<PathBuf>) -> (Vec<PathBuf>, Vec<PathBuf>) {
        let app_file = self.config.context.join(&self.config.app_file);
        let mut components = Vec::new();
        let mut legacy = Vec::new();

        for file in files {
            if file == app_file {
                continue;
            }
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            if name.ends_with(&self.config.route_extension)
                || name == self.config.router_file_name
                || name == self.config.store_file_name
            {
                components.push(file);
            } else {
                legacy.push(file);
            }
        }
        (components, legacy)
    }

    // -- generation --------------------------------------------------------

    fn generate_one(
        &self,
        name: &str,
        root: &Route,
        store: Option<&StoreTree>,
        module: PathBuf,
        spa: bool,
    ) -> Result<EntryPoint, EntryError> {
        let stem = self.output_stem(name);
        let source = generate_entry(root, store, &self.config);
        let out_path = self
            .config
            .context
            .join(&self.config.output_dir)
            .join(format!("{stem}.js"));

        if self.cache.write_if_changed(&out_path, &source)? {
            info!("wrote entry {}", out_path.display());
        }

        Ok(EntryPoint {
            entry: out_path,
            module,
            module_name: name.to_string(),
            filename: format!("{stem}.html"),
            template: self.config.context.join(&self.config.template),
            legacy: false,
            spa,
        })
    }

    fn legacy_entry(&self, file: PathBuf) -> EntryPoint {
        let stem = file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let stem = self.output_stem(&stem);
        EntryPoint {
            filename: format!("{stem}.html"),
            module: file.clone(),
            module_name: stem,
            template: self.config.context.join(&self.config.template),
            entry: file,
            legacy: true,
            spa: false,
        }
    }

    fn output_stem(&self, name: &str) -> String {
        let flat = name.replace('/', "-");
        if self.config.kebab_case_path {
            to_kebab_string(&flat)
        } else {
            flat
        }
    }

    // -- housekeeping ------------------------------------------------------

    /// Delete generated files that no longer correspond to an entry.
    /// Failures here are logged and swallowed; a stale file never aborts
    /// the build.
    fn cleanup_stale(&self, written: &HashSet<PathBuf>) {
        for path in self.cache.known_paths() {
            if written.contains(&path) {
                continue;
            }
            if let Err(err) = fs::remove_file(&path) {
                warn!("failed to delete stale entry {}: {err}", path.display());
            }
            self.cache.forget(&path);
        }
    }

    /// Apply the user page-name remapping. A remap whose target collides
    /// with an existing or already-remapped name is rejected with a warning
    /// and the original name retained.
    fn apply_remap(&self, entries: &mut [EntryPoint]) {
        if self.config.page_remap.is_empty() {
            return;
        }
        let mut taken: HashSet<String> =
            entries.iter().map(|e| e.module_name.clone()).collect();

        for entry in entries.iter_mut() {
            let Some(target) = self.config.page_remap.get(&entry.module_name) else {
                continue;
            };
            if taken.contains(target) {
                warn!(
                    "page remap {:?} -> {:?} collides with an existing page, keeping {:?}",
                    entry.module_name, target, entry.module_name
                );
                continue;
            }
            taken.remove(&entry.module_name);
            taken.insert(target.clone());
            entry.module_name = target.clone();
        }
    }

    fn register_env(&self, entries: &[EntryPoint]) {
        match serde_json::to_string(entries) {
            Ok(json) => std::env::set_var(ENTRY_POINTS_ENV, json),
            Err(err) => warn!("failed to serialize entry points: {err}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
