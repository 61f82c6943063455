//! File watcher for development mode.
//!
//! Watches the module root for added/removed route components and
//! router/store config files, coalesces bursts of filesystem events with a
//! fixed debounce delay, and invokes a single change callback per burst.
//! The callback re-runs entry resolution; editing a component in place is
//! the host compiler's business, only additions and removals change the
//! entry set.

use std::path::Path;
use std::sync::mpsc::{channel, RecvTimeoutError};
use std::thread::JoinHandle;
use std::time::Duration;

use log::{debug, warn};
use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::config::Config;

/// Handle to a running watcher. Dropping it (or calling [`Self::close`])
/// stops both the OS watcher and the debounce thread.
pub struct EntryWatcher {
    watcher: Option<RecommendedWatcher>,
    debouncer: Option<JoinHandle<()>>,
}

impl EntryWatcher {
    /// Watch the module root and invoke `on_change` once per debounced
    /// burst of relevant add/remove events.
    pub fn watch(config: &Config, on_change: impl Fn() + Send + 'static) -> anyhow::Result<Self> {
        let root = config.context.join(&config.module_root);
        let (tx, rx) = channel();

        let mut watcher = RecommendedWatcher::new(
            move |res| {
                let _ = tx.send(res);
            },
            notify::Config::default(),
        )?;
        watcher.watch(&root, RecursiveMode::Recursive)?;
        debug!("watching {} for entry changes", root.display());

        let delay = Duration::from_millis(config.watch_delay_ms);
        let route_extension = config.route_extension.clone();
        let router_file_name = config.router_file_name.clone();
        let store_file_name = config.store_file_name.clone();

        let debouncer = std::thread::spawn(move || {
            let relevant = |event: &Event| {
                changes_entry_set(event)
                    && event.paths.iter().any(|p| {
                        is_watched_file(p, &route_extension, &router_file_name, &store_file_name)
                    })
            };

            // One callback per burst: block for the first event, then keep
            // draining until the channel stays quiet for the delay.
            'outer: loop {
                let mut hit = match rx.recv() {
                    Ok(Ok(event)) => relevant(&event),
                    Ok(Err(err)) => {
                        warn!("file watcher error: {err}");
                        false
                    }
                    Err(_) => break,
                };

                loop {
                    match rx.recv_timeout(delay) {
                        Ok(Ok(event)) => hit |= relevant(&event),
                        Ok(Err(err)) => warn!("file watcher error: {err}"),
                        Err(RecvTimeoutError::Timeout) => break,
                        Err(RecvTimeoutError::Disconnected) => {
                            if hit {
                                on_change();
                            }
                            break 'outer;
                        }
                    }
                }

                if hit {
                    on_change();
                }
            }
        });

        Ok(Self {
            watcher: Some(watcher),
            debouncer: Some(debouncer),
        })
    }

    /// Stop watching and wait for the debounce thread to drain.
    pub fn close(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        // Dropping the watcher drops the channel sender, unblocking the
        // debounce thread.
        self.watcher.take();
        if let Some(handle) = self.debouncer.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for EntryWatcher {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Only additions, removals and renames change the entry set.
fn changes_entry_set(event: &Event) -> bool {
    matches!(
        event.kind,
        EventKind::Create(_)
            | EventKind::Remove(_)
            | EventKind::Modify(ModifyKind::Name(RenameMode::Any))
            | EventKind::Modify(ModifyKind::Name(RenameMode::From))
            | EventKind::Modify(ModifyKind::Name(RenameMode::To))
            | EventKind::Modify(ModifyKind::Name(RenameMode::Both))
    )
}

fn is_watched_file(
    path: &Path,
    route_extension: &str,
    router_file_name: &str,
    store_file_name: &str,
) -> bool {
    let Some(name) = path.file_name().map(|n| n.to_string_lossy()) else {
        return false;
    };
    name.ends_with(route_extension) || name == router_file_name || name == store_file_name
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn watched_file_filter() {
        let check = |p: &str| is_watched_file(Path::new(p), ".vue", "router.js", "store.js");
        assert!(check("/v/home/index.vue"));
        assert!(check("/v/home/router.js"));
        assert!(check("/v/home/store.js"));
        assert!(!check("/v/home/helper.js"));
        assert!(!check("/v/home/readme.md"));
    }

    #[test]
    fn add_and_remove_trigger_the_callback() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src/views")).unwrap();

        let config = Config {
            context: dir.path().to_path_buf(),
            watch_delay_ms: 50,
            ..Config::default()
        };

        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        let watcher = EntryWatcher::watch(&config, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

        let target = dir.path().join("src/views/about.vue");
        fs::write(&target, "<template/>").unwrap();

        let mut waited = 0;
        while fired.load(Ordering::SeqCst) == 0 && waited < 3000 {
            std::thread::sleep(Duration::from_millis(50));
            waited += 50;
        }
        watcher.close();
        assert!(fired.load(Ordering::SeqCst) >= 1, "watcher never fired");
    }
}
