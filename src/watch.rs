//! Ref watcher for development sessions.
//!
//! Regenerates the creation times module whenever the checked-out commit
//! moves (a commit, checkout, merge or reset rewrites `HEAD` or a branch ref).
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      Event Loop                              │
//! │                                                              │
//! │  ┌──────────┐    ┌──────────┐    ┌────────────────────────┐  │
//! │  │ notify   │───▶│ Debouncer│───▶│       refresh()        │  │
//! │  │ events   │    │ (300ms)  │    │                        │  │
//! │  └──────────┘    └──────────┘    │  invalidate module     │  │
//! │   .git/HEAD                      │  reload (cache hits +  │  │
//! │   .git/refs/heads/**             │    one query for new)  │  │
//! │                                  │  write output          │  │
//! │                                  └────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```

use crate::{
    data::{ModuleFormat, VirtualModule},
    log,
    resolver::HistorySource,
    utils::git::RepoLayout,
    write_output,
};
use anyhow::{Context, Result};
use notify::{Event, EventKind, RecursiveMode, Watcher};
use rustc_hash::FxHashSet;
use std::{
    path::{Path, PathBuf},
    time::{Duration, Instant},
};
use tokio::runtime::Runtime;

const DEBOUNCE_MS: u64 = 300;

// =============================================================================
// Debounce State
// =============================================================================

/// Batches rapid ref events; a single commit touches several files.
struct Debouncer {
    pending: FxHashSet<PathBuf>,
    last_event: Option<Instant>,
}

impl Debouncer {
    fn new() -> Self {
        Self {
            pending: FxHashSet::default(),
            last_event: None,
        }
    }

    fn add(&mut self, event: Event, layout: &RepoLayout) {
        let mut relevant = false;
        for path in event.paths {
            if layout.is_ref_change(&path) {
                self.pending.insert(path);
                relevant = true;
            }
        }
        if relevant {
            self.last_event = Some(Instant::now());
        }
    }

    fn ready(&self) -> bool {
        !self.pending.is_empty()
            && self
                .last_event
                .is_some_and(|t| t.elapsed() >= Duration::from_millis(DEBOUNCE_MS))
    }

    fn take(&mut self) -> Vec<PathBuf> {
        self.last_event = None;
        self.pending.drain().collect()
    }

    fn timeout(&self) -> Duration {
        if self.pending.is_empty() {
            Duration::from_secs(60)
        } else {
            Duration::from_millis(DEBOUNCE_MS)
        }
    }
}

const fn is_relevant(event: &Event) -> bool {
    matches!(
        event.kind,
        EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
    )
}

/// Format path as relative to the git dir for log display.
fn rel_path(path: &Path, layout: &RepoLayout) -> String {
    path.strip_prefix(&layout.common_dir)
        .or_else(|_| path.strip_prefix(&layout.git_dir))
        .unwrap_or(path)
        .display()
        .to_string()
}

// =============================================================================
// Watcher
// =============================================================================

/// Invalidates and rewrites a [`VirtualModule`] when refs move.
pub struct RefWatcher<'a, H> {
    layout: &'a RepoLayout,
    module: &'a VirtualModule<H>,
    format: ModuleFormat,
    output: Option<&'a Path>,
}

impl<'a, H: HistorySource> RefWatcher<'a, H> {
    pub fn new(
        layout: &'a RepoLayout,
        module: &'a VirtualModule<H>,
        format: ModuleFormat,
        output: Option<&'a Path>,
    ) -> Self {
        Self {
            layout,
            module,
            format,
            output,
        }
    }

    /// Invalidate the module, regenerate it and write it out.
    pub fn refresh(&self, rt: &Runtime) -> Result<()> {
        self.module.invalidate();
        let text = rt.block_on(self.module.load(self.format))?;
        write_output(self.output, text.as_bytes())
    }

    fn setup_watchers(&self, watcher: &mut impl Watcher) -> Result<()> {
        // HEAD is replaced by renaming HEAD.lock over it, so watch its directory.
        let git_dir = &self.layout.git_dir;
        watcher
            .watch(git_dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch {}", git_dir.display()))?;

        let heads = self.layout.heads_dir();
        if heads.exists() {
            watcher
                .watch(&heads, RecursiveMode::Recursive)
                .with_context(|| format!("Failed to watch {}", heads.display()))?;
        }

        log!("watch"; "watching {} and {}/", self.layout.head_file().display(), heads.display());
        Ok(())
    }

    /// Block, regenerating the module after every settled batch of ref changes.
    pub fn watch_blocking(&self, rt: &Runtime) -> Result<()> {
        let (tx, rx) = std::sync::mpsc::channel();
        let mut watcher =
            notify::recommended_watcher(tx).context("Failed to create file watcher")?;
        self.setup_watchers(&mut watcher)?;

        let mut debouncer = Debouncer::new();

        loop {
            match rx.recv_timeout(debouncer.timeout()) {
                Ok(Ok(event)) if is_relevant(&event) => debouncer.add(event, self.layout),
                Ok(Err(e)) => log!("watch"; "error: {e}"),
                Err(std::sync::mpsc::RecvTimeoutError::Timeout) if debouncer.ready() => {
                    let changed = debouncer.take();
                    let names: Vec<_> = changed.iter().map(|p| rel_path(p, self.layout)).collect();
                    log!("watch"; "{} changed, regenerating", names.join(", "));

                    if let Err(e) = self.refresh(rt) {
                        log!("error"; "{e:#}");
                    }
                }
                Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
                _ => {}
            }
        }

        Ok(())
    }
}
