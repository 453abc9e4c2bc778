//! @acp:module "Watch"
//! @acp:summary "Filesystem watcher keeping the tag index current"
//! @acp:domain core
//! @acp:layer service
//!
//! Raw notify events feed a [`ScanScheduler`] keyed by path, so a burst of
//! writes to one file is reindexed once after the quiet period.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use notify::{EventKind, RecursiveMode, Watcher as _};

use crate::config::Config;
use crate::error::{CraftError, Result};
use crate::index::{relative_path, IndexOptions, PathFilter, TagIndex, TagInfo};
use crate::schedule::ScanScheduler;

/// Upper bound on one wait for events
const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// @acp:summary "Outcome of reindexing one changed path"
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchUpdate {
    Indexed { file: String, tags: Vec<TagInfo> },
    Removed { file: String, count: usize },
}

/// @acp:summary "Debounced incremental indexer for a workspace root"
pub struct WorkspaceWatcher {
    root: PathBuf,
    filter: PathFilter,
    options: IndexOptions,
    scheduler: ScanScheduler<PathBuf>,
    running: Arc<AtomicBool>,
}

impl WorkspaceWatcher {
    pub fn new(root: &Path, config: &Config) -> Result<Self> {
        let options = IndexOptions::from_config(config);
        Ok(Self {
            root: root.canonicalize()?,
            filter: options.path_filter()?,
            options,
            scheduler: ScanScheduler::new(config.debounce()),
            running: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Flag that stops [`Self::run`] when cleared
    pub fn running(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    /// Record a change; paths outside the root or the globs are ignored.
    pub fn notify(&mut self, path: &Path, now: Instant) -> bool {
        let Ok(relative) = path.strip_prefix(&self.root) else {
            return false;
        };
        if !self.filter.matches(&relative.to_string_lossy()) {
            tracing::trace!("Ignoring change to {}", path.display());
            return false;
        }
        self.scheduler.notify_change(path.to_path_buf(), now);
        true
    }

    /// @acp:summary "Reindex every path whose quiet period has elapsed"
    pub fn process_due(&mut self, index: &mut TagIndex, now: Instant) -> Vec<WatchUpdate> {
        let mut updates = Vec::new();
        for path in self.scheduler.due(now) {
            let file = relative_path(&self.root, &path);
            if path.is_file() {
                match index.scan_file_as(&path, &file, &self.options) {
                    Ok(tags) => updates.push(WatchUpdate::Indexed { file, tags }),
                    Err(e) => tracing::warn!("Cannot index {}: {}", file, e),
                }
            } else {
                let count = index.remove_file(&file);
                updates.push(WatchUpdate::Removed { file, count });
            }
        }
        updates
    }

    /// @acp:summary "Block, applying filesystem changes to the index"
    /// @acp:ai-careful "Runs until the running flag is cleared or the watcher disconnects"
    pub fn run(&mut self, index: &mut TagIndex, mut on_update: impl FnMut(&WatchUpdate, &TagIndex)) -> Result<()> {
        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            let _ = tx.send(res);
        })
        .map_err(|e| self.watch_error(e))?;
        watcher
            .watch(&self.root, RecursiveMode::Recursive)
            .map_err(|e| self.watch_error(e))?;

        tracing::debug!("Watching {}", self.root.display());
        self.running.store(true, Ordering::SeqCst);

        while self.running.load(Ordering::SeqCst) {
            let timeout = self
                .scheduler
                .next_deadline()
                .map(|deadline| deadline.saturating_duration_since(Instant::now()))
                .unwrap_or(POLL_INTERVAL)
                .min(POLL_INTERVAL);

            match rx.recv_timeout(timeout) {
                Ok(Ok(event)) => {
                    if matches!(event.kind, EventKind::Access(_)) {
                        continue;
                    }
                    let now = Instant::now();
                    for path in &event.paths {
                        self.notify(path, now);
                    }
                }
                Ok(Err(e)) => tracing::warn!("Watch error: {}", e),
                Err(mpsc::RecvTimeoutError::Timeout) => {}
                Err(mpsc::RecvTimeoutError::Disconnected) => break,
            }

            for update in self.process_due(index, Instant::now()) {
                on_update(&update, &*index);
            }
        }

        self.running.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn watch_error(&self, e: notify::Error) -> CraftError {
        CraftError::Watch {
            path: self.root.clone(),
            message: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn watcher(dir: &TempDir) -> WorkspaceWatcher {
        let config = Config {
            include: vec!["**/*.rs".into()],
            exclude: vec!["**/target/**".into()],
            ..Config::default()
        };
        WorkspaceWatcher::new(dir.path(), &config).unwrap()
    }

    #[test]
    fn test_notify_applies_globs() {
        let dir = TempDir::new().unwrap();
        let mut watcher = watcher(&dir);
        let root = watcher.root().to_path_buf();
        let now = Instant::now();

        assert!(watcher.notify(&root.join("src/lib.rs"), now));
        assert!(!watcher.notify(&root.join("target/out.rs"), now));
        assert!(!watcher.notify(&root.join("notes.txt"), now));
        assert!(!watcher.notify(Path::new("/elsewhere/a.rs"), now));
    }

    #[test]
    fn test_changes_are_debounced_then_indexed() {
        let dir = TempDir::new().unwrap();
        let mut watcher = watcher(&dir);
        let path = watcher.root().join("a.rs");
        fs::write(&path, "// TODO: first\n// FIXME: second\n").unwrap();

        let mut index = TagIndex::new();
        let t0 = Instant::now();
        watcher.notify(&path, t0);
        watcher.notify(&path, t0 + Duration::from_millis(50));

        assert!(watcher.process_due(&mut index, t0 + Duration::from_millis(100)).is_empty());
        let updates = watcher.process_due(&mut index, t0 + Duration::from_millis(150));
        assert_eq!(updates.len(), 1);
        assert!(matches!(&updates[0], WatchUpdate::Indexed { file, tags } if file == "a.rs" && tags.len() == 2));
        assert_eq!(index.len(), 2);

        fs::remove_file(&path).unwrap();
        watcher.notify(&path, t0 + Duration::from_millis(200));
        let updates = watcher.process_due(&mut index, t0 + Duration::from_millis(400));
        assert_eq!(
            updates,
            vec![WatchUpdate::Removed {
                file: "a.rs".into(),
                count: 2
            }]
        );
        assert!(index.is_empty());
    }
}
