//! Live reload manager.
//!
//! Watches the scripts directory and re-synchronizes the project when an
//! eligible source changes. Debounced changes are handled one batch at a time
//! by a single task, so synchronization runs never overlap; connected clients
//! are told to reload only when something they would fetch actually changed.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use cb_manifest::SyncOutcome;
use cb_toolchain::Toolchain;
use notify::event::{CreateKind, ModifyKind, RemoveKind};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use serde::Serialize;
use tokio::sync::{broadcast, mpsc};

use super::debouncer::{ChangeDebouncer, ChangeKind, SourceChange};

/// Message pushed to connected clients.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub(crate) struct ReloadEvent {
    #[serde(rename = "type")]
    event_type: &'static str,
}

impl ReloadEvent {
    /// Ask clients to reload the whole page.
    pub(crate) fn full_reload() -> Self {
        Self {
            event_type: "full-reload",
        }
    }
}

/// Quiet period before a changed path is processed.
const DEBOUNCE: Duration = Duration::from_millis(100);

/// How often the processing task checks for settled changes.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Manages source watching and broadcasting reload events.
pub(crate) struct LiveReloadManager {
    toolchain: Arc<Toolchain>,
    broadcaster: broadcast::Sender<ReloadEvent>,
    // Only held; dropping it stops watching.
    #[allow(dead_code)]
    watcher: Option<RecommendedWatcher>,
}

impl LiveReloadManager {
    #[must_use]
    pub(crate) fn new(toolchain: Arc<Toolchain>, broadcaster: broadcast::Sender<ReloadEvent>) -> Self {
        Self {
            toolchain,
            broadcaster,
            watcher: None,
        }
    }

    /// Start watching the scripts directory.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the watcher cannot be created or the scripts
    /// directory cannot be watched.
    pub(crate) fn start(&mut self) -> Result<(), notify::Error> {
        let (tx, mut rx) = mpsc::channel::<Event>(100);

        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            match res {
                // The callback runs on the watcher's own thread.
                Ok(event) => {
                    let _ = tx.blocking_send(event);
                }
                Err(e) => tracing::warn!(error = %e, "File watcher error"),
            }
        })?;

        let scripts_dir = self.toolchain.layout().scripts_dir();
        watcher.watch(&scripts_dir, RecursiveMode::Recursive)?;
        self.watcher = Some(watcher);
        tracing::info!(path = %scripts_dir.display(), "Watching Python sources");

        let debouncer = Arc::new(ChangeDebouncer::new(DEBOUNCE));

        let record_debouncer = Arc::clone(&debouncer);
        let record_toolchain = Arc::clone(&self.toolchain);
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                Self::record_event(&event, &record_toolchain, &record_debouncer);
            }
        });

        let toolchain = Arc::clone(&self.toolchain);
        let broadcaster = self.broadcaster.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(POLL_INTERVAL);

            loop {
                interval.tick().await;

                let changes = debouncer.drain_ready();
                if !changes.is_empty() {
                    Self::resynchronize(&changes, &toolchain, &broadcaster).await;
                }
            }
        });

        Ok(())
    }

    /// Record the eligible paths of a raw watcher event.
    fn record_event(event: &Event, toolchain: &Toolchain, debouncer: &ChangeDebouncer) {
        let kind = match event.kind {
            EventKind::Create(_) => ChangeKind::Created,
            EventKind::Modify(_) => ChangeKind::Modified,
            EventKind::Remove(_) => ChangeKind::Removed,
            _ => return,
        };

        for path in &event.paths {
            if !Self::is_watched(&event.kind, path, toolchain) {
                continue;
            }
            debouncer.record(path.clone(), kind);
            tracing::debug!(path = %path.display(), ?kind, "Recorded source change");
        }
    }

    /// Eligible sources, plus directories moved or created below the scripts
    /// directory (one event stands for every source inside them). The packer
    /// output and anything outside the scripts directory are ignored.
    fn is_watched(kind: &EventKind, path: &Path, toolchain: &Toolchain) -> bool {
        let synchronizer = toolchain.synchronizer();
        synchronizer.is_tracked(path)
            || (Self::may_be_directory(kind, path) && synchronizer.is_tracked_dir(path))
    }

    /// A renamed path that is gone may have been a directory; without an
    /// extension it is treated as one.
    fn may_be_directory(kind: &EventKind, path: &Path) -> bool {
        match kind {
            EventKind::Create(CreateKind::Folder) | EventKind::Remove(RemoveKind::Folder) => true,
            EventKind::Modify(ModifyKind::Name(_)) => path.is_dir() || path.extension().is_none(),
            _ => false,
        }
    }

    /// Pack and synchronize once for a batch of changes, then notify clients.
    async fn resynchronize(
        changes: &[SourceChange],
        toolchain: &Arc<Toolchain>,
        broadcaster: &broadcast::Sender<ReloadEvent>,
    ) {
        let start = Instant::now();
        for change in changes {
            tracing::debug!(path = %change.path.display(), kind = ?change.kind, "Processing source change");
        }
        let task_toolchain = Arc::clone(toolchain);

        let report = match tokio::task::spawn_blocking(move || task_toolchain.refresh()).await {
            Ok(Ok(report)) => report,
            Ok(Err(e)) => {
                tracing::error!(error = %e, "Re-synchronization failed");
                return;
            }
            Err(e) => {
                tracing::error!(error = %e, "Re-synchronization task failed");
                return;
            }
        };

        if !Self::should_reload(changes, report.manifest) {
            tracing::debug!(changes = changes.len(), "Sources changed without visible effect");
            return;
        }

        // No receivers simply means no browser is connected.
        let _ = broadcaster.send(ReloadEvent::full_reload());

        tracing::info!(
            changes = changes.len(),
            manifest_updated = report.manifest.is_updated(),
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Live reload event processed"
        );
    }

    /// Reload when the manifest changed or a served source was edited.
    fn should_reload(changes: &[SourceChange], manifest: SyncOutcome) -> bool {
        manifest.is_updated() || changes.iter().any(|c| c.kind == ChangeKind::Modified)
    }

    /// Get a receiver for reload events.
    #[must_use]
    pub(crate) fn subscribe(&self) -> broadcast::Receiver<ReloadEvent> {
        self.broadcaster.subscribe()
    }
}
