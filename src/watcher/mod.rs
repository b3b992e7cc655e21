//! Live reload of the open book's manifest.
//!
//! The manifest's directory is watched non-recursively with `notify`. Events
//! for other files in that directory are ignored, as are access events, which
//! fire whenever the viewer itself reads pages or the manifest.
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

/// Quiet period before a burst of writes counts as one change.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(200);

/// Watches one manifest file and reports debounced changes.
pub struct ManifestWatcher {
    _watcher: RecommendedWatcher,
    rx: Receiver<notify::Result<Event>>,
    dir: PathBuf,
    manifest: PathBuf,
    file_name: Option<OsString>,
    debounce: Duration,
    last_change: Option<Instant>,
}

impl std::fmt::Debug for ManifestWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManifestWatcher")
            .field("manifest", &self.manifest)
            .field("debounce", &self.debounce)
            .finish_non_exhaustive()
    }
}

impl ManifestWatcher {
    /// Start watching `manifest`.
    ///
    /// # Errors
    /// Fails when the platform watcher cannot be created or the manifest's
    /// directory cannot be watched.
    pub fn new(manifest: impl AsRef<Path>, debounce: Duration) -> notify::Result<Self> {
        // Backends report canonical paths.
        let manifest = manifest
            .as_ref()
            .canonicalize()
            .unwrap_or_else(|_| manifest.as_ref().to_path_buf());
        let file_name = manifest.file_name().map(std::ffi::OsStr::to_os_string);
        let dir = containing_dir(&manifest);

        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = tx.send(res);
        })?;
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        tracing::debug!(manifest = %manifest.display(), "watching manifest");

        Ok(Self {
            _watcher: watcher,
            rx,
            dir,
            manifest,
            file_name,
            debounce,
            last_change: None,
        })
    }

    pub fn manifest_path(&self) -> &Path {
        &self.manifest
    }

    /// Drain pending events; true once a change has settled for the
    /// debounce period.
    pub fn poll_changed(&mut self) -> bool {
        let mut changed = false;
        while let Ok(event) = self.rx.try_recv() {
            match event {
                Ok(ev) if self.touches_manifest(&ev) => changed = true,
                Ok(ev) => {
                    tracing::trace!(kind = ?ev.kind, paths = ?ev.paths, "ignored fs event");
                }
                Err(err) => tracing::warn!("manifest watch error: {err}"),
            }
        }
        if changed {
            self.last_change = Some(Instant::now());
        }

        match self.last_change {
            Some(at) if at.elapsed() >= self.debounce => {
                self.last_change = None;
                tracing::debug!(manifest = %self.manifest.display(), "manifest changed");
                true
            }
            _ => false,
        }
    }

    fn touches_manifest(&self, event: &Event) -> bool {
        if matches!(event.kind, EventKind::Access(_)) {
            return false;
        }
        event.paths.iter().any(|path| {
            path == &self.dir
                || path == &self.manifest
                || self
                    .file_name
                    .as_ref()
                    .is_some_and(|name| path.file_name().is_some_and(|f| f == name))
        })
    }
}

fn containing_dir(path: &Path) -> PathBuf {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, EventAttributes, ModifyKind};
    use tempfile::tempdir;

    fn event(kind: EventKind, path: PathBuf) -> Event {
        Event {
            kind,
            paths: vec![path],
            attrs: EventAttributes::new(),
        }
    }

    fn book_dir() -> (tempfile::TempDir, PathBuf) {
        let dir = tempdir().expect("tempdir");
        let canonical = dir.path().canonicalize().expect("canonicalize");
        std::fs::write(canonical.join("manifest.json"), r#"{"pages": []}"#).expect("write");
        (dir, canonical)
    }

    #[test]
    fn test_page_image_events_are_ignored() {
        let (_guard, dir) = book_dir();
        let watcher =
            ManifestWatcher::new(dir.join("manifest.json"), Duration::from_millis(10)).unwrap();

        let page = event(EventKind::Modify(ModifyKind::Any), dir.join("001.jpg"));
        assert!(!watcher.touches_manifest(&page));

        let manifest = event(EventKind::Modify(ModifyKind::Any), dir.join("manifest.json"));
        assert!(watcher.touches_manifest(&manifest));
    }

    #[test]
    fn test_access_events_do_not_trigger_reload() {
        let (_guard, dir) = book_dir();
        let watcher =
            ManifestWatcher::new(dir.join("manifest.json"), Duration::from_millis(10)).unwrap();
        let read = event(EventKind::Access(AccessKind::Any), dir.join("manifest.json"));
        assert!(!watcher.touches_manifest(&read));
    }

    #[test]
    fn test_directory_event_counts_for_manifest() {
        let (_guard, dir) = book_dir();
        let watcher =
            ManifestWatcher::new(dir.join("manifest.json"), Duration::from_millis(10)).unwrap();
        assert!(watcher.touches_manifest(&event(EventKind::Any, dir.clone())));
    }

    #[test]
    fn test_containing_dir_of_bare_name_is_dot() {
        assert_eq!(containing_dir(Path::new("manifest.json")), PathBuf::from("."));
    }

    #[test]
    fn test_rewritten_manifest_is_reported_once() {
        let (_guard, dir) = book_dir();
        let path = dir.join("manifest.json");
        let mut watcher = ManifestWatcher::new(&path, Duration::from_millis(50)).unwrap();

        std::thread::sleep(Duration::from_millis(300));
        std::fs::write(&path, r#"{"pages": ["001.jpg"]}"#).expect("write");

        let deadline = Instant::now() + Duration::from_secs(5);
        let mut detected = false;
        while Instant::now() < deadline {
            if watcher.poll_changed() {
                detected = true;
                break;
            }
            std::thread::sleep(Duration::from_millis(50));
        }
        assert!(detected, "manifest rewrite should be reported");
        assert!(!watcher.poll_changed(), "change is consumed once reported");
    }
}
