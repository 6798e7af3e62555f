use crossbeam_channel::Sender;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};

/// Watches individual files for changes.
///
/// Editors often save by writing a new file and renaming it over the old
/// one, so the parent directory is watched and events are matched against
/// the watched file names.
pub struct FileWatcher {
    watcher: RecommendedWatcher,
    files: Vec<PathBuf>,
}

impl FileWatcher {
    /// Create a new file watcher that sends events to the provided channel
    pub fn new(tx: Sender<notify::Result<Event>>) -> notify::Result<Self> {
        let watcher = notify::recommended_watcher(move |res| {
            // The receiver is gone once the REPL exits
            let _ = tx.send(res);
        })?;

        Ok(Self {
            watcher,
            files: Vec::new(),
        })
    }

    /// Start watching a file
    pub fn watch<P: AsRef<Path>>(&mut self, path: P) -> notify::Result<()> {
        let file = absolute(path.as_ref());
        if self.files.contains(&file) {
            return Ok(());
        }
        self.watcher
            .watch(watch_dir(&file), RecursiveMode::NonRecursive)?;
        self.files.push(file);
        Ok(())
    }

    /// Stop watching a file
    pub fn unwatch<P: AsRef<Path>>(&mut self, path: P) -> notify::Result<()> {
        let file = absolute(path.as_ref());
        self.files.retain(|f| f != &file);
        let dir = watch_dir(&file);
        if self.files.iter().any(|f| watch_dir(f) == dir) {
            return Ok(());
        }
        self.watcher.unwatch(dir)
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Watched files touched by a write or create event
    pub fn changed_files(&self, event: &Event) -> Vec<PathBuf> {
        if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
            return Vec::new();
        }
        let mut changed: Vec<PathBuf> = self
            .files
            .iter()
            .filter(|file| event.paths.iter().any(|p| same_file(p, file)))
            .cloned()
            .collect();
        changed.dedup();
        changed
    }
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|dir| dir.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    }
}

fn watch_dir(file: &Path) -> &Path {
    match file.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}

fn same_file(event_path: &Path, watched: &Path) -> bool {
    event_path == watched
        || (event_path.file_name() == watched.file_name()
            && event_path.parent().map(|p| p.canonicalize().ok())
                == watched.parent().map(|p| p.canonicalize().ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;
    use notify::event::{CreateKind, ModifyKind, RemoveKind};

    fn watcher_for(path: &Path) -> FileWatcher {
        let (tx, _rx) = unbounded();
        let mut watcher = FileWatcher::new(tx).unwrap();
        watcher.watch(path).unwrap();
        watcher
    }

    #[test]
    fn test_changed_files_filters_by_name_and_kind() {
        let dir = tempfile::tempdir().unwrap();
        let table = dir.path().join("exercises.tsv");
        std::fs::write(&table, "").unwrap();
        let watcher = watcher_for(&table);

        let modify = Event::new(EventKind::Modify(ModifyKind::Any)).add_path(table.clone());
        assert_eq!(watcher.changed_files(&modify), vec![table.clone()]);

        let other = Event::new(EventKind::Create(CreateKind::File))
            .add_path(dir.path().join("notes.txt"));
        assert!(watcher.changed_files(&other).is_empty());

        let remove = Event::new(EventKind::Remove(RemoveKind::File)).add_path(table.clone());
        assert!(watcher.changed_files(&remove).is_empty());
    }

    #[test]
    fn test_watch_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let table = dir.path().join("exercises.tsv");
        std::fs::write(&table, "").unwrap();
        let mut watcher = watcher_for(&table);
        watcher.watch(&table).unwrap();
        assert_eq!(watcher.files().len(), 1);
        watcher.unwatch(&table).unwrap();
        assert!(watcher.files().is_empty());
    }
}
