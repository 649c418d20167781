use parking_lot::Mutex;
use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::Path;
use std::sync::Arc;

use super::{Entries, EntryKind, Filesystem, Finder, Handle};

#[derive(Debug, Default)]
struct MemoryState {
    entries: BTreeMap<String, EntryKind>,
    failing: HashSet<String>,
    vanishing: HashSet<String>,
    unavailable: bool,
}

/// In-memory storage area.
///
/// Clones share the same tree, so a caller can hand one clone to an
/// [`AreaRegistry`](super::AreaRegistry) and inspect the other afterwards.
#[derive(Debug, Clone, Default)]
pub struct MemoryFilesystem {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryFilesystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, creating missing parent directories
    pub fn add_file(&self, path: &str) -> &Self {
        let path = normalize(path);
        let mut state = self.state.lock();
        insert_parents(&mut state.entries, &path);
        state.entries.insert(path, EntryKind::File);
        self
    }

    /// Add a directory, creating missing parents
    pub fn add_dir(&self, path: &str) -> &Self {
        let path = normalize(path);
        let mut state = self.state.lock();
        insert_parents(&mut state.entries, &path);
        state.entries.insert(path, EntryKind::Directory);
        self
    }

    /// Make every `delete()` of the entry at `path` fail with `PermissionDenied`
    pub fn fail_on(&self, path: &str) -> &Self {
        self.state.lock().failing.insert(normalize(path));
        self
    }

    /// Remove the entry at `path` right after `find` yields it, so its
    /// `delete()` sees `NotFound`
    pub fn vanish_after_listing(&self, path: &str) -> &Self {
        self.state.lock().vanishing.insert(normalize(path));
        self
    }

    /// Make `find` fail, as if the area root could not be opened
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state.lock().unavailable = unavailable;
    }

    pub fn exists(&self, path: &str) -> bool {
        self.state.lock().entries.contains_key(&normalize(path))
    }

    /// All remaining entry paths, sorted
    pub fn paths(&self) -> Vec<String> {
        self.state.lock().entries.keys().cloned().collect()
    }

    /// Remove an entry behind the enumerator's back
    pub fn remove_externally(&self, path: &str) {
        let path = normalize(path);
        let mut state = self.state.lock();
        remove_tree(&mut state.entries, &path);
    }
}

impl Filesystem for MemoryFilesystem {
    fn find(&self, finder: &Finder) -> io::Result<Entries<'_>> {
        let state = self.state.lock();
        if state.unavailable {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "storage area is unavailable",
            ));
        }

        // Snapshot so deletions during iteration do not alias the lock
        let selected: Vec<(String, EntryKind)> = state
            .entries
            .iter()
            .filter(|(path, kind)| finder.matches(Path::new(path.as_str()), **kind))
            .map(|(path, kind)| (path.clone(), *kind))
            .collect();
        drop(state);

        let shared = Arc::clone(&self.state);
        let iter = selected.into_iter().map(move |(path, kind)| {
            {
                let mut state = shared.lock();
                if state.vanishing.remove(&path) {
                    remove_tree(&mut state.entries, &path);
                }
            }
            Box::new(MemoryHandle {
                state: Arc::clone(&shared),
                path,
                kind,
            }) as Box<dyn Handle>
        });

        Ok(Box::new(iter))
    }
}

struct MemoryHandle {
    state: Arc<Mutex<MemoryState>>,
    path: String,
    kind: EntryKind,
}

impl Handle for MemoryHandle {
    fn path(&self) -> &str {
        &self.path
    }

    fn kind(&self) -> EntryKind {
        self.kind
    }

    fn delete(&self) -> io::Result<()> {
        let mut state = self.state.lock();
        if state.failing.contains(&self.path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("permission denied: {}", self.path),
            ));
        }
        if state.entries.get(&self.path) != Some(&self.kind) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such entry: {}", self.path),
            ));
        }
        remove_tree(&mut state.entries, &self.path);
        Ok(())
    }
}

fn normalize(path: &str) -> String {
    path.split('/')
        .filter(|part| !part.is_empty() && *part != ".")
        .collect::<Vec<_>>()
        .join("/")
}

fn insert_parents(entries: &mut BTreeMap<String, EntryKind>, path: &str) {
    let mut prefix = String::new();
    let parts: Vec<&str> = path.split('/').collect();
    for part in &parts[..parts.len().saturating_sub(1)] {
        if !prefix.is_empty() {
            prefix.push('/');
        }
        prefix.push_str(part);
        entries
            .entry(prefix.clone())
            .or_insert(EntryKind::Directory);
    }
}

fn remove_tree(entries: &mut BTreeMap<String, EntryKind>, path: &str) {
    let nested = format!("{}/", path);
    entries.retain(|p, _| p != path && !p.starts_with(&nested));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_file_creates_parents() {
        let fs = MemoryFilesystem::new();
        fs.add_file("a/b/c.data");

        assert_eq!(fs.paths(), vec!["a", "a/b", "a/b/c.data"]);
    }

    #[test]
    fn test_directory_delete_removes_subtree() {
        let fs = MemoryFilesystem::new();
        fs.add_file("sub/b.data").add_file("subway.data");

        let dirs: Vec<_> = fs
            .find(&Finder::directories().depth_below(1))
            .unwrap()
            .collect();
        assert_eq!(dirs.len(), 1);
        dirs[0].delete().unwrap();

        assert_eq!(fs.paths(), vec!["subway.data"]);
    }

    #[test]
    fn test_failing_and_vanished_entries() {
        let fs = MemoryFilesystem::new();
        fs.add_file("a.data").add_file("b.data").fail_on("a.data");

        let files: Vec<_> = fs.find(&Finder::files()).unwrap().collect();
        fs.remove_externally("b.data");

        let err = files[0].delete().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
        let err = files[1].delete().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(fs.exists("a.data"));
    }

    #[test]
    fn test_unavailable_area() {
        let fs = MemoryFilesystem::new();
        fs.set_unavailable(true);
        assert!(fs.find(&Finder::files()).is_err());
    }
}
