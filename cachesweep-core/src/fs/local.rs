use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::{DirEntry, WalkDir};

use super::{Entries, EntryKind, Filesystem, Finder, Handle};

/// Storage area backed by a directory on local disk
#[derive(Debug, Clone)]
pub struct LocalFilesystem {
    root: PathBuf,
}

impl LocalFilesystem {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn handle_for(&self, entry: &DirEntry, finder: &Finder) -> Option<LocalHandle> {
        let file_type = entry.file_type();
        // Symlinks are removed as links, never followed
        let kind = if file_type.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        };

        let relative = entry.path().strip_prefix(&self.root).ok()?;
        if !finder.matches(relative, kind) {
            return None;
        }

        Some(LocalHandle {
            absolute: entry.path().to_path_buf(),
            relative: to_slash(relative),
            kind,
        })
    }
}

impl Filesystem for LocalFilesystem {
    fn find(&self, finder: &Finder) -> io::Result<Entries<'_>> {
        let metadata = fs::metadata(&self.root)?;
        if !metadata.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotADirectory,
                format!("storage area root is not a directory: {:?}", self.root),
            ));
        }
        // An unreadable root fails the query instead of yielding nothing
        fs::read_dir(&self.root)?;

        // Finder depth d is walk depth d + 1, so `depth < n` maps to max_depth(n)
        let mut walker = WalkDir::new(&self.root)
            .follow_links(false)
            .min_depth(1)
            .sort_by_file_name();
        if let Some(bound) = finder.max_depth() {
            walker = walker.max_depth(bound);
        }

        let pruning = finder.clone();
        let matching = finder.clone();
        let iter = walker
            .into_iter()
            .filter_entry(move |entry| {
                // The area root itself may be a dot-directory; only prune below it
                !(entry.depth() > 0
                    && entry.file_type().is_dir()
                    && entry
                        .file_name()
                        .to_str()
                        .is_some_and(|name| pruning.prunes(name)))
            })
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable entry during cache sweep");
                    None
                }
            })
            .filter_map(move |entry| self.handle_for(&entry, &matching))
            .map(|handle| Box::new(handle) as Box<dyn Handle>);

        Ok(Box::new(iter))
    }
}

/// Entry found on local disk
#[derive(Debug, Clone)]
pub struct LocalHandle {
    absolute: PathBuf,
    relative: String,
    kind: EntryKind,
}

impl Handle for LocalHandle {
    fn path(&self) -> &str {
        &self.relative
    }

    fn kind(&self) -> EntryKind {
        self.kind
    }

    fn delete(&self) -> io::Result<()> {
        match self.kind {
            EntryKind::File => fs::remove_file(&self.absolute),
            EntryKind::Directory => fs::remove_dir_all(&self.absolute),
        }
    }
}

fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
