//! Entry filter shared by every filesystem backend
//!
//! Depth follows the usual finder convention: entries directly under the
//! area root are at depth 0.

use std::path::{Component, Path};

/// Directory names treated as version-control metadata
pub const VCS_PATTERNS: &[&str] = &[
    ".svn",
    "_svn",
    "CVS",
    "_darcs",
    ".arch-params",
    ".monotone",
    ".bzr",
    ".git",
    ".hg",
];

/// Kind of entry a query selects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    File,
    Directory,
}

/// Query describing which entries `Filesystem::find` should yield
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finder {
    kind: EntryKind,
    excluded_names: Vec<String>,
    ignore_dot_files: bool,
    ignore_vcs: bool,
    depth_below: Option<usize>,
}

impl Finder {
    fn new(kind: EntryKind) -> Self {
        Self {
            kind,
            excluded_names: Vec::new(),
            ignore_dot_files: true,
            ignore_vcs: true,
            depth_below: None,
        }
    }

    /// Select regular files, at any depth
    pub fn files() -> Self {
        Self::new(EntryKind::File)
    }

    /// Select directories, at any depth
    pub fn directories() -> Self {
        Self::new(EntryKind::Directory)
    }

    /// Exclude entries whose file name is exactly `name`
    pub fn not_name(mut self, name: impl Into<String>) -> Self {
        self.excluded_names.push(name.into());
        self
    }

    /// Skip entries named `.*` and everything below them
    pub fn ignore_dot_files(mut self, ignore: bool) -> Self {
        self.ignore_dot_files = ignore;
        self
    }

    /// Skip version-control metadata trees
    pub fn ignore_vcs(mut self, ignore: bool) -> Self {
        self.ignore_vcs = ignore;
        self
    }

    /// Only yield entries at depth strictly less than `depth`
    pub fn depth_below(mut self, depth: usize) -> Self {
        self.depth_below = Some(depth);
        self
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    /// Exclusive depth bound, if any
    pub fn max_depth(&self) -> Option<usize> {
        self.depth_below
    }

    /// Whether a directory with this name must not be descended into
    pub fn prunes(&self, name: &str) -> bool {
        (self.ignore_dot_files && name.starts_with('.'))
            || (self.ignore_vcs && VCS_PATTERNS.contains(&name))
    }

    /// Whether an entry at `relative` (to the area root) is selected
    pub fn matches(&self, relative: &Path, kind: EntryKind) -> bool {
        if kind != self.kind {
            return false;
        }

        let names: Vec<&str> = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(name) => name.to_str(),
                _ => None,
            })
            .collect();

        let Some(file_name) = names.last() else {
            // The root itself is never an entry
            return false;
        };

        if self.depth_below.is_some_and(|bound| names.len() > bound) {
            return false;
        }

        if names.iter().any(|name| self.prunes(name)) {
            return false;
        }

        !self.excluded_names.iter().any(|n| n == file_name)
    }
}
