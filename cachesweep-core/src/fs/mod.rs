//! Storage Area Filesystems
//!
//! Capability-style access to a named directory tree:
//! - `find` lists entries selected by a [`Finder`]
//! - every yielded [`Handle`] can delete itself
//!
//! Backends:
//! - [`LocalFilesystem`]: a directory on local disk
//! - [`MemoryFilesystem`]: an in-memory tree with injectable failures

pub mod finder;
pub mod local;
pub mod memory;
pub mod registry;

use std::io;

pub use finder::{EntryKind, Finder, VCS_PATTERNS};
pub use local::LocalFilesystem;
pub use memory::MemoryFilesystem;
pub use registry::AreaRegistry;

/// A single entry yielded by [`Filesystem::find`]
pub trait Handle {
    /// Path relative to the area root, `/`-separated
    fn path(&self) -> &str;

    fn kind(&self) -> EntryKind;

    /// Remove the entry. Directories are removed recursively.
    fn delete(&self) -> io::Result<()>;
}

/// Lazy sequence of entries produced by a query
pub type Entries<'a> = Box<dyn Iterator<Item = Box<dyn Handle>> + 'a>;

/// Filesystem handle for one storage area
pub trait Filesystem {
    /// List entries matching `finder`.
    ///
    /// Fails only when the area itself cannot be enumerated. Entries that
    /// vanish after being listed surface as `delete()` errors.
    fn find(&self, finder: &Finder) -> io::Result<Entries<'_>>;
}
