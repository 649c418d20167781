//! File Cache Store
//!
//! Durable key/value cache for volatile data (feeds, rendered fragments and
//! the like) that can be recomputed if lost. One file per key; see
//! [`path`] for the layout and [`entry`] for the file format.

pub mod entry;
pub mod file_store;
pub mod path;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use file_store::FileCacheStore;

/// Statistics about the store's directory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub directory: PathBuf,
    pub entries: usize,
    pub size_bytes: u64,
}
