pub mod config;
pub mod error;
pub mod flush;
pub mod fs;
pub mod logging;
pub mod store;

// Re-export commonly used types
pub use config::{
    AreaConfig, CacheConfig, DEFAULT_EXTENSION, DEFAULT_MAX_AGE, DEFAULT_UMASK, LoggingConfig,
    SweepConfig,
};
pub use error::{CacheError, Result};
pub use flush::{CacheFlusher, FlushReport};
pub use fs::{AreaRegistry, EntryKind, Filesystem, Finder, Handle, LocalFilesystem, MemoryFilesystem};
pub use logging::init_logging;
pub use store::{CacheStats, FileCacheStore};
