//! Cache Flush
//!
//! Best-effort invalidation across the cache store and its storage areas.
//! Per-entry failures are counted in a [`FlushReport`], never raised.

pub mod flusher;
pub mod report;

pub use flusher::{CacheFlusher, SENTINEL_FILE, flush_area};
pub use report::FlushReport;
