use tracing::{debug, info, warn};

use super::FlushReport;
use crate::fs::{AreaRegistry, Filesystem, Finder};
use crate::store::FileCacheStore;

/// Placeholder that blocks directory listing; never deleted
pub const SENTINEL_FILE: &str = "index.html";

/// Best-effort cleanup of the cache store and every registered storage area
#[derive(Debug, Clone)]
pub struct CacheFlusher {
    store: FileCacheStore,
}

impl CacheFlusher {
    pub fn new(store: FileCacheStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &FileCacheStore {
        &self.store
    }

    /// Flush the store, then each area in registry order.
    ///
    /// Never fails: per-entry errors land in the returned report. The
    /// store's own deletion count is logged but not part of the report.
    pub fn flush(&self, areas: Option<&AreaRegistry>) -> FlushReport {
        let store_deleted = self.store.flush_self();
        debug!(deleted = store_deleted, "Cleared cache store entries");

        let mut report = FlushReport::new();
        let Some(areas) = areas else {
            return report;
        };

        for (name, fs) in areas.iter() {
            flush_area(name, fs, &mut report);
        }

        info!(
            areas = areas.len(),
            success_files = report.success_files,
            failed_files = report.failed_files,
            success_folders = report.success_folders,
            failed_folders = report.failed_folders,
            "Cache flush finished"
        );
        report
    }

    #[deprecated(note = "use `flush` instead")]
    pub fn clear_cache(&self, areas: Option<&AreaRegistry>) -> FlushReport {
        self.flush(areas)
    }
}

/// Delete the cached files of one area, then its top-level directories.
///
/// If the area cannot be enumerated at all it contributes nothing but a log
/// note. Each entry is attempted exactly once.
pub fn flush_area(name: &str, fs: &dyn Filesystem, report: &mut FlushReport) {
    let files = Finder::files()
        .not_name(SENTINEL_FILE)
        .ignore_dot_files(true)
        .ignore_vcs(true);

    let entries = match fs.find(&files) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(area = %name, error = %e, "Cannot enumerate storage area, skipping");
            report.note(format!("{}: cannot enumerate files: {}", name, e));
            return;
        }
    };

    for file in entries {
        match file.delete() {
            Ok(()) => {
                debug!(area = %name, path = %file.path(), "Deleted cached file");
                report.record_file_deleted();
            }
            Err(e) => {
                warn!(area = %name, path = %file.path(), error = %e, "Failed to delete cached file");
                report.record_file_failed(file.path());
            }
        }
    }

    // Only top-level folders: the root is a mount point and must survive
    let dirs = Finder::directories().depth_below(1);
    let entries = match fs.find(&dirs) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(area = %name, error = %e, "Cannot enumerate storage area folders");
            report.note(format!("{}: cannot enumerate folders: {}", name, e));
            return;
        }
    };

    for dir in entries {
        match dir.delete() {
            Ok(()) => {
                debug!(area = %name, path = %dir.path(), "Deleted cache folder");
                report.record_folder_deleted();
            }
            Err(e) => {
                warn!(area = %name, path = %dir.path(), error = %e, "Failed to delete cache folder");
                report.record_folder_failed();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CacheConfig;
    use crate::fs::MemoryFilesystem;
    use tempfile::{TempDir, tempdir};

    fn flusher() -> (TempDir, CacheFlusher) {
        let dir = tempdir().unwrap();
        let store = FileCacheStore::new(&CacheConfig::new(dir.path().join("store"))).unwrap();
        (dir, CacheFlusher::new(store))
    }

    #[test]
    fn test_flush_without_areas_is_zero() {
        let (_dir, flusher) = flusher();

        assert_eq!(flusher.flush(None), FlushReport::default());
        assert_eq!(flusher.flush(Some(&AreaRegistry::new())), FlushReport::default());
    }

    #[test]
    fn test_store_count_not_in_report() {
        let (_dir, flusher) = flusher();
        flusher.store().set("a", b"1").unwrap();
        flusher.store().set("b", b"2").unwrap();

        let report = flusher.flush(None);

        assert_eq!(report.success_files, 0);
        assert!(!flusher.store().contains("a"));
        assert!(!flusher.store().contains("b"));
    }

    #[test]
    fn test_mixed_outcome_in_single_area() {
        let (_dir, flusher) = flusher();
        let cache = MemoryFilesystem::new();
        cache
            .add_file("index.html")
            .add_file(".hidden")
            .add_file("a.data")
            .add_file("sub/b.data")
            .fail_on("a.data");

        let registry = AreaRegistry::new().with("cache", cache.clone());
        let report = flusher.flush(Some(&registry));

        assert_eq!(report.success_files, 1);
        assert_eq!(report.failed_files, 1);
        assert_eq!(report.failed, vec!["a.data"]);
        assert_eq!(report.success_folders, 1);
        assert_eq!(report.failed_folders, 0);
        assert_eq!(cache.paths(), vec![".hidden", "a.data", "index.html"]);
    }

    #[test]
    fn test_counts_accumulate_across_areas() {
        let (_dir, flusher) = flusher();
        let cache = MemoryFilesystem::new();
        cache.add_file("one.data");
        let thumbs = MemoryFilesystem::new();
        thumbs.add_file("one.jpg");

        let registry = AreaRegistry::new()
            .with("cache", cache)
            .with("thumbs", thumbs);
        let report = flusher.flush(Some(&registry));

        assert_eq!(report.success_files, 2);
        assert_eq!(report.failed_files, 0);
    }

    #[test]
    fn test_folder_failures_not_listed() {
        let mut report = FlushReport::new();
        let area = MemoryFilesystem::new();
        area.add_file("locked/x.data")
            .add_dir("locked")
            .fail_on("locked/x.data")
            .fail_on("locked");

        flush_area("cache", &area, &mut report);

        assert_eq!(report.failed_files, 1);
        assert_eq!(report.failed_folders, 1);
        assert_eq!(report.failed, vec!["locked/x.data"]);
    }

    #[test]
    fn test_entry_vanishing_mid_flush_counts_as_failure() {
        let mut report = FlushReport::new();
        let area = MemoryFilesystem::new();
        area.add_file("a.data")
            .add_file("b.data")
            .vanish_after_listing("a.data");

        flush_area("cache", &area, &mut report);

        assert_eq!(report.success_files, 1);
        assert_eq!(report.failed_files, 1);
        assert_eq!(report.failed, vec!["a.data"]);
        assert!(area.paths().is_empty());
    }

    #[test]
    fn test_nested_folders_removed_with_their_parent() {
        let mut report = FlushReport::new();
        let area = MemoryFilesystem::new();
        area.add_dir("a/b/c").add_dir("d");

        flush_area("thumbs", &area, &mut report);

        assert_eq!(report.success_files, 0);
        assert_eq!(report.success_folders, 2);
        assert!(area.paths().is_empty());
    }

    #[test]
    fn test_unavailable_area_does_not_block_others() {
        let (_dir, flusher) = flusher();
        let broken = MemoryFilesystem::new();
        broken.add_file("x.data");
        broken.set_unavailable(true);
        let thumbs = MemoryFilesystem::new();
        thumbs.add_file("y.jpg");

        let registry = AreaRegistry::new()
            .with("cache", broken)
            .with("thumbs", thumbs);
        let report = flusher.flush(Some(&registry));

        assert_eq!(report.success_files, 1);
        assert_eq!(report.failed_files, 0);
        assert_eq!(report.folders_considered(), 0);
        assert!(report.log.contains("cache"));
    }

    #[test]
    #[allow(deprecated)]
    fn test_clear_cache_alias() {
        let (_dir, flusher) = flusher();
        let area = MemoryFilesystem::new();
        area.add_file("z.data");

        let registry = AreaRegistry::new().with("cache", area);
        assert_eq!(flusher.clear_cache(Some(&registry)).success_files, 1);
    }
}
