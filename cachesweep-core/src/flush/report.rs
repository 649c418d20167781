use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of one flush across all storage areas.
///
/// Counters only ever grow; each area pass adds to them. `failed` lists the
/// area-relative paths of files that could not be deleted, never directories.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlushReport {
    #[serde(rename = "successfiles")]
    pub success_files: usize,
    #[serde(rename = "failedfiles")]
    pub failed_files: usize,
    pub failed: Vec<String>,
    #[serde(rename = "successfolders")]
    pub success_folders: usize,
    #[serde(rename = "failedfolders")]
    pub failed_folders: usize,
    pub log: String,
}

impl FlushReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_file_deleted(&mut self) {
        self.success_files += 1;
    }

    pub fn record_file_failed(&mut self, path: impl Into<String>) {
        self.failed_files += 1;
        self.failed.push(path.into());
    }

    pub fn record_folder_deleted(&mut self) {
        self.success_folders += 1;
    }

    pub fn record_folder_failed(&mut self) {
        self.failed_folders += 1;
    }

    /// Append a line to the free-form log
    pub fn note(&mut self, line: impl AsRef<str>) {
        if !self.log.is_empty() {
            self.log.push('\n');
        }
        self.log.push_str(line.as_ref());
    }

    /// Fold another report into this one
    pub fn merge(&mut self, other: FlushReport) {
        self.success_files += other.success_files;
        self.failed_files += other.failed_files;
        self.failed.extend(other.failed);
        self.success_folders += other.success_folders;
        self.failed_folders += other.failed_folders;
        if !other.log.is_empty() {
            self.note(other.log);
        }
    }

    pub fn files_considered(&self) -> usize {
        self.success_files + self.failed_files
    }

    pub fn folders_considered(&self) -> usize {
        self.success_folders + self.failed_folders
    }

    /// True when any file or folder could not be deleted
    pub fn has_failures(&self) -> bool {
        self.failed_files > 0 || self.failed_folders > 0
    }
}

impl fmt::Display for FlushReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} files deleted, {} failed; {} folders deleted, {} failed",
            self.success_files, self.failed_files, self.success_folders, self.failed_folders
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_all_zero() {
        let report = FlushReport::new();
        assert_eq!(report.success_files, 0);
        assert_eq!(report.failed_files, 0);
        assert!(report.failed.is_empty());
        assert_eq!(report.success_folders, 0);
        assert_eq!(report.failed_folders, 0);
        assert!(report.log.is_empty());
        assert!(!report.has_failures());
    }

    #[test]
    fn test_merge_is_additive() {
        let mut cache = FlushReport::new();
        cache.record_file_deleted();
        cache.record_file_failed("a.data");
        cache.record_folder_deleted();

        let mut thumbs = FlushReport::new();
        thumbs.record_file_deleted();
        thumbs.record_file_failed("200x150/b.jpg");
        thumbs.record_folder_failed();
        thumbs.note("thumbs: slow disk");

        cache.merge(thumbs);

        assert_eq!(cache.success_files, 2);
        assert_eq!(cache.failed_files, 2);
        assert_eq!(cache.failed, vec!["a.data", "200x150/b.jpg"]);
        assert_eq!(cache.files_considered(), 4);
        assert_eq!(cache.folders_considered(), 2);
        assert_eq!(cache.log, "thumbs: slow disk");
        assert!(cache.has_failures());
    }

    #[test]
    fn test_serialized_field_names() {
        let mut report = FlushReport::new();
        report.record_file_failed("a.data");

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["successfiles"], 0);
        assert_eq!(json["failedfiles"], 1);
        assert_eq!(json["failed"][0], "a.data");
        assert_eq!(json["successfolders"], 0);
        assert_eq!(json["failedfolders"], 0);
        assert_eq!(json["log"], "");
    }

    #[test]
    fn test_display_summary() {
        let mut report = FlushReport::new();
        report.record_file_deleted();
        report.record_folder_failed();
        assert_eq!(
            report.to_string(),
            "1 files deleted, 0 failed; 0 folders deleted, 1 failed"
        );
    }
}
