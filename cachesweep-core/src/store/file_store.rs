use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use super::{CacheStats, entry, path};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};

/// Persistent key/value store, one file per key.
///
/// The directory tree is the only index. Extension and permission mask are
/// fixed at construction.
#[derive(Debug, Clone)]
pub struct FileCacheStore {
    directory: PathBuf,
    extension: String,
    umask: u32,
}

impl FileCacheStore {
    /// Create a store over `config.directory`. The directory itself is
    /// created lazily by the first `set`.
    pub fn new(config: &CacheConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            directory: config.directory.clone(),
            extension: config.extension.clone(),
            umask: config.umask,
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn umask(&self) -> u32 {
        self.umask
    }

    /// File backing `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        path::entry_path(&self.directory, key, &self.extension)
    }

    /// Read the payload stored for `key`
    pub fn get(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.path_for(key);
        let raw = match fs::read(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(CacheError::NotFound(key.to_string()));
            }
            Err(e) => return Err(CacheError::read(path, e)),
        };

        let (expires_at, payload) = entry::decode(&raw).map_err(|e| CacheError::read(&path, e))?;
        if entry::is_expired(expires_at, now()) {
            debug!(key = %key, "Cache entry expired");
            return Err(CacheError::NotFound(key.to_string()));
        }

        Ok(payload.to_vec())
    }

    /// Store `payload` for `key` without expiry
    pub fn set(&self, key: &str, payload: &[u8]) -> Result<()> {
        self.write_entry(key, payload, 0)
    }

    /// Store `payload` for `key`, expiring after `ttl`. A zero TTL never expires.
    pub fn set_with_ttl(&self, key: &str, payload: &[u8], ttl: Duration) -> Result<()> {
        let expires_at = if ttl.is_zero() {
            0
        } else {
            now().saturating_add(ttl.as_secs().max(1))
        };
        self.write_entry(key, payload, expires_at)
    }

    /// Whether a live entry exists for `key`. Only the header is read.
    pub fn contains(&self, key: &str) -> bool {
        let Ok(file) = File::open(self.path_for(key)) else {
            return false;
        };

        let mut line = Vec::with_capacity(entry::MAX_HEADER_LEN);
        let mut reader = BufReader::new(file).take(entry::MAX_HEADER_LEN as u64);
        match reader.read_until(b'\n', &mut line) {
            Ok(_) if line.last() == Some(&b'\n') => {
                line.pop();
                entry::parse_header(&line)
                    .map(|expires_at| !entry::is_expired(expires_at, now()))
                    .unwrap_or(false)
            }
            _ => false,
        }
    }

    /// Remove the entry for `key`. Absent keys are not an error.
    pub fn delete(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CacheError::delete(path, e)),
        }
    }

    /// Delete every entry file under the store root, then every directory
    /// below the root left empty.
    ///
    /// Children are visited before their parent. Failures are logged and
    /// skipped; returns the number of files removed.
    pub fn flush_self(&self) -> usize {
        let mut deleted = 0;
        let walker = WalkDir::new(&self.directory)
            .follow_links(false)
            .min_depth(1)
            .contents_first(true);

        for entry in walker.into_iter().filter_map(|e| e.ok()) {
            if entry.file_type().is_dir() {
                // Non-empty directories hold foreign files and stay
                let _ = fs::remove_dir(entry.path());
            } else if entry.file_type().is_file() && self.is_entry_file(&entry) {
                match fs::remove_file(entry.path()) {
                    Ok(()) => deleted += 1,
                    Err(e) => {
                        warn!(path = ?entry.path(), error = %e, "Failed to delete cache entry")
                    }
                }
            }
        }
        debug!(directory = ?self.directory, deleted, "Flushed cache store");
        deleted
    }

    /// Entry count and on-disk size of the store
    pub fn stats(&self) -> CacheStats {
        let mut stats = CacheStats {
            directory: self.directory.clone(),
            ..CacheStats::default()
        };
        for path in self.entry_files() {
            if let Ok(metadata) = fs::metadata(&path) {
                stats.entries += 1;
                stats.size_bytes += metadata.len();
            }
        }
        stats
    }

    fn entry_files(&self) -> impl Iterator<Item = PathBuf> + '_ {
        WalkDir::new(&self.directory)
            .follow_links(false)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(move |e| e.file_type().is_file() && self.is_entry_file(e))
            .map(|e| e.into_path())
    }

    fn is_entry_file(&self, entry: &DirEntry) -> bool {
        entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.ends_with(&self.extension))
    }

    fn write_entry(&self, key: &str, payload: &[u8], expires_at: u64) -> Result<()> {
        let path = self.path_for(key);
        let Some(parent) = path.parent() else {
            return Err(CacheError::write(
                &path,
                io::Error::new(io::ErrorKind::InvalidInput, "entry path has no parent"),
            ));
        };

        self.create_dirs(parent)
            .map_err(|e| CacheError::write(parent, e))?;

        let mut tmp = tempfile::Builder::new()
            .prefix(".tmp")
            .tempfile_in(parent)
            .map_err(|e| CacheError::write(&path, e))?;
        tmp.write_all(&entry::encode(expires_at, payload))
            .map_err(|e| CacheError::write(&path, e))?;
        self.apply_file_mode(tmp.as_file())
            .map_err(|e| CacheError::write(&path, e))?;
        tmp.persist(&path)
            .map_err(|e| CacheError::write(&path, e.error))?;

        debug!(key = %key, bytes = payload.len(), expires_at, "Cache entry written");
        Ok(())
    }

    #[cfg(unix)]
    fn create_dirs(&self, dir: &Path) -> io::Result<()> {
        use std::os::unix::fs::DirBuilderExt;
        fs::DirBuilder::new()
            .recursive(true)
            .mode(0o777 & !self.umask)
            .create(dir)
    }

    #[cfg(not(unix))]
    fn create_dirs(&self, dir: &Path) -> io::Result<()> {
        fs::create_dir_all(dir)
    }

    #[cfg(unix)]
    fn apply_file_mode(&self, file: &File) -> io::Result<()> {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o666 & !self.umask))
    }

    #[cfg(not(unix))]
    fn apply_file_mode(&self, _file: &File) -> io::Result<()> {
        Ok(())
    }
}

fn now() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0)
}
