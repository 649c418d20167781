//! Key to file path mapping
//!
//! Entries live at `<root>/<first two hex chars>/<sha256 hex><extension>`.

use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Lowercase hex SHA-256 of the key
pub fn key_hash(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hex::encode(hasher.finalize())
}

pub fn entry_path(root: &Path, key: &str, extension: &str) -> PathBuf {
    let hash = key_hash(key);
    root.join(&hash[..2]).join(format!("{}{}", hash, extension))
}
