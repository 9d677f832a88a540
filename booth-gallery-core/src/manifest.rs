use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::error::{GalleryError, Result};

/// One captured picture as listed in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub thumb: String,
    pub full: String,
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qrcode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl ManifestEntry {
    /// Build an entry from paths relative to the picture directory. With a
    /// base URL every reference is prefixed by it.
    pub fn new(
        filename: &str,
        thumb_rel: &str,
        qrcode_rel: Option<&str>,
        base_url: Option<&str>,
    ) -> Self {
        let link = |rel: &str| match base_url {
            Some(base) => url_join(base, rel),
            None => rel.to_string(),
        };

        Self {
            thumb: link(thumb_rel),
            full: link(filename),
            filename: filename.to_string(),
            qrcode: qrcode_rel.map(link),
            base_url: base_url.map(str::to_string),
        }
    }
}

/// Ordered list of entries, newest first, stored as a bare JSON array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    pub entries: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the manifest at `path`. A missing file is an empty manifest; so is
    /// an unreadable or malformed one, which is logged and later overwritten.
    pub fn load(path: &Path) -> Self {
        let data = match fs::read_to_string(path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Self::new(),
            Err(e) => {
                tracing::warn!("Failed to read manifest {}: {}", path.display(), e);
                return Self::new();
            }
        };

        match Self::from_json(&data) {
            Ok(manifest) => manifest,
            Err(e) => {
                tracing::warn!("Ignoring malformed manifest {}: {}", path.display(), e);
                Self::new()
            }
        }
    }

    /// Replace any entry for the same picture and put `entry` first.
    pub fn upsert(&mut self, entry: ManifestEntry) {
        self.entries
            .retain(|e| e.filename != entry.filename && e.full != entry.full);
        self.entries.insert(0, entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Write the whole manifest next to `path` and rename it into place.
    pub fn save(&self, path: &Path) -> Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(|e| GalleryError::io(&dir, e))?;

        let json = self.to_json().map_err(|source| GalleryError::Json {
            path: path.to_path_buf(),
            source,
        })?;

        let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| GalleryError::io(&dir, e))?;
        tmp.write_all(json.as_bytes())
            .map_err(|e| GalleryError::io(tmp.path(), e))?;
        tmp.persist(path)
            .map_err(|e| GalleryError::io(path, e.error))?;

        Ok(())
    }
}

/// Join a base URL and a relative name with exactly one `/`.
pub fn url_join(base: &str, name: &str) -> String {
    if base.is_empty() {
        return name.to_string();
    }
    format!("{}/{}", base.trim_end_matches('/'), name)
}

/// `path` relative to `base`, with `/` separators. Falls back to the file name
/// when `path` lies outside `base`.
pub fn relative_link(path: &Path, base: &Path) -> String {
    match path.strip_prefix(base) {
        Ok(rel) => rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/"),
        Err(_) => path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string(),
    }
}
