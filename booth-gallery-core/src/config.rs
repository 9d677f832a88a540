//! Plugin settings resolved from the host's key/value configuration store.
//!
//! The host owns the store; this module only reads from it. Every option the
//! plugin declares lives in the `GALLERY` section. The `QRCODE` section belongs
//! to the sibling QR code plugin and is read opportunistically, never declared.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

pub const SECTION: &str = "GALLERY";
pub const QRCODE_SECTION: &str = "QRCODE";

/// Read-only view of the host's configuration.
pub trait ConfigStore {
    fn get(&self, section: &str, key: &str) -> Option<String>;
}

/// In-memory store with case-insensitive section and key lookup.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<(String, String), String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, section: &str, key: &str, value: impl Into<String>) {
        self.values
            .insert((section.to_uppercase(), key.to_uppercase()), value.into());
    }

    pub fn with(mut self, section: &str, key: &str, value: impl Into<String>) -> Self {
        self.set(section, key, value);
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl ConfigStore for MemoryStore {
    fn get(&self, section: &str, key: &str) -> Option<String> {
        self.values
            .get(&(section.to_uppercase(), key.to_uppercase()))
            .cloned()
    }
}

/// One declared option: key, default value and help text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionSpec {
    pub key: &'static str,
    pub default: &'static str,
    pub help: &'static str,
}

const OPTIONS: &[OptionSpec] = &[
    OptionSpec { key: "GALLERY_ENABLED", default: "yes", help: "Enable gallery plugin features" },
    OptionSpec { key: "GALLERY_SIZE", default: "300x300", help: "Thumbnail size WxH" },
    OptionSpec { key: "GALLERY_SUFFIX", default: "_thumb", help: "Suffix for thumbnail files" },
    OptionSpec { key: "GALLERY_QUALITY", default: "85", help: "JPEG quality for thumbnails" },
    OptionSpec { key: "GALLERY_OUTPUT_FOLDER", default: "", help: "Optional subfolder near image to write thumbs" },
    OptionSpec { key: "GALLERY_KEEP_ASPECT", default: "yes", help: "Keep aspect ratio when resizing" },
    OptionSpec { key: "GALLERY_UPDATE_MANIFEST", default: "yes", help: "Update or create the manifest after thumbnail creation" },
    OptionSpec { key: "GALLERY_MANIFEST_NAME", default: "thumbs.json", help: "Manifest filename in the image directory" },
    OptionSpec { key: "GALLERY_MANIFEST_INCLUDE_BASE_URL", default: "yes", help: "Include base_url when writing manifest entries" },
    OptionSpec { key: "GALLERY_TEMPLATE", default: "", help: "Optional path to a gallery HTML template" },
    OptionSpec { key: "GALLERY_OUTPUT", default: "gallery.html", help: "Output filename for gallery HTML" },
    OptionSpec { key: "GALLERY_BASE_URL", default: "", help: "Optional base URL to prefix thumb/full entries and gallery links" },
    OptionSpec { key: "GALLERY_QRCODE_WAIT_SECONDS", default: "1.0", help: "Seconds to wait for the qrcode file before writing the manifest" },
];

/// Options declared under the `GALLERY` section, in declaration order.
pub fn default_options() -> &'static [OptionSpec] {
    OPTIONS
}

fn default_for(key: &str) -> &'static str {
    OPTIONS
        .iter()
        .find(|opt| opt.key == key)
        .map(|opt| opt.default)
        .unwrap_or("")
}

/// Thumbnail bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThumbSize {
    pub width: u32,
    pub height: u32,
}

impl ThumbSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl std::fmt::Display for ThumbSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl std::str::FromStr for ThumbSize {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidSize {
            key: "GALLERY_SIZE",
            value: s.to_string(),
        };
        let lower = s.trim().to_lowercase();
        let (w, h) = lower.split_once('x').ok_or_else(invalid)?;
        let width: u32 = w.trim().parse().map_err(|_| invalid())?;
        let height: u32 = h.trim().parse().map_err(|_| invalid())?;
        if width == 0 || height == 0 {
            return Err(invalid());
        }
        Ok(Self { width, height })
    }
}

/// Settings of the sibling QR code plugin, as far as they can be read.
#[derive(Debug, Clone, PartialEq)]
pub struct QrCodeSettings {
    pub save: bool,
    pub suffix: String,
    pub ext: String,
    pub save_path: Option<PathBuf>,
}

impl Default for QrCodeSettings {
    fn default() -> Self {
        Self {
            save: false,
            suffix: "_qrcode".to_string(),
            ext: "png".to_string(),
            save_path: None,
        }
    }
}

impl QrCodeSettings {
    pub fn from_store(store: &dyn ConfigStore) -> Result<Self, ConfigError> {
        let mut settings = Self::default();

        if let Some(raw) = store.get(QRCODE_SECTION, "save") {
            settings.save = parse_bool(QRCODE_SECTION, "save", &raw)?;
        }
        if let Some(suffix) = non_blank(store.get(QRCODE_SECTION, "suffix")) {
            settings.suffix = suffix;
        }
        if let Some(ext) = non_blank(store.get(QRCODE_SECTION, "ext")) {
            settings.ext = ext.trim_start_matches('.').to_string();
        }
        settings.save_path = non_blank(store.get(QRCODE_SECTION, "save_path")).map(PathBuf::from);

        Ok(settings)
    }

    /// File name the sibling plugin uses for the QR code of `stem`.
    pub fn expected_filename(&self, stem: &str) -> String {
        format!("{stem}{}.{}", self.suffix, self.ext)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GallerySettings {
    pub enabled: bool,
    pub size: ThumbSize,
    pub suffix: String,
    pub quality: u8,
    pub output_folder: Option<String>,
    pub keep_aspect: bool,
    pub update_manifest: bool,
    pub manifest_name: String,
    pub include_base_url: bool,
    pub template: Option<PathBuf>,
    pub gallery_output: String,
    pub base_url: Option<String>,
    pub qrcode_wait: Duration,
    pub qrcode: QrCodeSettings,
}

impl Default for GallerySettings {
    fn default() -> Self {
        Self {
            enabled: true,
            size: ThumbSize::new(300, 300),
            suffix: "_thumb".to_string(),
            quality: 85,
            output_folder: None,
            keep_aspect: true,
            update_manifest: true,
            manifest_name: "thumbs.json".to_string(),
            include_base_url: true,
            template: None,
            gallery_output: "gallery.html".to_string(),
            base_url: None,
            qrcode_wait: Duration::from_secs(1),
            qrcode: QrCodeSettings::default(),
        }
    }
}

impl GallerySettings {
    /// Resolve settings from the host store. Missing or blank keys fall back
    /// to their declared defaults; malformed values are errors.
    pub fn from_store(store: &dyn ConfigStore) -> Result<Self, ConfigError> {
        let get = |key: &'static str| -> String {
            non_blank(store.get(SECTION, key)).unwrap_or_else(|| default_for(key).to_string())
        };
        let flag = |key: &'static str| parse_bool(SECTION, key, &get(key));

        let size: ThumbSize = get("GALLERY_SIZE").parse()?;

        let raw_quality = get("GALLERY_QUALITY");
        let quality = raw_quality
            .trim()
            .parse::<u8>()
            .ok()
            .filter(|q| (1..=100).contains(q))
            .ok_or(ConfigError::InvalidQuality {
                key: "GALLERY_QUALITY",
                value: raw_quality.clone(),
            })?;

        let raw_wait = get("GALLERY_QRCODE_WAIT_SECONDS");
        let qrcode_wait = raw_wait
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
            .ok_or(ConfigError::InvalidWait {
                key: "GALLERY_QRCODE_WAIT_SECONDS",
                value: raw_wait.clone(),
            })?;

        let base_url = non_blank(store.get(SECTION, "GALLERY_BASE_URL"))
            .or_else(|| non_blank(store.get("DOWNLOADER", "base_url")))
            .or_else(|| non_blank(store.get("DEFAULT", "base_url")));

        Ok(Self {
            enabled: flag("GALLERY_ENABLED")?,
            size,
            suffix: get("GALLERY_SUFFIX"),
            quality,
            output_folder: non_blank(store.get(SECTION, "GALLERY_OUTPUT_FOLDER")),
            keep_aspect: flag("GALLERY_KEEP_ASPECT")?,
            update_manifest: flag("GALLERY_UPDATE_MANIFEST")?,
            manifest_name: get("GALLERY_MANIFEST_NAME"),
            include_base_url: flag("GALLERY_MANIFEST_INCLUDE_BASE_URL")?,
            template: non_blank(store.get(SECTION, "GALLERY_TEMPLATE")).map(PathBuf::from),
            gallery_output: get("GALLERY_OUTPUT"),
            base_url,
            qrcode_wait,
            qrcode: QrCodeSettings::from_store(store)?,
        })
    }

    /// Base URL to embed in manifest entries, if inclusion is on.
    pub fn manifest_base_url(&self) -> Option<&str> {
        if self.include_base_url {
            self.base_url.as_deref()
        } else {
            None
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) fn parse_bool(
    section: &'static str,
    key: &'static str,
    raw: &str,
) -> Result<bool, ConfigError> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            section,
            key,
            value: raw.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_store() {
        let settings = GallerySettings::from_store(&MemoryStore::new()).unwrap();
        assert_eq!(settings, GallerySettings::default());
    }

    #[test]
    fn test_every_option_has_a_default_entry() {
        let keys: Vec<&str> = default_options().iter().map(|o| o.key).collect();
        assert_eq!(keys.len(), 13);
        assert!(keys.contains(&"GALLERY_QRCODE_WAIT_SECONDS"));
        assert_eq!(default_for("GALLERY_SIZE"), "300x300");
    }

    #[test]
    fn test_size_parsing() {
        assert_eq!("640X480".parse::<ThumbSize>().unwrap(), ThumbSize::new(640, 480));
        assert_eq!(" 200 x 100 ".parse::<ThumbSize>().unwrap(), ThumbSize::new(200, 100));
        assert!("640".parse::<ThumbSize>().is_err());
        assert!("0x100".parse::<ThumbSize>().is_err());
        assert!("axb".parse::<ThumbSize>().is_err());
    }

    #[test]
    fn test_store_values_override_defaults() {
        let store = MemoryStore::new()
            .with("gallery", "gallery_size", "640x480")
            .with("GALLERY", "GALLERY_QUALITY", "70")
            .with("GALLERY", "GALLERY_KEEP_ASPECT", "No")
            .with("GALLERY", "GALLERY_OUTPUT_FOLDER", "thumbs")
            .with("GALLERY", "GALLERY_QRCODE_WAIT_SECONDS", "2.5");

        let settings = GallerySettings::from_store(&store).unwrap();
        assert_eq!(settings.size, ThumbSize::new(640, 480));
        assert_eq!(settings.quality, 70);
        assert!(!settings.keep_aspect);
        assert_eq!(settings.output_folder.as_deref(), Some("thumbs"));
        assert_eq!(settings.qrcode_wait, Duration::from_millis(2500));
    }

    #[test]
    fn test_malformed_values_are_errors() {
        for (key, value) in [
            ("GALLERY_SIZE", "big"),
            ("GALLERY_QUALITY", "0"),
            ("GALLERY_QUALITY", "high"),
            ("GALLERY_ENABLED", "maybe"),
            ("GALLERY_QRCODE_WAIT_SECONDS", "-1"),
        ] {
            let store = MemoryStore::new().with(SECTION, key, value);
            assert!(
                GallerySettings::from_store(&store).is_err(),
                "{key}={value} should be rejected"
            );
        }
    }

    #[test]
    fn test_base_url_fallback_chain() {
        let store = MemoryStore::new()
            .with("DEFAULT", "base_url", "http://default")
            .with("DOWNLOADER", "base_url", "http://downloader");
        let settings = GallerySettings::from_store(&store).unwrap();
        assert_eq!(settings.base_url.as_deref(), Some("http://downloader"));

        let store = store.with(SECTION, "GALLERY_BASE_URL", "http://booth.local/");
        let settings = GallerySettings::from_store(&store).unwrap();
        assert_eq!(settings.base_url.as_deref(), Some("http://booth.local/"));

        let store = MemoryStore::new().with("DEFAULT", "base_url", "http://default");
        let settings = GallerySettings::from_store(&store).unwrap();
        assert_eq!(settings.base_url.as_deref(), Some("http://default"));
    }

    #[test]
    fn test_base_url_hidden_when_inclusion_disabled() {
        let store = MemoryStore::new()
            .with(SECTION, "GALLERY_BASE_URL", "http://booth.local")
            .with(SECTION, "GALLERY_MANIFEST_INCLUDE_BASE_URL", "off");
        let settings = GallerySettings::from_store(&store).unwrap();
        assert_eq!(settings.manifest_base_url(), None);
    }

    #[test]
    fn test_qrcode_section() {
        let store = MemoryStore::new()
            .with(QRCODE_SECTION, "save", "yes")
            .with(QRCODE_SECTION, "ext", ".jpg")
            .with(QRCODE_SECTION, "save_path", "/tmp/qr");
        let qr = QrCodeSettings::from_store(&store).unwrap();
        assert!(qr.save);
        assert_eq!(qr.suffix, "_qrcode");
        assert_eq!(qr.ext, "jpg");
        assert_eq!(qr.save_path, Some(PathBuf::from("/tmp/qr")));
        assert_eq!(qr.expected_filename("IMG_0001"), "IMG_0001_qrcode.jpg");
    }
}
