pub mod config;
pub mod error;
pub mod gallery;
pub mod manifest;
pub mod plugin;
pub mod qrcode;
pub mod thumbnail;

pub use config::{ConfigStore, GallerySettings, MemoryStore};
pub use error::{ConfigError, GalleryError};
pub use manifest::{Manifest, ManifestEntry};
pub use plugin::{CaptureEvent, CaptureOutcome, GalleryPlugin};
