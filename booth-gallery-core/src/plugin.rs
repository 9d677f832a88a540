//! Capture hook handler.
//!
//! The host calls [`GalleryPlugin::configure`] when it assembles its option
//! table, [`GalleryPlugin::startup`] once with its configuration store, then
//! [`GalleryPlugin::on_capture`] once per saved picture. Nothing here returns
//! an error to the host or panics: failures are logged and the capture
//! pipeline carries on.

use std::path::{Path, PathBuf};

use crate::config::{default_options, ConfigStore, GallerySettings, OptionSpec};
use crate::error::Result;
use crate::gallery::{write_gallery, GalleryTemplate, RenderContext, DEFAULT_TITLE};
use crate::manifest::{relative_link, Manifest, ManifestEntry};
use crate::qrcode::{QrCodeQuery, POLL_INTERVAL};
use crate::thumbnail::{generate_thumbnail, thumbnail_path, ThumbnailSpec};

/// What the host knows about a freshly saved picture.
#[derive(Debug, Clone, Default)]
pub struct CaptureEvent {
    pub picture: Option<PathBuf>,
    /// QR code path already published by the sibling plugin, if any.
    pub qrcode: Option<PathBuf>,
    /// Host output directory, searched for the QR code file.
    pub output_dir: Option<PathBuf>,
}

impl CaptureEvent {
    pub fn new(picture: impl Into<PathBuf>) -> Self {
        Self {
            picture: Some(picture.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestUpdate {
    pub path: PathBuf,
    pub entries: usize,
}

/// Files produced for one capture, for the host to pass on to other plugins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureOutcome {
    pub picture: PathBuf,
    pub thumbnail: PathBuf,
    pub thumbnail_size: (u32, u32),
    pub qrcode: Option<PathBuf>,
    pub manifest: Option<ManifestUpdate>,
    pub gallery: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct GalleryPlugin {
    settings: GallerySettings,
}

impl GalleryPlugin {
    /// Options this plugin declares in the host configuration.
    pub fn configure() -> &'static [OptionSpec] {
        default_options()
    }

    /// Resolve settings from the host store. Bad configuration disables the
    /// plugin instead of failing the host.
    pub fn startup(store: &dyn ConfigStore) -> Self {
        match GallerySettings::from_store(store) {
            Ok(settings) => {
                tracing::info!(
                    enabled = settings.enabled,
                    size = %settings.size,
                    suffix = %settings.suffix,
                    quality = settings.quality,
                    keep_aspect = settings.keep_aspect,
                    update_manifest = settings.update_manifest,
                    manifest = %settings.manifest_name,
                    template = ?settings.template,
                    base_url = ?settings.base_url,
                    qrcode_save = settings.qrcode.save,
                    qrcode_wait = ?settings.qrcode_wait,
                    "Gallery plugin configured"
                );
                Self { settings }
            }
            Err(e) => {
                tracing::error!("Invalid gallery configuration, plugin disabled: {}", e);
                Self {
                    settings: GallerySettings {
                        enabled: false,
                        ..GallerySettings::default()
                    },
                }
            }
        }
    }

    pub fn with_settings(settings: GallerySettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &GallerySettings {
        &self.settings
    }

    pub fn is_enabled(&self) -> bool {
        self.settings.enabled
    }

    /// Handle one capture: thumbnail, QR code wait, manifest, gallery.
    pub fn on_capture(&self, event: &CaptureEvent) -> Option<CaptureOutcome> {
        if !self.settings.enabled {
            return None;
        }

        let Some(picture) = event.picture.as_deref() else {
            tracing::debug!("Capture event without picture, skipping");
            return None;
        };
        if !picture.is_file() {
            tracing::debug!("Picture not found: {}, skipping", picture.display());
            return None;
        }

        let (thumbnail, thumbnail_size) = match self.make_thumbnail(picture) {
            Ok(done) => done,
            Err(e) => {
                tracing::error!("Failed to create thumbnail for {}: {}", picture.display(), e);
                return None;
            }
        };
        tracing::info!("Thumbnail created: {}", thumbnail.display());

        let qrcode = QrCodeQuery {
            picture,
            hint: event.qrcode.as_deref(),
            output_dir: event.output_dir.as_deref(),
            settings: &self.settings.qrcode,
        }
        .wait(self.settings.qrcode_wait, POLL_INTERVAL);

        let manifest = if self.settings.update_manifest {
            match self.update_manifest(picture, &thumbnail, qrcode.as_deref()) {
                Ok(update) => Some(update),
                Err(e) => {
                    tracing::warn!("Manifest update failed for {}: {}", picture.display(), e);
                    None
                }
            }
        } else {
            None
        };

        let gallery = match picture.parent() {
            Some(dir) => match self.render_gallery(dir) {
                Ok(path) => Some(path),
                Err(e) => {
                    tracing::warn!("Gallery update failed for {}: {}", dir.display(), e);
                    None
                }
            },
            None => None,
        };

        Some(CaptureOutcome {
            picture: picture.to_path_buf(),
            thumbnail,
            thumbnail_size,
            qrcode,
            manifest,
            gallery,
        })
    }

    pub fn cleanup(&self) {
        tracing::debug!("Gallery plugin cleanup");
    }

    fn make_thumbnail(&self, picture: &Path) -> Result<(PathBuf, (u32, u32))> {
        let dst = thumbnail_path(
            picture,
            &self.settings.suffix,
            self.settings.output_folder.as_deref(),
        )?;
        let spec = ThumbnailSpec {
            size: self.settings.size,
            quality: self.settings.quality,
            keep_aspect: self.settings.keep_aspect,
        };
        let size = generate_thumbnail(picture, &dst, &spec)?;
        Ok((dst, size))
    }

    fn update_manifest(
        &self,
        picture: &Path,
        thumbnail: &Path,
        qrcode: Option<&Path>,
    ) -> Result<ManifestUpdate> {
        let dir = picture.parent().unwrap_or_else(|| Path::new(""));
        let path = self.manifest_path(dir);

        let filename = relative_link(picture, dir);
        let thumb_rel = relative_link(thumbnail, dir);
        let qrcode_rel = qrcode.map(|qr| relative_link(qr, dir));

        let entry = ManifestEntry::new(
            &filename,
            &thumb_rel,
            qrcode_rel.as_deref(),
            self.settings.manifest_base_url(),
        );

        let mut manifest = Manifest::load(&path);
        manifest.upsert(entry);
        manifest.save(&path)?;

        tracing::info!(
            "Manifest updated: {} (entries={})",
            path.display(),
            manifest.len()
        );

        Ok(ManifestUpdate {
            path,
            entries: manifest.len(),
        })
    }

    pub fn manifest_path(&self, dir: &Path) -> PathBuf {
        dir.join(&self.settings.manifest_name)
    }

    /// Rewrite the gallery page of `dir` from the manifest stored there.
    pub fn render_gallery(&self, dir: &Path) -> Result<PathBuf> {
        let manifest = Manifest::load(&self.manifest_path(dir));
        let template = GalleryTemplate::load_or_default(self.settings.template.as_deref());
        let ctx = RenderContext {
            title: DEFAULT_TITLE,
            manifest_name: &self.settings.manifest_name,
        };

        let output = dir.join(&self.settings.gallery_output);
        write_gallery(&template, &manifest, &ctx, &output)?;
        Ok(output)
    }
}
