use anyhow::Result;
use booth_gallery_core::{CaptureEvent, CaptureOutcome, GalleryPlugin};
use std::path::PathBuf;

pub fn execute(
    plugin: &GalleryPlugin,
    picture: PathBuf,
    qrcode: Option<PathBuf>,
    output_dir: Option<PathBuf>,
) -> Result<()> {
    if !plugin.is_enabled() {
        anyhow::bail!("Gallery plugin is disabled, check GALLERY_ENABLED and the log above");
    }
    if !picture.is_file() {
        anyhow::bail!("Picture does not exist: {}", picture.display());
    }

    let event = CaptureEvent {
        picture: Some(picture.clone()),
        qrcode,
        output_dir,
    };

    match plugin.on_capture(&event) {
        Some(outcome) => {
            print_outcome(&outcome);
            Ok(())
        }
        None => anyhow::bail!("No thumbnail produced for {}", picture.display()),
    }
}

pub fn print_outcome(outcome: &CaptureOutcome) {
    let (w, h) = outcome.thumbnail_size;
    println!("✓ Thumbnail: {} ({w}x{h})", outcome.thumbnail.display());
    if let Some(qrcode) = &outcome.qrcode {
        println!("  QR code:   {}", qrcode.display());
    }
    if let Some(manifest) = &outcome.manifest {
        println!(
            "  Manifest:  {} ({} entries)",
            manifest.path.display(),
            manifest.entries
        );
    }
    if let Some(gallery) = &outcome.gallery {
        println!("  Gallery:   {}", gallery.display());
    }
}
