use anyhow::Result;
use booth_gallery_core::thumbnail::is_image_file;
use booth_gallery_core::{CaptureEvent, GalleryPlugin, GallerySettings};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use walkdir::WalkDir;

pub fn execute(plugin: &GalleryPlugin, dir: PathBuf, recursive: bool, no_wait: bool) -> Result<()> {
    if !plugin.is_enabled() {
        anyhow::bail!("Gallery plugin is disabled, check GALLERY_ENABLED and the log above");
    }
    if !dir.is_dir() {
        anyhow::bail!("Not a directory: {}", dir.display());
    }

    let plugin = if no_wait {
        GalleryPlugin::with_settings(GallerySettings {
            qrcode_wait: Duration::ZERO,
            ..plugin.settings().clone()
        })
    } else {
        plugin.clone()
    };

    let pictures = collect_pictures(&dir, recursive, plugin.settings());
    if pictures.is_empty() {
        anyhow::bail!("No pictures found in {}", dir.display());
    }

    println!("Pictures to process: {}\n", pictures.len());

    let pb = ProgressBar::new(pictures.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")?
            .progress_chars("█▓▒░ "),
    );

    let mut failed = Vec::new();
    for picture in &pictures {
        let filename = picture
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        // Oldest first so the newest picture ends up at the top of the manifest
        match plugin.on_capture(&CaptureEvent::new(picture)) {
            Some(_) => pb.set_message(format!("Processed: {filename}")),
            None => {
                pb.set_message(format!("Failed: {filename}"));
                failed.push(picture.clone());
            }
        }
        pb.inc(1);
    }

    pb.finish_with_message("Backfill complete");
    println!();

    println!(
        "✓ {} processed, {} failed",
        pictures.len() - failed.len(),
        failed.len()
    );
    for picture in &failed {
        println!("  ✗ {}", picture.display());
    }

    Ok(())
}

/// Captured pictures under `dir`, oldest first, leaving out files this
/// plugin or the QR code plugin produced.
pub fn collect_pictures(dir: &Path, recursive: bool, settings: &GallerySettings) -> Vec<PathBuf> {
    let max_depth = if recursive { usize::MAX } else { 1 };
    let output_folder = settings.output_folder.as_deref();

    let mut pictures: Vec<(SystemTime, PathBuf)> = WalkDir::new(dir)
        .max_depth(max_depth)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| {
            e.depth() == 0
                || !e.file_type().is_dir()
                || Some(e.file_name().to_string_lossy().as_ref()) != output_folder
        })
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_image_file(e.path()))
        .filter(|e| !is_derived(e.path(), settings))
        .map(|e| {
            let modified = e
                .metadata()
                .ok()
                .and_then(|m| m.modified().ok())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            (modified, e.into_path())
        })
        .collect();

    pictures.sort();
    pictures.into_iter().map(|(_, path)| path).collect()
}

fn is_derived(path: &Path, settings: &GallerySettings) -> bool {
    let stem = path
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy();
    stem.ends_with(&settings.suffix) || stem.ends_with(&settings.qrcode.suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_collect_skips_derived_files() {
        let dir = tempdir().unwrap();
        for name in ["a.jpg", "a_thumb.jpg", "a_qrcode.png", "notes.txt", "b.png"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        fs::create_dir(dir.path().join("thumbs")).unwrap();
        fs::write(dir.path().join("thumbs").join("c.jpg"), b"x").unwrap();
        fs::create_dir(dir.path().join("day2")).unwrap();
        fs::write(dir.path().join("day2").join("d.jpg"), b"x").unwrap();

        let settings = GallerySettings {
            output_folder: Some("thumbs".to_string()),
            ..GallerySettings::default()
        };

        let names = |paths: Vec<PathBuf>| {
            let mut names: Vec<String> = paths
                .iter()
                .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
                .collect();
            names.sort();
            names
        };

        let flat = collect_pictures(dir.path(), false, &settings);
        assert_eq!(names(flat), vec!["a.jpg", "b.png"]);

        let deep = collect_pictures(dir.path(), true, &settings);
        assert_eq!(names(deep), vec!["a.jpg", "b.png", "d.jpg"]);
    }
}
