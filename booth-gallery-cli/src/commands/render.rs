use anyhow::{Context, Result};
use booth_gallery_core::{GalleryPlugin, Manifest};
use std::path::PathBuf;

pub fn execute(plugin: &GalleryPlugin, dir: PathBuf) -> Result<()> {
    if !dir.is_dir() {
        anyhow::bail!("Not a directory: {}", dir.display());
    }

    let manifest_path = plugin.manifest_path(&dir);
    let entries = Manifest::load(&manifest_path).len();
    if entries == 0 {
        tracing::warn!("Manifest {} is empty or missing", manifest_path.display());
    }

    let gallery = plugin
        .render_gallery(&dir)
        .context(format!("Failed to render gallery in {}", dir.display()))?;

    println!("✓ Gallery written: {} ({entries} images)", gallery.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use booth_gallery_core::ManifestEntry;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_render_from_existing_manifest() {
        let dir = tempdir().unwrap();
        let plugin = GalleryPlugin::with_settings(Default::default());

        let mut manifest = Manifest::new();
        manifest.upsert(ManifestEntry::new("a.jpg", "a_thumb.jpg", None, None));
        manifest.upsert(ManifestEntry::new("b.jpg", "b_thumb.jpg", None, None));
        manifest.save(&plugin.manifest_path(dir.path())).unwrap();

        execute(&plugin, dir.path().to_path_buf()).unwrap();

        let html = fs::read_to_string(dir.path().join("gallery.html")).unwrap();
        assert_eq!(html.matches(r#"src="a_thumb.jpg""#).count(), 1);
        assert_eq!(html.matches(r#"src="b_thumb.jpg""#).count(), 1);
        assert!(html.contains("<p>2 photographs</p>"));
    }

    #[test]
    fn test_render_without_manifest_writes_empty_gallery() {
        let dir = tempdir().unwrap();
        let plugin = GalleryPlugin::with_settings(Default::default());

        execute(&plugin, dir.path().to_path_buf()).unwrap();

        let html = fs::read_to_string(dir.path().join("gallery.html")).unwrap();
        assert!(html.contains("<p>0 photographs</p>"));
    }

    #[test]
    fn test_render_rejects_missing_directory() {
        let dir = tempdir().unwrap();
        let plugin = GalleryPlugin::with_settings(Default::default());
        assert!(execute(&plugin, dir.path().join("missing")).is_err());
    }
}
