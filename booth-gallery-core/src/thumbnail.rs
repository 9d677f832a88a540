use image::codecs::jpeg::JpegEncoder;
use image::{imageops::FilterType, DynamicImage, GenericImageView, ImageFormat};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::config::ThumbSize;
use crate::error::{GalleryError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThumbnailSpec {
    pub size: ThumbSize,
    pub quality: u8,
    pub keep_aspect: bool,
}

/// Where the thumbnail of `image` goes: `<stem><suffix><ext>` next to the
/// image, or inside `<image dir>/<output_folder>` when one is configured.
pub fn thumbnail_path(image: &Path, suffix: &str, output_folder: Option<&str>) -> Result<PathBuf> {
    let parent = image.parent().unwrap_or_else(|| Path::new(""));
    let stem = image
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy();
    let ext = image
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let filename = format!("{stem}{suffix}{ext}");

    match output_folder {
        Some(folder) => {
            let dir = parent.join(folder);
            fs::create_dir_all(&dir).map_err(|e| GalleryError::io(&dir, e))?;
            Ok(dir.join(filename))
        }
        None => Ok(parent.join(filename)),
    }
}

/// Resize `src` into `dst` and return the thumbnail dimensions.
pub fn generate_thumbnail(src: &Path, dst: &Path, spec: &ThumbnailSpec) -> Result<(u32, u32)> {
    tracing::debug!("Generating thumbnail: {} -> {}", src.display(), dst.display());

    let img = image::open(src).map_err(|e| GalleryError::image(src, e))?;
    let resized = resize_image(img, spec.size, spec.keep_aspect);
    let dimensions = resized.dimensions();

    let format = ImageFormat::from_path(dst).unwrap_or(ImageFormat::Jpeg);
    write_image(&resized, dst, format, spec.quality)?;

    Ok(dimensions)
}

/// Fit within the box preserving aspect ratio, or stretch to it exactly.
pub fn resize_image(img: DynamicImage, size: ThumbSize, keep_aspect: bool) -> DynamicImage {
    if !keep_aspect {
        return img.resize_exact(size.width, size.height, FilterType::Lanczos3);
    }

    let (width, height) = img.dimensions();

    // Only shrink, never upscale
    if width <= size.width && height <= size.height {
        return img;
    }

    img.resize(size.width, size.height, FilterType::Lanczos3)
}

/// Encode into a temporary file beside `dst` and rename it into place, so a
/// failed encode never leaves a partial thumbnail behind.
fn write_image(img: &DynamicImage, dst: &Path, format: ImageFormat, quality: u8) -> Result<()> {
    let dir = match dst.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| GalleryError::io(&dir, e))?;

    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        let encoded = if format == ImageFormat::Jpeg {
            // JPEG has no alpha channel
            let rgb = img.to_rgb8();
            JpegEncoder::new_with_quality(&mut writer, quality).encode_image(&rgb)
        } else {
            img.write_to(&mut writer, format)
        };
        encoded.map_err(|e| GalleryError::image(dst, e))?;
        writer.flush().map_err(|e| GalleryError::io(dst, e))?;
    }

    tmp.persist(dst).map_err(|e| GalleryError::io(dst, e.error))?;
    Ok(())
}

pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            matches!(
                e.to_lowercase().as_str(),
                "jpg" | "jpeg" | "png" | "webp" | "tif" | "tiff" | "bmp"
            )
        })
        .unwrap_or(false)
}
