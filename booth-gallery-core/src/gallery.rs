//! HTML gallery page rendered from the manifest.
//!
//! Templates are plain HTML with `{{placeholder}}` markers:
//!
//! | Placeholder | Replaced with |
//! |---|---|
//! | `{{title}}` | gallery title |
//! | `{{image_count}}` | number of manifest entries |
//! | `{{items}}` | one `<figure>` per manifest entry |
//! | `{{manifest}}` | manifest file name, for templates that fetch it |
//! | `{{manifest_json}}` | the manifest inlined as JSON |
//! | `{{generated_at}}` | local render time, RFC 3339 |
//!
//! A template without markers is written verbatim.

use std::fs;
use std::path::Path;

use crate::error::{GalleryError, Result};
use crate::manifest::{Manifest, ManifestEntry};

pub const DEFAULT_TITLE: &str = "Photobooth";

const DEFAULT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{{title}}</title>
    <style>
        * {
            margin: 0;
            padding: 0;
            box-sizing: border-box;
        }

        body {
            font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif;
            background: #ffffff;
            color: #333;
            line-height: 1.6;
        }

        .header {
            padding: 40px 20px;
            text-align: center;
            border-bottom: 1px solid #eee;
        }

        .header h1 {
            font-size: 2.5rem;
            font-weight: 300;
            margin-bottom: 10px;
        }

        .header p {
            color: #666;
            font-size: 0.9rem;
        }

        .gallery-container {
            max-width: 1400px;
            margin: 0 auto;
            padding: 40px 20px;
        }

        .bento-grid {
            display: flex;
            flex-wrap: wrap;
            justify-content: center;
            gap: 15px;
            align-items: flex-start;
        }

        .bento-item {
            background: #f5f5f5;
            border-radius: 4px;
            padding: 8px;
            text-align: center;
            transition: transform 0.2s ease;
        }

        .bento-item:hover {
            transform: translateY(-4px);
            box-shadow: 0 8px 20px rgba(0,0,0,0.1);
        }

        .bento-item img.thumb {
            display: block;
            max-height: 300px;
            width: auto;
            border-radius: 4px;
        }

        .bento-item figcaption {
            margin-top: 6px;
            font-size: 0.85rem;
        }

        .bento-item img.qrcode {
            width: 96px;
            height: 96px;
            margin-top: 6px;
        }

        .footer {
            text-align: center;
            color: #999;
            font-size: 0.8rem;
            padding: 20px;
        }
    </style>
</head>
<body>
    <div class="header">
        <h1>{{title}}</h1>
        <p>{{image_count}} photographs</p>
    </div>

    <div class="gallery-container">
        <div class="bento-grid" id="gallery">
{{items}}
        </div>
    </div>

    <div class="footer">Updated {{generated_at}}</div>
</body>
</html>
"#;

/// Gallery template, either user supplied or built in.
#[derive(Debug, Clone)]
pub struct GalleryTemplate {
    source: String,
}

impl Default for GalleryTemplate {
    fn default() -> Self {
        Self {
            source: DEFAULT_TEMPLATE.to_string(),
        }
    }
}

impl GalleryTemplate {
    pub fn from_source(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path).map_err(|e| GalleryError::io(path, e))?;
        Ok(Self { source })
    }

    /// Load `path` if given, falling back to the built-in template when it
    /// cannot be read.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        match path {
            Some(path) => Self::from_file(path).unwrap_or_else(|e| {
                tracing::warn!("Gallery template unavailable, using built-in: {}", e);
                Self::default()
            }),
            None => Self::default(),
        }
    }

    pub fn render(&self, manifest: &Manifest, ctx: &RenderContext<'_>) -> String {
        let title = html_escape(ctx.title);
        let image_count = manifest.len().to_string();
        let manifest_name = html_escape(ctx.manifest_name);
        let manifest_json = serde_json::to_string(manifest).unwrap_or_else(|_| "[]".to_string());
        let generated_at = chrono::Local::now().to_rfc3339();
        let items = generate_items_html(manifest);

        substitute(&self.source, |name| match name {
            "title" => Some(title.as_str()),
            "image_count" => Some(image_count.as_str()),
            "manifest" => Some(manifest_name.as_str()),
            "manifest_json" => Some(manifest_json.as_str()),
            "generated_at" => Some(generated_at.as_str()),
            "items" => Some(items.as_str()),
            _ => None,
        })
    }
}

/// Replace every known `{{name}}` marker in one pass. Substituted text is
/// never scanned again; unknown markers are kept as they are.
fn substitute<'a>(source: &str, lookup: impl Fn(&str) -> Option<&'a str>) -> String {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}").and_then(|end| lookup(&after[..end]).map(|v| (end, v))) {
            Some((end, value)) => {
                out.push_str(value);
                rest = &after[end + 2..];
            }
            None => {
                out.push_str("{{");
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub title: &'a str,
    pub manifest_name: &'a str,
}

/// Render the manifest and write it to `output` in full.
pub fn write_gallery(
    template: &GalleryTemplate,
    manifest: &Manifest,
    ctx: &RenderContext<'_>,
    output: &Path,
) -> Result<()> {
    let html = template.render(manifest, ctx);
    fs::write(output, html).map_err(|e| GalleryError::io(output, e))?;
    tracing::info!(
        "Gallery written: {} ({} images)",
        output.display(),
        manifest.len()
    );
    Ok(())
}

fn generate_items_html(manifest: &Manifest) -> String {
    manifest
        .entries
        .iter()
        .map(generate_item_html)
        .collect::<Vec<_>>()
        .join("\n")
}

fn generate_item_html(entry: &ManifestEntry) -> String {
    let qrcode = entry
        .qrcode
        .as_deref()
        .map(|qr| {
            format!(
                "\n                <img class=\"qrcode\" src=\"{}\" alt=\"QR code for {}\">",
                html_escape(qr),
                html_escape(&entry.filename),
            )
        })
        .unwrap_or_default();

    format!(
        r#"            <figure class="bento-item">
                <a href="{full}"><img class="thumb" src="{thumb}" alt="{filename}" loading="lazy"></a>
                <figcaption><a href="{full}" download>{filename}</a></figcaption>{qrcode}
            </figure>"#,
        full = html_escape(&entry.full),
        thumb = html_escape(&entry.thumb),
        filename = html_escape(&entry.filename),
        qrcode = qrcode,
    )
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const CTX: RenderContext<'static> = RenderContext {
        title: "Wedding",
        manifest_name: "thumbs.json",
    };

    fn manifest(names: &[&str]) -> Manifest {
        let mut manifest = Manifest::new();
        for name in names {
            manifest.upsert(ManifestEntry::new(name, &format!("t/{name}"), None, None));
        }
        manifest
    }

    #[test]
    fn test_every_entry_referenced_once() {
        let manifest = manifest(&["a.jpg", "b.jpg", "c.jpg"]);
        let html = GalleryTemplate::default().render(&manifest, &CTX);

        for name in ["a.jpg", "b.jpg", "c.jpg"] {
            let thumb = format!("src=\"t/{name}\"");
            assert_eq!(html.matches(&thumb).count(), 1, "{name}");
        }
        assert_eq!(html.matches("<figure").count(), 3);
        assert!(html.contains("<p>3 photographs</p>"));
        assert!(html.contains("<title>Wedding</title>"));
    }

    #[test]
    fn test_items_keep_manifest_order() {
        let manifest = manifest(&["old.jpg", "new.jpg"]);
        let html = GalleryTemplate::default().render(&manifest, &CTX);
        let new_at = html.find("t/new.jpg").unwrap();
        let old_at = html.find("t/old.jpg").unwrap();
        assert!(new_at < old_at);
    }

    #[test]
    fn test_qrcode_rendered_when_present() {
        let mut manifest = Manifest::new();
        manifest.upsert(ManifestEntry::new("a.jpg", "a_t.jpg", Some("a_qrcode.png"), None));
        let html = GalleryTemplate::default().render(&manifest, &CTX);
        assert!(html.contains(r#"class="qrcode" src="a_qrcode.png""#));
    }

    #[test]
    fn test_values_are_escaped() {
        let manifest = manifest(&["<b>\"x\".jpg"]);
        let html = GalleryTemplate::default().render(&manifest, &CTX);
        assert!(!html.contains("<b>\"x\""));
        assert!(html.contains("&lt;b&gt;&quot;x&quot;.jpg"));
    }

    #[test]
    fn test_custom_template_placeholders() {
        let template = GalleryTemplate::from_source(
            "<h1>{{title}}</h1><script>fetch('{{manifest}}')</script><ul>{{items}}</ul>{{manifest_json}}",
        );
        let manifest = manifest(&["a.jpg"]);
        let html = template.render(&manifest, &CTX);
        assert!(html.starts_with("<h1>Wedding</h1><script>fetch('thumbs.json')</script>"));
        assert!(html.contains(r#""filename":"a.jpg""#));
        assert_eq!(html.matches("<figure").count(), 1);
    }

    #[test]
    fn test_template_without_markers_is_verbatim() {
        let source = "<html><body>static</body></html>";
        let html = GalleryTemplate::from_source(source).render(&manifest(&["a.jpg"]), &CTX);
        assert_eq!(html, source);
    }

    #[test]
    fn test_missing_template_falls_back() {
        let dir = tempdir().unwrap();
        let template = GalleryTemplate::load_or_default(Some(&dir.path().join("nope.html")));
        let html = template.render(&manifest(&["a.jpg"]), &CTX);
        assert!(html.contains("id=\"gallery\""));
    }

    #[test]
    fn test_write_gallery_overwrites() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("gallery.html");
        fs::write(&out, "stale").unwrap();

        write_gallery(&GalleryTemplate::default(), &manifest(&["a.jpg"]), &CTX, &out).unwrap();
        let html = fs::read_to_string(&out).unwrap();
        assert!(!html.contains("stale"));
        assert!(html.contains("t/a.jpg"));
    }

    #[test]
    fn test_markers_in_filenames_are_not_expanded() {
        let template = GalleryTemplate::from_source("<ul>{{items}}</ul><script>{{manifest_json}}</script>");
        let manifest = manifest(&["{{manifest_json}}.jpg", "{{items}}.jpg"]);
        let html = template.render(&manifest, &CTX);

        assert_eq!(html.matches(r#""filename":"#).count(), 2);
        assert_eq!(html.matches("<figure").count(), 2);
        assert!(html.contains(r#"alt="{{manifest_json}}.jpg""#));
        assert!(html.contains(r#""filename":"{{items}}.jpg""#));
    }

    #[test]
    fn test_unknown_markers_are_kept() {
        let html = GalleryTemplate::from_source("{{nope}} {{title}} {{").render(&manifest(&[]), &CTX);
        assert_eq!(html, "{{nope}} Wedding {{");
    }
}
