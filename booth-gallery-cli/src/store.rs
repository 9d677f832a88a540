use anyhow::{Context, Result};
use booth_gallery_core::MemoryStore;
use config::{Config, Environment, File, FileFormat, Value};
use std::collections::HashMap;
use std::path::Path;

/// Load the booth configuration: an optional INI file, overridden by
/// `BOOTH_<SECTION>__<KEY>` environment variables.
pub fn load(path: Option<&Path>) -> Result<MemoryStore> {
    let mut builder = Config::builder();

    if let Some(path) = path {
        if !path.is_file() {
            anyhow::bail!("Config file does not exist: {}", path.display());
        }
        builder = builder.add_source(File::from(path).format(FileFormat::Ini));
    }

    let settings = builder
        .add_source(
            Environment::with_prefix("BOOTH")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()
        .context("Failed to load booth configuration")?;

    let sections: HashMap<String, Value> = settings
        .try_deserialize()
        .context("Failed to read booth configuration")?;

    let mut store = MemoryStore::new();
    for (section, table) in sections {
        // Top-level keys (e.g. BOOTH_CONFIG itself) belong to no section
        let Ok(table) = table.into_table() else {
            continue;
        };
        for (key, value) in table {
            match value.into_string() {
                Ok(value) => store.set(&section, &key, value),
                Err(e) => tracing::warn!("Ignoring {}.{}: {}", section, key, e),
            }
        }
    }

    tracing::debug!("Loaded {} configuration values", store.len());
    Ok(store)
}
