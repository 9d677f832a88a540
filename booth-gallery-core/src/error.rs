use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key}: invalid size {value:?}, expected WIDTHxHEIGHT")]
    InvalidSize { key: &'static str, value: String },

    #[error("{key}: invalid quality {value:?}, expected an integer in 1..=100")]
    InvalidQuality { key: &'static str, value: String },

    #[error("{section}.{key}: invalid boolean {value:?}")]
    InvalidBool {
        section: &'static str,
        key: &'static str,
        value: String,
    },

    #[error("{key}: invalid wait {value:?}, expected non-negative seconds")]
    InvalidWait { key: &'static str, value: String },
}

#[derive(Debug, Error)]
pub enum GalleryError {
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("image {}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("manifest {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl GalleryError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn image(path: impl Into<PathBuf>, source: image::ImageError) -> Self {
        Self::Image {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, GalleryError>;
