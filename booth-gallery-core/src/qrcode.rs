//! Lookup of the QR code file written by the sibling QR code plugin.
//!
//! The gallery never generates QR codes. It only waits, for a bounded time,
//! for the sibling's file to show up so the manifest can reference it.

use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use crate::config::QrCodeSettings;

pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Everything needed to find the QR code of one captured picture.
#[derive(Debug, Clone)]
pub struct QrCodeQuery<'a> {
    pub picture: &'a Path,
    /// Path the host already published for the QR code, if any.
    pub hint: Option<&'a Path>,
    /// Host output directory, searched after `save_path`.
    pub output_dir: Option<&'a Path>,
    pub settings: &'a QrCodeSettings,
}

impl QrCodeQuery<'_> {
    /// Directories searched for the expected file name, in priority order.
    fn candidate_dirs(&self) -> Vec<PathBuf> {
        let mut dirs = Vec::new();
        if let Some(save_path) = &self.settings.save_path {
            dirs.push(save_path.clone());
        }
        if let Some(output_dir) = self.output_dir {
            dirs.push(output_dir.to_path_buf());
        }
        if let Some(parent) = self.picture.parent() {
            dirs.push(parent.to_path_buf());
        }
        dirs
    }

    /// Single lookup without waiting.
    pub fn locate(&self) -> Option<PathBuf> {
        if let Some(hint) = self.hint.filter(|p| p.exists()) {
            return Some(hint.to_path_buf());
        }

        if !self.settings.save {
            return None;
        }

        let stem = self.picture.file_stem()?.to_string_lossy();
        let expected = self.settings.expected_filename(&stem);
        let dirs = self.candidate_dirs();

        let found = dirs.iter().map(|d| d.join(&expected)).find(|p| p.exists());
        if found.is_none() {
            tracing::debug!(
                "QR code {} not found for {} in {:?}",
                expected,
                self.picture.display(),
                dirs
            );
        }
        found
    }

    /// Poll until the file appears or `timeout` elapses. A zero timeout
    /// checks exactly once.
    pub fn wait(&self, timeout: Duration, poll: Duration) -> Option<PathBuf> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(path) = self.locate() {
                return Some(path);
            }
            let now = Instant::now();
            if now >= deadline {
                return None;
            }
            thread::sleep(poll.min(deadline - now));
        }
    }
}
