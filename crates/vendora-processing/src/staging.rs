//! Scoped ownership of uploaded files on disk.

use std::io;
use std::path::{Path, PathBuf};

use uuid::Uuid;

/// A file written by the upload path that is deleted when the guard is dropped.
///
/// Call [`StagedFile::keep`] once the file has been consumed (moved, compressed, attached)
/// to release ownership.
#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
    armed: bool,
}

impl StagedFile {
    /// Take ownership of an existing path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            armed: true,
        }
    }

    /// Write `data` to `path` (creating parent directories) and guard the result.
    pub async fn write(path: impl Into<PathBuf>, data: &[u8]) -> io::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        // Guard first so a partial write is cleaned up too.
        let staged = Self::new(path);
        tokio::fs::write(&staged.path, data).await?;
        Ok(staged)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Release ownership; the file stays on disk.
    pub fn keep(mut self) -> PathBuf {
        self.armed = false;
        std::mem::take(&mut self.path)
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "Removed staged file"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                error = %e,
                path = %self.path.display(),
                "Failed to remove staged file"
            ),
        }
    }
}

/// Unique on-disk name for an upload: `<millis>-<uuid><ext>`, keeping the (lowercased)
/// extension of the client's filename.
pub fn unique_file_name(original_filename: &str) -> String {
    let extension = Path::new(original_filename)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_default();

    format!(
        "{}-{}{}",
        chrono::Utc::now().timestamp_millis(),
        Uuid::new_v4().simple(),
        extension
    )
}
