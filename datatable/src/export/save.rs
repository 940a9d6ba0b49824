//! Saving export artifacts.

use std::path::{Path, PathBuf};

use crate::error::ExportError;

use super::ExportArtifact;

/// Destination for export artifacts (a browser download, a directory, ...).
pub trait FileSaver {
    /// Save an artifact, returning where it went.
    fn save(&self, artifact: &ExportArtifact) -> Result<PathBuf, ExportError>;
}

/// Saves artifacts into a directory under their own file names.
#[derive(Debug, Clone)]
pub struct DirectorySaver {
    dir: PathBuf,
}

impl DirectorySaver {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }
}

impl FileSaver for DirectorySaver {
    fn save(&self, artifact: &ExportArtifact) -> Result<PathBuf, ExportError> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(&artifact.file_name);
        std::fs::write(&path, &artifact.bytes)?;
        log::info!("export: saved {}", path.display());
        Ok(path)
    }
}
