//! Scoped workspace for one sandbox invocation
//!
//! Every execution owns a private temporary directory holding the source
//! file and any compiler artifacts. The directory is removed when the
//! workspace drops, so cleanup runs on every exit path, including deadline
//! kills and spawn failures.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::debug;

use crate::sandbox::SandboxError;

/// An exclusively-owned scratch directory for one execution.
///
/// Never shared across invocations or sessions; the backing directory is
/// deleted on drop.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Allocate a fresh workspace directory
    pub fn create() -> Result<Self, SandboxError> {
        let dir = TempDir::with_prefix("codesage-").map_err(SandboxError::Workspace)?;
        debug!(path = %dir.path().display(), "workspace created");
        Ok(Self { dir })
    }

    /// Path to the workspace root (used as the child process working dir)
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Host path for a file inside the workspace
    ///
    /// Returns an error if the name contains path traversal attempts.
    pub fn file_path(&self, name: &str) -> Result<PathBuf, SandboxError> {
        if name.contains("..") || name.starts_with('/') {
            return Err(SandboxError::InvalidPath(format!(
                "path traversal not allowed: {name}"
            )));
        }
        Ok(self.dir.path().join(name))
    }

    /// Write a file into the workspace
    pub async fn write_file(&self, name: &str, content: &[u8]) -> Result<(), SandboxError> {
        let path = self.file_path(name)?;
        tokio::fs::write(&path, content).await?;
        debug!(path = %path.display(), len = content.len(), "wrote file to workspace");
        Ok(())
    }

    /// Check if a file exists in the workspace
    pub async fn file_exists(&self, name: &str) -> Result<bool, SandboxError> {
        let path = self.file_path(name)?;
        Ok(tokio::fs::metadata(&path).await.is_ok())
    }
}
