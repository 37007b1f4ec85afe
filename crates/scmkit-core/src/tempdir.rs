//! Scoped temporary directories for clone targets and SSH key staging.

use std::io;
use std::path::PathBuf;

use tempfile::TempDir;

/// Allocates scoped temporary directories.
///
/// The returned [`TempDir`] removes itself on drop. Call [`TempDir::close`]
/// to observe removal errors, or [`TempDir::keep`] to persist it.
pub trait TempDirProvider: Send + Sync {
    /// Create a new, empty temporary directory.
    ///
    /// # Errors
    ///
    /// Returns the I/O error from the filesystem unchanged.
    fn new_scoped_temp_dir(&self) -> io::Result<TempDir>;
}

/// Creates temporary directories on the local filesystem.
#[derive(Debug, Clone)]
pub struct OsTempDirProvider {
    base_dir: Option<PathBuf>,
    prefix: String,
}

impl Default for OsTempDirProvider {
    fn default() -> Self {
        Self {
            base_dir: None,
            prefix: "scmkit-".to_owned(),
        }
    }
}

impl OsTempDirProvider {
    /// Provider that allocates under the system temp directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate under `base_dir` instead of the system temp directory.
    #[must_use]
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(base_dir.into());
        self
    }

    /// Name prefix for created directories.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }
}

impl TempDirProvider for OsTempDirProvider {
    fn new_scoped_temp_dir(&self) -> io::Result<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(&self.prefix);
        match &self.base_dir {
            Some(base) => builder.tempdir_in(base),
            None => builder.tempdir(),
        }
    }
}
