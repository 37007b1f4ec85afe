//! Checkout entry points.
//!
//! [`Checkouter`] validates a request, resolves credentials, builds the clone
//! URL, drives the checkout and (for archives) packs the result. Temporary
//! resources it allocates are released on every exit path.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::archive::{ArchiveCodec, CheckoutArchive, TarCodec, assemble};
use crate::driver::{CheckoutDriver, VcsTools};
use crate::error::{CheckoutError, CheckoutResult};
use crate::exec::{Executor, OsExecutor};
use crate::request::CheckoutRequest;
use crate::security;
use crate::tempdir::{OsTempDirProvider, TempDirProvider};
use crate::url::{build_url, redact_url};
use crate::validate::validate;

/// Directory name of the clone inside an archive flow's temp dir.
pub const ARCHIVE_CLONE_DIR: &str = "clone";

/// A checkout that was kept on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutOutcome {
    path: PathBuf,
    branch: Option<String>,
    commit_id: String,
}

impl CheckoutOutcome {
    /// Directory holding the working tree.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Branch the checkout was cloned from; `None` for Hg checkouts.
    #[must_use]
    pub fn branch(&self) -> Option<&str> {
        self.branch.as_deref()
    }

    /// Commit or changeset the checkout is pinned to.
    #[must_use]
    pub fn commit_id(&self) -> &str {
        &self.commit_id
    }
}

/// Performs checkouts using pluggable collaborators.
///
/// Holds no per-checkout state, so one instance may serve concurrent
/// checkouts as long as each targets a distinct working directory.
#[derive(Clone)]
pub struct Checkouter {
    executor: Arc<dyn Executor>,
    temp_dirs: Arc<dyn TempDirProvider>,
    codec: Arc<dyn ArchiveCodec>,
    tools: VcsTools,
}

impl Default for Checkouter {
    fn default() -> Self {
        Self::new(
            Arc::new(OsExecutor::new()),
            Arc::new(OsTempDirProvider::new()),
            Arc::new(TarCodec::plain()),
        )
    }
}

impl std::fmt::Debug for Checkouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Checkouter")
            .field("tools", &self.tools)
            .finish_non_exhaustive()
    }
}

impl Checkouter {
    /// Checkouter over the given collaborators.
    #[must_use]
    pub fn new(
        executor: Arc<dyn Executor>,
        temp_dirs: Arc<dyn TempDirProvider>,
        codec: Arc<dyn ArchiveCodec>,
    ) -> Self {
        Self {
            executor,
            temp_dirs,
            codec,
            tools: VcsTools::default(),
        }
    }

    /// Use different `git`/`hg` binaries.
    #[must_use]
    pub fn with_tools(mut self, tools: VcsTools) -> Self {
        self.tools = tools;
        self
    }

    /// Check `request` out into `working_dir/clone_path` and keep it there.
    ///
    /// On failure the partially cloned directory is left for inspection.
    ///
    /// # Errors
    ///
    /// Validation errors are returned before any I/O. Otherwise returns the
    /// clone/pin failure or a resource error from credential staging.
    #[instrument(skip_all, fields(kind = %request.kind()))]
    pub async fn checkout(
        &self,
        request: CheckoutRequest,
        working_dir: &Path,
        clone_path: &Path,
    ) -> CheckoutResult<CheckoutOutcome> {
        validate(&request)?;
        let path = working_dir.join(clone_path);
        self.clone_into(&request, &path).await?;

        let pin = request.pin();
        Ok(CheckoutOutcome {
            branch: pin.branch().map(str::to_owned),
            commit_id: pin.commit_id().to_owned(),
            path,
        })
    }

    /// Check `request` out into a scoped temp dir and pack it.
    ///
    /// With `ignore_scm_files`, the provider family's metadata files are left
    /// out of the archive. The temp dir is removed whether or not the
    /// checkout succeeds.
    ///
    /// # Errors
    ///
    /// Validation errors are returned before any I/O. Otherwise returns the
    /// clone/pin failure, or a resource error from temp dirs or packing.
    #[instrument(skip_all, fields(kind = %request.kind(), ignore_scm_files = ignore_scm_files))]
    pub async fn checkout_to_archive(
        &self,
        request: CheckoutRequest,
        ignore_scm_files: bool,
    ) -> CheckoutResult<CheckoutArchive> {
        validate(&request)?;
        let workdir = self.temp_dirs.new_scoped_temp_dir()?;
        let clone_path = workdir.path().join(ARCHIVE_CLONE_DIR);

        let result = self.archive_at(&request, &clone_path, ignore_scm_files).await;
        release(result, workdir.close())
    }

    async fn archive_at(
        &self,
        request: &CheckoutRequest,
        clone_path: &Path,
        ignore_scm_files: bool,
    ) -> CheckoutResult<CheckoutArchive> {
        self.clone_into(request, clone_path).await?;

        let patterns: &'static [&'static str] = if ignore_scm_files {
            request.family().ignore_patterns()
        } else {
            &[]
        };
        let codec = Arc::clone(&self.codec);
        let base = clone_path.to_path_buf();
        let bytes = tokio::task::spawn_blocking(move || assemble(codec.as_ref(), &base, patterns))
            .await
            .map_err(|e| CheckoutError::Resource(io::Error::other(e)))??;

        let pin = request.pin();
        info!(bytes = bytes.len(), "archive assembled");
        Ok(CheckoutArchive::new(
            bytes,
            pin.branch().map(str::to_owned),
            pin.commit_id().to_owned(),
        ))
    }

    async fn clone_into(&self, request: &CheckoutRequest, path: &Path) -> CheckoutResult<()> {
        let url = build_url(request)?;
        let credentials = security::resolve(request.security(), self.temp_dirs.as_ref())?;
        info!(
            url = %redact_url(&url),
            path = %path.display(),
            ssh = credentials.ssh_command().is_some(),
            "starting checkout"
        );

        let driven = CheckoutDriver::new(self.executor.as_ref(), &self.tools)
            .run(request.pin(), &url, credentials.ssh_command(), path)
            .await
            .map(|_| ());
        release(driven, credentials.release())
    }
}

/// Combine a primary result with the result of releasing a resource.
///
/// A cleanup failure only surfaces when the primary step succeeded;
/// otherwise it is logged and the primary error is kept.
fn release<T>(primary: CheckoutResult<T>, cleanup: io::Result<()>) -> CheckoutResult<T> {
    match (primary, cleanup) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(e)) => Err(CheckoutError::Resource(e)),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(cleanup)) => {
            warn!(error = %cleanup, "failed to release temporary resource");
            Err(e)
        },
    }
}
