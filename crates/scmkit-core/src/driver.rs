//! Two-phase checkout driver: clone, then pin to an exact revision.
//!
//! Git family: `git clone --branch B --depth 50 --recursive URL PATH`, then
//! `git checkout -f REV` inside PATH. A revision more than 50 commits behind
//! the branch tip is not in the shallow clone, so the pin step fails with
//! [`CheckoutError::CouldNotCheckout`].
//!
//! Hg family: `hg clone [--ssh CMD] URL PATH`, then
//! `hg update --cwd PATH CHANGESET`.

use std::path::Path;

use tracing::{debug, info};

use crate::error::{CheckoutError, CheckoutResult, ExecError};
use crate::exec::{Cmd, Executor};
use crate::request::Pin;

/// Shallow clone depth for Git-family checkouts.
pub const GIT_CLONE_DEPTH: u32 = 50;

/// Names of the external VCS binaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VcsTools {
    /// Program used for Git-family checkouts.
    pub git: String,
    /// Program used for Hg-family checkouts.
    pub hg: String,
}

impl Default for VcsTools {
    fn default() -> Self {
        Self {
            git: "git".to_owned(),
            hg: "hg".to_owned(),
        }
    }
}

/// Where a checkout is in the driver's state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Nothing has run yet; the next step is the clone.
    Pending,
    /// The clone succeeded; the next step is the pin.
    Cloned,
    /// The working tree is at the requested revision.
    Pinned,
}

/// Drives `git`/`hg` through an [`Executor`].
pub struct CheckoutDriver<'a> {
    executor: &'a dyn Executor,
    tools: &'a VcsTools,
}

impl<'a> CheckoutDriver<'a> {
    /// Driver running commands on `executor`.
    #[must_use]
    pub fn new(executor: &'a dyn Executor, tools: &'a VcsTools) -> Self {
        Self { executor, tools }
    }

    /// Clone `url` into `path` and pin it to the requested revision.
    ///
    /// The pin step never runs if the clone failed.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::CouldNotClone`] if the clone fails;
    /// [`CheckoutError::CouldNotCheckout`] or [`CheckoutError::CouldNotUpdate`]
    /// if the pin fails.
    pub async fn run(
        &self,
        pin: Pin<'_>,
        url: &str,
        ssh_command: Option<&str>,
        path: &Path,
    ) -> CheckoutResult<Stage> {
        let mut stage = Stage::Pending;
        while stage != Stage::Pinned {
            stage = self.step(stage, pin, url, ssh_command, path).await?;
        }
        Ok(stage)
    }

    async fn step(
        &self,
        stage: Stage,
        pin: Pin<'_>,
        url: &str,
        ssh_command: Option<&str>,
        path: &Path,
    ) -> CheckoutResult<Stage> {
        match stage {
            Stage::Pending => {
                let cmd = match pin {
                    Pin::Git { branch, .. } => {
                        git_clone_cmd(&self.tools.git, branch, url, path, ssh_command)
                    },
                    Pin::Hg { .. } => hg_clone_cmd(&self.tools.hg, url, path, ssh_command),
                };
                info!(path = %path.display(), "cloning repository");
                self.run_cmd(&cmd)
                    .await
                    .map_err(|(source, stderr)| CheckoutError::CouldNotClone { source, stderr })?;
                Ok(Stage::Cloned)
            },
            Stage::Cloned => {
                match pin {
                    Pin::Git { revision, .. } => {
                        debug!(revision, "pinning git checkout");
                        self.run_cmd(&git_checkout_cmd(&self.tools.git, revision, path))
                            .await
                            .map_err(|(source, stderr)| CheckoutError::CouldNotCheckout {
                                source,
                                stderr,
                            })?;
                    },
                    Pin::Hg { changeset } => {
                        debug!(changeset, "pinning hg checkout");
                        self.run_cmd(&hg_update_cmd(&self.tools.hg, path, changeset))
                            .await
                            .map_err(|(source, stderr)| CheckoutError::CouldNotUpdate {
                                source,
                                stderr,
                            })?;
                    },
                }
                Ok(Stage::Pinned)
            },
            Stage::Pinned => Ok(Stage::Pinned),
        }
    }

    async fn run_cmd(&self, cmd: &Cmd) -> Result<(), (ExecError, String)> {
        let output = self
            .executor
            .execute(cmd)
            .await
            .map_err(|e| (e, String::new()))?;
        match output.exit_error() {
            None => Ok(()),
            Some(e) => Err((e, output.stderr)),
        }
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// `git clone --branch B --depth 50 --recursive URL PATH`.
#[must_use]
pub fn git_clone_cmd(
    git: &str,
    branch: &str,
    url: &str,
    path: &Path,
    ssh_command: Option<&str>,
) -> Cmd {
    let mut cmd = Cmd::new([
        git.to_owned(),
        "clone".to_owned(),
        "--branch".to_owned(),
        branch.to_owned(),
        "--depth".to_owned(),
        GIT_CLONE_DEPTH.to_string(),
        "--recursive".to_owned(),
        url.to_owned(),
        path_arg(path),
    ])
    .capturing_stderr();
    if let Some(ssh) = ssh_command.filter(|s| !s.is_empty()) {
        cmd = cmd.with_env("GIT_SSH_COMMAND", ssh);
    }
    cmd
}

/// `git checkout -f REV`, run inside the clone.
#[must_use]
pub fn git_checkout_cmd(git: &str, revision: &str, path: &Path) -> Cmd {
    Cmd::new([git, "checkout", "-f", revision])
        .with_dir(path)
        .capturing_stderr()
}

/// `hg clone [--ssh CMD] URL PATH`.
#[must_use]
pub fn hg_clone_cmd(hg: &str, url: &str, path: &Path, ssh_command: Option<&str>) -> Cmd {
    let mut args = vec![hg.to_owned(), "clone".to_owned()];
    if let Some(ssh) = ssh_command.filter(|s| !s.is_empty()) {
        args.push("--ssh".to_owned());
        args.push(ssh.to_owned());
    }
    args.push(url.to_owned());
    args.push(path_arg(path));
    Cmd::new(args).capturing_stderr()
}

/// `hg update --cwd PATH CHANGESET`.
#[must_use]
pub fn hg_update_cmd(hg: &str, path: &Path, changeset: &str) -> Cmd {
    Cmd::new([
        hg.to_owned(),
        "update".to_owned(),
        "--cwd".to_owned(),
        path_arg(path),
        changeset.to_owned(),
    ])
    .capturing_stderr()
}
