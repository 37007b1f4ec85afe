//! Credential resolution.
//!
//! Turns [`SecurityOptions`] into the ssh invocation prefix handed to
//! `git`/`hg`, staging the private key (if any) in a scoped temp dir.

use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::debug;

use crate::request::SecurityOptions;
use crate::tempdir::TempDirProvider;

/// File name of the staged private key.
pub const KEY_FILE_NAME: &str = "id_rsa";

/// Resolved credential material for one checkout.
///
/// Owns the staged key directory, if any. The directory is removed on drop;
/// [`Credentials::release`] does the same but reports removal errors.
#[derive(Debug, Default)]
pub struct Credentials {
    ssh_command: Option<String>,
    key_dir: Option<TempDir>,
}

impl Credentials {
    /// Credentials with no ssh prefix.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// The ssh command to pass via `GIT_SSH_COMMAND` or `hg --ssh`.
    #[must_use]
    pub fn ssh_command(&self) -> Option<&str> {
        self.ssh_command.as_deref()
    }

    /// Path of the staged private key, if one was written.
    #[must_use]
    pub fn key_path(&self) -> Option<PathBuf> {
        self.key_dir.as_ref().map(|d| d.path().join(KEY_FILE_NAME))
    }

    /// Remove the staged key directory.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the directory could not be removed.
    pub fn release(self) -> io::Result<()> {
        match self.key_dir {
            Some(dir) => dir.close(),
            None => Ok(()),
        }
    }
}

/// Resolve security options into credentials.
///
/// No options and access tokens produce no ssh prefix; tokens only affect the
/// clone URL.
///
/// # Errors
///
/// I/O errors from allocating the temp dir or writing the key are returned
/// unwrapped. Any partially written key is removed before returning.
pub fn resolve(
    security: Option<&SecurityOptions>,
    temp_dirs: &dyn TempDirProvider,
) -> io::Result<Credentials> {
    let Some(SecurityOptions::Ssh(ssh)) = security else {
        return Ok(Credentials::none());
    };

    let mut tokens = vec![
        "ssh".to_owned(),
        "-o".to_owned(),
        format!(
            "StrictHostKeyChecking={}",
            if ssh.strict_host_key_checking { "yes" } else { "no" }
        ),
    ];

    let mut key_dir = None;
    if let Some(key) = &ssh.private_key {
        let dir = temp_dirs.new_scoped_temp_dir()?;
        let key_path = write_key(dir.path(), key.as_bytes())?;
        debug!(key_path = %key_path.display(), "staged ssh private key");
        tokens.push("-i".to_owned());
        tokens.push(key_path.display().to_string());
        key_dir = Some(dir);
    }

    Ok(Credentials {
        ssh_command: Some(tokens.join(" ")),
        key_dir,
    })
}

fn write_key(dir: &Path, key: &[u8]) -> io::Result<PathBuf> {
    let path = std::path::absolute(dir.join(KEY_FILE_NAME))?;
    std::fs::write(&path, key)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o400))?;
    }
    Ok(path)
}
