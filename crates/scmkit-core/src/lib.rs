//! Checkout orchestration and archive assembly for Git and Mercurial sources.
//!
//! Materialises one revision of a remote repository by driving the external
//! `git`/`hg` binaries, and optionally packs the result as a tar archive:
//!
//! - [`CheckoutRequest`]: what to fetch (provider, identity, revision, credentials)
//! - [`validate`]: pre-I/O request checks
//! - [`build_url`]: per-provider clone URL rules
//! - [`security::resolve`]: ssh invocation prefix and scoped key staging
//! - [`CheckoutDriver`]: clone + pin state machine
//! - [`assemble`]: file listing, SCM-metadata filtering, packing
//! - [`Checkouter`]: the entry point tying these together
//!
//! Processes, temp dirs and the archive format sit behind the [`Executor`],
//! [`TempDirProvider`] and [`ArchiveCodec`] traits.
//!
//! # Example
//!
//! ```no_run
//! use scmkit_core::{CheckoutRequest, Checkouter, GithubCheckout};
//!
//! # async fn run() -> scmkit_core::CheckoutResult<()> {
//! let request = CheckoutRequest::from(GithubCheckout {
//!     user: "acme".into(),
//!     repository: "widget".into(),
//!     branch: "main".into(),
//!     revision: "a40e854c17df0b1a98c90c250dc20e6cb2474dfa".into(),
//!     security: None,
//! });
//! let archive = Checkouter::default().checkout_to_archive(request, true).await?;
//! println!("{} bytes at {}", archive.len(), archive.commit_id());
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod archive;
pub mod dispatch;
pub mod driver;
pub mod error;
pub mod exec;
pub mod external;
pub mod kind;
pub mod request;
pub mod security;
pub mod tempdir;
pub mod url;
pub mod validate;

pub use archive::{ArchiveCodec, CheckoutArchive, TarCodec, assemble, filter_ignored, list_files};
pub use dispatch::{CheckoutOutcome, Checkouter};
pub use driver::{CheckoutDriver, Stage, VcsTools};
pub use error::{CheckoutError, CheckoutResult, ExecError, ValidationError};
pub use exec::{Cmd, ExecOutput, Executor, OsExecutor};
pub use external::{ExternalCheckoutOptions, ExternalSecurityOptions};
pub use kind::{BitbucketFlavor, CheckoutKind, SecurityKind, VcsFamily};
pub use request::{
    AccessTokenOptions, BitbucketCheckout, CheckoutRequest, GitCheckout, GithubCheckout,
    HgCheckout, Pin, PrivateKey, SecurityOptions, SshOptions,
};
pub use security::Credentials;
pub use tempdir::{OsTempDirProvider, TempDirProvider};
pub use url::{build_url, redact_url};
pub use validate::{allowed_security_kinds, validate};
