//! Checkout requests and their security options.
//!
//! A [`CheckoutRequest`] is built by the caller (or converted from an
//! [`ExternalCheckoutOptions`](crate::ExternalCheckoutOptions) record),
//! validated once and consumed by a single checkout.

use std::fmt;

use zeroize::Zeroizing;

use crate::kind::{BitbucketFlavor, CheckoutKind, SecurityKind, VcsFamily};

/// SSH private key material. Zeroed on drop and never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey(Zeroizing<Vec<u8>>);

impl PrivateKey {
    /// Wrap raw key bytes.
    #[must_use]
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(Zeroizing::new(bytes.into()))
    }

    /// The raw key bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Whether the key has no content.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrivateKey(<{} bytes>)", self.0.len())
    }
}

/// SSH transport options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SshOptions {
    /// Whether ssh should refuse unknown host keys.
    pub strict_host_key_checking: bool,
    /// Key to authenticate with. Without one, ssh falls back to the agent and
    /// the user's ssh configuration.
    pub private_key: Option<PrivateKey>,
}

/// Access token embedded in an HTTPS clone URL.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessTokenOptions {
    /// The bearer token.
    pub token: Zeroizing<String>,
}

impl AccessTokenOptions {
    /// Wrap a token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Zeroizing::new(token.into()),
        }
    }
}

impl fmt::Debug for AccessTokenOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessTokenOptions")
            .field("has_token", &!self.token.is_empty())
            .finish()
    }
}

/// Credential material and policy used to authenticate a clone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecurityOptions {
    /// SSH with host key policy and optional key.
    Ssh(SshOptions),
    /// Access token (GitHub only).
    AccessToken(AccessTokenOptions),
}

impl SecurityOptions {
    /// SSH options with an optional key.
    #[must_use]
    pub fn ssh(strict_host_key_checking: bool, private_key: Option<PrivateKey>) -> Self {
        Self::Ssh(SshOptions {
            strict_host_key_checking,
            private_key,
        })
    }

    /// Access token options.
    #[must_use]
    pub fn access_token(token: impl Into<String>) -> Self {
        Self::AccessToken(AccessTokenOptions::new(token))
    }

    /// Discriminator of these options.
    #[must_use]
    pub const fn kind(&self) -> SecurityKind {
        match self {
            Self::Ssh(_) => SecurityKind::Ssh,
            Self::AccessToken(_) => SecurityKind::AccessToken,
        }
    }
}

/// Checkout from any Git host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitCheckout {
    /// SSH user (e.g. `git`).
    pub user: String,
    /// Host name (e.g. `github.com`).
    pub host: String,
    /// Repository path on the host, including the leading separator.
    pub path: String,
    /// Branch to clone.
    pub branch: String,
    /// Commit to pin the working tree to.
    pub revision: String,
    /// Optional security options. Only SSH is accepted.
    pub security: Option<SecurityOptions>,
}

/// Checkout from github.com.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GithubCheckout {
    /// Owner of the repository.
    pub user: String,
    /// Repository name.
    pub repository: String,
    /// Branch to clone.
    pub branch: String,
    /// Commit to pin the working tree to.
    pub revision: String,
    /// Optional security options. SSH and access tokens are accepted.
    pub security: Option<SecurityOptions>,
}

/// Checkout from any Mercurial host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HgCheckout {
    /// SSH user (e.g. `hg`).
    pub user: String,
    /// Host name.
    pub host: String,
    /// Repository path on the host, including the leading separator.
    pub path: String,
    /// Changeset to update the working tree to.
    pub changeset: String,
    /// Optional security options. Only SSH is accepted.
    pub security: Option<SecurityOptions>,
}

/// Checkout from bitbucket.org.
///
/// The Git flavor uses `branch` + `revision`; the Hg flavor uses `changeset`.
/// Setting a field of the other flavor fails validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitbucketCheckout {
    /// Which VCS the repository uses.
    pub flavor: BitbucketFlavor,
    /// Owner of the repository.
    pub user: String,
    /// Repository name.
    pub repository: String,
    /// Branch to clone (Git flavor).
    pub branch: Option<String>,
    /// Commit to pin to (Git flavor).
    pub revision: Option<String>,
    /// Changeset to update to (Hg flavor).
    pub changeset: Option<String>,
    /// Optional security options. Only SSH is accepted.
    pub security: Option<SecurityOptions>,
}

/// A request to materialise one revision of a remote repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutRequest {
    /// Generic Git host.
    Git(GitCheckout),
    /// github.com.
    Github(GithubCheckout),
    /// Generic Mercurial host.
    Hg(HgCheckout),
    /// bitbucket.org.
    Bitbucket(BitbucketCheckout),
}

/// What the pin step moves the working tree to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pin<'a> {
    /// Clone `branch`, then `git checkout -f revision`.
    Git {
        /// Branch passed to `git clone --branch`.
        branch: &'a str,
        /// Commit passed to `git checkout -f`.
        revision: &'a str,
    },
    /// Clone, then `hg update changeset`.
    Hg {
        /// Changeset passed to `hg update`.
        changeset: &'a str,
    },
}

impl CheckoutRequest {
    /// Discriminator of this request.
    #[must_use]
    pub const fn kind(&self) -> CheckoutKind {
        match self {
            Self::Git(_) => CheckoutKind::Git,
            Self::Github(_) => CheckoutKind::Github,
            Self::Hg(_) => CheckoutKind::Hg,
            Self::Bitbucket(_) => CheckoutKind::Bitbucket,
        }
    }

    /// Security options, if any.
    #[must_use]
    pub const fn security(&self) -> Option<&SecurityOptions> {
        match self {
            Self::Git(r) => r.security.as_ref(),
            Self::Github(r) => r.security.as_ref(),
            Self::Hg(r) => r.security.as_ref(),
            Self::Bitbucket(r) => r.security.as_ref(),
        }
    }

    /// Which external tool performs this checkout.
    #[must_use]
    pub fn family(&self) -> VcsFamily {
        match self {
            Self::Git(_) | Self::Github(_) => VcsFamily::Git,
            Self::Hg(_) => VcsFamily::Hg,
            Self::Bitbucket(r) => r.flavor.into(),
        }
    }

    /// The revision selector for the pin step.
    ///
    /// Absent Bitbucket fields read as empty strings; validation rejects such
    /// requests before they reach the driver.
    #[must_use]
    pub fn pin(&self) -> Pin<'_> {
        match self {
            Self::Git(r) => Pin::Git {
                branch: &r.branch,
                revision: &r.revision,
            },
            Self::Github(r) => Pin::Git {
                branch: &r.branch,
                revision: &r.revision,
            },
            Self::Hg(r) => Pin::Hg {
                changeset: &r.changeset,
            },
            Self::Bitbucket(r) => match r.flavor {
                BitbucketFlavor::Git => Pin::Git {
                    branch: r.branch.as_deref().unwrap_or_default(),
                    revision: r.revision.as_deref().unwrap_or_default(),
                },
                BitbucketFlavor::Hg => Pin::Hg {
                    changeset: r.changeset.as_deref().unwrap_or_default(),
                },
            },
        }
    }
}

impl Pin<'_> {
    /// Branch label, for Git-family checkouts.
    #[must_use]
    pub fn branch(&self) -> Option<&str> {
        match self {
            Pin::Git { branch, .. } => Some(branch),
            Pin::Hg { .. } => None,
        }
    }

    /// Commit or changeset identifier.
    #[must_use]
    pub fn commit_id(&self) -> &str {
        match self {
            Pin::Git { revision, .. } => revision,
            Pin::Hg { changeset } => changeset,
        }
    }
}

impl From<GitCheckout> for CheckoutRequest {
    fn from(r: GitCheckout) -> Self {
        Self::Git(r)
    }
}

impl From<GithubCheckout> for CheckoutRequest {
    fn from(r: GithubCheckout) -> Self {
        Self::Github(r)
    }
}

impl From<HgCheckout> for CheckoutRequest {
    fn from(r: HgCheckout) -> Self {
        Self::Hg(r)
    }
}

impl From<BitbucketCheckout> for CheckoutRequest {
    fn from(r: BitbucketCheckout) -> Self {
        Self::Bitbucket(r)
    }
}
