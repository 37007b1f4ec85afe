//! Flat wire representation of a checkout request.
//!
//! This is what the command-line front end reads from JSON or YAML. All
//! fields are optional on input; conversion into [`CheckoutRequest`] checks
//! them with the same rules as [`validate`](crate::validate()).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::kind::{BitbucketFlavor, CheckoutKind, SecurityKind};
use crate::request::{
    BitbucketCheckout, CheckoutRequest, GitCheckout, GithubCheckout, HgCheckout, PrivateKey,
    SecurityOptions,
};
use crate::validate::validate;

/// Wire form of [`CheckoutRequest`].
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExternalCheckoutOptions {
    /// Checkout kind: `git`, `github`, `hg` or `bitbucket`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Repository owner or SSH user.
    pub user: String,
    /// Host name (`git`, `hg`).
    pub host: String,
    /// Repository path on the host (`git`, `hg`).
    pub path: String,
    /// Repository name (`github`, `bitbucket`).
    pub repository: String,
    /// Branch (Git family).
    pub branch: String,
    /// Commit to pin to (Git family).
    pub commit_id: String,
    /// Changeset to update to (Hg family).
    pub changeset_id: String,
    /// Bitbucket flavor: `git` or `hg`.
    pub bitbucket_type: String,
    /// Optional credentials.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_options: Option<ExternalSecurityOptions>,
}

/// Wire form of [`SecurityOptions`].
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExternalSecurityOptions {
    /// Security kind: `ssh` or `access_token`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Refuse unknown host keys (`ssh`).
    pub strict_host_key_checking: bool,
    /// PEM-encoded private key; empty means none (`ssh`).
    pub private_key: String,
    /// Access token (`access_token`).
    pub access_token: String,
}

impl fmt::Debug for ExternalCheckoutOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExternalCheckoutOptions")
            .field("type", &self.kind)
            .field("user", &self.user)
            .field("host", &self.host)
            .field("path", &self.path)
            .field("repository", &self.repository)
            .field("branch", &self.branch)
            .field("commit_id", &self.commit_id)
            .field("changeset_id", &self.changeset_id)
            .field("bitbucket_type", &self.bitbucket_type)
            .field("security_options", &self.security_options)
            .finish()
    }
}

impl fmt::Debug for ExternalSecurityOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExternalSecurityOptions")
            .field("type", &self.kind)
            .field("strict_host_key_checking", &self.strict_host_key_checking)
            .field("has_private_key", &!self.private_key.is_empty())
            .field("has_access_token", &!self.access_token.is_empty())
            .finish()
    }
}

impl TryFrom<ExternalSecurityOptions> for SecurityOptions {
    type Error = ValidationError;

    fn try_from(ext: ExternalSecurityOptions) -> Result<Self, Self::Error> {
        Ok(match ext.kind.parse::<SecurityKind>()? {
            SecurityKind::Ssh => {
                let key = (!ext.private_key.is_empty())
                    .then(|| PrivateKey::new(ext.private_key.into_bytes()));
                Self::ssh(ext.strict_host_key_checking, key)
            },
            SecurityKind::AccessToken => Self::access_token(ext.access_token),
        })
    }
}

fn non_empty(s: String) -> Option<String> {
    (!s.is_empty()).then_some(s)
}

impl TryFrom<ExternalCheckoutOptions> for CheckoutRequest {
    type Error = ValidationError;

    fn try_from(ext: ExternalCheckoutOptions) -> Result<Self, Self::Error> {
        let security = ext.security_options.map(SecurityOptions::try_from).transpose()?;
        let kind = ext.kind.parse::<CheckoutKind>()?;

        let request = match kind {
            CheckoutKind::Git => Self::Git(GitCheckout {
                user: ext.user,
                host: ext.host,
                path: ext.path,
                branch: ext.branch,
                revision: ext.commit_id,
                security,
            }),
            CheckoutKind::Github => Self::Github(GithubCheckout {
                user: ext.user,
                repository: ext.repository,
                branch: ext.branch,
                revision: ext.commit_id,
                security,
            }),
            CheckoutKind::Hg => Self::Hg(HgCheckout {
                user: ext.user,
                host: ext.host,
                path: ext.path,
                changeset: ext.changeset_id,
                security,
            }),
            CheckoutKind::Bitbucket => {
                if ext.bitbucket_type.is_empty() {
                    return Err(ValidationError::RequiredFieldMissing {
                        object_type: "BitbucketCheckoutOptions",
                        field: "bitbucket_type",
                    });
                }
                Self::Bitbucket(BitbucketCheckout {
                    flavor: ext.bitbucket_type.parse::<BitbucketFlavor>()?,
                    user: ext.user,
                    repository: ext.repository,
                    branch: non_empty(ext.branch),
                    revision: non_empty(ext.commit_id),
                    changeset: non_empty(ext.changeset_id),
                    security,
                })
            },
        };
        validate(&request)?;
        Ok(request)
    }
}
