//! Request validation.
//!
//! Runs before any I/O. Checks happen in a fixed order: identity fields,
//! Bitbucket flavor exclusivity, allowed security kinds, then the security
//! payload itself. Object and field names in errors use the wire names of
//! [`ExternalCheckoutOptions`](crate::ExternalCheckoutOptions).

use crate::error::ValidationError;
use crate::kind::{BitbucketFlavor, CheckoutKind, SecurityKind};
use crate::request::{
    BitbucketCheckout, CheckoutRequest, GitCheckout, GithubCheckout, HgCheckout, SecurityOptions,
};

const GIT: &str = "GitCheckoutOptions";
const GITHUB: &str = "GithubCheckoutOptions";
const HG: &str = "HgCheckoutOptions";
const BITBUCKET: &str = "BitbucketCheckoutOptions";
const ACCESS_TOKEN: &str = "AccessTokenSecurityOptions";

/// Validate a checkout request.
///
/// # Errors
///
/// Returns the first [`ValidationError`] found.
pub fn validate(request: &CheckoutRequest) -> Result<(), ValidationError> {
    match request {
        CheckoutRequest::Git(r) => validate_git(r)?,
        CheckoutRequest::Github(r) => validate_github(r)?,
        CheckoutRequest::Hg(r) => validate_hg(r)?,
        CheckoutRequest::Bitbucket(r) => validate_bitbucket(r)?,
    }
    if let Some(security) = request.security() {
        validate_security(security, request.kind())?;
    }
    Ok(())
}

/// Security kinds a checkout kind accepts.
#[must_use]
pub const fn allowed_security_kinds(kind: CheckoutKind) -> &'static [SecurityKind] {
    match kind {
        CheckoutKind::Github => &[SecurityKind::Ssh, SecurityKind::AccessToken],
        CheckoutKind::Git | CheckoutKind::Hg | CheckoutKind::Bitbucket => &[SecurityKind::Ssh],
    }
}

fn require(object_type: &'static str, field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::RequiredFieldMissing { object_type, field });
    }
    Ok(())
}

fn require_opt(
    object_type: &'static str,
    field: &'static str,
    value: Option<&String>,
) -> Result<(), ValidationError> {
    require(object_type, field, value.map_or("", String::as_str))
}

fn forbid(
    object_type: &'static str,
    field: &'static str,
    value: Option<&String>,
) -> Result<(), ValidationError> {
    if value.is_some_and(|v| !v.is_empty()) {
        return Err(ValidationError::FieldShouldNotBeSet { object_type, field });
    }
    Ok(())
}

fn validate_git(r: &GitCheckout) -> Result<(), ValidationError> {
    require(GIT, "user", &r.user)?;
    require(GIT, "host", &r.host)?;
    require(GIT, "path", &r.path)?;
    require(GIT, "branch", &r.branch)?;
    require(GIT, "commit_id", &r.revision)
}

fn validate_github(r: &GithubCheckout) -> Result<(), ValidationError> {
    require(GITHUB, "user", &r.user)?;
    require(GITHUB, "repository", &r.repository)?;
    require(GITHUB, "branch", &r.branch)?;
    require(GITHUB, "commit_id", &r.revision)
}

fn validate_hg(r: &HgCheckout) -> Result<(), ValidationError> {
    require(HG, "user", &r.user)?;
    require(HG, "host", &r.host)?;
    require(HG, "path", &r.path)?;
    require(HG, "changeset_id", &r.changeset)
}

fn validate_bitbucket(r: &BitbucketCheckout) -> Result<(), ValidationError> {
    require(BITBUCKET, "user", &r.user)?;
    require(BITBUCKET, "repository", &r.repository)?;
    match r.flavor {
        BitbucketFlavor::Git => {
            require_opt(BITBUCKET, "branch", r.branch.as_ref())?;
            require_opt(BITBUCKET, "commit_id", r.revision.as_ref())?;
            forbid(BITBUCKET, "changeset_id", r.changeset.as_ref())
        },
        BitbucketFlavor::Hg => {
            forbid(BITBUCKET, "branch", r.branch.as_ref())?;
            forbid(BITBUCKET, "commit_id", r.revision.as_ref())?;
            require_opt(BITBUCKET, "changeset_id", r.changeset.as_ref())
        },
    }
}

fn validate_security(security: &SecurityOptions, checkout_kind: CheckoutKind) -> Result<(), ValidationError> {
    let security_kind = security.kind();
    if !allowed_security_kinds(checkout_kind).contains(&security_kind) {
        return Err(ValidationError::SecurityNotImplementedForCheckoutKind {
            security_kind,
            checkout_kind,
        });
    }
    match security {
        // The key is optional: without one ssh uses the agent and ssh config.
        SecurityOptions::Ssh(_) => Ok(()),
        SecurityOptions::AccessToken(t) => require(ACCESS_TOKEN, "access_token", &t.token),
    }
}
