//! Discriminators for checkout requests and security options.
//!
//! Each kind maps to a stable lowercase string used by the wire format.
//! The mapping is computed inline in `as_str`/`FromStr`, so there is no
//! shared lookup table to initialise.

use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Which provider a checkout request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckoutKind {
    /// Any Git host addressed by host and path.
    Git,
    /// A repository on github.com.
    Github,
    /// Any Mercurial host addressed by host and path.
    Hg,
    /// A repository on bitbucket.org (Git or Hg flavor).
    Bitbucket,
}

impl CheckoutKind {
    /// All checkout kinds, in wire order.
    #[must_use]
    pub const fn all() -> [Self; 4] {
        [Self::Git, Self::Github, Self::Hg, Self::Bitbucket]
    }

    /// The wire string for this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Git => "git",
            Self::Github => "github",
            Self::Hg => "hg",
            Self::Bitbucket => "bitbucket",
        }
    }
}

impl fmt::Display for CheckoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CheckoutKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownCheckoutKind(s.to_owned()))
    }
}

/// Which kind of credential material a request carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SecurityKind {
    /// SSH with optional private key.
    Ssh,
    /// Bearer access token embedded in an HTTPS URL.
    AccessToken,
}

impl SecurityKind {
    /// All security kinds, in wire order.
    #[must_use]
    pub const fn all() -> [Self; 2] {
        [Self::Ssh, Self::AccessToken]
    }

    /// The wire string for this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ssh => "ssh",
            Self::AccessToken => "access_token",
        }
    }
}

impl fmt::Display for SecurityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SecurityKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Older records spell the token kind in camel case.
        if s == "accessToken" {
            return Ok(Self::AccessToken);
        }
        Self::all()
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownSecurityKind(s.to_owned()))
    }
}

/// Which VCS a Bitbucket repository uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BitbucketFlavor {
    /// Git-backed repository.
    Git,
    /// Mercurial-backed repository.
    Hg,
}

impl BitbucketFlavor {
    /// All flavors, in wire order.
    #[must_use]
    pub const fn all() -> [Self; 2] {
        [Self::Git, Self::Hg]
    }

    /// The wire string for this flavor.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Git => "git",
            Self::Hg => "hg",
        }
    }
}

impl fmt::Display for BitbucketFlavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BitbucketFlavor {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownBitbucketFlavor(s.to_owned()))
    }
}

/// The external tool family that performs a checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VcsFamily {
    /// `git clone` + `git checkout -f`.
    Git,
    /// `hg clone` + `hg update`.
    Hg,
}

impl VcsFamily {
    /// Path prefixes of SCM metadata excluded from archives when asked.
    #[must_use]
    pub const fn ignore_patterns(self) -> &'static [&'static str] {
        match self {
            Self::Git => &[".git", ".gitignore"],
            Self::Hg => &[".hg", ".hgignore", ".hgsigs", ".hgtags"],
        }
    }
}

impl From<BitbucketFlavor> for VcsFamily {
    fn from(flavor: BitbucketFlavor) -> Self {
        match flavor {
            BitbucketFlavor::Git => Self::Git,
            BitbucketFlavor::Hg => Self::Hg,
        }
    }
}
