//! Checkout error types.
//!
//! Errors fall into three families:
//! - [`ValidationError`]: the request was rejected before any I/O happened
//! - clone/pin failures: an external `git`/`hg` process did not succeed
//! - resource failures: temporary directories or key files could not be
//!   allocated, written, or released

use std::time::Duration;

use crate::kind::{CheckoutKind, SecurityKind};

/// A request failed validation. Never retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A required field is empty or absent.
    #[error("required field missing: {object_type}.{field}")]
    RequiredFieldMissing {
        /// Name of the object that owns the field.
        object_type: &'static str,
        /// Name of the missing field.
        field: &'static str,
    },

    /// A field was set that the request's flavor forbids.
    #[error("field should not be set: {object_type}.{field}")]
    FieldShouldNotBeSet {
        /// Name of the object that owns the field.
        object_type: &'static str,
        /// Name of the offending field.
        field: &'static str,
    },

    /// The security kind is not supported for this checkout kind.
    #[error("security kind '{security_kind}' is not implemented for checkout kind '{checkout_kind}'")]
    SecurityNotImplementedForCheckoutKind {
        /// The security kind that was supplied.
        security_kind: SecurityKind,
        /// The checkout kind it was supplied for.
        checkout_kind: CheckoutKind,
    },

    /// The checkout `type` string is not recognised.
    #[error("unknown checkout kind: '{0}'")]
    UnknownCheckoutKind(String),

    /// The security `type` string is not recognised.
    #[error("unknown security kind: '{0}'")]
    UnknownSecurityKind(String),

    /// The Bitbucket flavor string is not recognised.
    #[error("unknown bitbucket flavor: '{0}'")]
    UnknownBitbucketFlavor(String),
}

/// Why an external process did not succeed.
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    /// The command had no program to run.
    #[error("empty command")]
    EmptyCommand,

    /// The process could not be started.
    #[error("failed to run {program}: {source}")]
    Spawn {
        /// Program that was being started.
        program: String,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// The process exited with a non-zero status.
    #[error("exit status {code}")]
    Exit {
        /// Exit code reported by the OS.
        code: i32,
    },

    /// The process was terminated without an exit code (e.g. by a signal).
    #[error("terminated without exit status")]
    Terminated,

    /// The process exceeded the executor's timeout and was killed.
    #[error("{program} timed out after {}s", .after.as_secs())]
    TimedOut {
        /// Program that timed out.
        program: String,
        /// Timeout that elapsed.
        after: Duration,
    },
}

/// Errors from checkout operations.
#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    /// The request was rejected before any I/O.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The clone step failed.
    #[error("CouldNotClone: {stderr}")]
    CouldNotClone {
        /// Underlying process failure.
        #[source]
        source: ExecError,
        /// Captured standard error of the clone process.
        stderr: String,
    },

    /// The git pin step (`git checkout -f`) failed.
    #[error("CouldNotCheckout: {stderr}")]
    CouldNotCheckout {
        /// Underlying process failure.
        #[source]
        source: ExecError,
        /// Captured standard error of the checkout process.
        stderr: String,
    },

    /// The hg pin step (`hg update`) failed.
    #[error("CouldNotUpdate: {stderr}")]
    CouldNotUpdate {
        /// Underlying process failure.
        #[source]
        source: ExecError,
        /// Captured standard error of the update process.
        stderr: String,
    },

    /// Allocating, writing, or releasing a temporary resource failed.
    #[error(transparent)]
    Resource(#[from] std::io::Error),
}

impl CheckoutError {
    /// Returns the validation error, if this is one.
    #[must_use]
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(e) => Some(e),
            _ => None,
        }
    }

    /// Captured stderr of the failing process, if this is an execution error.
    #[must_use]
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Self::CouldNotClone { stderr, .. }
            | Self::CouldNotCheckout { stderr, .. }
            | Self::CouldNotUpdate { stderr, .. } => Some(stderr),
            Self::Validation(_) | Self::Resource(_) => None,
        }
    }
}

/// Result type for checkout operations.
pub type CheckoutResult<T> = Result<T, CheckoutError>;
