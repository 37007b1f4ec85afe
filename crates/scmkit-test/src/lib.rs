//! Shared test utilities for scmkit.
//!
//! Provides a recording [`Executor`](scmkit_core::Executor) mock, a counting
//! temp dir provider, request fixtures and archive helpers, so checkout flows
//! can be exercised without `git`, `hg` or network access.
//!
//! ```rust,ignore
//! use scmkit_test::{RecordingExecutor, fake_clone, test_git_request};
//!
//! let executor = RecordingExecutor::new().with_materializer(fake_clone(&[("README.md", "hi")]));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod archive;
pub mod fixtures;
pub mod mocks;

pub use archive::*;
pub use fixtures::*;
pub use mocks::*;

/// Install a test subscriber honouring `RUST_LOG`. Safe to call repeatedly.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
