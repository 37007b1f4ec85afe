//! Checkouts against public repositories.
//!
//! These need `git`, `hg` and network access:
//! `cargo test -p scmkit-core --test end_to_end -- --ignored`

use std::path::Path;

use scmkit_core::{Checkouter, Cmd, Executor, OsExecutor};
use scmkit_test::{
    HG_GIT_CHANGESET, SMARTYSTREETS_REVISION, init_test_logging, test_git_request, test_hg_request,
    untar_to,
};

#[tokio::test]
#[ignore = "requires git and network access"]
async fn git_checkout_keeps_metadata() {
    init_test_logging();
    let archive = Checkouter::default()
        .checkout_to_archive(test_git_request().into(), false)
        .await
        .unwrap();
    let out = tempfile::tempdir().unwrap();
    untar_to(&archive.into_bytes(), out.path()).unwrap();

    assert!(out.path().join("smartystreets.gemspec").is_file());
    let head = std::fs::read_to_string(out.path().join(".git/HEAD")).unwrap();
    assert_eq!(head.trim(), SMARTYSTREETS_REVISION);
}

#[tokio::test]
#[ignore = "requires git and network access"]
async fn git_checkout_filters_metadata() {
    let archive = Checkouter::default()
        .checkout_to_archive(test_git_request().into(), true)
        .await
        .unwrap();
    let out = tempfile::tempdir().unwrap();
    untar_to(&archive.into_bytes(), out.path()).unwrap();

    assert!(out.path().join("smartystreets.gemspec").is_file());
    assert!(!out.path().join(".git").exists());
    assert!(!out.path().join(".gitignore").exists());
}

async fn hg_current_revision(dir: &Path) -> String {
    let out = OsExecutor::new()
        .execute(&Cmd::new(["hg", "id", "-i"]).with_dir(dir))
        .await
        .unwrap();
    assert!(out.is_success());
    out.stdout.trim().trim_end_matches('+').to_owned()
}

#[tokio::test]
#[ignore = "requires hg and network access"]
async fn hg_checkout_is_at_requested_changeset() {
    init_test_logging();
    let archive = Checkouter::default()
        .checkout_to_archive(test_hg_request().into(), false)
        .await
        .unwrap();
    let out = tempfile::tempdir().unwrap();
    untar_to(&archive.into_bytes(), out.path()).unwrap();

    assert!(out.path().join("hggit/overlay.py").is_file());
    let id = hg_current_revision(out.path()).await;
    assert_eq!(id.get(..12), HG_GIT_CHANGESET.get(..12));
}
