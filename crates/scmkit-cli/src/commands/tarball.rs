//! `scmkit tarball`: check out into a scoped temp dir and write an archive.

use std::path::Path;

use anyhow::{Context, Result};
use scmkit_config::Config;
use tracing::info;

use crate::TarballArgs;
use crate::config_bridge::{base_dir, single_component, to_checkouter};
use crate::input::read_request;
use crate::output::{Record, host_path};

pub(crate) async fn run(config: &Config, args: TarballArgs) -> Result<()> {
    single_component("tarball name", &args.tarball_name)?;
    let request = read_request(&args.common.input).await?;
    let base = base_dir(config, args.common.base_dir.as_deref());
    let ignore = args.ignore_checkout_files || config.checkout.ignore_checkout_files;

    let archive = to_checkouter(config, base.as_deref(), args.gzip)
        .checkout_to_archive(request, ignore)
        .await
        .context("checkout failed")?;

    let branch = archive.branch().map(str::to_owned);
    let commit_id = archive.commit_id().to_owned();
    let path = base
        .clone()
        .unwrap_or_else(std::env::temp_dir)
        .join(&args.tarball_name);
    write_archive(&path, &archive.into_bytes())?;
    info!(path = %path.display(), gzip = args.gzip, "archive written");

    let printed = host_path(&path, base.as_deref(), args.common.host_base_dir.as_deref());
    Record::for_tarball(printed, branch, commit_id).print()
}

fn write_archive(path: &Path, bytes: &[u8]) -> Result<()> {
    std::fs::write(path, bytes).with_context(|| format!("failed to write {}", path.display()))
}
