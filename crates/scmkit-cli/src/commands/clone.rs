//! `scmkit clone`: check out into a directory that outlives the process.

use std::path::Path;

use anyhow::{Context, Result};
use scmkit_config::Config;
use scmkit_core::TempDirProvider;
use tracing::info;

use crate::CloneArgs;
use crate::config_bridge::{base_dir, single_component, temp_dirs, to_checkouter};
use crate::input::read_request;
use crate::output::{Record, host_path};

pub(crate) async fn run(config: &Config, args: CloneArgs) -> Result<()> {
    let request = read_request(&args.common.input).await?;
    let base = base_dir(config, args.common.base_dir.as_deref());
    let clone_path = args
        .clone_path
        .unwrap_or_else(|| config.checkout.clone_path.clone());
    single_component("clone path", &clone_path)?;

    // Persisted up front: a partial checkout stays on disk for inspection.
    let workdir = temp_dirs(base.as_deref())
        .new_scoped_temp_dir()
        .context("failed to create checkout directory")?
        .keep();

    let outcome = to_checkouter(config, base.as_deref(), false)
        .checkout(request, &workdir, Path::new(&clone_path))
        .await
        .with_context(|| format!("checkout into {} failed", workdir.display()))?;

    info!(
        dir = %workdir.display(),
        commit_id = outcome.commit_id(),
        "checkout complete"
    );

    let printed = host_path(
        outcome.path(),
        base.as_deref(),
        args.common.host_base_dir.as_deref(),
    );
    Record::for_clone(printed).print()
}
