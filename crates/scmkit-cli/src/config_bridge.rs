//! Mapping from `scmkit_config::Config` onto telemetry and checkout types.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use anyhow::{Result, bail};
use scmkit_config::Config;
use scmkit_core::{Checkouter, OsExecutor, OsTempDirProvider, TarCodec, VcsTools};
use scmkit_telemetry::{LogConfig, LogFormat, LogTarget};

/// Logging setup for the binary. `--verbose` wins over `SCMKIT_LOG`, which
/// wins over the config file. Output always goes to stderr.
pub(crate) fn to_log_config(cfg: &Config, verbose: bool, env_level: Option<&str>) -> LogConfig {
    let level = if verbose {
        "debug"
    } else {
        env_level
            .filter(|l| !l.trim().is_empty())
            .unwrap_or(&cfg.logging.level)
    };

    // The config validator already rejected unknown formats.
    let format = cfg.logging.format.parse().unwrap_or(LogFormat::Compact);

    let mut lc = LogConfig::new(level)
        .with_format(format)
        .with_target(LogTarget::Stderr);
    for directive in &cfg.logging.directives {
        lc = lc.with_directive(directive.clone());
    }
    lc
}

/// Base directory for outputs: the flag, then the config, then `None`.
pub(crate) fn base_dir(cfg: &Config, flag: Option<&Path>) -> Option<PathBuf> {
    flag.map(Path::to_path_buf)
        .or_else(|| cfg.checkout.base_dir.clone())
}

/// A checkouter whose temp dirs live under `base_dir` and whose archives are
/// optionally gzipped.
pub(crate) fn to_checkouter(cfg: &Config, base_dir: Option<&Path>, gzip: bool) -> Checkouter {
    let mut executor = OsExecutor::new();
    if let Some(timeout) = cfg.checkout.command_timeout() {
        executor = executor.with_timeout(timeout);
    }

    let codec = if gzip {
        TarCodec::gzip()
    } else {
        TarCodec::plain()
    };

    Checkouter::new(Arc::new(executor), Arc::new(temp_dirs(base_dir)), Arc::new(codec)).with_tools(
        VcsTools {
            git: cfg.checkout.git_binary.clone(),
            hg: cfg.checkout.hg_binary.clone(),
        },
    )
}

/// Temp dir provider rooted at `base_dir`, or the system temp dir.
pub(crate) fn temp_dirs(base_dir: Option<&Path>) -> OsTempDirProvider {
    match base_dir {
        Some(base) => OsTempDirProvider::new().with_base_dir(base),
        None => OsTempDirProvider::new(),
    }
}

/// Reject anything but a single plain file or directory name.
pub(crate) fn single_component(what: &str, name: &str) -> Result<()> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => bail!("{what} '{name}' must be a single relative name"),
    }
}
