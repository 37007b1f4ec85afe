//! Result records printed on stdout.

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One line of output, tagged with its `type`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub(crate) enum Record {
    /// A checkout kept on disk.
    Clone {
        timestamp: DateTime<Utc>,
        path: PathBuf,
    },
    /// An archive written to disk.
    Tarball {
        timestamp: DateTime<Utc>,
        path: PathBuf,
        #[serde(skip_serializing_if = "Option::is_none")]
        branch: Option<String>,
        commit_id: String,
    },
}

impl Record {
    pub(crate) fn for_clone(path: PathBuf) -> Self {
        Self::Clone {
            timestamp: Utc::now(),
            path,
        }
    }

    pub(crate) fn for_tarball(path: PathBuf, branch: Option<String>, commit_id: String) -> Self {
        Self::Tarball {
            timestamp: Utc::now(),
            path,
            branch,
            commit_id,
        }
    }

    pub(crate) fn to_json_line(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub(crate) fn print(&self) -> Result<()> {
        println!("{}", self.to_json_line()?);
        Ok(())
    }
}

/// Rewrite `path` from the container's `base_dir` to the host's mount point.
/// Paths outside `base_dir`, or calls without a host dir, pass through.
pub(crate) fn host_path(path: &Path, base_dir: Option<&Path>, host_base_dir: Option<&Path>) -> PathBuf {
    match (base_dir, host_base_dir) {
        (Some(base), Some(host)) => match path.strip_prefix(base) {
            Ok(rest) => host.join(rest),
            Err(_) => path.to_path_buf(),
        },
        _ => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clone_record_json() {
        let line = Record::for_clone(PathBuf::from("/work/scmkit-abc/clone"))
            .to_json_line()
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();

        assert_eq!(value["type"], "clone");
        assert_eq!(value["path"], "/work/scmkit-abc/clone");
        let ts = value["timestamp"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(ts).is_ok());
    }

    #[test]
    fn test_tarball_record_omits_missing_branch() {
        let line = Record::for_tarball(PathBuf::from("/work/out.tar"), None, "4538981d".to_owned())
            .to_json_line()
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();

        assert_eq!(value["type"], "tarball");
        assert_eq!(value["commit_id"], "4538981d");
        assert!(value.get("branch").is_none());
    }

    #[test]
    fn test_tarball_record_with_branch() {
        let line = Record::for_tarball(
            PathBuf::from("/work/out.tar"),
            Some("master".to_owned()),
            "a40e854c".to_owned(),
        )
        .to_json_line()
        .unwrap();
        assert!(line.contains("\"branch\":\"master\""));
        assert!(!line.contains('\n'));
    }

    #[test]
    fn test_host_path_rewrites_prefix() {
        assert_eq!(
            host_path(
                Path::new("/work/scmkit-abc/clone"),
                Some(Path::new("/work")),
                Some(Path::new("/home/ci/work")),
            ),
            PathBuf::from("/home/ci/work/scmkit-abc/clone")
        );
    }

    #[test]
    fn test_host_path_passthrough() {
        let path = Path::new("/elsewhere/out.tar");
        assert_eq!(
            host_path(path, Some(Path::new("/work")), Some(Path::new("/host"))),
            path
        );
        assert_eq!(host_path(path, Some(Path::new("/elsewhere")), None), path);
    }
}
