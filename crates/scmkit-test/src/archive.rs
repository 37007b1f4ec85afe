//! Archive inspection helpers.

use std::io;
use std::path::{Path, PathBuf};

use scmkit_core::{ArchiveCodec, TarCodec, list_files};

/// Unpack an archive (plain or gzip tar) into `dest`.
///
/// # Errors
///
/// Returns the codec's I/O error.
pub fn untar_to(bytes: &[u8], dest: &Path) -> io::Result<()> {
    TarCodec::plain().untar(bytes, dest)
}

/// Relative paths of the regular files in an archive, sorted.
///
/// # Errors
///
/// Returns an I/O error if the archive cannot be unpacked.
pub fn archive_file_list(bytes: &[u8]) -> io::Result<Vec<PathBuf>> {
    let dir = tempfile::tempdir()?;
    untar_to(bytes, dir.path())?;
    list_files(dir.path())
}
