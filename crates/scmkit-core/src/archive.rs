//! Archive assembly.
//!
//! Lists regular files under a checkout, drops SCM metadata when asked, and
//! hands the sorted list to an [`ArchiveCodec`].

use std::io::{self, Cursor, Read, Write};
use std::path::{Component, Path, PathBuf};

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use tar::{Archive, Builder, EntryType};
use tracing::debug;
use walkdir::WalkDir;

/// Maximum number of entries accepted when unpacking.
const MAX_ENTRY_COUNT: usize = 100_000;

/// Maximum total unpacked size (2 GB).
const MAX_EXTRACTED_SIZE: u64 = 2_000_000_000;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Reads and writes archive byte streams.
pub trait ArchiveCodec: Send + Sync {
    /// Pack `files` (relative to `base`) in the given order.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if a file cannot be read.
    fn tar(&self, files: &[PathBuf], base: &Path) -> io::Result<Vec<u8>>;

    /// Unpack `data` into `dest`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the archive is malformed or an entry would
    /// escape `dest`.
    fn untar(&self, data: &[u8], dest: &Path) -> io::Result<()>;
}

/// Tar codec, optionally gzip-compressed.
#[derive(Debug, Clone, Copy, Default)]
pub struct TarCodec {
    gzip: bool,
}

impl TarCodec {
    /// Plain, uncompressed tar.
    #[must_use]
    pub fn plain() -> Self {
        Self { gzip: false }
    }

    /// Gzip-compressed tar.
    #[must_use]
    pub fn gzip() -> Self {
        Self { gzip: true }
    }
}

fn append_files<W: Write>(builder: &mut Builder<W>, files: &[PathBuf], base: &Path) -> io::Result<()> {
    for rel in files {
        builder.append_path_with_name(base.join(rel), rel)?;
    }
    Ok(())
}

impl ArchiveCodec for TarCodec {
    fn tar(&self, files: &[PathBuf], base: &Path) -> io::Result<Vec<u8>> {
        if self.gzip {
            let mut builder = Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
            append_files(&mut builder, files, base)?;
            builder.into_inner()?.finish()
        } else {
            let mut builder = Builder::new(Vec::new());
            append_files(&mut builder, files, base)?;
            builder.into_inner()
        }
    }

    fn untar(&self, data: &[u8], dest: &Path) -> io::Result<()> {
        // Either encoding is accepted regardless of how this codec writes.
        if data.starts_with(&GZIP_MAGIC) {
            unpack(Archive::new(GzDecoder::new(data)), dest)
        } else {
            unpack(Archive::new(data), dest)
        }
    }
}

fn invalid(message: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message)
}

fn unpack<R: Read>(mut archive: Archive<R>, dest: &Path) -> io::Result<()> {
    archive.set_preserve_permissions(false);
    let dest = dest.canonicalize()?;

    let mut entry_count = 0usize;
    let mut total_size: u64 = 0;

    for entry in archive.entries()? {
        let mut entry = entry?;

        entry_count = entry_count.saturating_add(1);
        if entry_count > MAX_ENTRY_COUNT {
            return Err(invalid(format!(
                "archive exceeds maximum entry count ({MAX_ENTRY_COUNT})"
            )));
        }

        let entry_type = entry.header().entry_type();
        if !is_safe_entry_type(entry_type) {
            return Err(invalid(format!("unsupported entry type {entry_type:?}")));
        }

        total_size = total_size.saturating_add(entry.header().size()?);
        if total_size > MAX_EXTRACTED_SIZE {
            return Err(invalid(format!(
                "archive exceeds maximum extracted size ({MAX_EXTRACTED_SIZE} bytes)"
            )));
        }

        let entry_path = entry.path()?.into_owned();
        validate_entry_path(&entry_path)?;

        let target = dest.join(&entry_path);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
            if !parent.canonicalize()?.starts_with(&dest) {
                return Err(invalid(format!(
                    "entry escapes destination: {}",
                    entry_path.display()
                )));
            }
        }
        entry.unpack(&target)?;
    }
    Ok(())
}

fn is_safe_entry_type(entry_type: EntryType) -> bool {
    matches!(
        entry_type,
        EntryType::Regular
            | EntryType::Directory
            | EntryType::GNULongName
            | EntryType::XHeader
            | EntryType::XGlobalHeader
    )
}

fn validate_entry_path(path: &Path) -> io::Result<()> {
    let escapes = path.is_absolute()
        || path.components().any(|c| {
            matches!(
                c,
                Component::ParentDir | Component::Prefix(_) | Component::RootDir
            )
        });
    if escapes {
        return Err(invalid(format!(
            "entry escapes destination: {}",
            path.display()
        )));
    }
    Ok(())
}

/// Regular files under `base`, relative to it, in lexicographic order.
///
/// Symlinks are neither followed nor listed.
///
/// # Errors
///
/// Returns the I/O error from walking the tree.
pub fn list_files(base: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(base).follow_links(false) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        if let Ok(rel) = entry.path().strip_prefix(base) {
            files.push(rel.to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}

/// Drop files whose relative path starts with any of `patterns`.
///
/// Patterns are plain string prefixes, not globs: `.git` also drops
/// `.gitignore` and `.github/...`.
#[must_use]
pub fn filter_ignored(files: Vec<PathBuf>, patterns: &[&str]) -> Vec<PathBuf> {
    if patterns.is_empty() {
        return files;
    }
    files
        .into_iter()
        .filter(|f| {
            let rel = f.to_string_lossy();
            !patterns.iter().any(|p| rel.starts_with(p))
        })
        .collect()
}

/// List, filter and pack the tree under `base`.
///
/// # Errors
///
/// Returns the I/O error from listing or packing.
pub fn assemble(codec: &dyn ArchiveCodec, base: &Path, ignore_patterns: &[&str]) -> io::Result<Vec<u8>> {
    let listed = list_files(base)?;
    let total = listed.len();
    let files = filter_ignored(listed, ignore_patterns);
    debug!(
        base = %base.display(),
        files = files.len(),
        ignored = total.saturating_sub(files.len()),
        "packing archive"
    );
    codec.tar(&files, base)
}

/// Archive produced by a checkout, with the revision it was taken at.
///
/// Implements [`Read`]; once consumed it cannot be replayed.
#[derive(Debug)]
pub struct CheckoutArchive {
    data: Cursor<Vec<u8>>,
    branch: Option<String>,
    commit_id: String,
}

impl CheckoutArchive {
    /// Wrap archive bytes with their revision labels.
    #[must_use]
    pub fn new(data: Vec<u8>, branch: Option<String>, commit_id: String) -> Self {
        Self {
            data: Cursor::new(data),
            branch,
            commit_id,
        }
    }

    /// Branch the checkout was cloned from; `None` for Hg checkouts.
    #[must_use]
    pub fn branch(&self) -> Option<&str> {
        self.branch.as_deref()
    }

    /// Commit or changeset the checkout is pinned to.
    #[must_use]
    pub fn commit_id(&self) -> &str {
        &self.commit_id
    }

    /// Archive size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.get_ref().len()
    }

    /// Whether the archive has no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.get_ref().is_empty()
    }

    /// The raw archive bytes, regardless of how much has been read.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.data.into_inner()
    }
}

impl Read for CheckoutArchive {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.data.read(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(base: &Path, rel: &str, content: &str) {
        let path = base.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "src/main.rs", "fn main() {}");
        write(dir.path(), "README.md", "readme");
        write(dir.path(), ".git/HEAD", "abc\n");
        write(dir.path(), ".gitignore", "target\n");
        write(dir.path(), ".github/workflows/ci.yml", "on: push");
        dir
    }

    fn paths(files: &[PathBuf]) -> Vec<String> {
        files.iter().map(|p| p.to_string_lossy().into_owned()).collect()
    }

    #[test]
    fn lists_regular_files_sorted_and_relative() {
        let dir = tree();
        std::fs::create_dir(dir.path().join("empty")).unwrap();
        let files = list_files(dir.path()).unwrap();
        assert_eq!(paths(&files), [
            ".git/HEAD",
            ".github/workflows/ci.yml",
            ".gitignore",
            "README.md",
            "src/main.rs"
        ]);
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_are_not_listed() {
        let dir = tree();
        std::os::unix::fs::symlink(dir.path().join("README.md"), dir.path().join("link")).unwrap();
        let files = list_files(dir.path()).unwrap();
        assert!(!paths(&files).contains(&"link".to_owned()));
    }

    #[test]
    fn ignore_patterns_are_string_prefixes() {
        let dir = tree();
        let files = filter_ignored(list_files(dir.path()).unwrap(), &[".git", ".gitignore"]);
        assert_eq!(paths(&files), ["README.md", "src/main.rs"]);
    }

    #[test]
    fn empty_patterns_keep_everything() {
        let dir = tree();
        let all = list_files(dir.path()).unwrap();
        assert_eq!(filter_ignored(all.clone(), &[]), all);
    }

    #[test]
    fn plain_archive_round_trips_contents() {
        let dir = tree();
        let codec = TarCodec::plain();
        let bytes = assemble(&codec, dir.path(), &[]).unwrap();
        assert!(!bytes.starts_with(&GZIP_MAGIC));

        let out = tempfile::tempdir().unwrap();
        codec.untar(&bytes, out.path()).unwrap();
        assert_eq!(std::fs::read_to_string(out.path().join(".git/HEAD")).unwrap(), "abc\n");
        assert_eq!(
            std::fs::read_to_string(out.path().join("src/main.rs")).unwrap(),
            "fn main() {}"
        );
    }

    #[test]
    fn gzip_archive_is_unpacked_by_either_codec() {
        let dir = tree();
        let bytes = assemble(&TarCodec::gzip(), dir.path(), &[".git"]).unwrap();
        assert!(bytes.starts_with(&GZIP_MAGIC));

        let out = tempfile::tempdir().unwrap();
        TarCodec::plain().untar(&bytes, out.path()).unwrap();
        assert!(out.path().join("README.md").is_file());
        assert!(!out.path().join(".git").exists());
        assert!(!out.path().join(".gitignore").exists());
    }

    #[test]
    fn archive_entries_follow_sorted_order() {
        let dir = tree();
        let bytes = assemble(&TarCodec::plain(), dir.path(), &[]).unwrap();
        let mut archive = Archive::new(bytes.as_slice());
        let names: Vec<String> = archive
            .entries()
            .unwrap()
            .map(|e| e.unwrap().path().unwrap().to_string_lossy().into_owned())
            .collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert_eq!(names.len(), 5);
    }

    #[test]
    fn untar_rejects_parent_traversal() {
        let mut builder = Builder::new(Vec::new());
        let data = b"x";
        let mut header = tar::Header::new_gnu();
        header.set_size(1);
        header.set_mode(0o644);
        header.set_entry_type(EntryType::Regular);
        // set_path refuses `..`, so write the raw name bytes.
        header.as_old_mut().name[..9].copy_from_slice(b"../escape");
        header.set_cksum();
        builder.append(&header, &data[..]).unwrap();
        let bytes = builder.into_inner().unwrap();

        let out = tempfile::tempdir().unwrap();
        let err = TarCodec::plain().untar(&bytes, out.path()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(!out.path().parent().unwrap().join("escape").exists());
    }

    #[test]
    fn checkout_archive_reads_once() {
        let mut archive = CheckoutArchive::new(b"abc".to_vec(), Some("main".to_owned()), "r1".to_owned());
        assert_eq!(archive.branch(), Some("main"));
        assert_eq!(archive.commit_id(), "r1");
        let mut buf = Vec::new();
        archive.read_to_end(&mut buf).unwrap();
        assert_eq!(buf, b"abc");
        buf.clear();
        archive.read_to_end(&mut buf).unwrap();
        assert!(buf.is_empty());
        assert_eq!(archive.into_bytes(), b"abc");
    }
}
