//! Archive extraction module
//!
//! The portable zip is unpacked with `7z` (it is a prerequisite anyway and
//! handles every compression method upstream uses). The source tarball is
//! read natively; only the header subtree is written out.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::{Component, Path, PathBuf};
use std::process::Command;

use thiserror::Error;

use crate::process::{self, CommandError};

/// Errors from unpacking release archives.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Reading the archive or writing an entry failed.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// `7z` could not be run or exited unsuccessfully.
    #[error(transparent)]
    Command(#[from] CommandError),

    /// The archive is malformed, unsafe or lacks the requested subtree.
    #[error("Archive error: {0}")]
    Archive(String),
}

/// Information about an extracted file
#[derive(Debug, Clone)]
pub struct ExtractedFile {
    /// Path relative to extraction root
    pub relative_path: PathBuf,
    /// Absolute path on disk
    pub absolute_path: PathBuf,
}

/// Extract an archive with `7z x -aoa` (overwrite existing files) into `dest_dir`.
///
/// `sevenzip` is the `7z` program to run.
///
/// # Errors
///
/// Returns an error if `dest_dir` cannot be created or `7z` fails.
pub fn extract_with_7z(
    sevenzip: &Path,
    archive_path: &Path,
    dest_dir: &Path,
) -> Result<(), ExtractError> {
    fs::create_dir_all(dest_dir)?;

    let mut out_flag = OsString::from("-o");
    out_flag.push(dest_dir);

    process::run(
        Command::new(sevenzip)
            .arg("x")
            .arg("-aoa")
            .arg(out_flag)
            .arg(archive_path),
    )?;

    Ok(())
}

/// Extract only the entries under `subtree` from a `.tar.gz`, stripping the
/// `subtree` prefix, into `dest_dir`.
///
/// # Errors
///
/// Returns [`ExtractError::Archive`] if an entry would land outside
/// `dest_dir`, the subtree contains a symbolic or hard link, or the subtree
/// is absent from the archive.
pub fn extract_tar_gz_subtree(
    archive_path: &Path,
    dest_dir: &Path,
    subtree: &Path,
) -> Result<Vec<ExtractedFile>, ExtractError> {
    let file = File::open(archive_path)?;
    let reader = BufReader::new(file);
    let gz_decoder = flate2::read::GzDecoder::new(reader);

    let extracted = extract_tar_subtree(gz_decoder, dest_dir, subtree)?;
    if extracted.is_empty() {
        return Err(ExtractError::Archive(format!(
            "{} not found in {}",
            subtree.display(),
            archive_path.display()
        )));
    }
    Ok(extracted)
}

fn extract_tar_subtree<R: Read>(
    reader: R,
    dest_dir: &Path,
    subtree: &Path,
) -> Result<Vec<ExtractedFile>, ExtractError> {
    fs::create_dir_all(dest_dir)?;
    let root = fs::canonicalize(dest_dir)?;

    let mut archive = tar::Archive::new(reader);
    let mut extracted_files = Vec::new();

    for entry in archive.entries()? {
        let mut entry = entry?;
        let entry_path = entry.path()?.into_owned();

        let Ok(relative_path) = entry_path.strip_prefix(subtree) else {
            continue;
        };
        let relative_path = relative_path.to_path_buf();
        if relative_path.as_os_str().is_empty() {
            continue;
        }

        // Sanitize path to prevent Zip Slip
        if !relative_path
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(ExtractError::Archive(format!(
                "Invalid path in archive: {}",
                entry_path.display()
            )));
        }

        // Links could redirect later entries outside the destination
        let entry_type = entry.header().entry_type();
        if entry_type.is_symlink() || entry_type.is_hard_link() {
            return Err(ExtractError::Archive(format!(
                "Link entries are not allowed: {}",
                entry_path.display()
            )));
        }

        let absolute_path = dest_dir.join(&relative_path);

        if entry_type.is_dir() {
            fs::create_dir_all(&absolute_path)?;
            ensure_within(&root, &absolute_path, &entry_path)?;
            continue;
        }

        if let Some(parent) = absolute_path.parent() {
            fs::create_dir_all(parent)?;
            ensure_within(&root, parent, &entry_path)?;
        }

        entry.unpack(&absolute_path)?;

        extracted_files.push(ExtractedFile {
            relative_path,
            absolute_path,
        });
    }

    Ok(extracted_files)
}

fn ensure_within(root: &Path, dir: &Path, entry_path: &Path) -> Result<(), ExtractError> {
    if fs::canonicalize(dir)?.starts_with(root) {
        return Ok(());
    }
    Err(ExtractError::Archive(format!(
        "Entry escapes destination: {}",
        entry_path.display()
    )))
}
