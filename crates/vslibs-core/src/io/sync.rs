//! Installing the staging tree into the prefix.

use std::ffi::OsString;
use std::path::Path;
use std::process::Command;

use crate::process::{self, CommandError};

/// Totals for a staged tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeStats {
    /// Regular files under the root
    pub files: usize,
    /// Sum of their sizes in bytes
    pub bytes: u64,
}

/// Count regular files and bytes under `root`.
pub fn tree_stats(root: &Path) -> TreeStats {
    walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_file())
        .fold(TreeStats::default(), |acc, entry| TreeStats {
            files: acc.files + 1,
            bytes: acc.bytes + entry.metadata().map_or(0, |m| m.len()),
        })
}

/// Copy the contents of `staging` into `prefix` with `rsync -aKv`, where
/// `rsync` is the program to run.
///
/// `-K` keeps existing directory symlinks in the prefix intact, which
/// matters for sysroots where `lib` points elsewhere.
///
/// # Errors
///
/// Returns an error if `rsync` is missing or exits unsuccessfully.
pub fn sync_tree(rsync: &Path, staging: &Path, prefix: &Path) -> Result<TreeStats, CommandError> {
    let stats = tree_stats(staging);

    // Trailing slash: copy the directory's contents, not the directory itself
    let mut source = OsString::from(staging.as_os_str());
    source.push("/");

    process::run(Command::new(rsync).arg("-aKv").arg(source).arg(prefix))?;

    tracing::info!(
        "Synced {} files ({} bytes) into {}",
        stats.files,
        stats.bytes,
        prefix.display()
    );
    Ok(stats)
}
