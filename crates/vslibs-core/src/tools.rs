//! External tool discovery.
//!
//! `rsync` and `7z` must be on `PATH` before anything touches the network or
//! the filesystem. The MinGW tools (`dlltool`, `gendef`) are handed in by the
//! caller and used as given.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Tools resolved from `PATH` before any work starts.
pub const REQUIRED_TOOLS: [&str; 2] = ["rsync", "7z"];

/// Symbol dumper used when the caller does not provide one.
pub const DEFAULT_NM: &str = "llvm-nm";

/// Errors from the prerequisite check.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    /// One or more required tools are not on `PATH`; carries their names.
    #[error("Please make sure that p7zip and rsync are installed.")]
    Missing(Vec<String>),
}

/// Return the subset of `names` that cannot be resolved on `PATH`.
pub fn missing_tools(names: &[&str]) -> Vec<String> {
    names
        .iter()
        .filter(|name| which::which(name).is_err())
        .map(|name| (*name).to_string())
        .collect()
}

/// Check that every entry of [`REQUIRED_TOOLS`] is available.
///
/// # Errors
///
/// Returns [`ToolError::Missing`] listing the tools that were not found.
pub fn require_tools() -> Result<(), ToolError> {
    let missing = missing_tools(&REQUIRED_TOOLS);
    if missing.is_empty() {
        Ok(())
    } else {
        tracing::debug!("Missing required tools: {}", missing.join(", "));
        Err(ToolError::Missing(missing))
    }
}

/// Every external program the install flow runs.
#[derive(Debug, Clone)]
pub struct Toolchain {
    /// `dlltool` (GNU or LLVM)
    pub dlltool: PathBuf,
    /// `gendef` from mingw-w64-tools
    pub gendef: PathBuf,
    /// Symbol dumper for import libraries
    pub nm: PathBuf,
    /// p7zip front end
    pub sevenzip: PathBuf,
    /// `rsync`
    pub rsync: PathBuf,
}

impl Toolchain {
    /// Create a toolchain from caller-supplied `dlltool` and `gendef` paths.
    ///
    /// Paths with a directory component are made absolute because several
    /// tools run with the extraction directory as their working directory.
    pub fn new(dlltool: impl AsRef<Path>, gendef: impl AsRef<Path>) -> Self {
        Self {
            dlltool: anchor(dlltool.as_ref()),
            gendef: anchor(gendef.as_ref()),
            nm: PathBuf::from(DEFAULT_NM),
            sevenzip: PathBuf::from(REQUIRED_TOOLS[1]),
            rsync: PathBuf::from(REQUIRED_TOOLS[0]),
        }
    }

    /// Override the symbol dumper.
    pub fn with_nm(mut self, nm: impl AsRef<Path>) -> Self {
        self.nm = anchor(nm.as_ref());
        self
    }

    /// Override the `7z` binary.
    pub fn with_sevenzip(mut self, sevenzip: impl AsRef<Path>) -> Self {
        self.sevenzip = anchor(sevenzip.as_ref());
        self
    }

    /// Override the `rsync` binary.
    pub fn with_rsync(mut self, rsync: impl AsRef<Path>) -> Self {
        self.rsync = anchor(rsync.as_ref());
        self
    }
}

/// Bare program names stay as they are so they resolve through `PATH`.
fn anchor(program: &Path) -> PathBuf {
    if program.components().count() > 1 || program.is_absolute() {
        std::path::absolute(program).unwrap_or_else(|_| program.to_path_buf())
    } else {
        program.to_path_buf()
    }
}
