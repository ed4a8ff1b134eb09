//! Temporary work and staging directories.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Staging subdirectory for runtime DLLs.
pub const BIN_DIR: &str = "bin";
/// Staging subdirectory for static archives.
pub const LIB_DIR: &str = "lib";
/// Staging subdirectory for headers.
pub const INCLUDE_DIR: &str = "include";

/// Scratch space for one install run.
///
/// `work` receives downloads and extracted files; `stage` mirrors the
/// prefix layout and is what gets synced. Both live under the same base
/// directory and are removed when the area is dropped, unless kept with
/// [`WorkArea::finish`].
#[derive(Debug)]
pub struct WorkArea {
    work: tempfile::TempDir,
    stage: tempfile::TempDir,
}

/// Paths of a work area that was kept on disk.
#[derive(Debug, Clone)]
pub struct KeptWorkArea {
    /// Former work directory
    pub work: PathBuf,
    /// Former staging directory
    pub stage: PathBuf,
}

impl WorkArea {
    /// Create both directories under `base`, which is created if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if `base` cannot be resolved or the directories
    /// cannot be created.
    pub fn create(base: &Path) -> io::Result<Self> {
        let base = std::path::absolute(base)?;
        fs::create_dir_all(&base)?;

        let work = tempfile::Builder::new()
            .prefix("vslibs-work-")
            .tempdir_in(&base)?;
        let stage = tempfile::Builder::new()
            .prefix("vslibs-stage-")
            .tempdir_in(&base)?;

        tracing::debug!(
            "Work area: {} (stage {})",
            work.path().display(),
            stage.path().display()
        );
        Ok(Self { work, stage })
    }

    /// Download and extraction directory.
    pub fn work(&self) -> &Path {
        self.work.path()
    }

    /// Root of the tree synced into the prefix.
    pub fn stage(&self) -> &Path {
        self.stage.path()
    }

    /// `<stage>/bin`
    pub fn stage_bin(&self) -> PathBuf {
        self.stage().join(BIN_DIR)
    }

    /// `<stage>/lib`
    pub fn stage_lib(&self) -> PathBuf {
        self.stage().join(LIB_DIR)
    }

    /// `<stage>/lib/pkgconfig`
    pub fn stage_pkgconfig(&self) -> PathBuf {
        self.stage_lib().join("pkgconfig")
    }

    /// `<stage>/include/vapoursynth`
    pub fn stage_headers(&self) -> PathBuf {
        self.stage().join(INCLUDE_DIR).join("vapoursynth")
    }

    /// Remove both directories, or keep them and return their paths.
    ///
    /// # Errors
    ///
    /// Returns an error if removal fails.
    pub fn finish(self, keep: bool) -> io::Result<Option<KeptWorkArea>> {
        if keep {
            return Ok(Some(KeptWorkArea {
                work: self.work.keep(),
                stage: self.stage.keep(),
            }));
        }
        self.work.close()?;
        self.stage.close()?;
        Ok(None)
    }
}

/// Extract the filename from a URL.
pub fn filename_from_url(url: &str) -> &str {
    url.split('/').next_back().unwrap_or("")
}
