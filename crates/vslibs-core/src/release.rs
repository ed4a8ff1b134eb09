//! Release artifact naming and URLs.

use crate::arch::Arch;
use crate::version::ReleaseVersion;

/// Upstream repository that publishes portable releases and source archives.
pub const DEFAULT_RELEASE_URL: &str = "https://github.com/vapoursynth/vapoursynth";

/// A specific VapourSynth release for one architecture.
#[derive(Debug, Clone)]
pub struct Release {
    /// Portable distribution architecture
    pub arch: Arch,
    /// Release tag
    pub version: ReleaseVersion,
    base_url: String,
}

impl Release {
    /// Create a release pointing at the upstream repository.
    pub fn new(arch: Arch, version: ReleaseVersion) -> Self {
        Self {
            arch,
            version,
            base_url: DEFAULT_RELEASE_URL.to_string(),
        }
    }

    /// Override the repository base URL (mirrors, tests).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// `VapourSynth64-Portable-R65.zip`
    pub fn portable_archive_name(&self) -> String {
        format!(
            "VapourSynth{}-Portable-{}.zip",
            self.arch.bits(),
            self.version
        )
    }

    /// `<base>/releases/download/R65/VapourSynth64-Portable-R65.zip`
    pub fn portable_archive_url(&self) -> String {
        format!(
            "{}/releases/download/{}/{}",
            self.base_url,
            self.version,
            self.portable_archive_name()
        )
    }

    /// `R65.tar.gz`
    pub fn source_archive_name(&self) -> String {
        format!("{}.tar.gz", self.version)
    }

    /// `<base>/archive/R65.tar.gz`
    pub fn source_archive_url(&self) -> String {
        format!("{}/archive/{}", self.base_url, self.source_archive_name())
    }

    /// Header directory inside the source archive (`vapoursynth-R65/include`).
    pub fn source_include_dir(&self) -> String {
        format!("vapoursynth-{}/include", self.version)
    }
}
