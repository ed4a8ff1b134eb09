//! Release tag parsing and the minimum-version gate
//!
//! VapourSynth tags releases as `R<number>` (e.g. `R58`). The numeric suffix
//! is everything after the first character.

use thiserror::Error;

/// Oldest release whose portable layout (`sdk/lib*`, `VSScript.dll`) is supported.
pub const MINIMUM_RELEASE: u32 = 58;

/// Errors from parsing or gating a release tag.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    /// The tag has no numeric suffix.
    #[error("Invalid VapourSynth version '{0}': expected a release tag such as R58")]
    Invalid(String),

    /// The release predates the supported portable layout.
    #[error("VapourSynth version must be {minimum} or higher.")]
    TooOld {
        /// Tag as given
        tag: String,
        /// Oldest supported release number
        minimum: u32,
    },
}

/// A parsed release tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseVersion {
    tag: String,
    number: u32,
}

impl ReleaseVersion {
    /// Parse a release tag like `R58`.
    ///
    /// # Errors
    ///
    /// Returns [`VersionError::Invalid`] if the tag is empty or its suffix is
    /// not a number.
    pub fn parse(tag: &str) -> Result<Self, VersionError> {
        let mut chars = tag.chars();
        if chars.next().is_none() {
            return Err(VersionError::Invalid(tag.to_string()));
        }

        let number = chars
            .as_str()
            .parse::<u32>()
            .map_err(|_| VersionError::Invalid(tag.to_string()))?;

        Ok(Self {
            tag: tag.to_string(),
            number,
        })
    }

    /// The full tag as given (`R58`).
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Suffix text after the tag's leading character, as written in pkg-config files.
    pub fn suffix(&self) -> &str {
        let mut chars = self.tag.chars();
        chars.next();
        chars.as_str()
    }

    /// Reject releases older than [`MINIMUM_RELEASE`].
    ///
    /// # Errors
    ///
    /// Returns [`VersionError::TooOld`] for releases below the threshold.
    pub fn check_supported(&self) -> Result<(), VersionError> {
        if self.number < MINIMUM_RELEASE {
            return Err(VersionError::TooOld {
                tag: self.tag.clone(),
                minimum: MINIMUM_RELEASE,
            });
        }
        Ok(())
    }
}

impl std::fmt::Display for ReleaseVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.tag)
    }
}

impl std::str::FromStr for ReleaseVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
