//! Domain-specific errors for the install flow

use thiserror::Error;

use crate::implib::ImplibError;
use crate::io::download::DownloadError;
use crate::io::extract::ExtractError;
use crate::pkgconfig::PkgConfigError;
use crate::process::CommandError;
use crate::version::VersionError;

/// Any failure that aborts an install run.
#[derive(Error, Debug)]
pub enum InstallError {
    /// The release tag is invalid or too old.
    #[error(transparent)]
    Version(#[from] VersionError),

    /// An artifact could not be fetched.
    #[error("Download failed: {0}")]
    Download(#[from] DownloadError),

    /// An archive could not be unpacked.
    #[error("Extraction failed: {0}")]
    Extract(#[from] ExtractError),

    /// A static archive could not be produced.
    #[error("Creating library failed: {0}")]
    Implib(#[from] ImplibError),

    /// A pkg-config file could not be rendered or written.
    #[error(transparent)]
    PkgConfig(#[from] PkgConfigError),

    /// An external command failed outside the other steps (`rsync`).
    #[error(transparent)]
    Command(#[from] CommandError),

    /// Filesystem error in the work area.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failure described by a step name and a message.
    #[error("{context}: {message}")]
    Context {
        /// Step or operation that failed
        context: &'static str,
        /// What went wrong
        message: String,
    },
}

impl InstallError {
    /// Create an error with context for better debugging.
    pub fn context(ctx: &'static str, msg: impl std::fmt::Display) -> Self {
        Self::Context {
            context: ctx,
            message: msg.to_string(),
        }
    }
}
