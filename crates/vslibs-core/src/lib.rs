//! vslibs-core - provisioning logic for VapourSynth MinGW libraries
//!
//! Fetches a VapourSynth portable release, turns its Windows import
//! libraries into MinGW static archives, generates pkg-config metadata,
//! pulls the public headers from the matching source tarball and syncs the
//! assembled tree into an install prefix.
//!
//! # Staging Layout
//!
//! ```text
//! <stage>/
//! ├── bin/VSScript.dll
//! ├── include/vapoursynth/   # headers from vapoursynth-<tag>/include
//! └── lib/
//!     ├── libvapoursynth.a
//!     ├── libvapoursynth-script.a
//!     └── pkgconfig/
//!         ├── vapoursynth.pc
//!         └── vapoursynth-script.pc
//! ```

pub mod arch;
pub mod error;
pub mod implib;
pub mod install;
pub mod io;
pub mod layout;
pub mod pkgconfig;
pub mod process;
pub mod release;
pub mod reporter;
pub mod symbols;
pub mod tools;
pub mod version;

#[cfg(all(test, unix))]
mod testutil;

pub use arch::Arch;
pub use error::InstallError;
pub use install::{InstallOptions, InstallReport, Installer};
pub use release::Release;
pub use reporter::{NullReporter, Reporter};
pub use tools::Toolchain;
pub use version::ReleaseVersion;

/// User Agent string for release downloads
pub const USER_AGENT: &str = concat!("vslibs/", env!("CARGO_PKG_VERSION"));
