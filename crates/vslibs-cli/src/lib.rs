//! install-vapoursynth-libs - VapourSynth libraries for MinGW cross builds
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
//!
//! Command-line front end for `vslibs-core`. Parses the positional
//! `install|uninstall <arch> <version> <prefix> <dlltool> <gendef>` form,
//! sets up logging and renders progress on the terminal.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use vslibs_core::Arch;
use vslibs_core::pkgconfig::PythonVersion;
use vslibs_core::release::DEFAULT_RELEASE_URL;
use vslibs_core::tools::DEFAULT_NM;

pub mod cmd;
pub mod ui;

/// Printed for any malformed invocation.
pub const USAGE: &str = "Usage: install-vapoursynth-libs install|uninstall <arch:32|64> <version> <prefix> <dlltool> <gendef>";

/// Crates whose logs `--debug` raises to `debug`.
const LOG_TARGETS: [&str; 3] = ["vslibs_core", "vslibs_cli", "install_vapoursynth_libs"];

#[derive(Parser, Debug)]
#[command(name = "install-vapoursynth-libs")]
#[command(version = env!("VSLIBS_VERSION"))]
#[command(about = "Install VapourSynth import libraries, pkg-config files and headers into a MinGW prefix")]
pub struct Cli {
    #[command(flatten)]
    pub options: Options,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct Options {
    /// Log every external command with its working directory
    #[arg(long, global = true, env = "VSLIBS_DEBUG")]
    pub debug: bool,

    /// Python version written to vapoursynth-script.pc
    #[arg(long, global = true, env = "VSLIBS_PYTHON_VERSION", default_value = "3.12")]
    pub python_version: PythonVersion,

    /// Repository that hosts releases and source archives
    #[arg(long, global = true, env = "VSLIBS_RELEASE_URL", default_value = DEFAULT_RELEASE_URL)]
    pub release_url: String,

    /// Symbol dumper used on VapourSynth.lib
    #[arg(long, global = true, env = "VSLIBS_NM", default_value = DEFAULT_NM)]
    pub nm: PathBuf,

    /// Directory the temporary work area is created in
    #[arg(long, global = true, env = "VSLIBS_WORK_DIR", default_value = ".")]
    pub work_dir: PathBuf,

    /// Keep the temporary work area after the run
    #[arg(long, global = true)]
    pub keep_work: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download, convert and install the libraries
    Install(InstallArgs),
    /// Accepted for symmetry; nothing is removed
    Uninstall(UninstallArgs),
}

/// Positional arguments of `install`.
#[derive(Args, Debug, Clone)]
pub struct InstallArgs {
    /// Target architecture: 32 or 64
    pub arch: Arch,
    /// Release tag, e.g. R65
    pub version: String,
    /// Install prefix
    pub prefix: PathBuf,
    /// dlltool binary
    pub dlltool: PathBuf,
    /// gendef binary
    pub gendef: PathBuf,
}

/// Positional arguments of `uninstall`, taken as given since nothing uses them.
#[derive(Args, Debug, Clone)]
pub struct UninstallArgs {
    /// Target architecture
    pub arch: String,
    /// Release tag, e.g. R65
    pub version: String,
    /// Install prefix
    pub prefix: PathBuf,
    /// dlltool binary
    pub dlltool: PathBuf,
    /// gendef binary
    pub gendef: PathBuf,
}

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` is honored; without it only warnings are shown. `debug`
/// raises this workspace's crates to `debug` on top of that.
pub fn init_tracing(debug: bool) -> anyhow::Result<()> {
    let mut filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();

    if debug {
        for target in LOG_TARGETS {
            filter = filter.add_directive(format!("{target}=debug").parse()?);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))?;
    Ok(())
}
