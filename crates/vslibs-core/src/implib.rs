//! Import-library conversion for MinGW linkers.
//!
//! Two paths produce a `lib*.a` archive:
//! 1. From an MSVC import library: dump its symbols with `nm`, rebuild a
//!    module definition from them and feed it to `dlltool`.
//! 2. From a DLL: let `gendef` write the module definition, then `dlltool`.
//!
//! All paths handed in should be absolute; the DLL route runs its tools in
//! the DLL's directory.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use thiserror::Error;

use crate::arch::Arch;
use crate::process::{self, CommandError};
use crate::symbols::ModuleDefinition;
use crate::tools::Toolchain;

/// Scratch file receiving the raw `nm` output.
pub const SYMBOLS_FILE: &str = "symbols.txt";

/// Scratch module definition passed to `dlltool`.
pub const DEF_FILE: &str = "temp.def";

/// Errors from producing a static archive.
#[derive(Error, Debug)]
pub enum ImplibError {
    /// `nm`, `gendef` or `dlltool` failed.
    #[error(transparent)]
    Command(#[from] CommandError),

    /// A scratch file could not be read or written.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The input path has no usable file name.
    #[error("Invalid library path: {}", .0.display())]
    InvalidPath(PathBuf),

    /// `gendef` exited cleanly without writing the expected definition.
    #[error("gendef did not produce {}", .0.display())]
    MissingDefinition(PathBuf),
}

/// Convert an MSVC import library (`VapourSynth.lib`) into a static archive.
///
/// The scratch files are written to `scratch` and removed once `dlltool`
/// succeeds. Returns the module definition that was used.
///
/// # Errors
///
/// Returns an error if `nm` or `dlltool` fail or a scratch file cannot be
/// written.
pub fn lib_to_archive(
    toolchain: &Toolchain,
    arch: Arch,
    lib: &Path,
    output: &Path,
    scratch: &Path,
) -> Result<ModuleDefinition, ImplibError> {
    let library = lib
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| ImplibError::InvalidPath(lib.to_path_buf()))?;

    let symbols_path = scratch.join(SYMBOLS_FILE);
    let symbols_file = File::create(&symbols_path)?;
    process::run(
        Command::new(&toolchain.nm)
            .arg(lib)
            .stdout(Stdio::from(symbols_file)),
    )?;

    let text = String::from_utf8_lossy(&fs::read(&symbols_path)?).into_owned();
    let definition = ModuleDefinition::from_nm_output(library, &text);
    if definition.exports.is_empty() {
        tracing::warn!("No exported symbols found in {}", lib.display());
    } else {
        tracing::debug!(
            "{} exports parsed from {}",
            definition.exports.len(),
            lib.display()
        );
    }

    let def_path = scratch.join(DEF_FILE);
    fs::write(&def_path, definition.render())?;

    process::run(
        Command::new(&toolchain.dlltool)
            .arg("-m")
            .arg(arch.dlltool_machine())
            .arg("-d")
            .arg(&def_path)
            .arg("-l")
            .arg(output),
    )?;

    fs::remove_file(&symbols_path)?;
    fs::remove_file(&def_path)?;

    tracing::info!("Created {} from {}", output.display(), lib.display());
    Ok(definition)
}

/// Build a static archive for a DLL (`VSScript.dll`) via `gendef` + `dlltool`.
///
/// `gendef` writes `<stem>.def` next to the DLL; that file is kept. Returns
/// its path.
///
/// # Errors
///
/// Returns an error if either tool fails or `gendef` leaves no definition.
pub fn dll_to_archive(
    toolchain: &Toolchain,
    arch: Arch,
    dll: &Path,
    output: &Path,
) -> Result<PathBuf, ImplibError> {
    let invalid = || ImplibError::InvalidPath(dll.to_path_buf());
    let file_name = dll.file_name().ok_or_else(invalid)?;
    let stem = dll.file_stem().and_then(|s| s.to_str()).ok_or_else(invalid)?;
    let dir = match dll.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    process::run(Command::new(&toolchain.gendef).arg(file_name).current_dir(dir))?;

    let def_name = format!("{stem}.def");
    let def_path = dir.join(&def_name);
    if !def_path.is_file() {
        return Err(ImplibError::MissingDefinition(def_path));
    }

    process::run(
        Command::new(&toolchain.dlltool)
            .arg("-m")
            .arg(arch.dlltool_machine())
            .arg("-D")
            .arg(file_name)
            .arg("-d")
            .arg(&def_name)
            .arg("-l")
            .arg(output)
            .current_dir(dir),
    )?;

    tracing::info!("Created {} from {}", output.display(), dll.display());
    Ok(def_path)
}
