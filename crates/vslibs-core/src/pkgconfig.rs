//! pkg-config metadata for the staged libraries.
//!
//! The two `.pc` bodies are fixed templates with `%%TOKEN%%` placeholders.
//! Placeholders are resolved in a single pass over the template, so values
//! are inserted verbatim and never rescanned.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// File name of the core library's pkg-config file.
pub const VAPOURSYNTH_PC_NAME: &str = "vapoursynth.pc";

/// File name of the script library's pkg-config file.
pub const VAPOURSYNTH_SCRIPT_PC_NAME: &str = "vapoursynth-script.pc";

const VAPOURSYNTH_PC: &str = "\
prefix=%%PREFIX%%
exec_prefix=${prefix}
libdir=${exec_prefix}/lib
includedir=${prefix}/include/vapoursynth

Name: vapoursynth
Description: A frameserver for the 21st century
Version: %%VERSION%%

Requires.private: zimg
Libs: -L${libdir} -lvapoursynth
Libs.private: -L${libdir} -lzimg
Cflags: -I${includedir}
";

const VAPOURSYNTH_SCRIPT_PC: &str = "\
prefix=%%PREFIX%%
exec_prefix=${prefix}
libdir=${exec_prefix}/lib
includedir=${prefix}/include/vapoursynth

Name: vapoursynth-script
Description: Library for interfacing VapourSynth with Python
Version: %%VERSION%%

Requires: vapoursynth
Requires.private: python-%%PY_VER_DOT%%
Libs: -L${libdir} -lvapoursynth-script
Libs.private: -lpython%%PY_VER%%
Cflags: -I${includedir}
";

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%%[A-Z_]+%%").expect("placeholder pattern is valid"));

/// Errors from rendering or writing pkg-config files.
#[derive(Error, Debug)]
pub enum PkgConfigError {
    /// The Python version is not `MAJOR.MINOR`.
    #[error("Invalid Python version '{0}': expected MAJOR.MINOR such as 3.12")]
    InvalidPythonVersion(String),

    /// A template contains a placeholder with no value.
    #[error("Unresolved placeholder {token} in {file}")]
    Unresolved {
        /// Template being rendered
        file: &'static str,
        /// The placeholder, including its `%%` delimiters
        token: String,
    },

    /// A `.pc` file or its directory could not be written.
    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        /// Path that failed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Python version the script library links against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PythonVersion {
    /// Major version (`3`)
    pub major: u32,
    /// Minor version (`12`)
    pub minor: u32,
}

impl PythonVersion {
    /// Dotted form used in pkg-config package names (`3.12`).
    pub fn dotted(&self) -> String {
        format!("{}.{}", self.major, self.minor)
    }

    /// Compact form used in library names (`312`).
    pub fn compact(&self) -> String {
        format!("{}{}", self.major, self.minor)
    }
}

impl Default for PythonVersion {
    fn default() -> Self {
        Self {
            major: 3,
            minor: 12,
        }
    }
}

impl std::fmt::Display for PythonVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.dotted())
    }
}

impl std::str::FromStr for PythonVersion {
    type Err = PkgConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PkgConfigError::InvalidPythonVersion(s.to_string());
        let (major, minor) = s.trim().split_once('.').ok_or_else(invalid)?;
        Ok(Self {
            major: major.parse().map_err(|_| invalid())?,
            minor: minor.parse().map_err(|_| invalid())?,
        })
    }
}

/// Values substituted into both templates.
#[derive(Debug, Clone)]
pub struct PkgConfigVars {
    /// Install prefix written to `prefix=`
    pub prefix: String,
    /// Release number written to `Version:`
    pub version: String,
    /// Python version for the script library
    pub python: PythonVersion,
}

/// Render `vapoursynth.pc`.
///
/// # Errors
///
/// Returns [`PkgConfigError::Unresolved`] if the template has a placeholder
/// without a value.
pub fn render_vapoursynth(vars: &PkgConfigVars) -> Result<String, PkgConfigError> {
    substitute(
        VAPOURSYNTH_PC_NAME,
        VAPOURSYNTH_PC,
        &[
            ("%%PREFIX%%", vars.prefix.clone()),
            ("%%VERSION%%", vars.version.clone()),
        ],
    )
}

/// Render `vapoursynth-script.pc`.
///
/// # Errors
///
/// Returns [`PkgConfigError::Unresolved`] if the template has a placeholder
/// without a value.
pub fn render_vapoursynth_script(vars: &PkgConfigVars) -> Result<String, PkgConfigError> {
    substitute(
        VAPOURSYNTH_SCRIPT_PC_NAME,
        VAPOURSYNTH_SCRIPT_PC,
        &[
            ("%%PREFIX%%", vars.prefix.clone()),
            ("%%VERSION%%", vars.version.clone()),
            ("%%PY_VER_DOT%%", vars.python.dotted()),
            ("%%PY_VER%%", vars.python.compact()),
        ],
    )
}

fn substitute(
    file: &'static str,
    template: &str,
    values: &[(&str, String)],
) -> Result<String, PkgConfigError> {
    let lookup = |token: &str| {
        values
            .iter()
            .find(|(name, _)| *name == token)
            .map(|(_, value)| value.as_str())
    };

    if let Some(missing) = PLACEHOLDER
        .find_iter(template)
        .find(|m| lookup(m.as_str()).is_none())
    {
        return Err(PkgConfigError::Unresolved {
            file,
            token: missing.as_str().to_string(),
        });
    }

    let rendered = PLACEHOLDER.replace_all(template, |caps: &regex::Captures<'_>| {
        lookup(&caps[0]).unwrap_or_default().to_string()
    });
    Ok(rendered.into_owned())
}

/// Write both `.pc` files into `dir`, creating it if needed.
///
/// Returns the written paths.
///
/// # Errors
///
/// Returns an error if rendering fails or a file cannot be written.
pub fn write_pkgconfig_files(
    dir: &Path,
    vars: &PkgConfigVars,
) -> Result<Vec<PathBuf>, PkgConfigError> {
    let files = [
        (VAPOURSYNTH_PC_NAME, render_vapoursynth(vars)?),
        (VAPOURSYNTH_SCRIPT_PC_NAME, render_vapoursynth_script(vars)?),
    ];

    fs::create_dir_all(dir).map_err(|source| PkgConfigError::Write {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut written = Vec::with_capacity(files.len());
    for (name, body) in files {
        let path = dir.join(name);
        tracing::debug!("Writing {}", path.display());
        fs::write(&path, body).map_err(|source| PkgConfigError::Write {
            path: path.clone(),
            source,
        })?;
        written.push(path);
    }

    Ok(written)
}
