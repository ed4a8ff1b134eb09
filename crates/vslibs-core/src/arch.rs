//! Target architecture selection.

/// Target architecture of the portable distribution.
///
/// VapourSynth ships separate 32-bit and 64-bit portable archives, and the
/// architecture also decides which SDK import library is converted and which
/// machine type `dlltool` emits.
///
/// # Example
///
/// ```
/// use vslibs_core::Arch;
///
/// let arch: Arch = "64".parse().unwrap();
/// assert_eq!(arch.sdk_lib_dir(), "sdk/lib64");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Arch {
    /// 32-bit x86 (`i386`)
    X86,
    /// 64-bit x86 (`x86_64`)
    #[default]
    X64,
}

/// Error returned when an architecture string is not recognised.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown architecture: {0} (expected 32 or 64)")]
pub struct ArchError(pub String);

impl Arch {
    /// Bit width as it appears in the portable archive name (`32` / `64`).
    pub fn bits(&self) -> &'static str {
        match self {
            Self::X86 => "32",
            Self::X64 => "64",
        }
    }

    /// SDK directory inside the portable archive holding the import libraries.
    pub fn sdk_lib_dir(&self) -> &'static str {
        match self {
            Self::X86 => "sdk/lib32",
            Self::X64 => "sdk/lib64",
        }
    }

    /// Machine name passed to `dlltool -m`.
    pub fn dlltool_machine(&self) -> &'static str {
        match self {
            Self::X86 => "i386",
            Self::X64 => "i386:x86-64",
        }
    }
}

impl std::fmt::Display for Arch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.bits())
    }
}

impl std::str::FromStr for Arch {
    type Err = ArchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "32" | "x86" | "i386" | "i686" => Ok(Self::X86),
            "64" | "x64" | "x86_64" | "amd64" => Ok(Self::X64),
            _ => Err(ArchError(s.to_string())),
        }
    }
}
