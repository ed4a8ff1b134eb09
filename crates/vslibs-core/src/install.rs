//! The install flow.
//!
//! Everything is assembled in a staging tree first; the prefix is only
//! touched by the final sync, so a failed run leaves it unchanged.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use reqwest::Client;

use crate::error::InstallError;
use crate::implib;
use crate::io::download;
use crate::io::extract;
use crate::io::sync::{self, TreeStats};
use crate::layout::{KeptWorkArea, WorkArea};
use crate::pkgconfig::{self, PkgConfigVars, PythonVersion};
use crate::release::Release;
use crate::reporter::Reporter;
use crate::tools::Toolchain;

/// Script runtime shipped in the portable archive.
pub const VSSCRIPT_DLL: &str = "VSScript.dll";
/// Core import library inside `sdk/lib*`.
pub const VAPOURSYNTH_LIB: &str = "VapourSynth.lib";
/// Static archive built from [`VAPOURSYNTH_LIB`].
pub const VAPOURSYNTH_ARCHIVE: &str = "libvapoursynth.a";
/// Static archive built from [`VSSCRIPT_DLL`].
pub const VAPOURSYNTH_SCRIPT_ARCHIVE: &str = "libvapoursynth-script.a";

/// Inputs for one install run.
#[derive(Debug, Clone)]
pub struct InstallOptions {
    /// Release and architecture to fetch
    pub release: Release,
    /// Destination prefix
    pub prefix: PathBuf,
    /// External programs
    pub toolchain: Toolchain,
    /// Python version for `vapoursynth-script.pc`
    pub python: PythonVersion,
    /// Directory the work area is created in
    pub work_base: PathBuf,
    /// Keep the work area after the run (also on failure)
    pub keep_work: bool,
}

/// Outcome of a successful install.
#[derive(Debug, Clone)]
pub struct InstallReport {
    /// Where the files were installed
    pub prefix: PathBuf,
    /// Files and bytes synced into the prefix
    pub installed: TreeStats,
    /// Symbols exported through `libvapoursynth.a`
    pub exports: usize,
    /// Work area paths, when kept
    pub kept: Option<KeptWorkArea>,
}

/// Runs the install flow and reports progress.
#[derive(Clone)]
pub struct Installer {
    client: Client,
    reporter: Arc<dyn Reporter>,
}

impl fmt::Debug for Installer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Installer").finish_non_exhaustive()
    }
}

impl Installer {
    /// Create an installer with the default HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(reporter: Arc<dyn Reporter>) -> Result<Self, InstallError> {
        Ok(Self::with_client(download::client()?, reporter))
    }

    /// Create an installer around an existing client.
    pub fn with_client(client: Client, reporter: Arc<dyn Reporter>) -> Self {
        Self { client, reporter }
    }

    /// Provision the libraries described by `opts` into `opts.prefix`.
    ///
    /// The version gate runs before anything is downloaded or created.
    ///
    /// # Errors
    ///
    /// Returns the first failing step's error. The work area is removed
    /// unless `keep_work` is set.
    pub async fn install(&self, opts: &InstallOptions) -> Result<InstallReport, InstallError> {
        opts.release.version.check_supported()?;

        let area = WorkArea::create(&opts.work_base)?;

        let (exports, installed) = match self.run_steps(&area, opts).await {
            Ok(done) => done,
            Err(e) => {
                if opts.keep_work
                    && let Ok(Some(kept)) = area.finish(true)
                {
                    self.reporter.warning(&format!(
                        "Work files kept in {}",
                        kept.work.display()
                    ));
                }
                return Err(e);
            }
        };

        let kept = area.finish(opts.keep_work)?;
        if let Some(kept) = &kept {
            tracing::info!(
                "Kept work area {} and staging tree {}",
                kept.work.display(),
                kept.stage.display()
            );
        }

        Ok(InstallReport {
            prefix: opts.prefix.clone(),
            installed,
            exports,
            kept,
        })
    }

    async fn run_steps(
        &self,
        area: &WorkArea,
        opts: &InstallOptions,
    ) -> Result<(usize, TreeStats), InstallError> {
        let release = &opts.release;
        let toolchain = &opts.toolchain;
        let reporter: &dyn Reporter = self.reporter.as_ref();

        // Phase 1: Portable distribution
        reporter.section("Downloading");
        let portable_name = release.portable_archive_name();
        let portable = area.work().join(&portable_name);
        download::download_to_file(
            &self.client,
            &release.portable_archive_url(),
            &portable,
            reporter,
        )
        .await?;

        reporter.extracting(&portable_name, 0, None);
        extract::extract_with_7z(&toolchain.sevenzip, &portable, area.work())?;
        reporter.done(&portable_name, "extracted", None);

        // Phase 2: Runtime DLL
        reporter.section("Local installing binaries");
        let dll = area.work().join(VSSCRIPT_DLL);
        require_file(&dll, &portable_name)?;
        let bin_dir = area.stage_bin();
        fs::create_dir_all(&bin_dir)?;
        let size = fs::copy(&dll, bin_dir.join(VSSCRIPT_DLL))?;
        reporter.done(VSSCRIPT_DLL, "staged", Some(size));

        // Phase 3: Static archives
        reporter.section("Creating library");
        let lib_dir = area.stage_lib();
        fs::create_dir_all(&lib_dir)?;

        let import_lib = area
            .work()
            .join(release.arch.sdk_lib_dir())
            .join(VAPOURSYNTH_LIB);
        require_file(&import_lib, &portable_name)?;

        let definition = implib::lib_to_archive(
            toolchain,
            release.arch,
            &import_lib,
            &lib_dir.join(VAPOURSYNTH_ARCHIVE),
            area.work(),
        )?;
        reporter.done(
            VAPOURSYNTH_ARCHIVE,
            &format!("{} exports", definition.exports.len()),
            None,
        );

        implib::dll_to_archive(
            toolchain,
            release.arch,
            &dll,
            &lib_dir.join(VAPOURSYNTH_SCRIPT_ARCHIVE),
        )?;
        reporter.done(VAPOURSYNTH_SCRIPT_ARCHIVE, "created", None);

        // Phase 4: pkg-config
        reporter.section("Creating pkgconfig");
        let vars = PkgConfigVars {
            prefix: opts.prefix.to_string_lossy().into_owned(),
            version: release.version.suffix().to_string(),
            python: opts.python,
        };
        for path in pkgconfig::write_pkgconfig_files(&area.stage_pkgconfig(), &vars)? {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            reporter.done(&name, "written", None);
        }

        // Phase 5: Headers
        reporter.section("Fetching headers");
        let source_name = release.source_archive_name();
        let tarball = area.work().join(&source_name);
        download::download_to_file(
            &self.client,
            &release.source_archive_url(),
            &tarball,
            reporter,
        )
        .await?;

        reporter.extracting(&source_name, 0, None);
        let headers = extract::extract_tar_gz_subtree(
            &tarball,
            &area.stage_headers(),
            Path::new(&release.source_include_dir()),
        )?;
        reporter.done(&source_name, &format!("{} headers", headers.len()), None);

        // Phase 6: Sync
        reporter.section(&format!("Installing to {}", opts.prefix.display()));
        let installed = sync::sync_tree(&toolchain.rsync, area.stage(), &opts.prefix)?;
        reporter.success(&format!(
            "Installed {} files into {}",
            installed.files,
            opts.prefix.display()
        ));

        Ok((definition.exports.len(), installed))
    }
}

fn require_file(path: &Path, archive: &str) -> Result<(), InstallError> {
    if path.is_file() {
        return Ok(());
    }
    Err(InstallError::context(
        "Unexpected portable archive layout",
        format!("{} missing after extracting {archive}", path.display()),
    ))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::arch::Arch;
    use crate::testutil::fake_tool;
    use crate::version::{ReleaseVersion, VersionError};
    use crate::NullReporter;
    use flate2::Compression;
    use flate2::write::GzEncoder;

    const FAKE_7Z: &str = r#"
for a in "$@"; do
  case "$a" in
    -o*) out="${a#-o}" ;;
  esac
done
mkdir -p "$out/sdk/lib64"
printf 'MZ' > "$out/VSScript.dll"
printf '!<arch>\n' > "$out/sdk/lib64/VapourSynth.lib"
"#;

    const FAKE_NM: &str = r#"
printf '00000000 getVapourSynthAPI\n'
printf '00000000 T __imp_getVapourSynthAPI\n'
"#;

    const FAKE_GENDEF: &str = r#"
stem=$(basename "$1" .dll)
printf 'LIBRARY "%s"\nEXPORTS\ngetVSScriptAPI\n' "$1" > "$stem.def"
"#;

    const FAKE_DLLTOOL: &str = r#"
while [ $# -gt 0 ]; do
  case "$1" in
    -l) out="$2"; shift 2 ;;
    *) shift ;;
  esac
done
printf 'archive' > "$out"
"#;

    // Copies "<src>/." into "<dst>", mirroring `rsync -a src/ dst`
    const FAKE_RSYNC: &str = r#"
mkdir -p "$3"
cp -R "$2." "$3"
"#;

    fn toolchain(dir: &Path) -> Toolchain {
        Toolchain::new(
            fake_tool(dir, "dlltool", FAKE_DLLTOOL),
            fake_tool(dir, "gendef", FAKE_GENDEF),
        )
        .with_nm(fake_tool(dir, "llvm-nm", FAKE_NM))
        .with_sevenzip(fake_tool(dir, "7z", FAKE_7Z))
        .with_rsync(fake_tool(dir, "rsync", FAKE_RSYNC))
    }

    fn source_tarball() -> Vec<u8> {
        let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
        for (path, data) in [
            ("vapoursynth-R65/include/VapourSynth4.h", &b"// vs4"[..]),
            ("vapoursynth-R65/include/VSScript4.h", &b"// vss4"[..]),
            ("vapoursynth-R65/src/core/vscore.cpp", &b"core"[..]),
        ] {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, path, data).unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap()
    }

    fn options(base: &Path, tag: &str, server_url: &str) -> InstallOptions {
        let version = ReleaseVersion::parse(tag).unwrap();
        InstallOptions {
            release: Release::new(Arch::X64, version).with_base_url(server_url),
            prefix: base.join("prefix"),
            toolchain: toolchain(&base.join("tools")),
            python: PythonVersion::default(),
            work_base: base.join("work"),
            keep_work: false,
        }
    }

    fn installer() -> Installer {
        Installer::new(Arc::new(NullReporter)).unwrap()
    }

    #[tokio::test]
    async fn test_install_assembles_prefix() {
        let mut server = mockito::Server::new_async().await;
        let zip = server
            .mock("GET", "/releases/download/R65/VapourSynth64-Portable-R65.zip")
            .with_body("PK")
            .create_async()
            .await;
        let tarball = server
            .mock("GET", "/archive/R65.tar.gz")
            .with_body(source_tarball())
            .create_async()
            .await;

        let base = tempfile::tempdir().unwrap();
        fs::create_dir_all(base.path().join("tools")).unwrap();
        let opts = options(base.path(), "R65", &server.url());

        let report = installer().install(&opts).await.unwrap();

        zip.assert_async().await;
        tarball.assert_async().await;

        let prefix = base.path().join("prefix");
        assert_eq!(report.exports, 1);
        assert!(report.kept.is_none());
        assert!(prefix.join("bin/VSScript.dll").is_file());
        assert!(prefix.join("lib/libvapoursynth.a").is_file());
        assert!(prefix.join("lib/libvapoursynth-script.a").is_file());
        assert!(prefix.join("include/vapoursynth/VapourSynth4.h").is_file());
        assert!(!prefix.join("include/vapoursynth/src").exists());

        let pc = fs::read_to_string(prefix.join("lib/pkgconfig/vapoursynth.pc")).unwrap();
        assert!(pc.contains(&format!("prefix={}", prefix.display())));
        assert!(pc.contains("Version: 65"));
        assert!(prefix.join("lib/pkgconfig/vapoursynth-script.pc").is_file());

        // Work area is gone once the run completes
        let leftovers = fs::read_dir(base.path().join("work")).unwrap().count();
        assert_eq!(leftovers, 0);
    }

    #[tokio::test]
    async fn test_old_release_is_rejected_before_any_work() {
        let mut server = mockito::Server::new_async().await;
        let zip = server
            .mock("GET", mockito::Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let base = tempfile::tempdir().unwrap();
        fs::create_dir_all(base.path().join("tools")).unwrap();
        let opts = options(base.path(), "R57", &server.url());

        let err = installer().install(&opts).await.unwrap_err();

        assert!(matches!(
            err,
            InstallError::Version(VersionError::TooOld { minimum: 58, .. })
        ));
        assert!(!base.path().join("work").exists());
        assert!(!base.path().join("prefix").exists());
        zip.assert_async().await;
    }

    #[tokio::test]
    async fn test_failed_download_leaves_prefix_untouched() {
        let mut server = mockito::Server::new_async().await;
        let _zip = server
            .mock("GET", "/releases/download/R65/VapourSynth64-Portable-R65.zip")
            .with_status(404)
            .create_async()
            .await;

        let base = tempfile::tempdir().unwrap();
        fs::create_dir_all(base.path().join("tools")).unwrap();
        let mut opts = options(base.path(), "R65", &server.url());
        opts.keep_work = true;

        let err = installer().install(&opts).await.unwrap_err();

        assert!(matches!(err, InstallError::Download(_)));
        assert!(!base.path().join("prefix").exists());
        // Kept for inspection on failure
        let kept = fs::read_dir(base.path().join("work")).unwrap().count();
        assert_eq!(kept, 2);
    }
}
