//! Install command

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use vslibs_core::{InstallOptions, Installer, Release, ReleaseVersion, Reporter, Toolchain};

use crate::ui::Output;
use crate::{InstallArgs, Options};

/// Run the full install flow for one release into `target.prefix`.
pub async fn install(target: &InstallArgs, options: &Options) -> Result<()> {
    let output = Output::new();
    let version = ReleaseVersion::parse(&target.version)?;

    let opts = InstallOptions {
        release: Release::new(target.arch, version).with_base_url(&options.release_url),
        prefix: target.prefix.clone(),
        toolchain: Toolchain::new(&target.dlltool, &target.gendef).with_nm(&options.nm),
        python: options.python_version,
        work_base: options.work_dir.clone(),
        keep_work: options.keep_work,
    };

    output.info(&format!(
        "VapourSynth {} ({}-bit) -> {}",
        opts.release.version,
        opts.release.arch,
        opts.prefix.display()
    ));

    let start = Instant::now();
    let installer =
        Installer::new(Arc::new(output.clone())).context("Failed to set up HTTP client")?;
    let report = installer.install(&opts).await?;

    output.summary(
        &format!(
            "{} files installed ({} exports in libvapoursynth.a)",
            report.installed.files, report.exports
        ),
        start.elapsed().as_secs_f64(),
    );
    if let Some(kept) = &report.kept {
        output.info(&format!(
            "Work area kept: {} (staging {})",
            kept.work.display(),
            kept.stage.display()
        ));
    }

    Ok(())
}
