//! Uninstall command

use anyhow::Result;
use vslibs_core::Reporter;

use crate::UninstallArgs;
use crate::ui::Output;

/// Accept the uninstall form without touching the prefix.
///
/// Installed files are not tracked, so there is nothing reliable to remove.
pub fn uninstall(target: &UninstallArgs) -> Result<()> {
    tracing::debug!(?target, "uninstall requested");
    Output::new().warning(&format!(
        "Uninstall is not supported; nothing was removed from {}",
        target.prefix.display()
    ));
    Ok(())
}
