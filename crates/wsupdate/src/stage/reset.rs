//! `--reset`: wipe catkin output and rebuild one package

use crate::environment::BuildEnvironment;
use crate::process::ToolRunner;
use crate::stage::catkin;
use crate::workspace::Workspace;
use crate::{Error, Result};

/// What a reset did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetOutcome {
    /// The build directory did not exist; nothing was deleted or rebuilt
    NothingToReset,
    /// Build output was deleted and the reset package rebuilt
    Rebuilt,
}

/// Delete the build and devel directories, then rebuild the configured
/// reset package.
///
/// The environment is captured before the devel directory (and with it the
/// setup script) is removed. A dry run uses the current environment without
/// checking it.
pub fn reset(workspace: &Workspace, dry_run: bool) -> Result<ResetOutcome> {
    let build_dir = workspace.build_dir();
    if !build_dir.is_dir() {
        tracing::warn!("Build directory {} does not exist, nothing to reset", build_dir);
        return Ok(ResetOutcome::NothingToReset);
    }

    let package = workspace.config.reset.package.as_deref().ok_or_else(|| {
        Error::config(
            "No package configured for --reset",
            "Set `package` in the [reset] table of wsupdate.toml",
        )
    })?;

    let env = if dry_run {
        BuildEnvironment::from_vars(std::env::vars())
    } else {
        BuildEnvironment::resolve(workspace)?
    };

    for dir in [build_dir, workspace.devel_dir()] {
        if !dir.exists() {
            continue;
        }
        if dry_run {
            tracing::info!("Would remove {}", dir);
        } else {
            std::fs::remove_dir_all(&dir)?;
            tracing::info!("Removed {}", dir);
        }
    }

    tracing::info!("Rebuilding {}", package);
    let runner = ToolRunner::new(&env).dry_run(dry_run);
    runner.run(&catkin::command(workspace, &[package]))?;

    Ok(ResetOutcome::Rebuilt)
}
