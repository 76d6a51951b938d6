//! Eclipse project regeneration through Gradle

use camino::Utf8Path;
use walkdir::WalkDir;

use crate::index::Selection;
use crate::process::ToolCommand;
use crate::workspace::Workspace;
use crate::{Error, Result};

/// Marker of a Gradle project directory
const GRADLE_BUILD_FILE: &str = "build.gradle";

/// One Gradle invocation per project directory directly under the source
/// directory.
///
/// The project's own wrapper is preferred over the configured `gradle`.
/// With a selection, only directories of selected packages are considered.
pub fn commands(workspace: &Workspace, selection: Option<&Selection<'_>>) -> Result<Vec<ToolCommand>> {
    let tools = &workspace.config.tools;
    let source_dir = workspace.source_dir();
    let mut commands = Vec::new();

    if !source_dir.is_dir() {
        return Ok(commands);
    }

    let walker = WalkDir::new(&source_dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name();

    for entry in walker {
        let entry = entry.map_err(|e| {
            Error::Io(e.into_io_error().unwrap_or_else(|| {
                std::io::Error::other(format!("failed to read {}", source_dir))
            }))
        })?;
        if !entry.file_type().is_dir() {
            continue;
        }
        let Some(dir) = Utf8Path::from_path(entry.path()) else {
            continue;
        };
        if !dir.join(GRADLE_BUILD_FILE).is_file() {
            continue;
        }
        if let Some(selection) = selection {
            if !selection.paths().iter().any(|path| path.as_path() == dir) {
                tracing::debug!(path = %dir, "Not selected, skipping Gradle project");
                continue;
            }
        }

        let wrapper = dir.join(&tools.gradle_wrapper);
        let program = if wrapper.is_file() {
            wrapper.into_string()
        } else {
            tools.gradle.clone()
        };

        commands.push(
            ToolCommand::new(program)
                .args(tools.eclipse_tasks.iter().cloned())
                .current_dir(dir),
        );
    }

    Ok(commands)
}
