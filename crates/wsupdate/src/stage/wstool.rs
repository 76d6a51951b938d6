//! Repository sync with wstool

use camino::Utf8PathBuf;

use crate::Result;
use crate::process::ToolCommand;
use crate::workspace::Workspace;

/// Merge every rosinstall fragment of the manifest package, then update.
///
/// Fragments are files named `*<rosinstall>` other than the merged file
/// itself, merged in name order.
pub fn commands(workspace: &Workspace) -> Result<Vec<ToolCommand>> {
    let tool = &workspace.config.tools.wstool;
    let source_dir = workspace.source_dir();

    let mut commands: Vec<ToolCommand> = fragments(workspace)?
        .into_iter()
        .map(|fragment| {
            // Without --confirm-all, wstool waits for an answer on stdin
            ToolCommand::new(tool)
                .args(["merge", "--confirm-all", "-t", source_dir.as_str()])
                .arg(fragment.as_str())
                .current_dir(&workspace.root)
        })
        .collect();

    commands.push(
        ToolCommand::new(tool)
            .args(["update", "-t", source_dir.as_str()])
            .current_dir(&workspace.root),
    );
    Ok(commands)
}

/// Rosinstall fragments of the manifest package, sorted by name
pub fn fragments(workspace: &Workspace) -> Result<Vec<Utf8PathBuf>> {
    let manifest_dir = workspace.manifest_dir();
    let merged_name = workspace.config.workspace.rosinstall.as_str();

    if !manifest_dir.is_dir() {
        tracing::warn!("Manifest package {} not found, no fragments to merge", manifest_dir);
        return Ok(Vec::new());
    }

    let mut fragments = Vec::new();
    for entry in manifest_dir.read_dir_utf8()? {
        let entry = entry?;
        let name = entry.file_name();
        if name.ends_with(merged_name) && name != merged_name && entry.path().is_file() {
            fragments.push(entry.path().to_path_buf());
        }
    }
    fragments.sort();
    Ok(fragments)
}
