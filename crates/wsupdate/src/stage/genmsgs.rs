//! Java message artifact generation

use crate::index::Selection;
use crate::process::ToolCommand;
use crate::workspace::Workspace;

/// Message packages to generate, or `None` when there are none.
///
/// With a selection, only configured message packages that are part of it
/// are generated.
pub fn command(workspace: &Workspace, selection: Option<&Selection<'_>>) -> Option<ToolCommand> {
    let packages: Vec<&str> = workspace
        .config
        .genmsgs
        .packages
        .iter()
        .map(String::as_str)
        .filter(|name| selection.is_none_or(|s| s.contains(name)))
        .collect();

    if packages.is_empty() {
        tracing::info!("No message packages to generate");
        return None;
    }

    Some(
        ToolCommand::new(&workspace.config.tools.genjava)
            .arg("-p")
            .args(packages)
            .current_dir(&workspace.root),
    )
}
