//! catkin_make invocations

use crate::index::Selection;
use crate::process::ToolCommand;
use crate::workspace::Workspace;

/// `catkin_make` restricted to `whitelist`, or unrestricted when it is empty.
///
/// catkin caches the whitelist in CMakeCache.txt, so an unrestricted build
/// passes it empty to clear a previous restriction.
pub fn command(workspace: &Workspace, whitelist: &[&str]) -> ToolCommand {
    ToolCommand::new(&workspace.config.tools.catkin_make)
        .args(["--directory", workspace.root.as_str()])
        .args(workspace.config.tools.catkin_args.iter().cloned())
        .arg(format!("-DCATKIN_WHITELIST_PACKAGES={}", whitelist.join(";")))
        .current_dir(&workspace.root)
}

/// Build command for the update pipeline
pub fn build_command(workspace: &Workspace, selection: Option<&Selection<'_>>) -> ToolCommand {
    let whitelist = selection.map(Selection::names).unwrap_or_default();
    command(workspace, &whitelist)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use camino::Utf8PathBuf;

    #[test]
    fn test_unrestricted_build_clears_whitelist() {
        let mut config = Config::default();
        config.tools.catkin_args = vec!["-j4".to_string()];
        let workspace = Workspace::with_config(Utf8PathBuf::from("/ws"), config);

        let command = build_command(&workspace, None);

        assert_eq!(command.program, "catkin_make");
        assert_eq!(
            command.args,
            vec!["--directory", "/ws", "-j4", "-DCATKIN_WHITELIST_PACKAGES="]
        );
        assert_eq!(command.current_dir, Some(Utf8PathBuf::from("/ws")));
    }

    #[test]
    fn test_whitelist_keeps_order() {
        let workspace = Workspace::with_config(Utf8PathBuf::from("/ws"), Config::default());

        let command = command(&workspace, &["robot_msgs", "robot_driver"]);

        assert_eq!(
            command.args.last().map(String::as_str),
            Some("-DCATKIN_WHITELIST_PACKAGES=robot_msgs;robot_driver")
        );
    }
}
