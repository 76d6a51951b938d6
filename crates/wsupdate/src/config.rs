//! Configuration file parsing and merging
//!
//! This module handles parsing of `wsupdate.toml` and `wsupdate.local.toml`
//! at the workspace root. Both files are optional; every setting has a
//! default.

use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;

use crate::Result;

/// Shared configuration file name
pub const CONFIG_FILE: &str = "wsupdate.toml";
/// Per-developer overrides, merged over [`CONFIG_FILE`]
pub const LOCAL_CONFIG_FILE: &str = "wsupdate.local.toml";

/// Main configuration structure for wsupdate
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Workspace layout
    pub workspace: WorkspaceConfig,

    /// Build environment requirements
    pub environment: EnvironmentConfig,

    /// Java message generation
    pub genmsgs: GenmsgsConfig,

    /// `--reset` settings
    pub reset: ResetConfig,

    /// External tool programs
    pub tools: ToolsConfig,
}

/// Workspace layout, all paths relative to the workspace root
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Package source directory (default: "src")
    pub source_dir: Utf8PathBuf,

    /// catkin build directory (default: "build")
    pub build_dir: Utf8PathBuf,

    /// catkin devel directory (default: "devel")
    pub devel_dir: Utf8PathBuf,

    /// Package holding the `.rosinstall` fragments for this workspace
    pub manifest_package: Utf8PathBuf,

    /// Name of the merged rosinstall file (default: ".rosinstall")
    pub rosinstall: String,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            source_dir: Utf8PathBuf::from("src"),
            build_dir: Utf8PathBuf::from("build"),
            devel_dir: Utf8PathBuf::from("devel"),
            manifest_package: Utf8PathBuf::from("src/workspace_manifests"),
            rosinstall: ".rosinstall".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    /// Setup script captured before running tools (default: "devel/setup.sh")
    pub setup_script: Utf8PathBuf,

    /// Variables that must be defined once the environment is set up
    pub required: Vec<String>,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            setup_script: Utf8PathBuf::from("devel/setup.sh"),
            required: vec!["ROS_PACKAGE_PATH".to_string()],
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GenmsgsConfig {
    /// Message packages handed to genjava_message_artifacts
    pub packages: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ResetConfig {
    /// Package rebuilt after the build directories are deleted
    pub package: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub wstool: String,
    pub genjava: String,
    pub catkin_make: String,
    /// Extra arguments appended to every catkin_make invocation
    pub catkin_args: Vec<String>,
    /// Used when a project has no Gradle wrapper
    pub gradle: String,
    /// Wrapper script looked up in each project directory
    pub gradle_wrapper: String,
    pub eclipse_tasks: Vec<String>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            wstool: "wstool".to_string(),
            genjava: "genjava_message_artifacts".to_string(),
            catkin_make: "catkin_make".to_string(),
            catkin_args: Vec::new(),
            gradle: "gradle".to_string(),
            gradle_wrapper: "gradlew".to_string(),
            eclipse_tasks: vec!["cleanEclipse".to_string(), "eclipse".to_string()],
        }
    }
}

impl Config {
    /// Load configuration from a workspace directory.
    ///
    /// This loads `wsupdate.toml` and merges `wsupdate.local.toml` over it if
    /// it exists.
    pub fn load(workspace_root: &Utf8Path) -> Result<Self> {
        let base_config = read_toml(&workspace_root.join(CONFIG_FILE))?
            .unwrap_or_else(|| toml::Value::Table(toml::map::Map::new()));

        let merged = match read_toml(&workspace_root.join(LOCAL_CONFIG_FILE))? {
            Some(local) => merge_toml_values(base_config, local),
            None => base_config,
        };

        let config: Config = merged.try_into()?;
        Ok(config)
    }

    /// Load configuration from a string
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }
}

fn read_toml(path: &Utf8Path) -> Result<Option<toml::Value>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)?;
    tracing::debug!(path = %path, "Loaded configuration file");
    Ok(Some(toml::from_str::<toml::Value>(&content)?))
}

/// Merge two TOML values:
/// - Tables: recursively merged
/// - Arrays: local replaces base (not merged)
/// - Primitives: local overrides base
fn merge_toml_values(base: toml::Value, local: toml::Value) -> toml::Value {
    match (base, local) {
        (toml::Value::Table(mut base_table), toml::Value::Table(local_table)) => {
            for (key, local_value) in local_table {
                let merged = match base_table.remove(&key) {
                    Some(base_value) => merge_toml_values(base_value, local_value),
                    None => local_value,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, local) => local,
    }
}
