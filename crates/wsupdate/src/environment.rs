//! Build environment for external tools
//!
//! Tools run with an explicit variable map instead of a mutated process
//! environment. When the workspace has a setup script, the map is what the
//! script exports; otherwise it is the environment wsupdate was started with.

use std::collections::BTreeMap;
use std::process::Command;

use camino::Utf8Path;

use crate::workspace::Workspace;
use crate::{Error, Result};

/// Environment variables handed to every external tool
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildEnvironment {
    vars: BTreeMap<String, String>,
}

impl BuildEnvironment {
    /// Set up the environment for `workspace` and check the required variables
    pub fn resolve(workspace: &Workspace) -> Result<Self> {
        let script = workspace.setup_script();
        let env = if script.is_file() {
            tracing::info!("Sourcing {}", script);
            Self::from_setup_script(&script)?
        } else {
            tracing::debug!("No setup script at {}, using the current environment", script);
            Self::from_vars(std::env::vars())
        };

        env.require(&workspace.config.environment.required, &script)?;
        Ok(env)
    }

    /// Build an environment from explicit variables
    pub fn from_vars<K, V>(vars: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: vars
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Capture the variables exported by a POSIX shell script
    pub fn from_setup_script(script: &Utf8Path) -> Result<Self> {
        let output = Command::new("sh")
            .arg("-c")
            .arg(". \"$1\" >/dev/null && env -0")
            .arg("sh")
            .arg(script.as_str())
            .output()
            .map_err(|source| Error::ToolSpawn {
                tool: "sh".to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(Error::tool_failure(format!("sourcing {}", script), output.status));
        }

        Ok(Self::from_env_output(&String::from_utf8_lossy(&output.stdout)))
    }

    /// Parse `env -0` output, `KEY=VALUE` entries separated by NUL
    fn from_env_output(output: &str) -> Self {
        Self::from_vars(
            output
                .split('\0')
                .filter_map(|line| line.split_once('='))
                .filter(|(key, _)| !key.is_empty() && !key.contains(char::is_whitespace)),
        )
    }

    /// Fail with [`Error::EnvironmentNotSourced`] on the first missing variable
    pub fn require(&self, required: &[String], setup_script: &Utf8Path) -> Result<()> {
        match required.iter().find(|name| !self.vars.contains_key(name.as_str())) {
            Some(missing) => Err(Error::EnvironmentNotSourced {
                variable: missing.clone(),
                setup_script: setup_script.to_path_buf(),
            }),
            None => Ok(()),
        }
    }

    pub fn vars(&self) -> &BTreeMap<String, String> {
        &self.vars
    }
}
