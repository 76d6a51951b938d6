//! Workspace update stages
//!
//! This module provides the update pipeline:
//! - Planning the tool invocations of each stage
//! - Running the selected stages in order with progress display
//! - The `--reset` mode, which replaces the regular stages

pub mod catkin;
pub mod eclipse;
pub mod genmsgs;
pub mod reset;
pub mod wstool;

use std::fmt;

use crate::Result;
use crate::index::Selection;
use crate::process::{ToolCommand, ToolRunner};
use crate::progress::StageProgress;
use crate::workspace::Workspace;

/// One step of the update pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Merge rosinstall fragments and update sources
    Wstool,
    /// Generate Java message artifacts
    Genmsgs,
    /// Build with catkin_make
    Catkin,
    /// Regenerate Eclipse project files
    Eclipse,
}

impl Stage {
    /// Every stage in execution order
    pub const ALL: [Stage; 4] = [Stage::Wstool, Stage::Genmsgs, Stage::Catkin, Stage::Eclipse];

    /// Whether a package restriction applies to this stage.
    ///
    /// wstool syncs the whole source tree and may bring in the requested
    /// packages, so it always runs unrestricted.
    pub fn is_package_scoped(self) -> bool {
        !matches!(self, Stage::Wstool)
    }

    /// Message logged when the stage starts
    fn description(self) -> &'static str {
        match self {
            Stage::Wstool => "Execute wstool",
            Stage::Genmsgs => "Execute genjava_message_artifacts",
            Stage::Catkin => "Execute catkin_make",
            Stage::Eclipse => "Update eclipse projects files",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Wstool => write!(f, "wstool"),
            Stage::Genmsgs => write!(f, "genmsgs"),
            Stage::Catkin => write!(f, "catkin"),
            Stage::Eclipse => write!(f, "eclipse"),
        }
    }
}

/// Runs update stages against a workspace
pub struct Updater<'a> {
    workspace: &'a Workspace,
    runner: ToolRunner<'a>,
    selection: Option<&'a Selection<'a>>,
}

impl<'a> Updater<'a> {
    pub fn new(workspace: &'a Workspace, runner: ToolRunner<'a>) -> Self {
        Self {
            workspace,
            runner,
            selection: None,
        }
    }

    /// Restrict package-level stages to `selection`
    pub fn with_selection(mut self, selection: &'a Selection<'a>) -> Self {
        self.selection = Some(selection);
        self
    }

    /// Tool invocations for `stage`, in order
    pub fn plan(&self, stage: Stage) -> Result<Vec<ToolCommand>> {
        let commands = match stage {
            Stage::Wstool => wstool::commands(self.workspace)?,
            Stage::Genmsgs => genmsgs::command(self.workspace, self.selection)
                .into_iter()
                .collect(),
            Stage::Catkin => vec![catkin::build_command(self.workspace, self.selection)],
            Stage::Eclipse => eclipse::commands(self.workspace, self.selection)?,
        };
        Ok(commands)
    }

    /// Run `stages` in order, stopping at the first failure
    pub fn run(&self, stages: &[Stage]) -> Result<()> {
        let progress = StageProgress::new(stages.len());

        for &stage in stages {
            tracing::info!("{}", stage.description());
            progress.start_stage(stage);

            let commands = self.plan(stage)?;
            if commands.is_empty() {
                tracing::info!("Nothing to do for {}", stage);
            }
            for command in &commands {
                progress.set_message(stage, command.label());
                self.runner.run(command)?;
            }

            progress.finish_stage();
        }

        progress.finish();
        Ok(())
    }
}
