//! Update command implementation
//!
//! This module provides the CLI interface for updating a workspace.

use camino::Utf8Path;
use clap::Args;
use miette::Result;

use crate::environment::BuildEnvironment;
use crate::index::{PackageIndex, Selection};
use crate::process::ToolRunner;
use crate::stage::reset::{self, ResetOutcome};
use crate::stage::{Stage, Updater};
use crate::tree;
use crate::workspace::Workspace;

/// Arguments for the update command
#[derive(Debug, Default, Args)]
pub struct UpdateArgs {
    /// A list of packages to update, together with their dependencies
    #[arg(short = 'p', long = "package", value_name = "NAME", num_args = 1..)]
    pub packages: Vec<String>,

    /// Run wstool update
    #[arg(short, long)]
    pub wstool: bool,

    /// Run genjava_message_artifacts
    #[arg(short, long)]
    pub genmsgs: bool,

    /// Run catkin_make
    #[arg(short, long)]
    pub catkin: bool,

    /// Update Eclipse projects
    #[arg(short, long)]
    pub eclipse: bool,

    /// Delete build output and rebuild the configured reset package
    #[arg(long, conflicts_with_all = ["list", "packages"])]
    pub reset: bool,

    /// Print the package dependency tree and exit
    #[arg(short, long)]
    pub list: bool,

    /// Don't build, just list the packages and commands it would run
    #[arg(short = 'f', long)]
    pub fakeit: bool,
}

impl UpdateArgs {
    /// Stages to run; all of them when none was requested
    pub fn stages(&self) -> Vec<Stage> {
        let requested: Vec<Stage> = Stage::ALL
            .into_iter()
            .filter(|stage| match stage {
                Stage::Wstool => self.wstool,
                Stage::Genmsgs => self.genmsgs,
                Stage::Catkin => self.catkin,
                Stage::Eclipse => self.eclipse,
            })
            .collect();

        if requested.is_empty() {
            Stage::ALL.to_vec()
        } else {
            requested
        }
    }
}

/// Run the update command
pub fn run(start: &Utf8Path, args: UpdateArgs) -> Result<()> {
    let workspace = Workspace::detect(start)?;
    tracing::info!("Workspace at {}", workspace.root);

    if args.list {
        let index = workspace.load_index()?;
        let rendered = if args.packages.is_empty() {
            tree::render(&index)?
        } else {
            tree::render_roots(&index, &args.packages)?
        };
        print!("{}", rendered);
        return Ok(());
    }

    if args.reset {
        if reset::reset(&workspace, args.fakeit)? == ResetOutcome::Rebuilt {
            tracing::info!("Reset complete!");
        }
        return Ok(());
    }

    tracing::info!("Prepare workspace sources...");
    if args.fakeit {
        tracing::info!("Would link {} into {}", workspace.config.workspace.rosinstall, workspace.source_dir());
    } else {
        workspace.link_rosinstall()?;
    }

    tracing::info!("Update workspace...");
    let env = if args.fakeit {
        BuildEnvironment::from_vars(std::env::vars())
    } else {
        BuildEnvironment::resolve(&workspace)?
    };
    let runner = ToolRunner::new(&env).dry_run(args.fakeit);

    // The package index is loaded only after wstool has synced the sources
    let (package_stages, sync_stages): (Vec<Stage>, Vec<Stage>) = args
        .stages()
        .into_iter()
        .partition(|stage| stage.is_package_scoped());
    if !sync_stages.is_empty() {
        Updater::new(&workspace, runner).run(&sync_stages)?;
    }

    let restricted = !args.packages.is_empty() && !package_stages.is_empty();
    let index = if restricted || args.fakeit {
        Some(workspace.load_index()?)
    } else {
        None
    };
    let selection = match &index {
        Some(index) if restricted => Some(index.resolve(&args.packages)?),
        _ => None,
    };

    if args.fakeit {
        if let Some(index) = &index {
            print_packages(index, selection.as_ref())?;
        }
    }

    if !package_stages.is_empty() {
        match &selection {
            Some(selection) if selection.is_empty() => {
                tracing::warn!(
                    "None of the requested packages are in the workspace ({}), skipping {}",
                    args.packages.join(", "),
                    package_stages
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join(", ")
                );
            }
            _ => {
                let mut updater = Updater::new(&workspace, runner);
                if let Some(selection) = &selection {
                    tracing::info!(
                        "Restricting to {} packages: {}",
                        selection.len(),
                        selection.names().join(", ")
                    );
                    updater = updater.with_selection(selection);
                }
                updater.run(&package_stages)?;
            }
        }
    }

    tracing::info!("Update complete!");
    Ok(())
}

fn print_packages(index: &PackageIndex, selection: Option<&Selection<'_>>) -> Result<()> {
    let order;
    let packages = match selection {
        Some(selection) => selection,
        None => {
            order = index.build_order()?;
            &order
        }
    };

    println!("Would update the following packages in order:");
    for package in packages.iter() {
        println!("  - {} ({}) at {}", package.name, package.build_type, package.path);
    }
    Ok(())
}
