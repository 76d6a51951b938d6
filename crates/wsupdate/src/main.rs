//! wsupdate CLI - ROS catkin workspace updater

use clap::Parser;
use miette::Result;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use wsupdate::commands;
use wsupdate::progress::{ProgressWriter, multi_progress};

/// Update ROS packages from their repositories, build with catkin and
/// update Eclipse projects
#[derive(Debug, Parser)]
#[command(name = "wsupdate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbosity in debugging
    #[arg(short, long)]
    verbose: bool,

    /// Directory to start workspace detection from (default: current directory)
    #[arg(long, value_name = "DIR")]
    workspace: Option<String>,

    #[command(flatten)]
    update: commands::update::UpdateArgs,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(ProgressWriter::new(multi_progress().clone())),
        )
        .with(filter)
        .init();

    // Determine where to look for the workspace
    let start = if let Some(ref path) = cli.workspace {
        camino::Utf8PathBuf::from(path)
    } else {
        std::env::current_dir()
            .ok()
            .and_then(|p| camino::Utf8PathBuf::try_from(p).ok())
            .unwrap_or_else(|| camino::Utf8PathBuf::from("."))
    };

    commands::update::run(&start, cli.update)
}
