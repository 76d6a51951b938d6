//! wsupdate - ROS catkin workspace updater
//!
//! This crate provides both a library and CLI for wsupdate, including:
//! - Configuration file parsing and merging
//! - Workspace detection and the rosinstall symlink
//! - Package manifest parsing and the dependency index
//! - Dependency selection and build ordering
//! - External tool stages (wstool, genjava, catkin_make, Gradle)

pub mod commands;
pub mod config;
pub mod environment;
pub mod error;
pub mod index;
pub mod package;
pub mod process;
pub mod progress;
pub mod stage;
pub mod tree;
pub mod workspace;

pub use error::{Error, Result};
