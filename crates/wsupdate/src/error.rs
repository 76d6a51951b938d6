//! Error types for wsupdate

// This warning is a false positive from thiserror macro expansion
#![allow(unused_assignments)]

use camino::Utf8PathBuf;
use miette::Diagnostic;
use thiserror::Error;

/// Result type alias for wsupdate operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for wsupdate
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// A package.xml could not be parsed
    #[error("Failed to parse manifest {path}: {source}")]
    #[diagnostic(help("Check that the file is a well-formed package.xml with <name> and <version>"))]
    ManifestParse {
        path: Utf8PathBuf,
        #[source]
        source: quick_xml::DeError,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[help]
        help: String,
    },

    /// Start directory is neither a workspace root nor the manifest package
    #[error("You are not in a ROS workspace: {path}")]
    #[diagnostic(help(
        "Run from the workspace root (the directory containing the source directory) \
         or from the manifest package directory, or pass --workspace"
    ))]
    NotInWorkspace { path: Utf8PathBuf },

    /// A required build-environment variable is missing
    #[error("Build environment is not set up: {variable} is not defined (setup script: {setup_script})")]
    #[diagnostic(help("You must source the catkin setup.sh environment script"))]
    EnvironmentNotSourced {
        variable: String,
        setup_script: Utf8PathBuf,
    },

    /// An external tool could not be started
    #[error("Failed to start {tool}: {source}")]
    #[diagnostic(help("Check that the tool is installed and on PATH"))]
    ToolSpawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    /// An external tool exited unsuccessfully
    #[error("{tool} failed ({status}), update aborted")]
    #[diagnostic(help("Check the tool output above for errors"))]
    ExternalToolFailure { tool: String, status: String },

    /// Symlink destination already exists
    #[error("File {path} already exists, skip")]
    SymlinkAlreadyExists { path: Utf8PathBuf },

    /// Two package directories declare the same name
    #[error("Duplicate package name '{name}' at {first} and {second}")]
    #[diagnostic(help("Each package.xml in the source directory must declare a unique name"))]
    DuplicatePackage {
        name: String,
        first: Utf8PathBuf,
        second: Utf8PathBuf,
    },

    /// Circular dependency detected
    #[error("Circular dependency detected: {packages:?}")]
    #[diagnostic(help("Check the dependency declarations in the package.xml files"))]
    CyclicDependency {
        /// Packages involved in the cycle
        packages: Vec<String>,
    },
}

impl Error {
    /// Create a configuration error
    pub fn config(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: help.into(),
        }
    }

    /// Create a circular dependency error
    pub fn cyclic_dependency(packages: Vec<String>) -> Self {
        Self::CyclicDependency { packages }
    }

    /// Create an external tool failure from an exit status
    pub fn tool_failure(tool: impl Into<String>, status: std::process::ExitStatus) -> Self {
        let status = match status.code() {
            Some(code) => format!("exit code {}", code),
            None => "terminated by signal".to_string(),
        };
        Self::ExternalToolFailure {
            tool: tool.into(),
            status,
        }
    }
}
