//! Workspace detection and layout
//!
//! The workspace root is found once from a start directory and then passed
//! explicitly to every operation; nothing here changes the process working
//! directory.

use camino::{Utf8Path, Utf8PathBuf};

use crate::config::Config;
use crate::index::PackageIndex;
use crate::{Error, Result};

/// A catkin workspace
#[derive(Debug)]
pub struct Workspace {
    /// Root directory of the workspace
    pub root: Utf8PathBuf,

    /// Configuration
    pub config: Config,
}

impl Workspace {
    /// Locate the workspace from `start`.
    ///
    /// `start` is the root if it contains the configured source directory.
    /// Otherwise the nearest ancestor whose configured manifest package is
    /// `start` is the root.
    pub fn detect(start: &Utf8Path) -> Result<Self> {
        let start = start.canonicalize_utf8().map_err(|_| Error::NotInWorkspace {
            path: start.to_path_buf(),
        })?;

        let config = Config::load(&start)?;
        if start.join(&config.workspace.source_dir).is_dir() {
            tracing::debug!(root = %start, "Workspace root found");
            return Ok(Self::with_config(start, config));
        }

        for ancestor in start.ancestors().skip(1) {
            let config = match Config::load(ancestor) {
                Ok(config) => config,
                Err(e) => {
                    tracing::debug!(path = %ancestor, error = %e, "Ignoring unreadable configuration");
                    continue;
                }
            };
            if ancestor.join(&config.workspace.manifest_package) == start
                && ancestor.join(&config.workspace.source_dir).is_dir()
            {
                tracing::debug!(root = %ancestor, "Started from the manifest package");
                return Ok(Self::with_config(ancestor.to_path_buf(), config));
            }
        }

        Err(Error::NotInWorkspace { path: start })
    }

    /// Use `root` as workspace root with a specific configuration
    pub fn with_config(root: Utf8PathBuf, config: Config) -> Self {
        Self { root, config }
    }

    /// Directory containing the packages
    pub fn source_dir(&self) -> Utf8PathBuf {
        self.root.join(&self.config.workspace.source_dir)
    }

    pub fn build_dir(&self) -> Utf8PathBuf {
        self.root.join(&self.config.workspace.build_dir)
    }

    pub fn devel_dir(&self) -> Utf8PathBuf {
        self.root.join(&self.config.workspace.devel_dir)
    }

    /// Directory of the package holding the rosinstall fragments
    pub fn manifest_dir(&self) -> Utf8PathBuf {
        self.root.join(&self.config.workspace.manifest_package)
    }

    pub fn setup_script(&self) -> Utf8PathBuf {
        self.root.join(&self.config.environment.setup_script)
    }

    /// Load the package index of the source directory
    pub fn load_index(&self) -> Result<PackageIndex> {
        let index = PackageIndex::load(&self.source_dir())?;
        tracing::info!("Found {} packages in {}", index.len(), self.source_dir());
        Ok(index)
    }

    /// Link the manifest package's rosinstall file into the source directory.
    ///
    /// An existing destination is left untouched and reported as a warning.
    pub fn link_rosinstall(&self) -> Result<()> {
        let name = &self.config.workspace.rosinstall;
        let target = self.manifest_dir().join(name);
        let link = self.source_dir().join(name);

        if !target.exists() {
            tracing::warn!("No {} in {}, skipping symlink", name, self.manifest_dir());
            return Ok(());
        }

        match create_symlink(&target, &link) {
            Ok(()) => {
                tracing::info!("Symlink for {} created", name);
                Ok(())
            }
            Err(Error::SymlinkAlreadyExists { path }) => {
                tracing::warn!("File {} already exists, skip", path);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

/// Create `link` pointing at `target`, refusing to replace anything
pub fn create_symlink(target: &Utf8Path, link: &Utf8Path) -> Result<()> {
    if link.exists() || link.is_symlink() {
        return Err(Error::SymlinkAlreadyExists {
            path: link.to_path_buf(),
        });
    }

    #[cfg(unix)]
    std::os::unix::fs::symlink(target, link)?;
    #[cfg(windows)]
    std::os::windows::fs::symlink_file(target, link)?;

    Ok(())
}
