//! Package manifest parsing
//!
//! This module parses catkin `package.xml` manifests (formats 1 to 3) into
//! the [`Package`] structure used by the dependency index.

use camino::{Utf8Path, Utf8PathBuf};
use quick_xml::de::from_str;
use serde::Deserialize;

use crate::{Error, Result};

/// Manifest file name looked up in every package directory
pub const MANIFEST_FILE: &str = "package.xml";

/// Build type declared in the manifest `<export>` section
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum BuildType {
    /// catkin package (the ROS 1 default when no build type is exported)
    #[default]
    Catkin,
    /// CMake-based package using ament
    AmentCmake,
    /// Python-based package using ament
    AmentPython,
    /// Pure CMake package
    Cmake,
    /// Unknown build type
    Other(String),
}

impl From<&str> for BuildType {
    fn from(s: &str) -> Self {
        match s {
            "catkin" => BuildType::Catkin,
            "ament_cmake" => BuildType::AmentCmake,
            "ament_python" => BuildType::AmentPython,
            "cmake" => BuildType::Cmake,
            other => BuildType::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for BuildType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildType::Catkin => write!(f, "catkin"),
            BuildType::AmentCmake => write!(f, "ament_cmake"),
            BuildType::AmentPython => write!(f, "ament_python"),
            BuildType::Cmake => write!(f, "cmake"),
            BuildType::Other(s) => write!(f, "{}", s),
        }
    }
}

/// A package parsed from package.xml
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    /// Package name
    pub name: String,

    /// Package version
    pub version: String,

    /// Package description
    pub description: Option<String>,

    /// Build type (catkin, ament_cmake, ...)
    pub build_type: BuildType,

    /// Path to the package directory
    pub path: Utf8PathBuf,

    /// Names of packages needed to build this one, without duplicates
    pub build_depends: Vec<String>,

    /// Names of packages needed at run time
    pub run_depends: Vec<String>,

    /// Names of packages needed by the tests
    pub test_depends: Vec<String>,
}

impl Package {
    /// Parse a package from a package.xml file
    pub fn from_path(manifest_path: &Utf8Path) -> Result<Self> {
        let content = std::fs::read_to_string(manifest_path)?;
        let package_dir = manifest_path
            .parent()
            .map(Utf8Path::to_path_buf)
            .unwrap_or_default();

        Self::parse(&content, package_dir).map_err(|source| Error::ManifestParse {
            path: manifest_path.to_path_buf(),
            source,
        })
    }

    /// Parse a package from XML content
    pub fn parse(content: &str, path: Utf8PathBuf) -> std::result::Result<Self, quick_xml::DeError> {
        let raw: RawManifest = from_str(content)?;

        let build_type = raw
            .export
            .as_ref()
            .and_then(|e| e.build_type.as_deref())
            .map(|s| BuildType::from(s.trim()))
            .unwrap_or_default();

        let build_depends = unique_names([
            &raw.build_depend,
            &raw.buildtool_depend,
            &raw.build_export_depend,
            &raw.depend,
        ]);
        let run_depends = unique_names([&raw.run_depend, &raw.exec_depend, &raw.depend]);
        let test_depends = unique_names([&raw.test_depend]);

        Ok(Package {
            name: raw.name.trim().to_string(),
            version: raw.version.trim().to_string(),
            description: raw.description.map(|d| d.trim().to_string()),
            build_type,
            path,
            build_depends,
            run_depends,
            test_depends,
        })
    }
}

/// Raw package.xml structure for deserialization
#[derive(Debug, Deserialize)]
struct RawManifest {
    name: String,
    version: String,
    description: Option<String>,
    #[serde(default)]
    build_depend: Vec<Dependency>,
    #[serde(default)]
    buildtool_depend: Vec<Dependency>,
    #[serde(default)]
    build_export_depend: Vec<Dependency>,
    #[serde(default)]
    run_depend: Vec<Dependency>,
    #[serde(default)]
    exec_depend: Vec<Dependency>,
    #[serde(default)]
    test_depend: Vec<Dependency>,
    #[serde(default)]
    depend: Vec<Dependency>,
    export: Option<Export>,
}

/// Dependency element
#[derive(Debug, Deserialize)]
struct Dependency {
    #[serde(rename = "$text")]
    name: String,
    #[serde(rename = "@condition")]
    condition: Option<String>,
}

/// Export section
#[derive(Debug, Deserialize)]
struct Export {
    build_type: Option<String>,
}

/// Merge dependency lists into one name list, keeping first occurrences.
///
/// Conditional dependencies (REP 149) are skipped: evaluating them needs the
/// ROS environment variables of the target distribution.
fn unique_names<const N: usize>(lists: [&Vec<Dependency>; N]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for dep in lists.into_iter().flatten() {
        if dep.condition.is_some() {
            continue;
        }
        let name = dep.name.trim();
        if !name.is_empty() && !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}
