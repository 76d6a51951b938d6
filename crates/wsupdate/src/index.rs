//! Package dependency index
//!
//! This module handles:
//! - Package discovery (one package.xml per immediate subdirectory)
//! - Dependency selection for a requested subset of packages
//! - Topological ordering of that selection for the build tool

use std::collections::{BTreeMap, HashMap, HashSet};

use camino::{Utf8Path, Utf8PathBuf};
use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use walkdir::WalkDir;

use crate::package::{MANIFEST_FILE, Package};
use crate::{Error, Result};

/// Marker files that exclude a directory from discovery
const IGNORE_MARKERS: &[&str] = &["CATKIN_IGNORE", "COLCON_IGNORE", "AMENT_IGNORE"];

/// Packages of a source directory, indexed by name
#[derive(Debug, Default)]
pub struct PackageIndex {
    packages: BTreeMap<String, Package>,
}

impl PackageIndex {
    /// Scan the immediate subdirectories of `source_root` for manifests.
    ///
    /// Directories without a package.xml are skipped; a malformed manifest
    /// fails the whole load.
    pub fn load(source_root: &Utf8Path) -> Result<Self> {
        let mut packages: BTreeMap<String, Package> = BTreeMap::new();

        let walker = WalkDir::new(source_root)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name();

        for entry in walker {
            let entry = entry.map_err(|e| {
                Error::Io(e.into_io_error().unwrap_or_else(|| {
                    std::io::Error::other(format!("failed to read {}", source_root))
                }))
            })?;

            if !entry.file_type().is_dir() {
                continue;
            }
            let Some(dir) = Utf8Path::from_path(entry.path()) else {
                tracing::warn!(path = ?entry.path(), "Skipping non UTF-8 directory");
                continue;
            };
            if !should_visit(dir) {
                tracing::debug!(path = %dir, "Skipping ignored directory");
                continue;
            }

            let manifest = dir.join(MANIFEST_FILE);
            if !manifest.is_file() {
                continue;
            }

            let package = Package::from_path(&manifest)?;
            tracing::debug!(name = %package.name, path = %package.path, "Discovered package");

            if let Some(existing) = packages.get(&package.name) {
                return Err(Error::DuplicatePackage {
                    name: package.name.clone(),
                    first: existing.path.clone(),
                    second: package.path,
                });
            }
            packages.insert(package.name.clone(), package);
        }

        Ok(Self { packages })
    }

    /// Build an index from already parsed packages
    pub fn from_packages(packages: impl IntoIterator<Item = Package>) -> Self {
        Self {
            packages: packages
                .into_iter()
                .map(|p| (p.name.clone(), p))
                .collect(),
        }
    }

    /// Get a package by name
    pub fn get(&self, name: &str) -> Option<&Package> {
        self.packages.get(name)
    }

    /// Iterate over packages ordered by name
    pub fn iter(&self) -> impl Iterator<Item = &Package> {
        self.packages.values()
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Dependencies of `package` that are part of this index
    pub fn workspace_dependencies<'a>(
        &'a self,
        package: &'a Package,
    ) -> impl Iterator<Item = &'a Package> {
        package
            .build_depends
            .iter()
            .filter_map(|name| self.packages.get(name))
    }

    /// Select the requested packages plus their transitive build dependencies.
    ///
    /// Names that are not in the index are ignored. The result lists every
    /// package after all of its dependencies.
    pub fn resolve<S: AsRef<str>>(&self, requested: &[S]) -> Result<Selection<'_>> {
        let mut visited: HashSet<&str> = HashSet::new();
        let mut order: Vec<&Package> = Vec::new();

        for name in requested {
            let name = name.as_ref();
            match self.packages.get(name) {
                Some(package) => self.collect(package, &mut visited, &mut order),
                None => tracing::debug!(name, "Requested package is not in the workspace, ignoring"),
            }
        }

        let packages = topological_order(self, &order)?;
        Ok(Selection { packages })
    }

    /// Every package of the index in build order
    pub fn build_order(&self) -> Result<Selection<'_>> {
        let names: Vec<&str> = self.packages.keys().map(String::as_str).collect();
        self.resolve(&names)
    }

    /// Depth-first walk collecting `package` and everything it reaches.
    ///
    /// Uses an explicit stack so that deep or cyclic graphs cannot overflow;
    /// cycles are reported by the ordering step.
    fn collect<'a>(
        &'a self,
        package: &'a Package,
        visited: &mut HashSet<&'a str>,
        order: &mut Vec<&'a Package>,
    ) {
        let mut stack = vec![package];
        while let Some(current) = stack.pop() {
            if !visited.insert(current.name.as_str()) {
                continue;
            }
            order.push(current);
            for dep in self.workspace_dependencies(current).collect::<Vec<_>>().into_iter().rev() {
                if !visited.contains(dep.name.as_str()) {
                    stack.push(dep);
                }
            }
        }
    }
}

/// Ordered, de-duplicated set of packages to hand to the build tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection<'a> {
    packages: Vec<&'a Package>,
}

impl<'a> Selection<'a> {
    pub fn iter(&self) -> impl Iterator<Item = &'a Package> + '_ {
        self.packages.iter().copied()
    }

    /// Package names in build order
    pub fn names(&self) -> Vec<&'a str> {
        self.packages.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.packages.iter().any(|p| p.name == name)
    }

    /// Directories of the selected packages
    pub fn paths(&self) -> Vec<&'a Utf8PathBuf> {
        self.packages.iter().map(|p| &p.path).collect()
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

/// Check if a discovered directory should be considered a package candidate
fn should_visit(dir: &Utf8Path) -> bool {
    let Some(name) = dir.file_name() else {
        return false;
    };
    if name.starts_with('.') {
        return false;
    }
    !IGNORE_MARKERS.iter().any(|marker| dir.join(marker).exists())
}

/// Sort the collected packages so that dependencies come first
fn topological_order<'a>(index: &PackageIndex, collected: &[&'a Package]) -> Result<Vec<&'a Package>> {
    // Edge from B to A means "A depends on B" (B must be built before A)
    let mut graph = DiGraph::<&'a Package, ()>::new();
    let mut nodes: HashMap<&str, NodeIndex> = HashMap::new();

    for package in collected {
        nodes.insert(package.name.as_str(), graph.add_node(package));
    }
    for package in collected {
        let dependent = nodes[package.name.as_str()];
        for dep in index.workspace_dependencies(package) {
            if let Some(&dependency) = nodes.get(dep.name.as_str()) {
                graph.add_edge(dependency, dependent, ());
            }
        }
    }

    match toposort(&graph, None) {
        Ok(sorted) => Ok(sorted.into_iter().map(|idx| graph[idx]).collect()),
        Err(cycle) => {
            let start = cycle.node_id();
            let mut members: Vec<String> = tarjan_scc(&graph)
                .into_iter()
                .find(|component| component.contains(&start))
                .unwrap_or_else(|| vec![start])
                .into_iter()
                .map(|idx| graph[idx].name.clone())
                .collect();
            members.sort();
            Err(Error::cyclic_dependency(members))
        }
    }
}
