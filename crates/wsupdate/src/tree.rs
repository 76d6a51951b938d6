//! Dependency tree rendering for `--list`

use crate::index::PackageIndex;
use crate::package::Package;
use crate::{Error, Result};

/// Prefix for a package without workspace dependencies
const LEAF: &str = "+--- ";
/// Prefix for a package whose dependencies follow below it
const BRANCH: &str = "\\--- ";
const INDENT: &str = "    ";

/// Render the dependency tree of every package in the index
pub fn render(index: &PackageIndex) -> Result<String> {
    let roots: Vec<&Package> = index.iter().collect();
    render_packages(index, &roots)
}

/// Render the dependency tree of the given root packages.
///
/// Names missing from the index are skipped.
pub fn render_roots<S: AsRef<str>>(index: &PackageIndex, roots: &[S]) -> Result<String> {
    let roots: Vec<&Package> = roots
        .iter()
        .filter_map(|name| index.get(name.as_ref()))
        .collect();
    render_packages(index, &roots)
}

fn render_packages(index: &PackageIndex, roots: &[&Package]) -> Result<String> {
    let mut out = String::new();
    let mut path = Vec::new();
    for package in roots {
        render_package(index, package, 0, &mut path, &mut out)?;
    }
    Ok(out)
}

fn render_package<'a>(
    index: &'a PackageIndex,
    package: &'a Package,
    depth: usize,
    path: &mut Vec<&'a str>,
    out: &mut String,
) -> Result<()> {
    if let Some(start) = path.iter().position(|name| *name == package.name) {
        let mut cycle: Vec<String> = path[start..].iter().map(|s| s.to_string()).collect();
        cycle.sort();
        return Err(Error::cyclic_dependency(cycle));
    }

    let deps: Vec<&Package> = index.workspace_dependencies(package).collect();
    let prefix = if deps.is_empty() { LEAF } else { BRANCH };
    out.push_str(&format!("{}{}{}\n", INDENT.repeat(depth), prefix, package.name));

    path.push(package.name.as_str());
    for dep in deps {
        render_package(index, dep, depth + 1, path, out)?;
    }
    path.pop();
    Ok(())
}
