//! End-to-end tests for the wsupdate binary
//!
//! External tools are replaced by shell scripts that append their arguments
//! to a log file, so the tests check what would have been run and in which
//! order.

use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use std::process::{Command, Output};
use tempfile::TempDir;

fn fixtures_path() -> Utf8PathBuf {
    let path = Utf8PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../tests/fixtures");
    path.canonicalize_utf8()
        .expect("fixtures directory should exist")
}

fn wsupdate(workspace: &Utf8Path, args: &[&str]) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_wsupdate"));
    cmd.arg("--workspace")
        .arg(workspace.as_str())
        .args(args)
        .env_remove("RUST_LOG")
        .env("ROS_PACKAGE_PATH", workspace.join("src").as_str());
    cmd
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Copy the fixture workspace so a test can modify it freely
fn copy_fixture(name: &str) -> (TempDir, Utf8PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let root = Utf8Path::from_path(temp_dir.path())
        .unwrap()
        .canonicalize_utf8()
        .unwrap()
        .join(name);
    let source = fixtures_path().join(name);

    for entry in walkdir::WalkDir::new(&source) {
        let entry = entry.unwrap();
        let relative = entry.path().strip_prefix(&source).unwrap();
        let dest = root.join(Utf8Path::from_path(relative).unwrap());
        if entry.file_type().is_dir() {
            fs::create_dir_all(&dest).unwrap();
        } else {
            fs::copy(entry.path(), &dest).unwrap();
        }
    }

    (temp_dir, root)
}

/// Install logging stand-ins for every external tool and point the
/// workspace configuration at them. Returns the log file.
#[cfg(unix)]
fn install_fake_tools(root: &Utf8Path, failing: &[&str]) -> Utf8PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let bin = root.join("fake_bin");
    let log = root.join("tools.log");
    fs::create_dir_all(&bin).unwrap();

    for tool in ["wstool", "genjava", "catkin", "gradle"] {
        let status = if failing.contains(&tool) { 1 } else { 0 };
        let script = bin.join(tool);
        fs::write(
            &script,
            format!("#!/bin/sh\necho \"{tool} $*\" >> \"{log}\"\nexit {status}\n"),
        )
        .unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
    }

    let mut config = fs::read_to_string(root.join("wsupdate.toml")).unwrap();
    config.push_str(&format!(
        "\n[tools]\nwstool = \"{bin}/wstool\"\ngenjava = \"{bin}/genjava\"\ncatkin_make = \"{bin}/catkin\"\ngradle = \"{bin}/gradle\"\n"
    ));
    fs::write(root.join("wsupdate.toml"), config).unwrap();

    log
}

fn read_log(log: &Utf8Path) -> Vec<String> {
    fs::read_to_string(log)
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn test_list_prints_dependency_tree() {
    let workspace = fixtures_path().join("robot_ws");

    let output = wsupdate(&workspace, &["--list"]).output().unwrap();

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(
        stdout(&output),
        "\\--- robot_bringup\n\
         \x20   \\--- robot_driver\n\
         \x20       +--- robot_msgs\n\
         \\--- robot_driver\n\
         \x20   +--- robot_msgs\n\
         +--- robot_msgs\n\
         +--- workspace_manifests\n"
    );
}

#[test]
fn test_list_restricted_to_packages() {
    let workspace = fixtures_path().join("robot_ws");

    let output = wsupdate(&workspace, &["--list", "-p", "robot_driver"])
        .output()
        .unwrap();

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "\\--- robot_driver\n    +--- robot_msgs\n");
}

#[test]
fn test_list_from_manifest_package() {
    let workspace = fixtures_path().join("robot_ws/src/workspace_manifests");

    let output = wsupdate(&workspace, &["-l", "-p", "robot_msgs"])
        .output()
        .unwrap();

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "+--- robot_msgs\n");
}

#[test]
fn test_outside_workspace_fails() {
    let temp_dir = TempDir::new().unwrap();
    let dir = Utf8Path::from_path(temp_dir.path()).unwrap();

    let output = wsupdate(dir, &["--list"]).output().unwrap();

    assert!(!output.status.success());
    assert!(stderr(&output).contains("not in a ROS workspace"), "stderr: {}", stderr(&output));
}

#[test]
fn test_fakeit_lists_build_order_and_runs_nothing() {
    let (_temp_dir, root) = copy_fixture("robot_ws");

    let output = wsupdate(&root, &["--fakeit"]).output().unwrap();

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    let position = |name: &str| out.find(&format!("- {} ", name)).unwrap();
    assert!(position("robot_msgs") < position("robot_driver"));
    assert!(position("robot_driver") < position("robot_bringup"));
    assert!(stderr(&output).contains("Would run"));
    assert!(!root.join("src/.rosinstall").exists());
}

#[cfg(unix)]
#[test]
fn test_full_update_runs_stages_in_order() {
    let (_temp_dir, root) = copy_fixture("robot_ws");
    fs::write(root.join("src/robot_driver/build.gradle"), "").unwrap();
    let log = install_fake_tools(&root, &[]);

    let output = wsupdate(&root, &[]).output().unwrap();

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let src = root.join("src");
    assert_eq!(
        read_log(&log),
        vec![
            format!(
                "wstool merge --confirm-all -t {src} {src}/workspace_manifests/robot.rosinstall"
            ),
            format!("wstool update -t {src}"),
            "genjava -p robot_msgs".to_string(),
            format!("catkin --directory {root} -DCATKIN_WHITELIST_PACKAGES="),
            "gradle cleanEclipse eclipse".to_string(),
        ]
    );
    assert_eq!(
        fs::read_link(src.join(".rosinstall")).unwrap(),
        src.join("workspace_manifests/.rosinstall").as_std_path()
    );
}

#[cfg(unix)]
#[test]
fn test_package_restricted_catkin_build() {
    let (_temp_dir, root) = copy_fixture("robot_ws");
    let log = install_fake_tools(&root, &[]);

    let output = wsupdate(&root, &["-p", "robot_driver", "-c"]).output().unwrap();

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(
        read_log(&log),
        vec![format!(
            "catkin --directory {root} -DCATKIN_WHITELIST_PACKAGES=robot_msgs;robot_driver"
        )]
    );
}

#[cfg(unix)]
#[test]
fn test_unknown_package_only_syncs_sources() {
    let (_temp_dir, root) = copy_fixture("robot_ws");
    fs::write(root.join("src/robot_driver/build.gradle"), "").unwrap();
    let log = install_fake_tools(&root, &[]);

    let output = wsupdate(&root, &["-p", "no_such_package"]).output().unwrap();

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let lines = read_log(&log);
    assert_eq!(lines.len(), 2, "log: {:?}", lines);
    assert!(lines.iter().all(|line| line.starts_with("wstool ")));
    assert!(stderr(&output).contains("skipping genmsgs, catkin, eclipse"));
}

#[cfg(unix)]
#[test]
fn test_wstool_runs_for_package_not_yet_checked_out() {
    let (_temp_dir, root) = copy_fixture("robot_ws");
    let log = install_fake_tools(&root, &[]);

    let output = wsupdate(&root, &["-p", "robot_new", "-w"]).output().unwrap();

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let src = root.join("src");
    assert_eq!(
        read_log(&log),
        vec![
            format!(
                "wstool merge --confirm-all -t {src} {src}/workspace_manifests/robot.rosinstall"
            ),
            format!("wstool update -t {src}"),
        ]
    );
}

#[cfg(unix)]
#[test]
fn test_package_checked_out_by_wstool_is_selected() {
    let (_temp_dir, root) = copy_fixture("robot_ws");
    let log = install_fake_tools(&root, &[]);
    // The stand-in wstool checks out a new package that depends on robot_msgs
    let manifest = "<package format=\"2\"><name>robot_new</name><version>0.1.0</version>\
                    <depend>robot_msgs</depend></package>";
    let wstool = root.join("fake_bin/wstool");
    let mut script = fs::read_to_string(&wstool).unwrap();
    script = script.replace(
        "exit 0",
        &format!(
            "mkdir -p \"{root}/src/robot_new\"\necho '{manifest}' > \"{root}/src/robot_new/package.xml\"\nexit 0"
        ),
    );
    fs::write(&wstool, script).unwrap();

    let output = wsupdate(&root, &["-p", "robot_new", "-w", "-c"]).output().unwrap();

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let lines = read_log(&log);
    assert_eq!(
        lines.last().unwrap(),
        &format!("catkin --directory {root} -DCATKIN_WHITELIST_PACKAGES=robot_msgs;robot_new")
    );
}

#[cfg(unix)]
#[test]
fn test_failing_tool_aborts_update() {
    let (_temp_dir, root) = copy_fixture("robot_ws");
    fs::write(root.join("src/robot_driver/build.gradle"), "").unwrap();
    let log = install_fake_tools(&root, &["catkin"]);

    let output = wsupdate(&root, &["-c", "-e"]).output().unwrap();

    assert!(!output.status.success());
    let lines = read_log(&log);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("catkin "));
}

#[cfg(unix)]
#[test]
fn test_missing_environment_fails_before_tools_run() {
    let (_temp_dir, root) = copy_fixture("robot_ws");
    let log = install_fake_tools(&root, &[]);

    let output = wsupdate(&root, &["-w"])
        .env_remove("ROS_PACKAGE_PATH")
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(stderr(&output).contains("ROS_PACKAGE_PATH"), "stderr: {}", stderr(&output));
    assert!(read_log(&log).is_empty());
}

#[cfg(unix)]
#[test]
fn test_reset_without_build_dir_does_nothing() {
    let (_temp_dir, root) = copy_fixture("robot_ws");
    let log = install_fake_tools(&root, &[]);

    let output = wsupdate(&root, &["--reset"]).output().unwrap();

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(read_log(&log).is_empty());
}

#[cfg(unix)]
#[test]
fn test_reset_rebuilds_configured_package() {
    let (_temp_dir, root) = copy_fixture("robot_ws");
    let log = install_fake_tools(&root, &[]);
    fs::create_dir_all(root.join("build/robot_msgs")).unwrap();
    fs::create_dir_all(root.join("devel/lib")).unwrap();

    let output = wsupdate(&root, &["--reset"]).output().unwrap();

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(!root.join("build").exists());
    assert!(!root.join("devel").exists());
    assert_eq!(
        read_log(&log),
        vec![format!(
            "catkin --directory {root} -DCATKIN_WHITELIST_PACKAGES=robot_msgs"
        )]
    );
}
