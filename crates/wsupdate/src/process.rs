//! External tool execution with log capture
//!
//! Tools run one at a time. Their stdout and stderr are read line by line
//! and forwarded to tracing so that output interleaves cleanly with the
//! progress display.

use std::fmt;
use std::io::{BufRead, BufReader, Read};
use std::process::{Command, Stdio};

use camino::{Utf8Path, Utf8PathBuf};

use crate::environment::BuildEnvironment;
use crate::{Error, Result};

/// A planned invocation of an external tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    /// Program name or path
    pub program: String,
    pub args: Vec<String>,
    /// Working directory for the tool; the caller's when `None`
    pub current_dir: Option<Utf8PathBuf>,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Utf8Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Short label used in logs and errors
    pub fn label(&self) -> &str {
        Utf8Path::new(&self.program)
            .file_name()
            .unwrap_or(&self.program)
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        if let Some(dir) = &self.current_dir {
            write!(f, " (in {})", dir)?;
        }
        Ok(())
    }
}

/// Runs tool commands in a build environment
#[derive(Debug, Clone, Copy)]
pub struct ToolRunner<'a> {
    env: &'a BuildEnvironment,
    dry_run: bool,
}

impl<'a> ToolRunner<'a> {
    pub fn new(env: &'a BuildEnvironment) -> Self {
        Self {
            env,
            dry_run: false,
        }
    }

    /// Log commands instead of running them
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Run `command` to completion.
    ///
    /// A tool that cannot be started fails with [`Error::ToolSpawn`], one that
    /// exits unsuccessfully with [`Error::ExternalToolFailure`].
    pub fn run(&self, command: &ToolCommand) -> Result<()> {
        if self.dry_run {
            tracing::info!("Would run: {}", command);
            return Ok(());
        }

        tracing::debug!("Running command: {}", command);
        let label = command.label();

        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args)
            .envs(self.env.vars())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &command.current_dir {
            cmd.current_dir(dir);
        }

        let mut child = cmd.spawn().map_err(|source| Error::ToolSpawn {
            tool: label.to_string(),
            source,
        })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        std::thread::scope(|scope| {
            if let Some(stdout) = stdout {
                scope.spawn(|| {
                    forward_lines(stdout, |line| {
                        tracing::debug!(target: "tool_output", tool = %label, "{}", line)
                    })
                });
            }
            if let Some(stderr) = stderr {
                scope.spawn(|| {
                    forward_lines(stderr, |line| {
                        tracing::warn!(target: "tool_output", tool = %label, "{}", line)
                    })
                });
            }
        });

        let status = child.wait()?;
        if !status.success() {
            tracing::error!("{} failed, update aborted", label);
            return Err(Error::tool_failure(label, status));
        }
        Ok(())
    }
}

fn forward_lines(stream: impl Read, log: impl Fn(&str)) {
    let reader = BufReader::new(stream);
    for line in reader.lines() {
        match line {
            Ok(line) => log(&line),
            Err(_) => break,
        }
    }
}
