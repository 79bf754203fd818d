//! Grader abstraction for invoking the external grading command.
//!
//! The [`Grader`] trait decouples the driver loop from the actual grading
//! backend (`submit <subproject>`). Tests use scripted graders that return
//! predetermined reports without spawning processes.

use std::fmt;
use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, instrument};

use crate::io::process::run_command;

/// Default grading program; the subproject name is appended as its last argument.
pub const DEFAULT_GRADER: &str = "submit";

/// Number of trailing stderr bytes kept in [`GraderExitError`].
const STDERR_TAIL_BYTES: usize = 2_000;

/// Abstraction over grading backends.
pub trait Grader {
    /// Grade one subproject and return the report it printed on stdout.
    fn grade(&self, project: &str) -> Result<String>;
}

/// The grading command exited unsuccessfully.
#[derive(Debug)]
pub struct GraderExitError {
    pub project: String,
    pub code: Option<i32>,
    pub timed_out: bool,
    /// Tail of the grader's stderr.
    pub stderr: String,
}

impl fmt::Display for GraderExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "grader for {} ", self.project)?;
        match (self.timed_out, self.code) {
            (true, _) => write!(f, "timed out")?,
            (false, Some(code)) => write!(f, "exited with status {code}")?,
            (false, None) => write!(f, "was terminated by a signal")?,
        }
        let stderr = self.stderr.trim_end();
        if !stderr.is_empty() {
            write!(f, ": {stderr}")?;
        }
        Ok(())
    }
}

impl std::error::Error for GraderExitError {}

/// Grader that spawns `<program> [args..] <subproject>` in `workdir`.
#[derive(Debug, Clone)]
pub struct SubmitGrader {
    pub program: String,
    pub args: Vec<String>,
    pub workdir: PathBuf,
    pub timeout: Option<Duration>,
}

impl SubmitGrader {
    /// Build from a whitespace-separated command line such as `python submit.py`.
    pub fn from_command_line(
        command_line: &str,
        workdir: PathBuf,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let mut words = command_line.split_whitespace().map(str::to_string);
        let program = words
            .next()
            .with_context(|| format!("grader command {command_line:?} is empty"))?;
        Ok(Self {
            program,
            args: words.collect(),
            workdir,
            timeout,
        })
    }

    fn command(&self, project: &str) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).arg(project).current_dir(&self.workdir);
        cmd
    }
}

impl Grader for SubmitGrader {
    #[instrument(skip(self), fields(program = %self.program))]
    fn grade(&self, project: &str) -> Result<String> {
        let output = run_command(self.command(project), self.timeout)
            .with_context(|| format!("run grader for {project}"))?;

        if output.timed_out || !output.status.success() {
            return Err(GraderExitError {
                project: project.to_string(),
                code: output.status.code(),
                timed_out: output.timed_out,
                stderr: stderr_tail(&output.stderr),
            }
            .into());
        }

        let report = String::from_utf8(output.stdout)
            .with_context(|| format!("grader output for {project} is not valid UTF-8"))?;
        debug!(bytes = report.len(), "grader report captured");
        Ok(report)
    }
}

fn stderr_tail(stderr: &[u8]) -> String {
    let start = stderr.len().saturating_sub(STDERR_TAIL_BYTES);
    String::from_utf8_lossy(&stderr[start..]).into_owned()
}
