//! Test-only helpers: a temporary working directory and a scripted grader.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tempfile::TempDir;

use crate::io::grader::{Grader, GraderExitError};
use crate::io::interrupt::StopFlag;
use crate::io::settle::LogSettler;

/// Build a grader report whose details line names `log_path`.
pub fn details_report(summary: &str, log_path: &str) -> String {
    format!("{summary}\n(Details available in {log_path}.)\n")
}

/// A throwaway working directory standing in for a project checkout.
pub struct TestWorkspace {
    dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir().context("create temp workspace")?,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a log at `relative` (creating parents) and return its absolute path.
    pub fn write_log(&self, relative: &str, contents: &str) -> Result<PathBuf> {
        write_log_at(self.path(), relative, contents)
    }

    pub fn settler(&self, logdir: impl Into<PathBuf>) -> LogSettler {
        LogSettler::new(self.path(), logdir)
    }
}

fn write_log_at(root: &Path, relative: &str, contents: &str) -> Result<PathBuf> {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    fs::write(&path, contents).with_context(|| format!("write {}", path.display()))?;
    Ok(path)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScriptedOutcome {
    Pass,
    Fail,
    Exit(i32),
}

/// One expected grader call and how it turns out.
#[derive(Debug, Clone)]
pub struct ScriptedRun {
    project: String,
    outcome: ScriptedOutcome,
}

impl ScriptedRun {
    pub fn pass(project: &str) -> Self {
        Self {
            project: project.to_string(),
            outcome: ScriptedOutcome::Pass,
        }
    }

    pub fn fail(project: &str) -> Self {
        Self {
            project: project.to_string(),
            outcome: ScriptedOutcome::Fail,
        }
    }

    /// The grader exits with `code` and prints no report.
    pub fn exit(project: &str, code: i32) -> Self {
        Self {
            project: project.to_string(),
            outcome: ScriptedOutcome::Exit(code),
        }
    }
}

/// Grader that replays scripted runs in order.
///
/// Each pass/fail run writes `<project>/run<N>/log.json` under `root` and
/// returns a report pointing at it, like the real `submit` does.
pub struct ScriptedGrader {
    root: PathBuf,
    runs: RefCell<VecDeque<ScriptedRun>>,
    calls: Cell<usize>,
    written: RefCell<Vec<PathBuf>>,
    stop_at: Option<(usize, StopFlag)>,
}

impl ScriptedGrader {
    pub fn new(root: &Path, runs: Vec<ScriptedRun>) -> Self {
        Self {
            root: root.to_path_buf(),
            runs: RefCell::new(runs.into()),
            calls: Cell::new(0),
            written: RefCell::new(Vec::new()),
            stop_at: None,
        }
    }

    /// Raise `flag` while handling the `call`-th invocation (1-based), as a
    /// Ctrl-C arriving while the grader is running would.
    pub fn stop_after(mut self, call: usize, flag: StopFlag) -> Self {
        self.stop_at = Some((call, flag));
        self
    }

    /// Scripted runs not yet consumed.
    pub fn remaining(&self) -> usize {
        self.runs.borrow().len()
    }

    /// Logs written by this grader that are still at their reported location.
    pub fn unsettled_logs(&self) -> Vec<PathBuf> {
        self.written
            .borrow()
            .iter()
            .filter(|path| path.exists())
            .cloned()
            .collect()
    }
}

impl Grader for ScriptedGrader {
    fn grade(&self, project: &str) -> Result<String> {
        let call = self.calls.get() + 1;
        self.calls.set(call);
        if let Some((stop_call, flag)) = &self.stop_at
            && *stop_call == call
        {
            flag.request_stop();
        }

        let Some(run) = self.runs.borrow_mut().pop_front() else {
            bail!("unexpected grader call #{call} for {project}");
        };
        if run.project != project {
            bail!(
                "grader call #{call}: expected {}, got {project}",
                run.project
            );
        }

        let summary = match run.outcome {
            ScriptedOutcome::Exit(code) => {
                return Err(GraderExitError {
                    project: project.to_string(),
                    code: Some(code),
                    timed_out: false,
                    stderr: String::new(),
                }
                .into());
            }
            ScriptedOutcome::Pass => format!("Grading {project}\nAll tests passed"),
            ScriptedOutcome::Fail => format!("Grading {project}\nTest failed."),
        };

        let relative = format!("{project}/run{call}/log.json");
        let path = write_log_at(&self.root, &relative, &format!("{{\"call\":{call}}}"))?;
        self.written.borrow_mut().push(path);
        Ok(details_report(&summary, &relative))
    }
}
