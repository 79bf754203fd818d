//! Settling the log a grader run leaves behind.
//!
//! Passing runs have their log deleted. Failing runs have it moved under the
//! failure directory (see [`crate::core::relocation`] for the layout).

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info, instrument};

use crate::core::relocation::{passing_log_path, plan_failure_move};
use crate::core::report::{GradeReport, parse_grade_report};

/// Default failure directory, relative to the working directory.
pub const DEFAULT_LOGDIR: &str = "pr_failures";

/// What happened to a run's log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    /// The run passed and its log was removed.
    Deleted { path: PathBuf },
    /// The run failed and its log was kept under the failure directory.
    Relocated { from: PathBuf, to: PathBuf },
}

impl Settlement {
    pub fn passed(&self) -> bool {
        matches!(self, Settlement::Deleted { .. })
    }
}

/// Deletes or relocates grader logs relative to a working directory.
#[derive(Debug, Clone)]
pub struct LogSettler {
    cwd: PathBuf,
    logdir: PathBuf,
}

impl LogSettler {
    pub fn new(cwd: impl Into<PathBuf>, logdir: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            logdir: logdir.into(),
        }
    }

    /// Parse one grader report for `project` and settle its log.
    pub fn settle_output(&self, project: &str, text: &str) -> Result<Settlement> {
        let report = parse_grade_report(text)
            .with_context(|| format!("unrecognized output format for {project}"))?;
        debug!(project, passed = report.passed, log_path = %report.log_path, "report parsed");
        self.settle(&report)
            .with_context(|| format!("settle log {} for {project}", report.log_path))
    }

    /// Delete the log of a passing run or move the log of a failing one.
    #[instrument(skip_all, fields(log_path = %report.log_path, passed = report.passed))]
    pub fn settle(&self, report: &GradeReport) -> Result<Settlement> {
        if report.passed {
            let path = passing_log_path(&self.cwd, &report.log_path);
            fs::remove_file(&path).with_context(|| format!("remove {}", path.display()))?;
            debug!(path = %path.display(), "removed passing log");
            return Ok(Settlement::Deleted { path });
        }

        let plan = plan_failure_move(&self.cwd, &self.logdir, &report.log_path)?;
        if !plan.failure_dir.exists() {
            fs::create_dir_all(&plan.failure_dir)
                .with_context(|| format!("create directory {}", plan.failure_dir.display()))?;
        }
        if let Some(parent) = plan.destination.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create directory {}", parent.display()))?;
        }
        move_file(&plan.source, &plan.destination)?;
        info!(
            from = %plan.source.display(),
            to = %plan.destination.display(),
            "kept failing log"
        );
        Ok(Settlement::Relocated {
            from: plan.source,
            to: plan.destination,
        })
    }
}

/// Rename `from` to `to`, copying across filesystems when a rename cannot.
fn move_file(from: &Path, to: &Path) -> Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::CrossesDevices => {
            debug!(from = %from.display(), to = %to.display(), "rename crosses devices, copying");
            fs::copy(from, to)
                .with_context(|| format!("copy {} to {}", from.display(), to.display()))?;
            fs::remove_file(from).with_context(|| format!("remove {}", from.display()))?;
            Ok(())
        }
        Err(err) => Err(err)
            .with_context(|| format!("move {} to {}", from.display(), to.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{TestWorkspace, details_report};

    #[test]
    fn passing_report_deletes_log_and_leaves_logdir_alone() {
        let ws = TestWorkspace::new().expect("workspace");
        let log = ws.write_log("echo/run1/log.json", "{}").expect("log");
        let settler = ws.settler(DEFAULT_LOGDIR);

        let settlement = settler
            .settle_output("echo", &details_report("All tests passed", "echo/run1/log.json"))
            .expect("settle");

        assert!(settlement.passed());
        assert!(!log.exists());
        assert!(!ws.path().join(DEFAULT_LOGDIR).exists());
    }

    #[test]
    fn failing_report_moves_log_under_absolute_logdir() {
        let ws = TestWorkspace::new().expect("workspace");
        let fails = tempfile::tempdir().expect("fails dir");
        let logdir = fails.path().join("var/fails");
        let source = ws.write_log("tmp/run1/log.json", "{\"failed\":1}").expect("log");
        let reported = source.to_str().expect("utf-8 path").to_string();

        let settler = LogSettler::new(ws.path(), &logdir);
        let settlement = settler
            .settle_output("echo", &details_report("Test failed.", &reported))
            .expect("settle");

        // Absolute reported paths drop the first component after `/`.
        let rest = crate::core::relocation::strip_first_segment(&reported).expect("rest");
        let destination = logdir.join(rest);
        assert_eq!(
            settlement,
            Settlement::Relocated {
                from: source.clone(),
                to: destination.clone(),
            }
        );
        assert!(!source.exists());
        assert_eq!(
            fs::read_to_string(&destination).expect("read moved"),
            "{\"failed\":1}"
        );
    }

    #[test]
    fn failing_report_with_relative_logdir_glues_paths() {
        let ws = TestWorkspace::new().expect("workspace");
        let source = ws.write_log("echo/run1/log.json", "payload").expect("log");
        let settler = ws.settler(DEFAULT_LOGDIR);

        let settlement = settler
            .settle_output("echo", &details_report("1 test failed", "echo/run1/log.json"))
            .expect("settle");

        let expected = ws.path().join("pr_failuresrun1/log.json");
        assert!(!settlement.passed());
        assert!(ws.path().join(DEFAULT_LOGDIR).is_dir());
        assert!(!source.exists());
        assert_eq!(fs::read(&expected).expect("read moved"), b"payload");
    }

    #[test]
    fn moved_log_is_byte_identical() {
        let ws = TestWorkspace::new().expect("workspace");
        let payload: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
        let source = ws.path().join("out/run7/log.bin");
        fs::create_dir_all(source.parent().expect("parent")).expect("mkdir");
        fs::write(&source, &payload).expect("write");
        let settler = ws.settler("fails/");

        let settlement = settler
            .settle_output("gfserver", &details_report("failed", "out/run7/log.bin"))
            .expect("settle");

        let Settlement::Relocated { to, .. } = settlement else {
            panic!("expected relocation");
        };
        assert_eq!(to, ws.path().join("fails/run7/log.bin"));
        assert_eq!(fs::read(&to).expect("read moved"), payload);
    }

    #[test]
    fn missing_log_is_an_error() {
        let ws = TestWorkspace::new().expect("workspace");
        let settler = ws.settler(DEFAULT_LOGDIR);
        let err = settler
            .settle_output("echo", &details_report("passed", "echo/missing.json"))
            .expect_err("log does not exist");
        assert!(format!("{err:#}").contains("settle log echo/missing.json for echo"));
    }

    #[test]
    fn unrecognized_output_names_the_project() {
        let ws = TestWorkspace::new().expect("workspace");
        let settler = ws.settler(DEFAULT_LOGDIR);
        let err = settler
            .settle_output("gfserver", "Traceback (most recent call last):\n")
            .expect_err("no details line");
        assert!(err.to_string().contains("unrecognized output format for gfserver"));
    }
}
