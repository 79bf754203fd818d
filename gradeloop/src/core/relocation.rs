//! Path computation for settling a grader log.
//!
//! A failed run's log is moved under the failure directory, keeping the
//! reported path minus its first segment. A relative failure directory is
//! glued to that remainder without a separator (`pr_failures` + `run1/log.json`
//! gives `pr_failuresrun1/log.json`), matching the long-standing layout of
//! existing failure directories.

use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RelocationError {
    #[error("log path {path:?} has nothing after its first segment")]
    NoSegmentAfterFirst { path: String },
}

/// Where a failed run's log comes from and where it goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelocationPlan {
    /// Failure directory resolved against the working directory; created before the move.
    pub failure_dir: PathBuf,
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// Drop the first segment of a reported path.
///
/// A leading `/` is not a segment, so `/tmp/run1/log.json` becomes
/// `run1/log.json`. A leading `.` is.
pub fn strip_first_segment(reported: &str) -> Option<PathBuf> {
    let rest: PathBuf = Path::new(reported)
        .components()
        .filter(|component| !matches!(component, Component::RootDir | Component::Prefix(_)))
        .skip(1)
        .collect();
    if rest.as_os_str().is_empty() {
        None
    } else {
        Some(rest)
    }
}

/// Compute the move for a failed run's log.
///
/// - absolute `logdir`: `logdir/<rest>`
/// - relative `logdir`: `cwd/<logdir><rest>` (no separator between the two)
///
/// The source is the reported path resolved against `cwd`.
pub fn plan_failure_move(
    cwd: &Path,
    logdir: &Path,
    reported: &str,
) -> Result<RelocationPlan, RelocationError> {
    let rest =
        strip_first_segment(reported).ok_or_else(|| RelocationError::NoSegmentAfterFirst {
            path: reported.to_string(),
        })?;

    let destination = if logdir.is_absolute() {
        logdir.join(&rest)
    } else {
        let mut glued = OsString::from(logdir.as_os_str());
        glued.push(rest.as_os_str());
        cwd.join(glued)
    };

    Ok(RelocationPlan {
        failure_dir: cwd.join(logdir),
        source: cwd.join(reported),
        destination,
    })
}

/// Location of a passing run's log, to be deleted.
pub fn passing_log_path(cwd: &Path, reported: &str) -> PathBuf {
    cwd.join(reported)
}
