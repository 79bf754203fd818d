//! Loop configuration assembled from command-line flags.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Result, anyhow, bail};
use tracing::warn;

use crate::io::grader::DEFAULT_GRADER;
use crate::io::settle::DEFAULT_LOGDIR;

/// Everything the driver loop needs to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopConfig {
    /// Subprojects in invocation order, without duplicates.
    pub projects: Vec<String>,
    /// Failure directory, relative to the working directory unless absolute.
    pub logdir: PathBuf,
    /// Grading program and leading arguments, e.g. `submit` or `python submit.py`.
    pub grader: String,
    /// Kill a grader invocation after this long.
    pub timeout: Option<Duration>,
    /// Stop cleanly after this many full iterations.
    pub max_iterations: Option<u32>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            projects: Vec::new(),
            logdir: PathBuf::from(DEFAULT_LOGDIR),
            grader: DEFAULT_GRADER.to_string(),
            timeout: None,
            max_iterations: None,
        }
    }
}

impl LoopConfig {
    pub fn validate(&self) -> Result<()> {
        if self.projects.is_empty() {
            bail!("--projects must name at least one subproject");
        }
        if self.logdir.as_os_str().is_empty() {
            bail!("--logdir must not be empty");
        }
        if self.grader.trim().is_empty() {
            bail!("--grader must not be empty");
        }
        if self.timeout.is_some_and(|t| t.is_zero()) {
            bail!("--timeout must be > 0");
        }
        if self.max_iterations == Some(0) {
            bail!("--iterations must be > 0");
        }
        Ok(())
    }
}

/// Split a comma-separated `--projects` value.
///
/// Names are trimmed; empty names are rejected. Repeated names are dropped
/// (keeping the first) since the tally is keyed by name.
pub fn parse_projects(raw: &str) -> Result<Vec<String>> {
    let mut projects: Vec<String> = Vec::new();
    for (idx, name) in raw.split(',').map(str::trim).enumerate() {
        if name.is_empty() {
            return Err(anyhow!(
                "--projects entry {} is empty (got {raw:?})",
                idx + 1
            ));
        }
        if projects.iter().any(|p| p == name) {
            warn!(project = name, "duplicate subproject ignored");
            continue;
        }
        projects.push(name.to_string());
    }
    Ok(projects)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_keeps_order() {
        let projects = parse_projects("echo,gfserver").expect("parse");
        assert_eq!(projects, vec!["echo".to_string(), "gfserver".to_string()]);
    }

    #[test]
    fn parse_trims_and_drops_duplicates() {
        let projects = parse_projects(" echo , gfserver,echo").expect("parse");
        assert_eq!(projects, vec!["echo".to_string(), "gfserver".to_string()]);
    }

    #[test]
    fn parse_rejects_empty_value() {
        let err = parse_projects("").expect_err("empty");
        assert!(err.to_string().contains("entry 1 is empty"));
    }

    #[test]
    fn parse_rejects_empty_entry() {
        let err = parse_projects("echo,,gfserver").expect_err("empty entry");
        assert!(err.to_string().contains("entry 2 is empty"));
    }

    #[test]
    fn default_uses_submit_and_pr_failures() {
        let cfg = LoopConfig::default();
        assert_eq!(cfg.logdir, PathBuf::from("pr_failures"));
        assert_eq!(cfg.grader, "submit");
        assert!(cfg.validate().is_err(), "no projects configured");
    }

    #[test]
    fn validate_rejects_zero_limits() {
        let base = LoopConfig {
            projects: vec!["echo".to_string()],
            ..LoopConfig::default()
        };
        assert!(base.validate().is_ok());

        let zero_timeout = LoopConfig {
            timeout: Some(Duration::ZERO),
            ..base.clone()
        };
        assert!(zero_timeout.validate().is_err());

        let zero_iterations = LoopConfig {
            max_iterations: Some(0),
            ..base
        };
        assert!(zero_iterations.validate().is_err());
    }
}
