//! The grading loop: every subproject, every iteration, until stopped.

use anyhow::Result;
use tracing::{debug, info, instrument, warn};

use crate::config::LoopConfig;
use crate::core::tally::{RunState, Tally};
use crate::io::grader::Grader;
use crate::io::interrupt::StopFlag;
use crate::io::settle::{LogSettler, Settlement};

/// Reason why `run_loop` stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopStop {
    /// A stop was requested (Ctrl-C).
    Interrupted,
    /// The configured number of full iterations completed.
    IterationLimit,
}

/// Summary of a loop invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopOutcome {
    pub tally: Tally,
    pub stop: LoopStop,
    /// Passes from the interrupted, incomplete iteration. Not part of `tally`.
    pub discarded_passes: u32,
}

/// One settled grader run, reported to the `on_result` callback.
#[derive(Debug)]
pub struct GradeEvent<'a> {
    /// 1-based number of the iteration in progress.
    pub iteration: u32,
    pub project: &'a str,
    pub settlement: &'a Settlement,
}

/// Grade every configured subproject in order, forever, until `stop` is raised
/// or `config.max_iterations` full iterations have completed.
///
/// The stop flag is polled before each grader invocation and again when it
/// returns. A run that returns after a stop request is discarded without
/// settling its log, and so is its error, since Ctrl-C also reaches the grader.
///
/// Any other grader, parse, or filesystem error ends the loop with `Err`.
pub fn run_loop<G: Grader, F: FnMut(&GradeEvent<'_>)>(
    config: &LoopConfig,
    grader: &G,
    settler: &LogSettler,
    stop: &StopFlag,
    mut on_result: F,
) -> Result<LoopOutcome> {
    let mut tally = Tally::new(config.projects.iter().cloned());

    loop {
        let state = run_iteration(config, grader, settler, stop, &mut tally, &mut on_result)?;
        if state == RunState::Stopped {
            let discarded_passes = tally.pending_passes();
            if discarded_passes > 0 {
                debug!(discarded_passes, "dropping passes of incomplete iteration");
            }
            info!(iterations = tally.iterations(), "grading loop interrupted");
            return Ok(LoopOutcome {
                tally,
                stop: LoopStop::Interrupted,
                discarded_passes,
            });
        }

        tally.complete_iteration();
        debug!(iterations = tally.iterations(), "iteration complete");

        if config
            .max_iterations
            .is_some_and(|limit| tally.iterations() >= limit)
        {
            info!(iterations = tally.iterations(), "iteration limit reached");
            return Ok(LoopOutcome {
                tally,
                stop: LoopStop::IterationLimit,
                discarded_passes: 0,
            });
        }
    }
}

#[instrument(skip_all, fields(iteration = tally.iterations() + 1))]
fn run_iteration<G: Grader, F: FnMut(&GradeEvent<'_>)>(
    config: &LoopConfig,
    grader: &G,
    settler: &LogSettler,
    stop: &StopFlag,
    tally: &mut Tally,
    on_result: &mut F,
) -> Result<RunState> {
    for project in &config.projects {
        if stop.is_stop_requested() {
            return Ok(RunState::Stopped);
        }

        let graded = grader.grade(project);
        if stop.is_stop_requested() {
            match graded {
                Ok(_) => warn!(project = %project, "stop requested, leaving last log unsettled"),
                Err(err) => warn!(
                    project = %project,
                    err = %format!("{err:#}"),
                    "stop requested, ignoring grader failure"
                ),
            }
            return Ok(RunState::Stopped);
        }

        let settlement = settler.settle_output(project, &graded?)?;
        info!(project = %project, passed = settlement.passed(), "graded");
        tally.record(project, settlement.passed());
        on_result(&GradeEvent {
            iteration: tally.iterations() + 1,
            project,
            settlement: &settlement,
        });
    }
    Ok(RunState::Running)
}
