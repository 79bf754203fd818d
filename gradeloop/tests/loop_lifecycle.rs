//! Loop-level tests driving `run_loop` through whole iterations with a
//! scripted grader and a real temporary working directory.

use std::fs;

use gradeloop::config::LoopConfig;
use gradeloop::core::tally::render_summary;
use gradeloop::io::interrupt::StopFlag;
use gradeloop::looping::{LoopStop, run_loop};
use gradeloop::test_support::{ScriptedGrader, ScriptedRun, TestWorkspace};

/// `echo` fails once in three iterations, `gfserver` never fails.
///
/// Iteration 2's echo log must end up under the failure directory, every
/// other log must be gone, and the summary must read 2/3 and 3/3.
#[test]
fn three_iterations_with_one_failure_summarize_correctly() {
    let ws = TestWorkspace::new().expect("workspace");
    let grader = ScriptedGrader::new(
        ws.path(),
        vec![
            ScriptedRun::pass("echo"),
            ScriptedRun::pass("gfserver"),
            ScriptedRun::fail("echo"),
            ScriptedRun::pass("gfserver"),
            ScriptedRun::pass("echo"),
            ScriptedRun::pass("gfserver"),
        ],
    );
    let logdir = ws.path().join("fails");
    let config = LoopConfig {
        projects: vec!["echo".to_string(), "gfserver".to_string()],
        logdir: logdir.clone(),
        max_iterations: Some(3),
        ..LoopConfig::default()
    };

    let outcome = run_loop(
        &config,
        &grader,
        &ws.settler(&logdir),
        &StopFlag::new(),
        |_| {},
    )
    .expect("loop");

    assert_eq!(outcome.stop, LoopStop::IterationLimit);
    assert_eq!(
        outcome.tally.summary_lines(),
        vec!["echo:      2/3".to_string(), "gfserver:      3/3".to_string()]
    );
    assert!(render_summary(&outcome.tally).contains("*** RESULTS: ***"));

    // Call 3 was the failing echo run: echo/run3/log.json -> fails/run3/log.json.
    let kept = logdir.join("run3/log.json");
    assert_eq!(fs::read_to_string(&kept).expect("kept log"), "{\"call\":3}");
    assert!(grader.unsettled_logs().is_empty());
}

/// Tally never exceeds completed iterations, wherever the stop lands.
#[test]
fn tally_is_bounded_by_iterations_at_every_stop_point() {
    for stop_call in 1..=6 {
        let ws = TestWorkspace::new().expect("workspace");
        let stop = StopFlag::new();
        let runs = (0..3)
            .flat_map(|_| [ScriptedRun::pass("echo"), ScriptedRun::pass("gfserver")])
            .collect();
        let grader = ScriptedGrader::new(ws.path(), runs).stop_after(stop_call, stop.clone());
        let config = LoopConfig {
            projects: vec!["echo".to_string(), "gfserver".to_string()],
            ..LoopConfig::default()
        };

        let outcome = run_loop(&config, &grader, &ws.settler("pr_failures"), &stop, |_| {})
            .expect("loop");

        let iterations = outcome.tally.iterations();
        assert_eq!(iterations, ((stop_call - 1) / 2) as u32, "stop at call {stop_call}");
        for project in outcome.tally.projects() {
            let passed = outcome.tally.passed(project).expect("known project");
            assert!(passed <= iterations, "{project}: {passed} > {iterations}");
        }
    }
}

/// A report without a details line aborts the loop with a clear message.
#[test]
fn unrecognized_report_is_fatal_and_names_project() {
    struct Garbage;
    impl gradeloop::io::grader::Grader for Garbage {
        fn grade(&self, _project: &str) -> anyhow::Result<String> {
            Ok("Traceback (most recent call last):\n  oops\n".to_string())
        }
    }

    let ws = TestWorkspace::new().expect("workspace");
    let config = LoopConfig {
        projects: vec!["gfserver".to_string()],
        ..LoopConfig::default()
    };
    let err = run_loop(
        &config,
        &Garbage,
        &ws.settler("pr_failures"),
        &StopFlag::new(),
        |_| {},
    )
    .expect_err("fatal");
    assert!(format!("{err:#}").contains("unrecognized output format for gfserver"));
}
