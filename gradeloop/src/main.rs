//! Soak-test a project's subprojects against the grading script.
//!
//! Runs `submit <subproject>` for every subproject, over and over, keeping the
//! JSON logs of failed runs under `--logdir` and deleting the rest. Must be run
//! from the project directory. Hit Ctrl-C to stop and print `passed/total`.

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;

use gradeloop::config::{LoopConfig, parse_projects};
use gradeloop::core::tally::render_summary;
use gradeloop::exit_codes;
use gradeloop::io::grader::{DEFAULT_GRADER, SubmitGrader};
use gradeloop::io::interrupt::install_ctrlc_handler;
use gradeloop::io::settle::{DEFAULT_LOGDIR, LogSettler};
use gradeloop::logging;
use gradeloop::looping::run_loop;

#[derive(Parser)]
#[command(
    name = "gradeloop",
    version,
    about = "Repeatedly grade subprojects and keep the logs of failed runs"
)]
struct Cli {
    /// Subprojects to grade, comma-separated (e.g. `echo,gfserver`).
    #[arg(long)]
    projects: String,

    /// Directory that receives the logs of failed runs.
    #[arg(long, default_value = DEFAULT_LOGDIR)]
    logdir: PathBuf,

    /// Grading command; the subproject is appended as its last argument.
    #[arg(long, default_value = DEFAULT_GRADER)]
    grader: String,

    /// Kill a grader run that takes longer than this many seconds.
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Stop after this many full iterations instead of waiting for Ctrl-C.
    #[arg(long, value_name = "N")]
    iterations: Option<u32>,
}

impl Cli {
    fn into_config(self) -> Result<LoopConfig> {
        let config = LoopConfig {
            projects: parse_projects(&self.projects)?,
            logdir: self.logdir,
            grader: self.grader,
            timeout: self.timeout.map(Duration::from_secs),
            max_iterations: self.iterations,
        };
        config.validate()?;
        Ok(config)
    }
}

fn main() {
    logging::init();
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(exit_codes::FAILURE);
    }
    std::process::exit(exit_codes::OK);
}

fn run() -> Result<()> {
    let config = Cli::parse().into_config()?;
    let cwd = std::env::current_dir().context("resolve working directory")?;
    debug!(?config, cwd = %cwd.display(), "configuration loaded");

    let grader = SubmitGrader::from_command_line(&config.grader, cwd.clone(), config.timeout)?;
    let settler = LogSettler::new(&cwd, &config.logdir);
    let stop = install_ctrlc_handler()?;

    println!("Test started... To complete, hit ctrl-c");
    let outcome = run_loop(&config, &grader, &settler, &stop, |_| {})?;
    print!("{}", render_summary(&outcome.tally));
    std::io::stdout().flush().context("flush stdout")?;
    Ok(())
}
