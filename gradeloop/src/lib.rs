//! Repeatedly grade a set of subprojects and keep the logs of failed runs.
//!
//! Each iteration runs the external grading command once per subproject, reads
//! the textual report it prints, and either deletes the generated log (pass) or
//! moves it under a failure directory (fail). The loop runs until interrupted
//! and then reports `passed/iterations` per subproject.
//!
//! - **[`core`]**: Pure logic (report parsing, path computation, tallying).
//!   No I/O, fully testable in isolation.
//! - **[`io`]**: Side effects (child processes, filesystem, Ctrl-C).
//!
//! [`looping`] ties the two together into the driver loop used by the CLI.

pub mod config;
pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod looping;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
