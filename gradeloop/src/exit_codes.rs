//! Stable exit codes for the gradeloop CLI.

/// The loop was stopped (Ctrl-C or iteration limit) and the summary was printed.
pub const OK: i32 = 0;
/// Invalid flags, a failed grader invocation, unrecognized output, or a filesystem error.
pub const FAILURE: i32 = 1;
