//! Parsing of the grading command's textual report.
//!
//! The grader prints human-readable text. Two facts are extracted from it:
//! the path of the log it wrote (from the details line, which must be the
//! second-to-last line, the last one being empty) and whether the run failed
//! (the word `failed` appears anywhere).

use thiserror::Error;

/// Prefix of the log path on the details line.
pub const DETAILS_MARKER: &str = "(Details available in ";

/// Substring whose presence anywhere in the report marks a failed run.
pub const FAILURE_WORD: &str = "failed";

/// Outcome of one grader run as read from its report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradeReport {
    pub passed: bool,
    /// Log path exactly as reported, usually relative to the working directory.
    pub log_path: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReportError {
    #[error("expected at least two lines, got {lines}")]
    TooFewLines { lines: usize },
    #[error("details line {line:?} does not contain {marker:?}", marker = DETAILS_MARKER)]
    MissingDetailsMarker { line: String },
    #[error("details line {line:?} names an empty log path")]
    EmptyLogPath { line: String },
}

/// Parse a grader report into pass/fail and the reported log path.
///
/// The path is whatever follows [`DETAILS_MARKER`] on the second-to-last line,
/// minus its last two characters (the closing `.)`).
pub fn parse_grade_report(text: &str) -> Result<GradeReport, ReportError> {
    let lines: Vec<&str> = text.split('\n').collect();
    if lines.len() < 2 {
        return Err(ReportError::TooFewLines { lines: lines.len() });
    }
    let line = lines[lines.len() - 2];

    let after_marker = line
        .split(DETAILS_MARKER)
        .nth(1)
        .ok_or_else(|| ReportError::MissingDetailsMarker {
            line: line.to_string(),
        })?;

    let cut = after_marker
        .char_indices()
        .rev()
        .nth(1)
        .map_or(0, |(idx, _)| idx);
    let log_path = &after_marker[..cut];
    if log_path.is_empty() {
        return Err(ReportError::EmptyLogPath {
            line: line.to_string(),
        });
    }

    Ok(GradeReport {
        passed: !text.contains(FAILURE_WORD),
        log_path: log_path.to_string(),
    })
}
