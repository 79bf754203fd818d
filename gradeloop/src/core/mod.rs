//! Deterministic, pure logic for the grading loop.
//!
//! Core modules must be free of I/O side effects. They operate on strings,
//! paths, and counters and return deterministic outputs suitable for tests.

pub mod relocation;
pub mod report;
pub mod tally;
