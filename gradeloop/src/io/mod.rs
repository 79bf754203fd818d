//! I/O helpers for the grading loop.

pub mod grader;
pub mod interrupt;
pub mod process;
pub mod settle;
