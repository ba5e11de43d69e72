//! Resume-to-job-posting matching for applicant tracking system boards.
//!
//! The [`matching`] module holds the pure scoring core. [`sources`] and
//! [`output`] are the I/O collaborators around it: ATS fetchers with a raw
//! posting cache, and the JSON/CSV result writers.

pub mod config;
pub mod error;
pub mod matching;
pub mod output;
pub mod sources;
pub mod telemetry;
