//! Batch scheduler.
//!
//! Pre-flight (config, targets, downloader, destination) runs once; then one
//! worker per item fans out under a permit cap and the outcomes are folded
//! into a [`BatchReport`] in input order.

mod parallel;
mod preflight;
mod progress;
mod report;

pub use parallel::run_batch;
pub use preflight::{preflight, Preflight, PreflightError};
pub use progress::BatchEvent;
pub use report::{BatchError, BatchReport, ItemFailure, ItemReport};
