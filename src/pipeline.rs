//! Per-frame pipeline orchestration.
//!
//! [`Pipeline`] interleaves detection, feature extraction, and tracking
//! over a fixed detector duty cycle, overlapping the asynchronous model
//! calls with the tracker's own computation to hide inference latency.

mod orchestrator;
mod timing;
mod worker;

pub use orchestrator::Pipeline;
pub use timing::{StageTimings, TimingReport};
pub use worker::InferenceWorker;
