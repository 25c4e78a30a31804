//! Visual tracking and navigation control for a camera-guided
//! motorized trolley.
//!
//! Three cores and the ports they drive:
//!
//! - [`Pipeline`] interleaves asynchronous object detection, appearance
//!   feature extraction, and optical-flow tracking on a fixed detector
//!   duty cycle, hiding inference latency behind the tracker's own
//!   computation.
//! - [`NavController`] converts the tracked target position into motor
//!   commands with hysteresis bands and front-proximity awareness.
//! - [`telemetry`] broadcasts live tracking state to WebSocket
//!   subscribers once a second, decoupled from the frame rate.
//!
//! Detection models, the feature extractor, the tracker internals,
//! video I/O, and the trolley hardware are external collaborators
//! behind the traits in [`ports`]; [`runner::run`] wires everything
//! into a frame loop with an orderly shutdown sequence.

pub mod config;
mod error;
pub mod nav;
pub mod pipeline;
pub mod ports;
mod rect;
pub mod runner;
pub mod telemetry;

pub use config::{Config, MotConfig, NavConfig, TelemetryConfig};
pub use error::{BoxError, Error, Result};
pub use nav::{MotorState, NavController};
pub use pipeline::{InferenceWorker, Pipeline, StageTimings, TimingReport};
pub use ports::{
    Detection, DetectionBuilder, Detector, DetectorKind, Embeddings, FeatureExtractor, Frame,
    FrameSink, FrameSource, StacklightColor, ThreadedDetector, ThreadedExtractor, Track,
    TrackerBackend, Trolley,
};
pub use rect::Rect;
pub use runner::{RunReport, run};
pub use telemetry::{
    MessageKind, TelemetrySnapshot, TelemetryState, TrackLog, TrackReport, spawn_broadcaster,
};
