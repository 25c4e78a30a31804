//! Multi-object tracker port.

use std::collections::BTreeMap;

use crate::ports::detector::Detection;
use crate::ports::extractor::Embeddings;
use crate::ports::video::Frame;
use crate::rect::Rect;

/// A tracked object as exposed by the tracker backend.
///
/// Owned by the backend for the track's whole lifetime; the pipeline
/// and controller only hold references for the duration of a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    /// Stable identifier, unique for the track's lifetime
    pub track_id: u64,
    /// Bounding box in TLBR frame coordinates
    pub tlbr: Rect,
    /// Sustained detection-embedding association confirmed this track
    pub confirmed: bool,
    /// The track matched recently enough to still be live
    pub active: bool,
}

impl Track {
    pub fn new(track_id: u64, tlbr: Rect) -> Self {
        Self {
            track_id,
            tlbr,
            confirmed: false,
            active: false,
        }
    }

    /// Confirmed and active, i.e. eligible for navigation and telemetry.
    pub fn is_visible(&self) -> bool {
        self.confirmed && self.active
    }
}

/// Multi-object tracker port.
///
/// Association, Kalman filtering, and optical-flow math all live behind
/// this trait. The pipeline drives the methods in a fixed per-frame
/// order; see [`Pipeline::step`](crate::pipeline::Pipeline::step).
pub trait TrackerBackend {
    /// Error type for tracker failures.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Start tracking from scratch with the first frame's detections.
    fn initiate(&mut self, frame: &Frame, detections: &[Detection]) -> Result<(), Self::Error>;

    /// Compute optical flow against `frame` for the next prediction step.
    fn compute_flow(&mut self, frame: &Frame) -> Result<(), Self::Error>;

    /// Run the motion prediction step using the most recent flow field.
    fn apply_kalman(&mut self) -> Result<(), Self::Error>;

    /// Associate `detections` and their `embeddings` with tracks at
    /// `frame_index`.
    fn update(
        &mut self,
        frame_index: u64,
        detections: &[Detection],
        embeddings: &Embeddings,
    ) -> Result<(), Self::Error>;

    /// Lightweight flow-only update for frames between detector cycles.
    fn track(&mut self, frame: &Frame) -> Result<(), Self::Error>;

    /// Current tracks keyed by id, in stable id order.
    fn tracks(&self) -> &BTreeMap<u64, Track>;
}
