//! Per-stage timing accumulators and the shutdown report.

use std::time::Duration;

/// Wall-clock time accumulated per pipeline stage.
///
/// Written only by the pipeline; read once at shutdown for reporting.
#[derive(Debug, Clone, Copy, Default)]
pub struct StageTimings {
    /// Detector input preparation and dispatch
    pub preprocessing: Duration,
    /// Flow computation overlapped with detection, plus retrieval
    pub detection: Duration,
    /// Motion prediction overlapped with extraction, plus retrieval
    pub extraction: Duration,
    /// Association and track update
    pub association: Duration,
    /// Flow-only updates between detector cycles
    pub tracking: Duration,
}

/// Per-stage averages for a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TimingReport {
    pub avg_fps: f64,
    pub avg_preprocessing: Duration,
    pub avg_detection: Duration,
    pub avg_extraction: Duration,
    pub avg_association: Duration,
    pub avg_tracking: Duration,
}

impl StageTimings {
    /// Averages over `frame_count` frames, of which `detector_frame_count`
    /// ran the detector, across `elapsed` of wall time.
    pub fn report(
        &self,
        frame_count: u64,
        detector_frame_count: u64,
        elapsed: Duration,
    ) -> TimingReport {
        // Zero counts mean zero sums; dividing by one keeps the math total.
        let detector_frames = detector_frame_count.max(1) as u32;
        let track_frames = frame_count.saturating_sub(detector_frame_count).max(1) as u32;
        let avg_fps = if elapsed.as_secs_f64() > 0.0 {
            frame_count as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        };

        TimingReport {
            avg_fps,
            avg_preprocessing: self.preprocessing / detector_frames,
            avg_detection: self.detection / detector_frames,
            avg_extraction: self.extraction / detector_frames,
            avg_association: self.association / detector_frames,
            avg_tracking: self.tracking / track_frames,
        }
    }
}
