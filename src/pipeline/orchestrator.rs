//! Top-level module that ties detection, feature extraction, and
//! tracking together, one frame per call.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::{Error, Result};
use crate::pipeline::timing::{StageTimings, TimingReport};
use crate::ports::{Detector, FeatureExtractor, Frame, Track, TrackerBackend};

/// Per-frame tracking pipeline with a fixed detector duty cycle.
///
/// Every `detector_frame_skip`-th frame runs the full
/// detect → extract → associate update; the frames in between run only
/// the tracker's cheap flow-based update. During a full update the two
/// asynchronous model calls are overlapped with the tracker's own
/// computation: flow runs while detection is in flight, the motion
/// prediction runs while extraction is in flight.
pub struct Pipeline<D, X, T> {
    detector: D,
    extractor: X,
    tracker: T,
    detector_frame_skip: u64,
    frame_count: u64,
    detector_frame_count: u64,
    timings: StageTimings,
}

impl<D, X, T> Pipeline<D, X, T>
where
    D: Detector,
    X: FeatureExtractor,
    T: TrackerBackend,
{
    /// Create a pipeline that runs the detector every
    /// `detector_frame_skip` frames (must be at least 1).
    pub fn new(detector: D, extractor: X, tracker: T, detector_frame_skip: u64) -> Result<Self> {
        if detector_frame_skip == 0 {
            return Err(Error::Config(
                "detector_frame_skip must be at least 1".into(),
            ));
        }
        Ok(Self {
            detector,
            extractor,
            tracker,
            detector_frame_skip,
            frame_count: 0,
            detector_frame_count: 0,
            timings: StageTimings::default(),
        })
    }

    /// Tracks that are both confirmed and active, in the tracker's order.
    ///
    /// Recomputed on every call: track state can change within a single
    /// frame (before vs after update), so the view is never cached.
    pub fn visible_tracks(&self) -> impl Iterator<Item = &Track> {
        self.tracker
            .tracks()
            .values()
            .filter(|track| track.confirmed && track.active)
    }

    /// Frames processed so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Frames on which the detector ran, excluding the initiation frame.
    pub fn detector_frame_count(&self) -> u64 {
        self.detector_frame_count
    }

    /// Accumulated per-stage timings.
    pub fn timings(&self) -> &StageTimings {
        &self.timings
    }

    /// Per-stage averages over `elapsed` of wall time.
    pub fn report(&self, elapsed: Duration) -> TimingReport {
        self.timings
            .report(self.frame_count, self.detector_frame_count, elapsed)
    }

    /// Get a reference to the tracker backend.
    pub fn tracker(&self) -> &T {
        &self.tracker
    }

    /// Get a mutable reference to the tracker backend.
    pub fn tracker_mut(&mut self) -> &mut T {
        &mut self.tracker
    }

    /// Clear the counters and timings so the next [`step`](Pipeline::step)
    /// re-initiates the tracker.
    pub fn reset(&mut self) {
        self.frame_count = 0;
        self.detector_frame_count = 0;
        self.timings = StageTimings::default();
    }

    /// Advance the tracker by exactly one frame.
    ///
    /// Mutates tracker-owned track state as a side effect and
    /// accumulates per-phase timing. The frame counter advances by one
    /// on success, whatever the mode; a failed step does not advance it,
    /// so a retried frame re-runs the same mode.
    pub fn step(&mut self, frame: &Frame) -> Result<()> {
        if self.frame_count == 0 {
            let detections = self.detector.detect(frame).map_err(Error::detector)?;
            self.tracker
                .initiate(frame, &detections)
                .map_err(Error::tracker)?;
            debug!(detections = detections.len(), "tracker initiated");
        } else if self.frame_count % self.detector_frame_skip == 0 {
            // Flow must run while detection is in flight, and the
            // prediction while extraction is in flight; reordering
            // loses the overlap and can leave the prediction on a
            // stale flow field.
            let tic = Instant::now();
            self.detector.detect_async(frame).map_err(Error::detector)?;
            self.timings.preprocessing += tic.elapsed();

            let tic = Instant::now();
            self.tracker.compute_flow(frame).map_err(Error::tracker)?;
            let detections = self.detector.postprocess().map_err(Error::detector)?;
            self.timings.detection += tic.elapsed();

            let tic = Instant::now();
            self.extractor
                .extract_async(frame, &detections)
                .map_err(Error::extractor)?;
            self.tracker.apply_kalman().map_err(Error::tracker)?;
            let embeddings = self.extractor.postprocess().map_err(Error::extractor)?;
            self.timings.extraction += tic.elapsed();

            let tic = Instant::now();
            self.tracker
                .update(self.frame_count, &detections, &embeddings)
                .map_err(Error::tracker)?;
            self.timings.association += tic.elapsed();

            self.detector_frame_count += 1;
        } else {
            let tic = Instant::now();
            self.tracker.track(frame).map_err(Error::tracker)?;
            self.timings.tracking += tic.elapsed();
        }

        self.frame_count += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::convert::Infallible;
    use std::result::Result;

    use super::*;
    use crate::ports::{Detection, Embeddings};
    use crate::rect::Rect;

    #[derive(Default)]
    struct CountingDetector {
        sync_calls: usize,
        async_calls: usize,
        post_calls: usize,
    }

    impl Detector for CountingDetector {
        type Error = Infallible;

        fn detect(&mut self, _frame: &Frame) -> Result<Vec<Detection>, Self::Error> {
            self.sync_calls += 1;
            Ok(vec![])
        }

        fn detect_async(&mut self, _frame: &Frame) -> Result<(), Self::Error> {
            self.async_calls += 1;
            Ok(())
        }

        fn postprocess(&mut self) -> Result<Vec<Detection>, Self::Error> {
            self.post_calls += 1;
            Ok(vec![])
        }
    }

    #[derive(Default)]
    struct CountingExtractor {
        async_calls: usize,
        post_calls: usize,
    }

    impl FeatureExtractor for CountingExtractor {
        type Error = Infallible;

        fn extract_async(
            &mut self,
            _frame: &Frame,
            _detections: &[Detection],
        ) -> Result<(), Self::Error> {
            self.async_calls += 1;
            Ok(())
        }

        fn postprocess(&mut self) -> Result<Embeddings, Self::Error> {
            self.post_calls += 1;
            Ok(Embeddings::zeros((0, 0)))
        }
    }

    #[derive(Default)]
    struct CountingTracker {
        tracks: BTreeMap<u64, Track>,
        initiate_calls: usize,
        flow_calls: usize,
        kalman_calls: usize,
        update_calls: usize,
        track_calls: usize,
    }

    impl TrackerBackend for CountingTracker {
        type Error = Infallible;

        fn initiate(
            &mut self,
            _frame: &Frame,
            _detections: &[Detection],
        ) -> Result<(), Self::Error> {
            self.initiate_calls += 1;
            Ok(())
        }

        fn compute_flow(&mut self, _frame: &Frame) -> Result<(), Self::Error> {
            self.flow_calls += 1;
            Ok(())
        }

        fn apply_kalman(&mut self) -> Result<(), Self::Error> {
            self.kalman_calls += 1;
            Ok(())
        }

        fn update(
            &mut self,
            _frame_index: u64,
            _detections: &[Detection],
            _embeddings: &Embeddings,
        ) -> Result<(), Self::Error> {
            self.update_calls += 1;
            Ok(())
        }

        fn track(&mut self, _frame: &Frame) -> Result<(), Self::Error> {
            self.track_calls += 1;
            Ok(())
        }

        fn tracks(&self) -> &BTreeMap<u64, Track> {
            &self.tracks
        }
    }

    fn frame() -> Frame {
        Frame::new(vec![0; 4], 2, 2)
    }

    #[test]
    fn test_schedule_with_skip_three() {
        let mut pipeline = Pipeline::new(
            CountingDetector::default(),
            CountingExtractor::default(),
            CountingTracker::default(),
            3,
        )
        .unwrap();

        for _ in 0..10 {
            pipeline.step(&frame()).unwrap();
        }

        // Frame 0 initiates; frames 3, 6, 9 run the full update; the
        // other six run flow-only.
        assert_eq!(pipeline.frame_count(), 10);
        assert_eq!(pipeline.detector_frame_count(), 3);
        assert_eq!(pipeline.detector.sync_calls, 1);
        assert_eq!(pipeline.detector.async_calls, 3);
        assert_eq!(pipeline.detector.post_calls, 3);
        assert_eq!(pipeline.extractor.async_calls, 3);
        assert_eq!(pipeline.extractor.post_calls, 3);
        assert_eq!(pipeline.tracker.initiate_calls, 1);
        assert_eq!(pipeline.tracker.flow_calls, 3);
        assert_eq!(pipeline.tracker.kalman_calls, 3);
        assert_eq!(pipeline.tracker.update_calls, 3);
        assert_eq!(pipeline.tracker.track_calls, 6);
        assert!(pipeline.detector_frame_count() <= pipeline.frame_count());
    }

    #[test]
    fn test_schedule_with_skip_one() {
        let mut pipeline = Pipeline::new(
            CountingDetector::default(),
            CountingExtractor::default(),
            CountingTracker::default(),
            1,
        )
        .unwrap();

        for _ in 0..5 {
            pipeline.step(&frame()).unwrap();
        }

        // Every frame after initiation is a full update.
        assert_eq!(pipeline.detector_frame_count(), 4);
        assert_eq!(pipeline.tracker.track_calls, 0);
    }

    #[test]
    fn test_zero_skip_is_rejected() {
        let result = Pipeline::new(
            CountingDetector::default(),
            CountingExtractor::default(),
            CountingTracker::default(),
            0,
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_reset_reinitiates() {
        let mut pipeline = Pipeline::new(
            CountingDetector::default(),
            CountingExtractor::default(),
            CountingTracker::default(),
            2,
        )
        .unwrap();

        for _ in 0..4 {
            pipeline.step(&frame()).unwrap();
        }
        pipeline.reset();
        assert_eq!(pipeline.frame_count(), 0);
        assert_eq!(pipeline.detector_frame_count(), 0);

        pipeline.step(&frame()).unwrap();
        assert_eq!(pipeline.tracker.initiate_calls, 2);
    }

    #[test]
    fn test_visible_tracks_filters_and_preserves_order() {
        let mut tracker = CountingTracker::default();
        let boxed = Rect::from_tlbr(0.0, 0.0, 10.0, 10.0);
        tracker.tracks.insert(
            3,
            Track {
                track_id: 3,
                tlbr: boxed,
                confirmed: true,
                active: true,
            },
        );
        tracker.tracks.insert(
            1,
            Track {
                track_id: 1,
                tlbr: boxed,
                confirmed: true,
                active: false,
            },
        );
        tracker.tracks.insert(
            2,
            Track {
                track_id: 2,
                tlbr: boxed,
                confirmed: true,
                active: true,
            },
        );
        tracker.tracks.insert(
            4,
            Track {
                track_id: 4,
                tlbr: boxed,
                confirmed: false,
                active: true,
            },
        );

        let pipeline = Pipeline::new(
            CountingDetector::default(),
            CountingExtractor::default(),
            tracker,
            2,
        )
        .unwrap();

        let ids: Vec<u64> = pipeline.visible_tracks().map(|t| t.track_id).collect();
        assert_eq!(ids, vec![2, 3]);
    }
}
