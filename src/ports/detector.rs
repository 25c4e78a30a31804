//! Object detection port.

use serde::Deserialize;

use crate::error::{Error, Result as CrateResult};
use crate::pipeline::InferenceWorker;
use crate::ports::video::Frame;
use crate::rect::Rect;

/// Which detection backend the application should construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectorKind {
    /// Single-shot multi-class detector
    Ssd,
    /// YOLO-family detector
    Yolo,
    /// Pre-computed public detections
    Public,
}

/// A single detection produced by a detector backend.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// Bounding box in TLBR frame coordinates
    pub tlbr: Rect,
    /// Class label index
    pub label: u32,
    /// Confidence score in `[0, 1]`
    pub score: f32,
}

impl Detection {
    pub fn new(tlbr: Rect, label: u32, score: f32) -> Self {
        Self { tlbr, label, score }
    }
}

/// Builder for `Detection` objects from the box formats different
/// backends emit.
#[derive(Debug, Clone, Default)]
pub struct DetectionBuilder {
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
    label: u32,
    score: f32,
}

impl DetectionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set bounding box in TLBR format (x1, y1, x2, y2).
    pub fn tlbr(mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        self.x1 = x1;
        self.y1 = y1;
        self.x2 = x2;
        self.y2 = y2;
        self
    }

    /// Set bounding box in XYWH format (center_x, center_y, width, height).
    pub fn xywh(mut self, cx: f32, cy: f32, w: f32, h: f32) -> Self {
        self.x1 = cx - w / 2.0;
        self.y1 = cy - h / 2.0;
        self.x2 = cx + w / 2.0;
        self.y2 = cy + h / 2.0;
        self
    }

    /// Set bounding box in TLWH format (top-left x, top-left y, width, height).
    pub fn tlwh(mut self, x: f32, y: f32, w: f32, h: f32) -> Self {
        self.x1 = x;
        self.y1 = y;
        self.x2 = x + w;
        self.y2 = y + h;
        self
    }

    /// Set the class label index.
    pub fn label(mut self, label: u32) -> Self {
        self.label = label;
        self
    }

    /// Set the confidence score.
    pub fn score(mut self, score: f32) -> Self {
        self.score = score;
        self
    }

    /// Build the final `Detection`.
    pub fn build(self) -> Detection {
        Detection::new(
            Rect::from_tlbr(self.x1, self.y1, self.x2, self.y2),
            self.label,
            self.score,
        )
    }
}

/// Object detection port.
///
/// `detect` is the blocking path used for the very first frame. The
/// `detect_async` / `postprocess` pair is a dispatch-then-retrieve
/// contract: the dispatch must return as soon as inference is in
/// flight, so the caller can overlap tracker work with it.
pub trait Detector {
    /// Error type for detection failures.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Run inference on `frame` and block for the detections.
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>, Self::Error>;

    /// Dispatch inference on `frame` without waiting for it.
    fn detect_async(&mut self, frame: &Frame) -> Result<(), Self::Error>;

    /// Block until the detections dispatched with
    /// [`detect_async`](Detector::detect_async) are ready.
    fn postprocess(&mut self) -> Result<Vec<Detection>, Self::Error>;
}

/// Runs a blocking detection function on a dedicated worker thread,
/// turning it into the dispatch/retrieve contract of [`Detector`].
///
/// While a dispatched frame is being inferred, the calling thread is
/// free to run the tracker's flow computation against the same frame.
pub struct ThreadedDetector<E> {
    worker: InferenceWorker<Frame, Result<Vec<Detection>, E>>,
}

impl<E> ThreadedDetector<E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    /// Spawn the worker thread. `infer` runs once per dispatched frame.
    pub fn spawn<F>(mut infer: F) -> std::io::Result<Self>
    where
        F: FnMut(&Frame) -> Result<Vec<Detection>, E> + Send + 'static,
    {
        let worker = InferenceWorker::spawn("detector", move |frame: Frame| infer(&frame))?;
        Ok(Self { worker })
    }
}

impl<E> Detector for ThreadedDetector<E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    type Error = Error;

    fn detect(&mut self, frame: &Frame) -> CrateResult<Vec<Detection>> {
        self.detect_async(frame)?;
        self.postprocess()
    }

    fn detect_async(&mut self, frame: &Frame) -> CrateResult<()> {
        self.worker.submit(frame.clone())
    }

    fn postprocess(&mut self) -> CrateResult<Vec<Detection>> {
        self.worker.retrieve()?.map_err(Error::detector)
    }
}
