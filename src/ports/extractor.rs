//! Appearance feature extraction port.

use ndarray::Array2;

use crate::error::{Error, Result as CrateResult};
use crate::pipeline::InferenceWorker;
use crate::ports::detector::Detection;
use crate::ports::video::Frame;

/// Appearance embeddings, one row per detection, in dispatch order.
pub type Embeddings = Array2<f32>;

/// Appearance feature extraction port.
///
/// Same dispatch-then-retrieve contract as the detector: the pipeline
/// runs the tracker's motion prediction while extraction is in flight.
pub trait FeatureExtractor {
    /// Error type for extraction failures.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Dispatch embedding extraction for `detections` cropped from `frame`.
    fn extract_async(
        &mut self,
        frame: &Frame,
        detections: &[Detection],
    ) -> Result<(), Self::Error>;

    /// Block until the embeddings dispatched with
    /// [`extract_async`](FeatureExtractor::extract_async) are ready.
    /// Rows are aligned positionally with the detections passed in.
    fn postprocess(&mut self) -> Result<Embeddings, Self::Error>;
}

/// Runs a blocking extraction function on a dedicated worker thread,
/// turning it into the dispatch/retrieve contract of
/// [`FeatureExtractor`].
pub struct ThreadedExtractor<E> {
    worker: InferenceWorker<(Frame, Vec<Detection>), Result<Embeddings, E>>,
}

impl<E> ThreadedExtractor<E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    /// Spawn the worker thread. `extract` runs once per dispatched batch.
    pub fn spawn<F>(mut extract: F) -> std::io::Result<Self>
    where
        F: FnMut(&Frame, &[Detection]) -> Result<Embeddings, E> + Send + 'static,
    {
        let worker = InferenceWorker::spawn(
            "extractor",
            move |(frame, detections): (Frame, Vec<Detection>)| extract(&frame, &detections),
        )?;
        Ok(Self { worker })
    }
}

impl<E> FeatureExtractor for ThreadedExtractor<E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    type Error = Error;

    fn extract_async(&mut self, frame: &Frame, detections: &[Detection]) -> CrateResult<()> {
        self.worker.submit((frame.clone(), detections.to_vec()))
    }

    fn postprocess(&mut self) -> CrateResult<Embeddings> {
        self.worker.retrieve()?.map_err(Error::extractor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rect::Rect;

    #[test]
    fn test_threaded_extractor_row_alignment() {
        let mut extractor =
            ThreadedExtractor::spawn(|_frame: &Frame, detections: &[Detection]| {
                Ok::<_, std::io::Error>(Embeddings::zeros((detections.len(), 8)))
            })
            .unwrap();

        let frame = Frame::new(vec![0; 4], 2, 2);
        let detections = vec![
            Detection::new(Rect::from_tlbr(0.0, 0.0, 1.0, 1.0), 0, 0.9),
            Detection::new(Rect::from_tlbr(1.0, 1.0, 2.0, 2.0), 0, 0.8),
        ];
        extractor.extract_async(&frame, &detections).unwrap();
        let embeddings = extractor.postprocess().unwrap();
        assert_eq!(embeddings.dim(), (2, 8));
    }
}
