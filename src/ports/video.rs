//! Frame source and sink contracts.

/// A single decoded video frame.
///
/// Raw pixel bytes plus dimensions. The pipeline never inspects the
/// pixel layout; it is whatever the detector and tracker backends
/// agreed on.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            data,
            width,
            height,
        }
    }
}

/// Supplies frames to the frame loop.
pub trait FrameSource {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Read the next frame. `Ok(None)` signals end of stream, which is
    /// normal termination rather than an error.
    fn read(&mut self) -> Result<Option<Frame>, Self::Error>;

    /// Native capture resolution, before any resize for processing.
    /// Logged track coordinates are rescaled back into this space.
    fn resolution(&self) -> (u32, u32);
}

/// Accepts processed frames (display window, encoder, file output).
pub trait FrameSink {
    type Error: std::error::Error + Send + Sync + 'static;

    fn write(&mut self, frame: &Frame) -> Result<(), Self::Error>;
}
