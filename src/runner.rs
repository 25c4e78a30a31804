//! The frame loop: drives the pipeline and controller until the stream
//! ends, then walks the hardware through its shutdown sequence.

use std::io::Write;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::nav::NavController;
use crate::pipeline::{Pipeline, TimingReport};
use crate::ports::{
    Detector, FeatureExtractor, FrameSink, FrameSource, StacklightColor, TrackerBackend, Trolley,
};
use crate::telemetry::{TelemetryState, TrackLog};

/// Summary of a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunReport {
    /// Frames processed before the stream ended.
    pub frames: u64,
    /// Wall time the loop ran for.
    pub elapsed: Duration,
    /// Per-stage timing averages.
    pub timing: TimingReport,
}

/// Run the frame loop to completion.
///
/// Reads frames until the source is exhausted (normal termination) or a
/// port fails (the error propagates). Each frame is stepped through the
/// pipeline, the visible tracks are handed to the controller, and the
/// optional track log and sink are fed.
///
/// Whatever way the loop ends, the motors are stopped and the
/// stacklight is cycled through its reset sequence before returning;
/// cleanup failures are logged and swallowed so they cannot mask the
/// loop's own result.
pub fn run<S, D, X, T, H, K, W>(
    source: &mut S,
    pipeline: &mut Pipeline<D, X, T>,
    nav: &mut NavController,
    trolley: &mut H,
    telemetry: &TelemetryState,
    mut sink: Option<&mut K>,
    mut track_log: Option<&mut TrackLog<W>>,
) -> Result<RunReport>
where
    S: FrameSource,
    D: Detector,
    X: FeatureExtractor,
    T: TrackerBackend,
    H: Trolley,
    K: FrameSink,
    W: Write,
{
    let started = Instant::now();
    let outcome = frame_loop(
        source,
        pipeline,
        nav,
        trolley,
        telemetry,
        &mut sink,
        &mut track_log,
    );
    let elapsed = started.elapsed();

    shutdown(trolley);

    let frames = outcome?;
    let timing = pipeline.report(elapsed);
    info!(frames, avg_fps = timing.avg_fps, "run finished");
    debug!(
        avg_preprocessing = ?timing.avg_preprocessing,
        avg_detection = ?timing.avg_detection,
        avg_extraction = ?timing.avg_extraction,
        avg_association = ?timing.avg_association,
        avg_tracking = ?timing.avg_tracking,
        "stage averages"
    );

    Ok(RunReport {
        frames,
        elapsed,
        timing,
    })
}

fn frame_loop<S, D, X, T, H, K, W>(
    source: &mut S,
    pipeline: &mut Pipeline<D, X, T>,
    nav: &mut NavController,
    trolley: &mut H,
    telemetry: &TelemetryState,
    sink: &mut Option<&mut K>,
    track_log: &mut Option<&mut TrackLog<W>>,
) -> Result<u64>
where
    S: FrameSource,
    D: Detector,
    X: FeatureExtractor,
    T: TrackerBackend,
    H: Trolley,
    K: FrameSink,
    W: Write,
{
    trolley
        .set_stacklight(StacklightColor::Green, true)
        .map_err(Error::hardware)?;
    info!("starting frame loop");

    let mut frames: u64 = 0;
    loop {
        let Some(frame) = source.read().map_err(Error::stream)? else {
            debug!("end of stream");
            break;
        };

        pipeline.step(&frame)?;
        nav.steer(pipeline.visible_tracks(), frame.width, trolley, telemetry)?;

        if let Some(log) = track_log.as_deref_mut() {
            log.write_frame(pipeline.frame_count(), pipeline.visible_tracks())?;
        }
        if let Some(sink) = sink.as_deref_mut() {
            sink.write(&frame).map_err(Error::stream)?;
        }

        frames += 1;
    }

    Ok(frames)
}

/// Stop the motors and walk the stacklight through its reset sequence.
fn shutdown<H: Trolley>(trolley: &mut H) {
    if let Err(err) = trolley.stop() {
        warn!("failed to stop motors during shutdown: {err}");
    }
    for color in [
        StacklightColor::Red,
        StacklightColor::Amber,
        StacklightColor::Green,
    ] {
        if let Err(err) = trolley.set_stacklight(color, false) {
            warn!("failed to reset stacklight during shutdown: {err}");
        }
    }
}
