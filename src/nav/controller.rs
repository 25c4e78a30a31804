//! Motor-state machine driven by the tracked target position.

use tracing::debug;

use crate::config::NavConfig;
use crate::error::{Error, Result};
use crate::ports::{StacklightColor, Track, Trolley};
use crate::telemetry::{TelemetrySnapshot, TelemetryState, TrackReport};

/// Discrete motor state. The integer values are what telemetry reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(i8)]
pub enum MotorState {
    Left = -1,
    #[default]
    Neutral = 0,
    Right = 1,
}

impl MotorState {
    pub fn as_i8(self) -> i8 {
        self as i8
    }
}

/// Converts visible tracks into motor commands, one decision per frame.
///
/// A wide band (`centre_limit`) triggers a turn and a band half as wide
/// releases it back to forward drive, so a centroid hovering at the
/// trigger boundary cannot chatter the motors. The release transitions
/// additionally require the front-proximity sensor to report clear.
#[derive(Debug)]
pub struct NavController {
    state: MotorState,
    centre_limit: u32,
    turn_duty: u8,
    forward_duty: u8,
}

impl NavController {
    pub fn new(config: NavConfig) -> Self {
        Self {
            state: MotorState::Neutral,
            centre_limit: config.centre_limit,
            turn_duty: config.turn_duty,
            forward_duty: config.forward_duty,
        }
    }

    pub fn motor_state(&self) -> MotorState {
        self.state
    }

    /// Decide and issue motor commands for this frame's visible tracks,
    /// then publish the telemetry snapshot.
    ///
    /// Tracks are examined in iteration order and the state machine is
    /// updated per track, so with several visible tracks the last one
    /// wins. An empty set commands a stop but leaves the state machine
    /// where it was; the next visible target resumes from that state.
    pub fn steer<'t, H, I>(
        &mut self,
        tracks: I,
        frame_width: u32,
        trolley: &mut H,
        telemetry: &TelemetryState,
    ) -> Result<()>
    where
        H: Trolley,
        I: IntoIterator<Item = &'t Track>,
    {
        let half_width = (frame_width / 2) as i32;
        let band = self.centre_limit as i32;
        let half_band = band / 2;

        let mut report = TrackReport::default();
        let mut any_visible = false;

        for track in tracks {
            if !any_visible {
                any_visible = true;
                trolley
                    .set_stacklight(StacklightColor::Red, true)
                    .map_err(Error::hardware)?;
            }

            let (mx, my) = track.tlbr.centroid();
            // Later tracks overwrite earlier ones; subscribers only see
            // the last track iterated.
            report.trk_id = Some(track.track_id);
            report.mx = Some(mx);
            report.my = Some(my);

            if mx > half_width + band && self.state == MotorState::Neutral {
                debug!(track = track.track_id, mx, "turning right");
                self.state = MotorState::Right;
                trolley
                    .turn_right(self.turn_duty)
                    .map_err(Error::hardware)?;
            }

            if mx < half_width - band && self.state == MotorState::Neutral {
                debug!(track = track.track_id, mx, "turning left");
                self.state = MotorState::Left;
                trolley.turn_left(self.turn_duty).map_err(Error::hardware)?;
            }

            if mx < half_width + half_band
                && self.state == MotorState::Right
                && trolley.front_proximity_clear().map_err(Error::hardware)?
            {
                debug!(track = track.track_id, mx, "forward after right");
                self.state = MotorState::Neutral;
                trolley
                    .forward(self.forward_duty)
                    .map_err(Error::hardware)?;
            }

            if mx > half_width - half_band
                && self.state == MotorState::Left
                && trolley.front_proximity_clear().map_err(Error::hardware)?
            {
                debug!(track = track.track_id, mx, "forward after left");
                self.state = MotorState::Neutral;
                trolley
                    .forward(self.forward_duty)
                    .map_err(Error::hardware)?;
            }
        }

        if !any_visible {
            trolley
                .set_stacklight(StacklightColor::Red, false)
                .map_err(Error::hardware)?;
            trolley.stop().map_err(Error::hardware)?;
        }

        report.motor_status = self.state.as_i8();
        telemetry.publish(TelemetrySnapshot::tracks(report));
        Ok(())
    }
}
