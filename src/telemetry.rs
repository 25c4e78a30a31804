//! Live tracking telemetry: the shared snapshot record, the WebSocket
//! broadcast loop, and the per-frame track log sink.

mod broadcaster;
mod state;
mod track_log;

pub use broadcaster::spawn_broadcaster;
pub use state::{MessageKind, TelemetrySnapshot, TelemetryState, TrackReport};
pub use track_log::TrackLog;
