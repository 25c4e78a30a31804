//! Shared telemetry record and its snapshot discipline.

use std::sync::{Arc, RwLock};

use serde::Serialize;

/// Discriminator for broadcast payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Tracks,
}

/// Per-frame track digest carried in a snapshot.
///
/// The id/centroid fields describe the last track the controller
/// iterated this frame and are omitted from the wire format entirely
/// when nothing was visible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TrackReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trk_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mx: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub my: Option<i32>,
    #[serde(rename = "motorStatus")]
    pub motor_status: i8,
}

/// Point-in-time copy of the tracking state pushed to subscribers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetrySnapshot {
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub data: TrackReport,
}

impl TelemetrySnapshot {
    pub fn tracks(data: TrackReport) -> Self {
        Self {
            kind: MessageKind::Tracks,
            data,
        }
    }
}

impl Default for TelemetrySnapshot {
    fn default() -> Self {
        Self::tracks(TrackReport::default())
    }
}

/// Single-writer, multi-reader snapshot slot shared between the frame
/// loop and the broadcaster.
///
/// The writer swaps in a fresh immutable snapshot; readers clone the
/// `Arc`. A reader can therefore never observe a record mid-update,
/// and holds no lock while serializing.
#[derive(Debug, Default)]
pub struct TelemetryState {
    current: RwLock<Arc<TelemetrySnapshot>>,
}

impl TelemetryState {
    /// Replace the current snapshot.
    pub fn publish(&self, snapshot: TelemetrySnapshot) {
        let mut slot = self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = Arc::new(snapshot);
    }

    /// The most recently published snapshot.
    pub fn snapshot(&self) -> Arc<TelemetrySnapshot> {
        let slot = self
            .current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_then_snapshot() {
        let state = TelemetryState::default();
        assert_eq!(*state.snapshot(), TelemetrySnapshot::default());

        let report = TrackReport {
            trk_id: Some(3),
            mx: Some(120),
            my: Some(80),
            motor_status: 1,
        };
        state.publish(TelemetrySnapshot::tracks(report));
        assert_eq!(state.snapshot().data, report);
    }

    #[test]
    fn test_snapshot_outlives_later_publishes() {
        let state = TelemetryState::default();
        state.publish(TelemetrySnapshot::tracks(TrackReport {
            trk_id: Some(1),
            mx: Some(10),
            my: Some(20),
            motor_status: 0,
        }));
        let held = state.snapshot();
        state.publish(TelemetrySnapshot::tracks(TrackReport {
            trk_id: Some(2),
            mx: Some(30),
            my: Some(40),
            motor_status: 1,
        }));

        // The held snapshot is immutable: id and centroid still belong
        // to the same track.
        assert_eq!(held.data.trk_id, Some(1));
        assert_eq!(held.data.mx, Some(10));
        assert_eq!(held.data.my, Some(20));
        assert_eq!(state.snapshot().data.trk_id, Some(2));
    }

    #[test]
    fn test_wire_shape_with_track() {
        let snapshot = TelemetrySnapshot::tracks(TrackReport {
            trk_id: Some(7),
            mx: Some(500),
            my: Some(300),
            motor_status: -1,
        });
        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "type": "tracks",
                "data": {"trk_id": 7, "mx": 500, "my": 300, "motorStatus": -1}
            })
        );
    }

    #[test]
    fn test_wire_shape_without_track() {
        let snapshot = TelemetrySnapshot::default();
        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"type": "tracks", "data": {"motorStatus": 0}})
        );
    }

    #[test]
    fn test_subscriber_roundtrip() {
        let snapshot = TelemetrySnapshot::tracks(TrackReport {
            trk_id: Some(12),
            mx: Some(640),
            my: Some(360),
            motor_status: 1,
        });
        let payload = serde_json::to_string(&snapshot).unwrap();

        // What a subscriber recovers from one broadcast tick.
        let decoded: serde_json::Value = serde_json::from_str(&payload).unwrap();
        assert_eq!(decoded["data"]["trk_id"], 12);
        assert_eq!(decoded["data"]["mx"], 640);
        assert_eq!(decoded["data"]["my"], 360);
        assert_eq!(decoded["data"]["motorStatus"], 1);
    }
}
