//! WebSocket broadcast loop for live tracking state.

use std::io;
use std::net::TcpListener as StdTcpListener;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use axum::{
    Router,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
    routing::get,
};
use tokio::sync::broadcast;
use tracing::{debug, error, warn};

use crate::config::TelemetryConfig;
use crate::telemetry::state::TelemetryState;

/// Subscribers slower than the tick rate skip ahead rather than queue.
const BROADCAST_BUFFER: usize = 8;

/// Spawn the telemetry server on a dedicated thread with its own
/// single-threaded runtime, keeping the frame loop free of async
/// concerns.
///
/// Once a second the current snapshot is serialized and fanned out to
/// every connected subscriber. A subscriber joining mid-run receives
/// only the ticks published after it connected; a subscriber
/// disconnecting affects nobody else. The thread runs until the
/// process exits.
pub fn spawn_broadcaster(
    state: Arc<TelemetryState>,
    config: TelemetryConfig,
) -> io::Result<thread::JoinHandle<()>> {
    let listener = StdTcpListener::bind(&config.bind)?;
    listener.set_nonblocking(true)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let period = Duration::from_secs(config.period_secs.max(1));

    thread::Builder::new()
        .name("telemetry-ws".into())
        .spawn(move || {
            runtime.block_on(async move {
                let (tx, _) = broadcast::channel::<String>(BROADCAST_BUFFER);

                let tick_tx = tx.clone();
                tokio::spawn(async move {
                    let mut interval = tokio::time::interval(period);
                    loop {
                        interval.tick().await;
                        match serde_json::to_string(state.snapshot().as_ref()) {
                            // Send fails only with no subscribers; the
                            // payload is simply dropped.
                            Ok(payload) => {
                                let _ = tick_tx.send(payload);
                            }
                            Err(err) => error!("failed to encode telemetry snapshot: {err}"),
                        }
                    }
                });

                let listener = match tokio::net::TcpListener::from_std(listener) {
                    Ok(listener) => listener,
                    Err(err) => {
                        error!("telemetry listener setup failed: {err}");
                        return;
                    }
                };
                let app = Router::new().route("/", get(ws_handler)).with_state(tx);
                if let Err(err) = axum::serve(listener, app).await {
                    error!("telemetry server exited: {err}");
                }
            });
        })
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(tx): State<broadcast::Sender<String>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| subscriber_loop(socket, tx.subscribe()))
}

/// Forward broadcast payloads to one subscriber until it disconnects.
async fn subscriber_loop(mut socket: WebSocket, mut rx: broadcast::Receiver<String>) {
    debug!("telemetry subscriber connected");
    loop {
        tokio::select! {
            payload = rx.recv() => match payload {
                Ok(payload) => {
                    if socket.send(Message::Text(payload)).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("telemetry subscriber lagged, skipped {skipped} payloads");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            incoming = socket.recv() => match incoming {
                // The channel is bidirectional but inbound traffic is ignored.
                Some(Ok(_)) => {}
                Some(Err(_)) | None => break,
            },
        }
    }
    debug!("telemetry subscriber disconnected");
}
