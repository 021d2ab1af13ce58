//! WebSocket connection handling
//!
//! Each accepted connection runs in its own task: the reader side turns
//! frames into [`SessionEvent`]s for the connection's [`LifecycleDriver`],
//! a writer task drains the driver's outbound frames, and the same
//! `select!` loop sleeps until the driver's next timer.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use futures::{SinkExt, StreamExt};
use rtfix_core::{
    Acknowledgement, Endpoint, LifecycleDriver, Outbound, Session, SessionError, SessionEvent,
    SessionId, SessionVariant, Transport,
};
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, error, warn};
use uuid::Uuid;

use super::protocol::{self, Inbound};
use crate::AppState;

/// Upper bound on waiting for the peer to finish a closing handshake
const CLOSE_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

/// Transport backed by the connection's writer task
#[derive(Clone)]
struct ChannelTransport {
    session_id: SessionId,
    tx: mpsc::UnboundedSender<Outbound>,
}

impl Transport for ChannelTransport {
    fn deliver(&self, frame: Outbound) -> Result<(), SessionError> {
        self.tx
            .send(frame)
            .map_err(|_| SessionError::TransportClosed(self.session_id.clone()))
    }
}

/// WebSocket upgrade handler for every fixture endpoint
///
/// Paths without a registered endpoint are answered with 404 before any
/// upgrade happens.
pub async fn ws_handler(
    Path(path): Path<String>,
    State(state): State<Arc<AppState>>,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    let endpoint = match state.registry.route(&path) {
        Ok(endpoint) => endpoint,
        Err(e) => {
            warn!("Rejecting connection: {}", e);
            return (StatusCode::NOT_FOUND, e.to_string()).into_response();
        }
    };

    match ws {
        Ok(ws) => ws.on_upgrade(move |socket| handle_socket(socket, endpoint, state)),
        Err(rejection) => rejection.into_response(),
    }
}

/// Run one session to completion
async fn handle_socket(socket: WebSocket, endpoint: Arc<Endpoint>, state: Arc<AppState>) {
    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<Outbound>();
    let variant = endpoint.variant();

    let writer = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            let closing = frame == Outbound::Close;
            let Some(message) = protocol::encode(variant, frame) else {
                continue;
            };
            if let Err(e) = sink.send(message).await {
                debug!("WebSocket write failed: {}", e);
                break;
            }
            if closing {
                break;
            }
        }
    });

    let session_id = Uuid::new_v4().to_string();
    let transport = Arc::new(ChannelTransport {
        session_id: session_id.clone(),
        tx,
    });
    let session = Session::new(
        session_id.clone(),
        endpoint.path(),
        transport.clone(),
        Instant::now(),
    );
    let group = endpoint
        .scenario()
        .uses_echo_group()
        .then(|| state.groups.group(endpoint.path()));
    let mut driver = LifecycleDriver::new(Arc::clone(&endpoint), session, group);

    driver.handle(SessionEvent::Connected, Instant::now());

    while !driver.is_closed() {
        let deadline = driver.next_deadline();
        tokio::select! {
            incoming = stream.next() => {
                let event = match incoming {
                    Some(Ok(message)) => decode(variant, message, &transport),
                    Some(Err(e)) => {
                        error!(session = %session_id, "WebSocket error: {}", e);
                        Some(SessionEvent::Closed)
                    }
                    None => Some(SessionEvent::Closed),
                };
                if let Some(event) = event {
                    driver.handle(event, Instant::now());
                }
            }
            () = wait_for(deadline.map(|(_, at)| at)) => {
                if let Some((handle, _)) = deadline {
                    driver.handle(SessionEvent::TimerFired(handle), Instant::now());
                }
            }
        }
    }

    // A close reply queued by the socket is only flushed by a later read;
    // keep reading until the peer finishes the handshake.
    let drained = tokio::time::timeout(CLOSE_HANDSHAKE_TIMEOUT, async {
        while let Some(Ok(_)) = stream.next().await {}
    })
    .await;
    if drained.is_err() {
        debug!(session = %session_id, "closing handshake timed out");
    }

    // Dropping the last sender lets the writer drain and stop.
    drop(driver);
    drop(transport);
    if let Err(e) = writer.await {
        debug!(session = %session_id, "writer task ended abnormally: {}", e);
    }
}

/// Translate one WebSocket message into a driver event
fn decode(
    variant: SessionVariant,
    message: Message,
    transport: &Arc<ChannelTransport>,
) -> Option<SessionEvent> {
    match message {
        Message::Text(text) => match protocol::decode_text(variant, text.as_str()) {
            Ok(Inbound::Message(payload)) => Some(SessionEvent::Message(payload)),
            Ok(Inbound::Event { name, data, ack }) => Some(SessionEvent::NamedEvent {
                name,
                data,
                ack: ack.map(|id| acknowledgement(transport, id)),
            }),
            Err(e) => {
                warn!(session = %transport.session_id, "Ignoring malformed frame: {}", e);
                None
            }
        },
        Message::Close(_) => Some(SessionEvent::Closed),
        Message::Binary(_) => {
            debug!(session = %transport.session_id, "Ignoring binary frame");
            None
        }
        Message::Ping(_) | Message::Pong(_) => None,
    }
}

/// Acknowledgement that answers the client on its own connection
fn acknowledgement(transport: &Arc<ChannelTransport>, id: u64) -> Acknowledgement {
    let transport = Arc::clone(transport);
    Acknowledgement::new(move || {
        if let Err(e) = transport.deliver(Outbound::Ack { id }) {
            debug!("Dropping ack {}: {}", id, e);
        }
    })
}

async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(at) => sleep_until(at).await,
        None => std::future::pending().await,
    }
}
