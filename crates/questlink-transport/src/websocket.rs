//! WebSocket dialer using `tokio-tungstenite`.
//!
//! Each dial spawns one task that owns the socket. The task connects,
//! reports [`TransportEvent::Connected`], then pumps frames both ways until
//! either side closes, and finally reports exactly one terminal event.

use std::io;
use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

use crate::{
    ConnectionId, Dialer, EventReceiver, EventSender, Link, LinkEvent,
    TransportConfig, TransportError, TransportEvent,
};

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Commands from a [`WebSocketLink`] to its connection task.
#[derive(Debug)]
enum Outbound {
    Frame(Vec<u8>),
    Close,
}

/// A [`Dialer`] that opens WebSocket connections to one server endpoint.
///
/// All links it creates report into the same event stream, handed out by
/// [`WebSocketDialer::new`].
pub struct WebSocketDialer {
    config: TransportConfig,
    events: EventSender,
}

impl WebSocketDialer {
    /// Creates a dialer and the receiver its links report events to.
    pub fn new(config: TransportConfig) -> (Self, EventReceiver) {
        let (events, rx) = mpsc::unbounded_channel();
        (Self { config, events }, rx)
    }

    /// Returns the endpoint this dialer connects to.
    pub fn url(&self) -> &str {
        &self.config.url
    }
}

impl Dialer for WebSocketDialer {
    type Link = WebSocketLink;

    /// Spawns the connection task on the current Tokio runtime.
    ///
    /// Fails only when called outside a runtime.
    fn dial(&mut self) -> Result<Self::Link, TransportError> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| TransportError::ConnectFailed(io::Error::other(e)))?;

        let id = ConnectionId::new(
            NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed),
        );
        let (outbound, outbound_rx) = mpsc::unbounded_channel();

        tracing::debug!(%id, url = %self.config.url, "dialing WebSocket");
        runtime.spawn(run_connection(
            id,
            self.config.clone(),
            outbound_rx,
            self.events.clone(),
        ));

        Ok(WebSocketLink { id, outbound })
    }
}

/// The client's handle to one WebSocket connection.
#[derive(Debug)]
pub struct WebSocketLink {
    id: ConnectionId,
    outbound: mpsc::UnboundedSender<Outbound>,
}

impl Link for WebSocketLink {
    fn send(&self, data: Vec<u8>) -> Result<(), TransportError> {
        self.outbound.send(Outbound::Frame(data)).map_err(|_| {
            TransportError::ConnectionClosed(format!("{} is closed", self.id))
        })
    }

    fn close(&self) {
        // The task may already be gone; nothing left to close then.
        let _ = self.outbound.send(Outbound::Close);
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}

fn report(events: &EventSender, conn_id: ConnectionId, event: TransportEvent) {
    if events.send(LinkEvent { conn_id, event }).is_err() {
        tracing::trace!(%conn_id, "event receiver dropped");
    }
}

/// Owns one socket from connect to close.
async fn run_connection(
    id: ConnectionId,
    config: TransportConfig,
    mut outbound_rx: mpsc::UnboundedReceiver<Outbound>,
    events: EventSender,
) {
    let connect = tokio_tungstenite::connect_async(config.url.as_str());
    let ws = match tokio::time::timeout(config.connect_timeout, connect).await
    {
        Ok(Ok((ws, _response))) => ws,
        Ok(Err(e)) => {
            tracing::warn!(%id, error = %e, "WebSocket connect failed");
            let err = TransportError::ConnectFailed(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                e,
            ));
            report(&events, id, TransportEvent::Failed(err));
            return;
        }
        Err(_) => {
            tracing::warn!(%id, timeout = ?config.connect_timeout, "WebSocket connect timed out");
            let err = TransportError::ConnectTimeout(config.connect_timeout);
            report(&events, id, TransportEvent::Failed(err));
            return;
        }
    };

    tracing::debug!(%id, "WebSocket connected");
    report(&events, id, TransportEvent::Connected);

    let (mut sink, mut stream) = ws.split();

    let outcome: Result<String, TransportError> = loop {
        tokio::select! {
            out = outbound_rx.recv() => match out {
                Some(Outbound::Frame(data)) => {
                    if let Err(e) = sink.send(Message::Binary(data.into())).await {
                        break Err(TransportError::SendFailed(io::Error::new(
                            io::ErrorKind::BrokenPipe,
                            e,
                        )));
                    }
                }
                // An explicit close and a dropped link end the same way.
                Some(Outbound::Close) | None => {
                    let _ = sink.close().await;
                    break Ok("closed by client".to_string());
                }
            },
            inbound = stream.next() => match inbound {
                Some(Ok(Message::Binary(data))) => {
                    report(&events, id, TransportEvent::Message(data.into()));
                }
                Some(Ok(Message::Text(text))) => {
                    report(
                        &events,
                        id,
                        TransportEvent::Message(text.as_bytes().to_vec()),
                    );
                }
                Some(Ok(Message::Close(frame))) => {
                    let reason = frame
                        .map(|f| f.reason.as_str().to_owned())
                        .filter(|r| !r.is_empty())
                        .unwrap_or_else(|| "closed by server".to_string());
                    break Ok(reason);
                }
                None => break Ok("stream ended".to_string()),
                Some(Ok(_)) => {} // ping/pong/raw frame
                Some(Err(e)) => {
                    break Err(TransportError::ReceiveFailed(io::Error::new(
                        io::ErrorKind::ConnectionReset,
                        e,
                    )));
                }
            }
        }
    };

    let event = match outcome {
        Ok(reason) => {
            tracing::debug!(%id, %reason, "WebSocket closed");
            TransportEvent::Disconnected { reason }
        }
        Err(e) => {
            tracing::warn!(%id, error = %e, "WebSocket failed");
            TransportEvent::Failed(e)
        }
    };
    report(&events, id, event);
}
