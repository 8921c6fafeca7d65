//! Client-side transport abstraction for Questlink.
//!
//! Provides the [`Dialer`] and [`Link`] traits that abstract over the
//! real-time channel a game client talks to its server through.
//!
//! Dialing is synchronous and never blocks: [`Dialer::dial`] hands back a
//! [`Link`] immediately, and everything that happens to that connection
//! afterwards (connected, inbound frames, disconnect, failure) arrives later
//! as a [`LinkEvent`] tagged with the link's [`ConnectionId`]. The session
//! layer uses the tag to tell the current connection apart from ones it
//! already abandoned.
//!
//! # Feature Flags
//!
//! - `websocket` (default) — WebSocket dialer via `tokio-tungstenite`

mod config;
mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use config::TransportConfig;
pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::{WebSocketDialer, WebSocketLink};

use std::fmt;

use tokio::sync::mpsc;

/// Opaque identifier for one transport connection.
///
/// A fresh id is minted for every dial, so a reconnect to the same server
/// still gets a new id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Something that happened on a connection.
#[derive(Debug)]
pub enum TransportEvent {
    /// The connection is established and ready to carry messages.
    Connected,

    /// A frame arrived from the server.
    Message(Vec<u8>),

    /// The connection closed. Emitted once, after which the link is dead.
    Disconnected { reason: String },

    /// The connection failed (refused, timed out, reset). Like
    /// `Disconnected`, this is terminal for the link.
    Failed(TransportError),
}

impl TransportEvent {
    /// Returns `true` for events after which the link carries nothing more.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Disconnected { .. } | Self::Failed(_))
    }
}

/// A [`TransportEvent`] tagged with the connection it came from.
#[derive(Debug)]
pub struct LinkEvent {
    pub conn_id: ConnectionId,
    pub event: TransportEvent,
}

/// Sending half of the shared event stream all links of a dialer report to.
pub type EventSender = mpsc::UnboundedSender<LinkEvent>;

/// Receiving half of the shared event stream.
pub type EventReceiver = mpsc::UnboundedReceiver<LinkEvent>;

/// Opens new connections to the game server.
pub trait Dialer: Send + 'static {
    /// The link type produced by this dialer.
    type Link: Link;

    /// Starts a new connection and returns its link right away.
    ///
    /// The link is not usable until a [`TransportEvent::Connected`] for its
    /// id has been delivered.
    fn dial(&mut self) -> Result<Self::Link, TransportError>;
}

/// The client's handle to one connection.
///
/// Dropping a link closes its connection.
pub trait Link: Send + 'static {
    /// Queues a frame for delivery to the server.
    ///
    /// Fails only when the connection is already gone.
    fn send(&self, data: Vec<u8>) -> Result<(), TransportError>;

    /// Closes the connection. Safe to call more than once.
    fn close(&self);

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;
}
