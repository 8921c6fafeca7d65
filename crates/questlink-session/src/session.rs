//! Session types: the record of one game binding and its connection state.
//!
//! A session tracks:
//! - WHICH game it is bound to (`GameId`)
//! - WHAT state its connection is in
//! - WHICH transport connection is current (so stale events can be told apart)
//! - WHETHER the room join and the initial state request already went out on
//!   this connection

use questlink_protocol::GameId;
use questlink_transport::ConnectionId;

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Configuration for session behavior.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Input starting with this character is a structured command
    /// (`/roll d20`); anything else is a free-form action.
    ///
    /// Default: `'/'`.
    pub command_prefix: char,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            command_prefix: '/',
        }
    }
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// Where the session's connection is in its lifecycle.
///
/// ```text
///   Idle ──connect──→ Connecting ──connected──→ ConnectedNotJoined ──join──→ ConnectedJoined
///                        ↑                             │                          │
///                        │                             └──────────┬───────────────┘
///                        │                                        ▼ (disconnect / error)
///                        └────────────connect────────────── Disconnected
/// ```
///
/// `Idle` means there is no session at all: nothing was ever connected, or
/// the caller explicitly disconnected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Connecting,
    ConnectedNotJoined,
    ConnectedJoined,
    Disconnected,
}

impl SessionState {
    /// Returns `true` for both connected states.
    pub fn is_connected(self) -> bool {
        matches!(self, Self::ConnectedNotJoined | Self::ConnectedJoined)
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// One game binding and the state of its (at most one) connection.
///
/// Only [`SessionManager`](crate::SessionManager) transitions change these
/// fields; everyone else gets read access.
#[derive(Debug, Clone)]
pub struct Session {
    pub(crate) game_id: GameId,
    pub(crate) state: SessionState,
    pub(crate) conn_id: Option<ConnectionId>,
    pub(crate) has_joined_room: bool,
    pub(crate) has_requested_initial_state: bool,
}

impl Session {
    /// A session whose first connection attempt is in flight.
    pub(crate) fn connecting(game_id: GameId, conn_id: ConnectionId) -> Self {
        Self {
            game_id,
            state: SessionState::Connecting,
            conn_id: Some(conn_id),
            has_joined_room: false,
            has_requested_initial_state: false,
        }
    }

    /// A session that never got a connection (dialing failed outright).
    pub(crate) fn unreachable(game_id: GameId) -> Self {
        Self {
            game_id,
            state: SessionState::Disconnected,
            conn_id: None,
            has_joined_room: false,
            has_requested_initial_state: false,
        }
    }

    /// The game this session is bound to.
    pub fn game_id(&self) -> &GameId {
        &self.game_id
    }

    /// Current connection state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The transport connection events are currently accepted from.
    pub fn conn_id(&self) -> Option<ConnectionId> {
        self.conn_id
    }

    /// Whether `join_game` went out on the current connection.
    pub fn has_joined_room(&self) -> bool {
        self.has_joined_room
    }

    /// Whether `request_state` went out on the current connection.
    pub fn has_requested_initial_state(&self) -> bool {
        self.has_requested_initial_state
    }

    /// Returns `true` while the current connection is live.
    pub fn is_connected(&self) -> bool {
        self.state.is_connected()
    }
}
