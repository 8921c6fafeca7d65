//! What a session operation did.

use std::fmt;

/// Result of a session operation that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The operation took effect: a message went out or a transition ran.
    Applied,
    /// The operation was a no-op. The reason is also logged at `debug`.
    Skipped(SkipReason),
}

/// Why an operation was a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No session exists (never connected, or explicitly disconnected).
    NoSession,
    /// The session exists but its connection is not live.
    NotConnected,
    /// `connect` for the game the session is already connected to.
    AlreadyConnected,
    /// `connect` for the game whose connection attempt is in flight.
    ConnectInFlight,
    /// The given game id is empty.
    BlankGameId,
    /// The given game id is not the session's.
    GameMismatch,
    /// `join_game` already went out on this connection.
    AlreadyJoined,
    /// The room was not joined on this connection.
    NotJoined,
    /// `request_state` already went out on this connection.
    AlreadyRequested,
    /// No user id has been set yet.
    UserUnresolved,
    /// The input was empty after trimming.
    EmptyInput,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NoSession => "no session",
            Self::NotConnected => "not connected",
            Self::AlreadyConnected => "already connected",
            Self::ConnectInFlight => "connection attempt in flight",
            Self::BlankGameId => "blank game id",
            Self::GameMismatch => "game id mismatch",
            Self::AlreadyJoined => "already joined",
            Self::NotJoined => "room not joined",
            Self::AlreadyRequested => "state already requested",
            Self::UserUnresolved => "user id unresolved",
            Self::EmptyInput => "empty input",
        })
    }
}
