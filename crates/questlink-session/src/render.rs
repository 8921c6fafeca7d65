//! The seam between the session and whatever draws the game.
//!
//! The session never looks inside state payloads. It only knows which
//! inbound message carried them, and passes that along as [`UpdateKind`].

use questlink_protocol::{GameId, PlayerEntry, UserId};
use serde_json::Value;

/// Whether a state payload replaces everything or patches what is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateKind {
    /// A full snapshot (`game_state`).
    Snapshot,
    /// A partial update (`game_state_update`, `game_update`).
    Incremental,
}

/// One inbound state payload, forwarded verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct StateUpdate {
    pub kind: UpdateKind,
    pub payload: Value,
}

/// A change to the game's roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterChange {
    /// The complete roster replaced whatever was known.
    Full(Vec<PlayerEntry>),
    Joined(PlayerEntry),
    Left(UserId),
    Ready { user_id: UserId, is_ready: bool },
}

/// Everything besides state payloads the renderer may want to show.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Roster(RosterChange),
    GameStarted(GameId),
    GameConcluded { message: Option<String> },
    CommandResponse(Value),
    ServerError(String),
}

/// Receives what the session routes out of inbound messages.
///
/// `apply_state_update` is called once per inbound state message. Malformed
/// payloads are passed through; defending against them is the renderer's
/// job.
pub trait Renderer: Send + 'static {
    /// Shows the latest state.
    fn apply_state_update(&mut self, update: StateUpdate);

    /// Shows a roster change, lifecycle notice, or server error.
    ///
    /// Defaults to ignoring it.
    fn notify(&mut self, notice: Notice) {
        let _ = notice;
    }
}
