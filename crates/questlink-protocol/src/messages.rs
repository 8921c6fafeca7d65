//! The messages that travel between the game client and the server.
//!
//! Every frame is a JSON object with an `event` name and a `data` payload:
//!
//! ```text
//! { "event": "join_game", "data": { "game_id": "7", "user_id": "3" } }
//! ```
//!
//! Outbound messages ([`ClientMessage`]) always carry the game id and, where
//! known, the user id. Inbound state payloads stay opaque
//! (`serde_json::Value`): the client forwards them to whatever renders the
//! game and never interprets their fields.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Difficulty, GameId, PlayerEntry, UserId};

// ---------------------------------------------------------------------------
// Client → Server
// ---------------------------------------------------------------------------

/// Messages the client sends to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientMessage {
    /// "Put me in this game's room."
    JoinGame {
        game_id: GameId,
        user_id: Option<UserId>,
    },

    /// "I'm leaving this game's room."
    LeaveGame {
        game_id: GameId,
        user_id: Option<UserId>,
    },

    /// "I'm ready to start."
    PlayerReady {
        game_id: GameId,
        user_id: Option<UserId>,
    },

    /// "Start the game." Only honored for the game's creator.
    StartGame {
        game_id: GameId,
        user_id: Option<UserId>,
    },

    /// A free-form in-game action, e.g. `"open the door"`.
    PlayerAction {
        game_id: GameId,
        user_id: Option<UserId>,
        action: String,
    },

    /// A structured command, e.g. `/roll d20` →
    /// `command: "roll", args: ["d20"]`.
    SlashCommand {
        game_id: GameId,
        user_id: Option<UserId>,
        command: String,
        args: Vec<String>,
    },

    /// "Send me a full snapshot of the game state."
    RequestState { game_id: GameId, user_id: UserId },

    /// Settings change for the running game.
    SetDifficulty {
        game_id: GameId,
        user_id: Option<UserId>,
        difficulty: Difficulty,
    },
}

impl ClientMessage {
    /// The wire event name, for logging.
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::JoinGame { .. } => "join_game",
            Self::LeaveGame { .. } => "leave_game",
            Self::PlayerReady { .. } => "player_ready",
            Self::StartGame { .. } => "start_game",
            Self::PlayerAction { .. } => "player_action",
            Self::SlashCommand { .. } => "slash_command",
            Self::RequestState { .. } => "request_state",
            Self::SetDifficulty { .. } => "set_difficulty",
        }
    }

    /// The game this message is scoped to.
    pub fn game_id(&self) -> &GameId {
        match self {
            Self::JoinGame { game_id, .. }
            | Self::LeaveGame { game_id, .. }
            | Self::PlayerReady { game_id, .. }
            | Self::StartGame { game_id, .. }
            | Self::PlayerAction { game_id, .. }
            | Self::SlashCommand { game_id, .. }
            | Self::RequestState { game_id, .. }
            | Self::SetDifficulty { game_id, .. } => game_id,
        }
    }
}

// ---------------------------------------------------------------------------
// Server → Client
// ---------------------------------------------------------------------------

/// Messages the server sends to the client.
///
/// Variants wrapping a bare [`Value`] are opaque state payloads whose shape
/// the server owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Greeting sent right after the socket connects.
    ConnectionResponse { status: String },

    /// Full state snapshot, usually the answer to `request_state`.
    GameState(Value),

    /// Partial state pushed after something changed.
    GameStateUpdate(Value),

    /// Broadcast of another player's action together with the state it
    /// produced.
    GameUpdate(Value),

    /// The complete roster of the game.
    PlayerList { players: Vec<PlayerEntry> },

    /// Someone new joined the game.
    PlayerJoined(PlayerEntry),

    /// Someone left the game.
    PlayerLeft { user_id: UserId },

    /// A player's ready flag changed.
    PlayerStatusUpdate { user_id: UserId, is_ready: bool },

    /// The game moved from the lobby into play.
    GameStarted { game_id: GameId },

    /// The game reached its conclusion.
    GameConcluded {
        #[serde(default)]
        game_id: Option<GameId>,
        #[serde(default)]
        message: Option<String>,
    },

    /// Result of a slash command.
    CommandResponse(Value),

    /// The server rejected something the client did.
    Error { message: String },
}

#[cfg(test)]
mod tests {
    //! The server matches on exact event names and field names, so these
    //! tests pin the JSON shape rather than just round-tripping.

    use serde_json::json;

    use super::*;

    fn gid(s: &str) -> GameId {
        GameId::from(s)
    }

    fn uid(s: &str) -> UserId {
        UserId::from(s)
    }

    // =====================================================================
    // ClientMessage
    // =====================================================================

    #[test]
    fn test_join_game_json_format() {
        let msg = ClientMessage::JoinGame {
            game_id: gid("7"),
            user_id: Some(uid("3")),
        };
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(
            json,
            json!({"event": "join_game", "data": {"game_id": "7", "user_id": "3"}})
        );
    }

    #[test]
    fn test_join_game_without_user_serializes_null() {
        let msg = ClientMessage::JoinGame {
            game_id: gid("7"),
            user_id: None,
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert!(json["data"]["user_id"].is_null());
    }

    #[test]
    fn test_slash_command_json_format() {
        let msg = ClientMessage::SlashCommand {
            game_id: gid("1"),
            user_id: Some(uid("2")),
            command: "roll".into(),
            args: vec!["d20".into()],
        };
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["event"], "slash_command");
        assert_eq!(json["data"]["command"], "roll");
        assert_eq!(json["data"]["args"], json!(["d20"]));
    }

    #[test]
    fn test_set_difficulty_json_format() {
        let msg = ClientMessage::SetDifficulty {
            game_id: gid("1"),
            user_id: None,
            difficulty: Difficulty::Easy,
        };
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["event"], "set_difficulty");
        assert_eq!(json["data"]["difficulty"], "easy");
    }

    #[test]
    fn test_event_name_matches_serde_tag() {
        let messages = [
            ClientMessage::LeaveGame {
                game_id: gid("1"),
                user_id: None,
            },
            ClientMessage::PlayerReady {
                game_id: gid("1"),
                user_id: None,
            },
            ClientMessage::StartGame {
                game_id: gid("1"),
                user_id: None,
            },
            ClientMessage::PlayerAction {
                game_id: gid("1"),
                user_id: None,
                action: "look".into(),
            },
            ClientMessage::RequestState {
                game_id: gid("1"),
                user_id: uid("2"),
            },
        ];
        for msg in messages {
            let json = serde_json::to_value(&msg).unwrap();
            assert_eq!(json["event"], msg.event_name());
            assert_eq!(msg.game_id(), &gid("1"));
        }
    }

    // =====================================================================
    // ServerMessage
    // =====================================================================

    #[test]
    fn test_game_state_keeps_payload_verbatim() {
        let raw = json!({
            "event": "game_state",
            "data": {"log": ["You wake up."], "state": {"location": "Cell"}}
        });
        let msg: ServerMessage = serde_json::from_value(raw).unwrap();

        match msg {
            ServerMessage::GameState(payload) => {
                assert_eq!(payload["state"]["location"], "Cell");
                assert_eq!(payload["log"][0], "You wake up.");
            }
            other => panic!("expected GameState, got {other:?}"),
        }
    }

    #[test]
    fn test_player_list_accepts_integer_ids() {
        let raw = json!({
            "event": "player_list",
            "data": {"players": [
                {"user_id": 1, "username": "ana", "is_ready": true},
                {"user_id": 2, "username": "bo", "is_ready": false}
            ]}
        });
        let msg: ServerMessage = serde_json::from_value(raw).unwrap();

        match msg {
            ServerMessage::PlayerList { players } => {
                assert_eq!(players.len(), 2);
                assert_eq!(players[0].user_id, uid("1"));
                assert!(players[0].is_ready);
            }
            other => panic!("expected PlayerList, got {other:?}"),
        }
    }

    #[test]
    fn test_game_concluded_tolerates_missing_fields() {
        let raw = json!({
            "event": "game_concluded",
            "data": {"message": "The game has concluded!"}
        });
        let msg: ServerMessage = serde_json::from_value(raw).unwrap();

        assert_eq!(
            msg,
            ServerMessage::GameConcluded {
                game_id: None,
                message: Some("The game has concluded!".into()),
            }
        );
    }

    #[test]
    fn test_error_json_format() {
        let raw = json!({"event": "error", "data": {"message": "Invalid game or user"}});
        let msg: ServerMessage = serde_json::from_value(raw).unwrap();
        assert_eq!(
            msg,
            ServerMessage::Error {
                message: "Invalid game or user".into()
            }
        );
    }

    #[test]
    fn test_unknown_event_returns_error() {
        let raw = json!({"event": "fly_to_moon", "data": {"speed": 9000}});
        let result: Result<ServerMessage, _> = serde_json::from_value(raw);
        assert!(result.is_err());
    }
}
