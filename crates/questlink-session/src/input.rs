//! Classifying what the player typed.

use questlink_protocol::{ClientMessage, GameId, UserId};

/// A line of player input, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionInput {
    /// `/roll d20` → `name: "roll"`, `args: ["d20"]`.
    Command { name: String, args: Vec<String> },

    /// Anything not starting with the command prefix, trimmed.
    FreeForm(String),
}

impl ActionInput {
    /// Classifies `raw`, or returns `None` when there is nothing to send.
    ///
    /// Input is trimmed first. If it starts with `prefix`, the first
    /// whitespace-delimited token after the prefix becomes the lower-cased
    /// command name and the remaining tokens its arguments. A bare prefix
    /// carries no command and counts as empty.
    pub fn parse(raw: &str, prefix: char) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        let Some(rest) = trimmed.strip_prefix(prefix) else {
            return Some(Self::FreeForm(trimmed.to_owned()));
        };

        let mut tokens = rest.split_whitespace();
        let name = tokens.next()?.to_lowercase();
        let args = tokens.map(str::to_owned).collect();
        Some(Self::Command { name, args })
    }

    /// Builds the outbound message for this input.
    pub fn into_message(
        self,
        game_id: GameId,
        user_id: Option<UserId>,
    ) -> ClientMessage {
        match self {
            Self::Command { name, args } => ClientMessage::SlashCommand {
                game_id,
                user_id,
                command: name,
                args,
            },
            Self::FreeForm(action) => ClientMessage::PlayerAction {
                game_id,
                user_id,
                action,
            },
        }
    }
}
