//! Wire protocol for the Questlink game client.
//!
//! This crate defines the language the client and the game server speak:
//!
//! - **Types** ([`GameId`], [`UserId`], [`Difficulty`], [`PlayerEntry`]) —
//!   the values messages are built from.
//! - **Messages** ([`ClientMessage`], [`ServerMessage`]) — one tagged enum
//!   per direction, one variant per event.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how messages become bytes.
//! - **Errors** ([`ProtocolError`]).
//!
//! ```text
//! Transport (bytes) → Protocol (ClientMessage / ServerMessage) → Session
//! ```

mod codec;
mod error;
mod messages;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use messages::{ClientMessage, ServerMessage};
pub use types::{Difficulty, GameId, PlayerEntry, UserId};
