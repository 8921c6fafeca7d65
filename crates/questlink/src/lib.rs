//! # Questlink
//!
//! Client-side session management for real-time multiplayer text games.
//!
//! Questlink keeps one game client bound to one game over one WebSocket
//! connection: it connects, joins the game's room, asks for the initial
//! state exactly once, forwards player input, and routes every inbound
//! state update to a [`Renderer`](questlink_session::Renderer) you supply.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use questlink::prelude::*;
//!
//! # async fn run() -> Result<(), QuestlinkError> {
//! let (renderer, mut updates) = ChannelRenderer::new();
//! let client = GameClient::builder()
//!     .url("ws://127.0.0.1:5000/ws")
//!     .user_id("3")
//!     .build(renderer)?;
//!
//! client.connect("7").await?;
//! client.perform_action("/roll d20").await?;
//! while let Some(event) = updates.recv().await {
//!     println!("{event:?}");
//! }
//! # Ok(())
//! # }
//! ```

mod channel;
mod client;
mod driver;
mod error;

pub use channel::{ChannelRenderer, RenderEvent};
pub use client::{GameClient, GameClientBuilder};
pub use error::QuestlinkError;

pub mod prelude {
    pub use crate::{
        ChannelRenderer, GameClient, GameClientBuilder, QuestlinkError,
        RenderEvent,
    };
    pub use questlink_protocol::{Difficulty, GameId, UserId};
    pub use questlink_session::{
        Notice, Outcome, Renderer, RosterChange, SessionConfig, SessionState,
        SkipReason, StateUpdate, UpdateKind,
    };
    pub use questlink_transport::TransportConfig;
}
