//! Game session lifecycle for the Questlink client.
//!
//! This crate decides *when* the client talks to the server:
//!
//! 1. **Connection lifecycle**: one session per game, one connection per
//!    session, and a clean teardown when switching games
//!    ([`SessionManager::connect`], [`SessionManager::disconnect`])
//! 2. **Handshakes**: joining the game's room and requesting the initial
//!    state exactly once per connection
//! 3. **Routing**: player input out, state updates in ([`Renderer`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Client driver (above)  ← owns the manager, feeds it transport events
//!     ↕
//! Session Layer (this crate)  ← state machine, no I/O of its own
//!     ↕
//! Protocol + Transport (below)  ← message types, dialers and links
//! ```

mod error;
mod input;
mod manager;
mod outcome;
mod render;
mod session;

pub use error::SessionError;
pub use input::ActionInput;
pub use manager::{Callback, SessionManager};
pub use outcome::{Outcome, SkipReason};
pub use render::{Notice, Renderer, RosterChange, StateUpdate, UpdateKind};
pub use session::{Session, SessionConfig, SessionState};
