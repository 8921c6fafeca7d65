//! `GameClient` builder and handle.
//!
//! This is the entry point for talking to a game server. It ties together
//! all the layers: transport → protocol → session, and runs them on one
//! background task.

use std::time::Duration;

use questlink_protocol::{Difficulty, GameId, JsonCodec, UserId};
use questlink_session::{
    Callback, Outcome, Renderer, SessionConfig, SessionError, SessionManager,
    SessionState,
};
use questlink_transport::{TransportConfig, WebSocketDialer};
use tokio::sync::{mpsc, oneshot};

use crate::driver::run_session;
use crate::QuestlinkError;

type Reply<T> = oneshot::Sender<T>;

/// A request from a [`GameClient`] handle to the session task.
pub(crate) enum Command {
    Connect {
        game_id: GameId,
        reply: Reply<Result<Outcome, SessionError>>,
    },
    Disconnect {
        reply: Reply<Outcome>,
    },
    JoinRoom {
        game_id: GameId,
        reply: Reply<Result<Outcome, SessionError>>,
    },
    RequestInitialState {
        reply: Reply<Result<Outcome, SessionError>>,
    },
    PerformAction {
        text: String,
        reply: Reply<Result<Outcome, SessionError>>,
    },
    SetReady {
        reply: Reply<Result<Outcome, SessionError>>,
    },
    StartGame {
        reply: Reply<Result<Outcome, SessionError>>,
    },
    LeaveRoom {
        reply: Reply<Result<Outcome, SessionError>>,
    },
    SetDifficulty {
        difficulty: Difficulty,
        reply: Reply<Result<Outcome, SessionError>>,
    },
    SetUserId(UserId),
    OnConnect(Callback),
    OnDisconnect(Callback),
    State {
        reply: Reply<SessionState>,
    },
    Shutdown {
        reply: Reply<()>,
    },
}

/// Builder for configuring and starting a game client.
///
/// # Example
///
/// ```rust,ignore
/// use questlink::prelude::*;
///
/// let (renderer, mut updates) = ChannelRenderer::new();
/// let client = GameClient::builder()
///     .url("ws://127.0.0.1:5000/ws")
///     .user_id("3")
///     .build(renderer)?;
/// client.connect("7").await?;
/// ```
pub struct GameClientBuilder {
    transport: TransportConfig,
    session: SessionConfig,
    user_id: Option<UserId>,
}

impl GameClientBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            transport: TransportConfig::default(),
            session: SessionConfig::default(),
            user_id: None,
        }
    }

    /// Sets the server endpoint.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.transport.url = url.into();
        self
    }

    /// Sets how long a connection attempt may take.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.transport.connect_timeout = timeout;
        self
    }

    /// Sets the user identity known at startup.
    pub fn user_id(mut self, user_id: impl Into<UserId>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Sets the session configuration.
    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.session = config;
        self
    }

    /// Spawns the session task and returns a handle to it.
    ///
    /// Uses `JsonCodec` and `WebSocketDialer`.
    ///
    /// # Errors
    /// [`QuestlinkError::NoRuntime`] when called outside a Tokio runtime.
    pub fn build<R: Renderer>(
        self,
        renderer: R,
    ) -> Result<GameClient, QuestlinkError> {
        let runtime = tokio::runtime::Handle::try_current()?;

        let (dialer, events) = WebSocketDialer::new(self.transport);
        let mut manager =
            SessionManager::new(dialer, JsonCodec, renderer, self.session);
        if let Some(user_id) = self.user_id {
            manager.set_user_id(user_id);
        }

        let (commands, commands_rx) = mpsc::unbounded_channel();
        runtime.spawn(run_session(manager, commands_rx, events));

        Ok(GameClient { commands })
    }
}

impl Default for GameClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to a running game client.
///
/// Cheap to clone. Every operation is forwarded to the session task and
/// answered once it has run there. When the last handle is dropped the
/// task disconnects and exits.
#[derive(Clone)]
pub struct GameClient {
    commands: mpsc::UnboundedSender<Command>,
}

impl GameClient {
    /// Creates a new builder.
    pub fn builder() -> GameClientBuilder {
        GameClientBuilder::new()
    }

    /// Connects to `game_id`, replacing any session for another game.
    pub async fn connect(
        &self,
        game_id: impl Into<GameId>,
    ) -> Result<Outcome, QuestlinkError> {
        let game_id = game_id.into();
        self.call_session(|reply| Command::Connect { game_id, reply })
            .await
    }

    /// Tears the current session down.
    pub async fn disconnect(&self) -> Result<Outcome, QuestlinkError> {
        self.call(|reply| Command::Disconnect { reply }).await
    }

    /// Joins `game_id`'s room on the current connection.
    pub async fn join_room(
        &self,
        game_id: impl Into<GameId>,
    ) -> Result<Outcome, QuestlinkError> {
        let game_id = game_id.into();
        self.call_session(|reply| Command::JoinRoom { game_id, reply })
            .await
    }

    /// Requests the full game state once for this connection.
    pub async fn request_initial_state(
        &self,
    ) -> Result<Outcome, QuestlinkError> {
        self.call_session(|reply| Command::RequestInitialState { reply })
            .await
    }

    /// Sends a line of player input.
    pub async fn perform_action(
        &self,
        text: impl Into<String>,
    ) -> Result<Outcome, QuestlinkError> {
        let text = text.into();
        self.call_session(|reply| Command::PerformAction { text, reply })
            .await
    }

    pub async fn set_ready(&self) -> Result<Outcome, QuestlinkError> {
        self.call_session(|reply| Command::SetReady { reply }).await
    }

    pub async fn start_game(&self) -> Result<Outcome, QuestlinkError> {
        self.call_session(|reply| Command::StartGame { reply }).await
    }

    pub async fn leave_room(&self) -> Result<Outcome, QuestlinkError> {
        self.call_session(|reply| Command::LeaveRoom { reply }).await
    }

    pub async fn set_difficulty(
        &self,
        difficulty: Difficulty,
    ) -> Result<Outcome, QuestlinkError> {
        self.call_session(|reply| Command::SetDifficulty { difficulty, reply })
            .await
    }

    /// Resolves the user identity for outbound messages.
    pub fn set_user_id(
        &self,
        user_id: impl Into<UserId>,
    ) -> Result<(), QuestlinkError> {
        self.send(Command::SetUserId(user_id.into()))
    }

    /// Registers a callback for every transition into a connected state.
    ///
    /// Registered while already connected, it runs once on the session
    /// task's next turn.
    pub fn on_connect<F>(&self, callback: F) -> Result<(), QuestlinkError>
    where
        F: FnMut() + Send + 'static,
    {
        self.send(Command::OnConnect(Box::new(callback)))
    }

    /// Registers a callback for every loss of a live connection.
    pub fn on_disconnect<F>(&self, callback: F) -> Result<(), QuestlinkError>
    where
        F: FnMut() + Send + 'static,
    {
        self.send(Command::OnDisconnect(Box::new(callback)))
    }

    /// Returns the session's current state.
    pub async fn state(&self) -> Result<SessionState, QuestlinkError> {
        self.call(|reply| Command::State { reply }).await
    }

    /// Disconnects and stops the session task, for every handle.
    ///
    /// Returns once the task has torn the session down.
    pub async fn shutdown(&self) -> Result<(), QuestlinkError> {
        self.call(|reply| Command::Shutdown { reply }).await
    }

    /// Returns `true` once the session task has exited.
    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }

    fn send(&self, command: Command) -> Result<(), QuestlinkError> {
        self.commands
            .send(command)
            .map_err(|_| QuestlinkError::ClientClosed)
    }

    async fn call<T>(
        &self,
        command: impl FnOnce(Reply<T>) -> Command,
    ) -> Result<T, QuestlinkError> {
        let (reply, rx) = oneshot::channel();
        self.send(command(reply))?;
        rx.await.map_err(|_| QuestlinkError::ClientClosed)
    }

    async fn call_session(
        &self,
        command: impl FnOnce(Reply<Result<Outcome, SessionError>>) -> Command,
    ) -> Result<Outcome, QuestlinkError> {
        Ok(self.call(command).await??)
    }
}
