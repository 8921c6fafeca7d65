//! The session manager: one game binding, one connection, one state machine.
//!
//! The manager is sans-IO. It never blocks and never awaits: it asks its
//! [`Dialer`] for links, pushes encoded frames into them, and is told about
//! everything that happens on the wire through [`SessionManager::handle_event`].
//! Whoever owns it (the async driver, or a test) feeds it events and calls its
//! operations from one logical thread, so it needs no locking.
//!
//! # Idempotency
//!
//! Every "at most once per connection" rule is a flag on [`Session`], and
//! those flags only change inside the transitions below. Events from a
//! connection the session already abandoned carry a stale [`ConnectionId`]
//! and are dropped before they can touch anything.

use std::collections::VecDeque;

use questlink_protocol::{
    ClientMessage, Codec, Difficulty, GameId, ServerMessage, UserId,
};
use questlink_transport::{
    ConnectionId, Dialer, Link, LinkEvent, TransportEvent,
};

use crate::{
    ActionInput, Notice, Outcome, Renderer, RosterChange, Session,
    SessionConfig, SessionError, SessionState, SkipReason, StateUpdate,
    UpdateKind,
};

/// A lifecycle callback registered with `on_connect` / `on_disconnect`.
pub type Callback = Box<dyn FnMut() + Send + 'static>;

/// Owns the session for one game at a time and its single connection.
///
/// ## Lifecycle
///
/// ```text
/// connect(g) ──→ [Connecting] ──Connected──→ join_room + request_initial_state
///                                                  │
///     disconnect() / Disconnected / Failed ←───────┘
/// ```
pub struct SessionManager<D: Dialer, C: Codec, R: Renderer> {
    dialer: D,
    codec: C,
    renderer: R,
    config: SessionConfig,

    /// Who we are. Belongs to the user, not the connection, so it survives
    /// disconnects and game switches.
    user_id: Option<UserId>,

    session: Option<Session>,
    link: Option<D::Link>,

    on_connect: Vec<Callback>,
    on_disconnect: Vec<Callback>,
    /// Callbacks scheduled for the next [`run_deferred`](Self::run_deferred).
    deferred: VecDeque<Callback>,
}

impl<D: Dialer, C: Codec, R: Renderer> SessionManager<D, C, R> {
    /// Creates an idle manager.
    pub fn new(dialer: D, codec: C, renderer: R, config: SessionConfig) -> Self {
        Self {
            dialer,
            codec,
            renderer,
            config,
            user_id: None,
            session: None,
            link: None,
            on_connect: Vec::new(),
            on_disconnect: Vec::new(),
            deferred: VecDeque::new(),
        }
    }

    // =====================================================================
    // Accessors
    // =====================================================================

    /// The current session, if one exists.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// The current state; [`SessionState::Idle`] when there is no session.
    pub fn state(&self) -> SessionState {
        self.session
            .as_ref()
            .map_or(SessionState::Idle, |s| s.state)
    }

    /// Returns `true` while the session's connection is live.
    pub fn is_connected(&self) -> bool {
        self.state().is_connected()
    }

    /// The resolved user id, if any.
    pub fn user_id(&self) -> Option<&UserId> {
        self.user_id.as_ref()
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Returns `true` if callbacks are waiting for the next tick.
    pub fn has_deferred(&self) -> bool {
        !self.deferred.is_empty()
    }

    // =====================================================================
    // Identity
    // =====================================================================

    /// Resolves the user identity used in outbound messages.
    ///
    /// Does not retry anything that was skipped for lack of a user id; call
    /// [`request_initial_state`](Self::request_initial_state) again if
    /// needed.
    pub fn set_user_id(&mut self, user_id: UserId) {
        tracing::debug!(%user_id, "user id resolved");
        self.user_id = Some(user_id);
    }

    // =====================================================================
    // Connection lifecycle
    // =====================================================================

    /// Starts a connection for `game_id`.
    ///
    /// - Already connected to `game_id` → no-op.
    /// - Attempt for `game_id` already in flight → no-op.
    /// - Session bound to another game → that session is torn down first
    ///   (its callbacks are cleared), then a fresh one starts.
    ///
    /// # Errors
    /// [`SessionError::Transport`] if the dialer refuses outright. The
    /// session is left `Disconnected` for `game_id`.
    pub fn connect(&mut self, game_id: GameId) -> Result<Outcome, SessionError> {
        if game_id.is_blank() {
            return skipped("connect", SkipReason::BlankGameId);
        }

        if let Some(session) = &self.session {
            if session.game_id == game_id {
                match session.state {
                    SessionState::ConnectedNotJoined
                    | SessionState::ConnectedJoined => {
                        return skipped("connect", SkipReason::AlreadyConnected);
                    }
                    SessionState::Connecting => {
                        return skipped("connect", SkipReason::ConnectInFlight);
                    }
                    SessionState::Disconnected | SessionState::Idle => {}
                }
            } else {
                tracing::info!(
                    from = %session.game_id,
                    to = %game_id,
                    "switching games"
                );
                self.disconnect();
            }
        }

        // A `Disconnected` session of the same game may still hold a dead
        // link; it is replaced below.
        self.close_link();

        match self.dialer.dial() {
            Ok(link) => {
                let conn_id = link.id();
                tracing::info!(%game_id, %conn_id, "connecting");
                self.session = Some(Session::connecting(game_id, conn_id));
                self.link = Some(link);
                Ok(Outcome::Applied)
            }
            Err(e) => {
                tracing::warn!(%game_id, error = %e, "dial failed");
                self.session = Some(Session::unreachable(game_id));
                Err(e.into())
            }
        }
    }

    /// Tears the session down.
    ///
    /// Closes the transport, fires disconnect callbacks if the session had
    /// reached a connected state, then clears every flag and every callback
    /// registration (including deferred ones). Safe to call repeatedly.
    pub fn disconnect(&mut self) -> Outcome {
        self.close_link();

        let outcome = match self.session.take() {
            Some(session) => {
                tracing::info!(game_id = %session.game_id, "session disconnected");
                if session.state.is_connected() {
                    self.fire_disconnect_callbacks();
                }
                Outcome::Applied
            }
            None => Outcome::Skipped(SkipReason::NoSession),
        };

        self.on_connect.clear();
        self.on_disconnect.clear();
        self.deferred.clear();
        outcome
    }

    /// Feeds one transport event into the state machine.
    ///
    /// Events from any connection other than the session's current one are
    /// dropped.
    pub fn handle_event(&mut self, event: LinkEvent) {
        let LinkEvent { conn_id, event } = event;

        if !self.is_current(conn_id) {
            tracing::trace!(%conn_id, ?event, "dropping event from stale connection");
            return;
        }

        match event {
            TransportEvent::Connected => self.on_transport_connected(),
            TransportEvent::Message(data) => self.on_frame(&data),
            TransportEvent::Disconnected { reason } => {
                self.on_transport_lost(&reason);
            }
            TransportEvent::Failed(err) => {
                self.on_transport_lost(&err.to_string());
            }
        }
    }

    // =====================================================================
    // Handshakes
    // =====================================================================

    /// Joins the game's room on the current connection.
    ///
    /// Emits `join_game` at most once per connection, and only for the
    /// session's own game. Needs a resolved user id; until then the room
    /// stays unjoined and the call can be repeated after
    /// [`set_user_id`](Self::set_user_id).
    pub fn join_room(&mut self, game_id: &GameId) -> Result<Outcome, SessionError> {
        let Some(session) = &self.session else {
            return skipped("join_room", SkipReason::NoSession);
        };
        if session.game_id != *game_id {
            return skipped("join_room", SkipReason::GameMismatch);
        }
        if session.has_joined_room {
            return skipped("join_room", SkipReason::AlreadyJoined);
        }
        if !session.state.is_connected() {
            return skipped("join_room", SkipReason::NotConnected);
        }
        let Some(user_id) = self.user_id.clone() else {
            return skipped("join_room", SkipReason::UserUnresolved);
        };

        self.emit(&ClientMessage::JoinGame {
            game_id: game_id.clone(),
            user_id: Some(user_id),
        })?;

        if let Some(session) = self.session.as_mut() {
            session.has_joined_room = true;
            session.state = SessionState::ConnectedJoined;
        }
        Ok(Outcome::Applied)
    }

    /// Asks the server for a full snapshot.
    ///
    /// Emits `request_state` at most once per connection. Needs a live
    /// connection and a resolved user id; otherwise a no-op that is not
    /// retried.
    pub fn request_initial_state(&mut self) -> Result<Outcome, SessionError> {
        let Some(session) = &self.session else {
            return skipped("request_initial_state", SkipReason::NoSession);
        };
        if !session.state.is_connected() {
            return skipped("request_initial_state", SkipReason::NotConnected);
        }
        if session.has_requested_initial_state {
            return skipped(
                "request_initial_state",
                SkipReason::AlreadyRequested,
            );
        }
        let Some(user_id) = self.user_id.clone() else {
            return skipped("request_initial_state", SkipReason::UserUnresolved);
        };

        self.emit(&ClientMessage::RequestState {
            game_id: session.game_id.clone(),
            user_id,
        })?;

        if let Some(session) = self.session.as_mut() {
            session.has_requested_initial_state = true;
        }
        Ok(Outcome::Applied)
    }

    /// Leaves the room joined on this connection.
    pub fn leave_room(&mut self) -> Result<Outcome, SessionError> {
        let game_id = match self.live_game_id() {
            Ok(game_id) => game_id,
            Err(reason) => return skipped("leave_room", reason),
        };
        if !self.session.as_ref().is_some_and(|s| s.has_joined_room) {
            return skipped("leave_room", SkipReason::NotJoined);
        }

        self.emit(&ClientMessage::LeaveGame {
            game_id,
            user_id: self.user_id.clone(),
        })?;

        if let Some(session) = self.session.as_mut() {
            session.has_joined_room = false;
            session.state = SessionState::ConnectedNotJoined;
        }
        Ok(Outcome::Applied)
    }

    // =====================================================================
    // Player input
    // =====================================================================

    /// Sends what the player typed.
    ///
    /// Input starting with the configured command prefix becomes a
    /// `slash_command`; anything else a `player_action`. Empty input, a
    /// dead connection and an unresolved user id are silent no-ops.
    pub fn perform_action(&mut self, text: &str) -> Result<Outcome, SessionError> {
        let Some(input) = ActionInput::parse(text, self.config.command_prefix)
        else {
            return skipped("perform_action", SkipReason::EmptyInput);
        };
        let game_id = match self.live_game_id() {
            Ok(game_id) => game_id,
            Err(reason) => return skipped("perform_action", reason),
        };
        let Some(user_id) = self.user_id.clone() else {
            return skipped("perform_action", SkipReason::UserUnresolved);
        };

        self.emit(&input.into_message(game_id, Some(user_id)))?;
        Ok(Outcome::Applied)
    }

    /// Marks this player ready.
    pub fn set_ready(&mut self) -> Result<Outcome, SessionError> {
        let game_id = match self.live_game_id() {
            Ok(game_id) => game_id,
            Err(reason) => return skipped("set_ready", reason),
        };
        self.emit(&ClientMessage::PlayerReady {
            game_id,
            user_id: self.user_id.clone(),
        })?;
        Ok(Outcome::Applied)
    }

    /// Asks the server to start the game.
    pub fn start_game(&mut self) -> Result<Outcome, SessionError> {
        let game_id = match self.live_game_id() {
            Ok(game_id) => game_id,
            Err(reason) => return skipped("start_game", reason),
        };
        self.emit(&ClientMessage::StartGame {
            game_id,
            user_id: self.user_id.clone(),
        })?;
        Ok(Outcome::Applied)
    }

    /// Changes the game's difficulty.
    pub fn set_difficulty(
        &mut self,
        difficulty: Difficulty,
    ) -> Result<Outcome, SessionError> {
        let game_id = match self.live_game_id() {
            Ok(game_id) => game_id,
            Err(reason) => return skipped("set_difficulty", reason),
        };
        self.emit(&ClientMessage::SetDifficulty {
            game_id,
            user_id: self.user_id.clone(),
            difficulty,
        })?;
        Ok(Outcome::Applied)
    }

    // =====================================================================
    // Callbacks
    // =====================================================================

    /// Runs `callback` on every transition into a connected state.
    ///
    /// If the session is already connected, `callback` is instead scheduled
    /// once for the next [`run_deferred`](Self::run_deferred) so the caller
    /// does not miss the connection it registered too late for.
    pub fn on_connect<F>(&mut self, callback: F)
    where
        F: FnMut() + Send + 'static,
    {
        if self.is_connected() {
            self.deferred.push_back(Box::new(callback));
        } else {
            self.on_connect.push(Box::new(callback));
        }
    }

    /// Runs `callback` whenever a connected session loses its connection.
    pub fn on_disconnect<F>(&mut self, callback: F)
    where
        F: FnMut() + Send + 'static,
    {
        self.on_disconnect.push(Box::new(callback));
    }

    /// Runs the callbacks scheduled for this tick. Returns how many ran.
    pub fn run_deferred(&mut self) -> usize {
        let mut ran = 0;
        while let Some(mut callback) = self.deferred.pop_front() {
            callback();
            ran += 1;
        }
        ran
    }

    // =====================================================================
    // Transitions
    // =====================================================================

    fn on_transport_connected(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.state != SessionState::Connecting {
            tracing::debug!(state = ?session.state, "ignoring duplicate connected event");
            return;
        }

        session.state = SessionState::ConnectedNotJoined;
        session.has_joined_room = false;
        session.has_requested_initial_state = false;
        let game_id = session.game_id.clone();
        tracing::info!(%game_id, conn_id = ?session.conn_id, "connected");

        log_failure("join_room", self.join_room(&game_id));
        log_failure("request_initial_state", self.request_initial_state());

        for callback in &mut self.on_connect {
            callback();
        }
    }

    fn on_transport_lost(&mut self, reason: &str) {
        let Some(session) = self.session.as_mut() else {
            return;
        };

        let was_connected = session.state.is_connected();
        session.state = SessionState::Disconnected;
        session.conn_id = None;
        session.has_joined_room = false;
        session.has_requested_initial_state = false;
        tracing::warn!(game_id = %session.game_id, %reason, was_connected, "connection lost");

        self.link = None;
        if was_connected {
            self.fire_disconnect_callbacks();
        }
    }

    fn on_frame(&mut self, data: &[u8]) {
        match self.codec.decode::<ServerMessage>(data) {
            Ok(msg) => self.dispatch(msg),
            Err(e) => {
                tracing::debug!(error = %e, len = data.len(), "dropping undecodable frame");
            }
        }
    }

    /// Routes one inbound message to the renderer.
    fn dispatch(&mut self, msg: ServerMessage) {
        let current = self.session.as_ref().map(|s| s.game_id.clone());

        match msg {
            ServerMessage::ConnectionResponse { status } => {
                tracing::debug!(%status, "server greeted connection");
            }
            ServerMessage::GameState(payload) => {
                self.renderer.apply_state_update(StateUpdate {
                    kind: UpdateKind::Snapshot,
                    payload,
                });
            }
            ServerMessage::GameStateUpdate(payload)
            | ServerMessage::GameUpdate(payload) => {
                self.renderer.apply_state_update(StateUpdate {
                    kind: UpdateKind::Incremental,
                    payload,
                });
            }
            ServerMessage::PlayerList { players } => {
                self.renderer.notify(Notice::Roster(RosterChange::Full(players)));
            }
            ServerMessage::PlayerJoined(player) => {
                self.renderer
                    .notify(Notice::Roster(RosterChange::Joined(player)));
            }
            ServerMessage::PlayerLeft { user_id } => {
                self.renderer
                    .notify(Notice::Roster(RosterChange::Left(user_id)));
            }
            ServerMessage::PlayerStatusUpdate { user_id, is_ready } => {
                self.renderer.notify(Notice::Roster(RosterChange::Ready {
                    user_id,
                    is_ready,
                }));
            }
            ServerMessage::GameStarted { game_id } => {
                if current.as_ref() == Some(&game_id) {
                    self.renderer.notify(Notice::GameStarted(game_id));
                } else {
                    tracing::debug!(%game_id, "ignoring start of another game");
                }
            }
            ServerMessage::GameConcluded { game_id, message } => {
                if game_id.is_none() || game_id == current {
                    self.renderer.notify(Notice::GameConcluded { message });
                } else {
                    tracing::debug!(?game_id, "ignoring conclusion of another game");
                }
            }
            ServerMessage::CommandResponse(payload) => {
                self.renderer.notify(Notice::CommandResponse(payload));
            }
            ServerMessage::Error { message } => {
                tracing::warn!(%message, "server reported error");
                self.renderer.notify(Notice::ServerError(message));
            }
        }
    }

    // =====================================================================
    // Helpers
    // =====================================================================

    fn is_current(&self, conn_id: ConnectionId) -> bool {
        self.session
            .as_ref()
            .and_then(|s| s.conn_id)
            .is_some_and(|current| current == conn_id)
    }

    /// The session's game id, if its connection is live.
    fn live_game_id(&self) -> Result<GameId, SkipReason> {
        let session = self.session.as_ref().ok_or(SkipReason::NoSession)?;
        if !session.state.is_connected() {
            return Err(SkipReason::NotConnected);
        }
        Ok(session.game_id.clone())
    }

    /// Encodes `msg` and hands it to the current link.
    fn emit(&self, msg: &ClientMessage) -> Result<(), SessionError> {
        let link = self.link.as_ref().ok_or_else(|| {
            questlink_transport::TransportError::ConnectionClosed(
                "no live link".into(),
            )
        })?;
        let bytes = self.codec.encode(msg)?;
        link.send(bytes)?;
        tracing::debug!(
            event = msg.event_name(),
            game_id = %msg.game_id(),
            conn_id = %link.id(),
            "emitted"
        );
        Ok(())
    }

    fn close_link(&mut self) {
        if let Some(link) = self.link.take() {
            tracing::debug!(conn_id = %link.id(), "closing link");
            link.close();
        }
    }

    fn fire_disconnect_callbacks(&mut self) {
        for callback in &mut self.on_disconnect {
            callback();
        }
    }
}

fn skipped(op: &'static str, reason: SkipReason) -> Result<Outcome, SessionError> {
    tracing::debug!(op, %reason, "skipped");
    Ok(Outcome::Skipped(reason))
}

fn log_failure(op: &'static str, result: Result<Outcome, SessionError>) {
    if let Err(e) = result {
        tracing::warn!(op, error = %e, "handshake step failed");
    }
}

// =========================================================================
// Tests
// =========================================================================
