//! The session task: owns the `SessionManager` and feeds it.
//!
//! The task selects over two inputs:
//!   1. Commands from `GameClient` handles → session operations
//!   2. Transport events from the dialer's connection tasks → `handle_event`
//!
//! After every turn it runs whatever callbacks the manager deferred. It
//! exits on `Shutdown` or when every handle is gone, disconnecting first.

use questlink_protocol::Codec;
use questlink_session::{Renderer, SessionManager};
use questlink_transport::{Dialer, EventReceiver};
use tokio::sync::mpsc;

use crate::client::Command;

/// Runs one session until shutdown.
pub(crate) async fn run_session<D, C, R>(
    mut manager: SessionManager<D, C, R>,
    mut commands: mpsc::UnboundedReceiver<Command>,
    mut events: EventReceiver,
) where
    D: Dialer,
    C: Codec,
    R: Renderer,
{
    tracing::debug!("session task started");
    let mut on_exit = None;

    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(Command::Shutdown { reply }) => {
                    on_exit = Some(reply);
                    break;
                }
                Some(command) => apply(&mut manager, command),
                None => {
                    tracing::debug!("all client handles dropped");
                    break;
                }
            },
            Some(event) = events.recv() => manager.handle_event(event),
        }

        let ran = manager.run_deferred();
        if ran > 0 {
            tracing::trace!(ran, "ran deferred callbacks");
        }
    }

    manager.disconnect();
    tracing::info!("session task stopped");
    if let Some(reply) = on_exit {
        let _ = reply.send(());
    }
}

/// Runs one command against the manager and answers it.
///
/// A dropped reply receiver only means the caller stopped waiting.
fn apply<D, C, R>(manager: &mut SessionManager<D, C, R>, command: Command)
where
    D: Dialer,
    C: Codec,
    R: Renderer,
{
    match command {
        Command::Connect { game_id, reply } => {
            let _ = reply.send(manager.connect(game_id));
        }
        Command::Disconnect { reply } => {
            let _ = reply.send(manager.disconnect());
        }
        Command::JoinRoom { game_id, reply } => {
            let _ = reply.send(manager.join_room(&game_id));
        }
        Command::RequestInitialState { reply } => {
            let _ = reply.send(manager.request_initial_state());
        }
        Command::PerformAction { text, reply } => {
            let _ = reply.send(manager.perform_action(&text));
        }
        Command::SetReady { reply } => {
            let _ = reply.send(manager.set_ready());
        }
        Command::StartGame { reply } => {
            let _ = reply.send(manager.start_game());
        }
        Command::LeaveRoom { reply } => {
            let _ = reply.send(manager.leave_room());
        }
        Command::SetDifficulty { difficulty, reply } => {
            let _ = reply.send(manager.set_difficulty(difficulty));
        }
        Command::SetUserId(user_id) => manager.set_user_id(user_id),
        Command::OnConnect(callback) => manager.on_connect(callback),
        Command::OnDisconnect(callback) => manager.on_disconnect(callback),
        Command::State { reply } => {
            let _ = reply.send(manager.state());
        }
        Command::Shutdown { reply } => {
            // Handled by the loop; answer anyway if it ever lands here.
            let _ = reply.send(());
        }
    }
}
