//! A [`Renderer`] that forwards everything into a Tokio channel.

use questlink_session::{Notice, Renderer, StateUpdate};
use tokio::sync::mpsc;

/// Something the session routed to the renderer.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderEvent {
    State(StateUpdate),
    Notice(Notice),
}

/// Forwards state updates and notices to an async consumer, e.g. a UI task.
///
/// Sends never block. Once the receiver is dropped, updates are discarded.
#[derive(Debug, Clone)]
pub struct ChannelRenderer {
    tx: mpsc::UnboundedSender<RenderEvent>,
}

impl ChannelRenderer {
    /// Creates a renderer and the receiver it forwards to.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<RenderEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn forward(&self, event: RenderEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("render receiver dropped, discarding update");
        }
    }
}

impl Renderer for ChannelRenderer {
    fn apply_state_update(&mut self, update: StateUpdate) {
        self.forward(RenderEvent::State(update));
    }

    fn notify(&mut self, notice: Notice) {
        self.forward(RenderEvent::Notice(notice));
    }
}

#[cfg(test)]
mod tests {
    use questlink_session::UpdateKind;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_channel_renderer_forwards_in_order() {
        let (mut renderer, mut rx) = ChannelRenderer::new();

        renderer.apply_state_update(StateUpdate {
            kind: UpdateKind::Snapshot,
            payload: json!({"turn": 1}),
        });
        renderer.notify(Notice::ServerError("nope".into()));

        assert!(matches!(
            rx.try_recv().unwrap(),
            RenderEvent::State(StateUpdate { kind: UpdateKind::Snapshot, .. })
        ));
        assert_eq!(
            rx.try_recv().unwrap(),
            RenderEvent::Notice(Notice::ServerError("nope".into()))
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_channel_renderer_survives_dropped_receiver() {
        let (mut renderer, rx) = ChannelRenderer::new();
        drop(rx);

        renderer.notify(Notice::GameConcluded { message: None });
    }
}
