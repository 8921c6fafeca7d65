//! Unified error type for the Questlink client.

use questlink_session::SessionError;

/// Top-level error returned by [`GameClient`](crate::GameClient).
///
/// Transport and codec failures reach the client through the session, so
/// they arrive wrapped in [`QuestlinkError::Session`]; `?` converts them via
/// the generated `From` impl.
#[derive(Debug, thiserror::Error)]
pub enum QuestlinkError {
    /// A session operation failed on the transport or the codec.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The client was built outside a Tokio runtime.
    #[error("no Tokio runtime available: {0}")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),

    /// The client's background task has exited.
    #[error("game client closed")]
    ClientClosed,
}

#[cfg(test)]
mod tests {
    use questlink_protocol::ProtocolError;
    use questlink_transport::TransportError;

    use super::*;

    #[test]
    fn test_from_session_transport_error_stays_transparent() {
        let err = SessionError::from(TransportError::ConnectionClosed(
            "reset".into(),
        ));
        let client_err: QuestlinkError = err.into();
        assert!(matches!(client_err, QuestlinkError::Session(_)));
        assert_eq!(client_err.to_string(), "connection closed: reset");
    }

    #[test]
    fn test_from_session_protocol_error() {
        let err = SessionError::from(ProtocolError::InvalidMessage("bad".into()));
        let client_err: QuestlinkError = err.into();
        assert!(matches!(
            client_err,
            QuestlinkError::Session(SessionError::Protocol(_))
        ));
    }

    #[test]
    fn test_client_closed_display() {
        assert_eq!(QuestlinkError::ClientClosed.to_string(), "game client closed");
    }
}
