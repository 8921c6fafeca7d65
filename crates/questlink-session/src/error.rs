//! Error types for the session layer.

use questlink_protocol::ProtocolError;
use questlink_transport::TransportError;

/// Errors that can occur while driving a session.
///
/// None of these are fatal: the worst case is a stalled session that needs
/// another `connect`. Operations that merely find their preconditions unmet
/// do not error; they return [`Outcome::Skipped`](crate::Outcome::Skipped).
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Dialing or writing to the transport failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// An outbound message could not be encoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
