//! Error types for the protocol layer.
//!
//! When you see a `ProtocolError`, the problem is in turning messages into
//! bytes or back, not in networking or session state.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: malformed JSON, an unknown `event` tag, or a payload
    /// missing a field the message type requires.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The message decoded but makes no sense at the protocol level.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
