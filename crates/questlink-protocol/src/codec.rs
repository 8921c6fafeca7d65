//! Codec trait and implementations for serializing/deserializing messages.
//!
//! A codec converts between Rust types and raw frame bytes. The session
//! layer only needs something that implements [`Codec`]; the JSON codec is
//! what the game server speaks today.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// `Send + Sync + 'static` because the codec lives inside the session
/// manager, which is moved onto a Tokio task.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// ## Example
///
/// ```rust
/// use questlink_protocol::{ClientMessage, Codec, GameId, JsonCodec};
///
/// let codec = JsonCodec;
/// let msg = ClientMessage::JoinGame {
///     game_id: GameId::from("7"),
///     user_id: None,
/// };
///
/// let bytes = codec.encode(&msg).unwrap();
/// let decoded: ClientMessage = codec.decode(&bytes).unwrap();
/// assert_eq!(msg, decoded);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ServerMessage;

    #[test]
    fn test_decode_garbage_returns_decode_error() {
        let result: Result<ServerMessage, _> =
            JsonCodec.decode(b"not json at all");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_encode_produces_utf8_json() {
        let bytes = JsonCodec.encode(&serde_json::json!({"a": 1})).unwrap();
        assert_eq!(std::str::from_utf8(&bytes).unwrap(), r#"{"a":1}"#);
    }
}
