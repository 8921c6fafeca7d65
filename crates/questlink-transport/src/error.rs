/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Opening the connection failed (DNS, TCP, or WebSocket upgrade).
    #[error("connect failed: {0}")]
    ConnectFailed(#[source] std::io::Error),

    /// The server did not complete the connection within the configured
    /// timeout.
    #[error("connect timed out after {0:?}")]
    ConnectTimeout(std::time::Duration),

    /// Sending data failed.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Receiving data failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),

    /// The connection was closed, locally or by the server.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),
}
