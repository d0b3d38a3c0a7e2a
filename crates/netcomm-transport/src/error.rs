/// Errors that end a connection worker.
///
/// None of these reach the caller of `send_command`. A worker that hits
/// one logs it, marks the connection as lost, and exits.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The server closed the connection.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    /// Writing to the socket failed.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Reading from the socket failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),

    /// A worker panicked.
    #[error("worker {worker} panicked: {message}")]
    Panicked {
        worker: &'static str,
        message: String,
    },
}
