use thiserror::Error;

/// Recoverable errors surfaced to a single client connection. These never
/// tear down the room or the server; the session layer converts them to a
/// `ServerMsg::Error` frame and keeps the connection open.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("room '{0}' not found")]
    RoomNotFound(String),

    #[error("room '{0}' is full")]
    RoomFull(String),

    #[error("server is at capacity ({0} rooms)")]
    ServerFull(usize),
}
