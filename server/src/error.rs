use proto::{ErrorCode, PlayerRole, ProtocolError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no active session for match `{0}`")]
    MatchSessionNotFound(String),

    #[error("match `{0}` already exists")]
    DuplicateMatch(String),

    #[error("match is full")]
    MatchFull,

    #[error("role {0} is already taken")]
    RoleTaken(PlayerRole),

    #[error("unsupported player count {0}")]
    UnsupportedPlayerCount(u8),

    #[error("client connection closed")]
    ClientGone,

    #[error("session inbox closed")]
    InboxClosed,

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SessionError {
    /// Code reported to the client when a request is refused
    pub fn code(&self) -> ErrorCode {
        match self {
            SessionError::MatchSessionNotFound(_) => ErrorCode::MatchNotFound,
            SessionError::MatchFull => ErrorCode::MatchFull,
            SessionError::RoleTaken(_) => ErrorCode::RoleTaken,
            _ => ErrorCode::InvalidMessage,
        }
    }
}
