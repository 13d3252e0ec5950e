//! Network protocol for the Pong match engine
//!
//! Messages are closed tagged unions. JSON (externally tagged, camelCase)
//! is the default wire format; postcard is available for binary transports.

mod error;
mod snapshot;

pub use error::ProtocolError;
pub use snapshot::{BallState, GameSnapshot, PaddleState};

use game_core::{Direction, Goals, Side};
use postcard::{from_bytes, to_allocvec};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

// ============================================================================
// Shared types
// ============================================================================

/// Seat a client claims when registering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerRole {
    Player1,
    Player2,
    Player3,
    Player4,
}

impl PlayerRole {
    pub fn as_str(self) -> &'static str {
        match self {
            PlayerRole::Player1 => "player1",
            PlayerRole::Player2 => "player2",
            PlayerRole::Player3 => "player3",
            PlayerRole::Player4 => "player4",
        }
    }
}

impl std::fmt::Display for PlayerRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorCode {
    MatchNotFound,
    MatchFull,
    RoleTaken,
    NotRegistered,
    InvalidMessage,
}

// ============================================================================
// C2S Messages (Client to Server)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum C2S {
    /// Join the match `match_id` as `player`
    Register {
        player: PlayerRole,
        user: String,
        match_id: String,
    },

    Ready { player: PlayerRole },

    /// Paddle direction: -1 = toward lower coordinate, 0 = stop, 1 = higher
    PlayerDirection { side: Side, dir: i8 },

    CloseSocket {},

    /// Ping for latency measurement
    Ping { t_ms: u64 },
}

/// A C2S message that passed validation
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Register {
        role: PlayerRole,
        user: String,
        match_id: String,
    },
    Ready {
        role: PlayerRole,
    },
    Direction {
        side: Side,
        dir: Direction,
    },
    Close,
    Ping {
        t_ms: u64,
    },
}

impl C2S {
    /// Check field values and turn the message into a typed command
    pub fn validate(self) -> Result<Command, ProtocolError> {
        match self {
            C2S::Register {
                player,
                user,
                match_id,
            } => {
                if match_id.trim().is_empty() {
                    return Err(ProtocolError::EmptyField("matchId"));
                }
                Ok(Command::Register {
                    role: player,
                    user,
                    match_id,
                })
            }
            C2S::Ready { player } => Ok(Command::Ready { role: player }),
            C2S::PlayerDirection { side, dir } => {
                let dir = Direction::try_from(dir).map_err(ProtocolError::InvalidDirection)?;
                Ok(Command::Direction { side, dir })
            }
            C2S::CloseSocket {} => Ok(Command::Close),
            C2S::Ping { t_ms } => Ok(Command::Ping { t_ms }),
        }
    }
}

// ============================================================================
// S2C Messages (Server to Client)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum S2C {
    /// Authoritative snapshot
    UpdateGameData(GameSnapshot),

    /// Someone left a running match; it is over
    PlayerDisconnection {},

    /// First kickoff
    LaunchGame {},

    ActiveConnections { count: u32 },

    /// Side assigned to the connection registered as `receiver`
    MyPaddle { side: Side, receiver: String },

    GameOver { winner: Option<Side>, goals: Goals },

    Error { code: ErrorCode, message: String },

    /// Pong response to ping
    Pong { t_ms: u64 },
}

// ============================================================================
// Serialization Helpers
// ============================================================================

/// Wire encoding of a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Codec {
    #[default]
    Json,
    Postcard,
}

impl Codec {
    pub fn encode<T: Serialize>(self, msg: &T) -> Result<Vec<u8>, ProtocolError> {
        match self {
            Codec::Json => Ok(serde_json::to_vec(msg)?),
            Codec::Postcard => Ok(to_allocvec(msg)?),
        }
    }

    pub fn decode<T: DeserializeOwned>(self, bytes: &[u8]) -> Result<T, ProtocolError> {
        match self {
            Codec::Json => Ok(serde_json::from_slice(bytes)?),
            Codec::Postcard => Ok(from_bytes(bytes)?),
        }
    }
}

impl C2S {
    /// Serialize C2S message to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, postcard::Error> {
        to_allocvec(self)
    }

    /// Deserialize C2S message from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, postcard::Error> {
        from_bytes(bytes)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

impl S2C {
    /// Serialize S2C message to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, postcard::Error> {
        to_allocvec(self)
    }

    /// Deserialize S2C message from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, postcard::Error> {
        from_bytes(bytes)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        S2C::Error {
            code,
            message: message.into(),
        }
    }
}
