//! Outgoing message construction

use game_core::{Direction, Side};
use proto::{Codec, PlayerRole, ProtocolError, C2S};

pub fn register_message(role: PlayerRole, user: &str, match_id: &str) -> C2S {
    C2S::Register {
        player: role,
        user: user.to_string(),
        match_id: match_id.to_string(),
    }
}

pub fn ready_message(role: PlayerRole) -> C2S {
    C2S::Ready { player: role }
}

pub fn direction_message(side: Side, dir: Direction) -> C2S {
    C2S::PlayerDirection {
        side,
        dir: dir.as_i8(),
    }
}

pub fn ping_message(t_ms: u64) -> C2S {
    C2S::Ping { t_ms }
}

pub fn close_message() -> C2S {
    C2S::CloseSocket {}
}

/// Encode for the wire in the connection's codec
pub fn encode(codec: Codec, msg: &C2S) -> Result<Vec<u8>, ProtocolError> {
    codec.encode(msg)
}
