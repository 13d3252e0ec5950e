//! Authoritative Pong match server.
//!
//! Each match runs as its own tokio task owning a [`session::MatchSession`];
//! connections reach it through the [`registry::SessionRegistry`].

pub mod config;
pub mod error;
pub mod logger;
pub mod registry;
pub mod runner;
pub mod session;
pub mod transport;


pub use config::{load_config, MatchConfig, ServerConfig};
pub use error::SessionError;
pub use registry::{SessionHandle, SessionRegistry};
pub use session::{ConnId, Environment, GameClient, Inbound, MatchSession, SessionSettings};
